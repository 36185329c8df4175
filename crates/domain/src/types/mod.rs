//! Domain types and models

pub mod endpoint;
pub mod session;
pub mod suspension;

pub use endpoint::{EndpointCandidate, NetworkType, ResolvedEndpoint};
pub use session::{Session, SessionStatus, StoredSession};
pub use suspension::SuspensionNotice;

//! Exactly-once handling of account suspension signals

pub mod guard;
pub mod ports;

pub use guard::SuspensionGuard;
pub use ports::SuspensionHandler;

//! Request retry policy

pub mod attempt;

pub use attempt::{
    decide_response, decide_transport_failure, is_auth_rejection, RequestAttempt,
    ResponseDecision,
};

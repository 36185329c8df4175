//! Endpoint discovery ports

pub mod ports;

pub use ports::EndpointResolver;

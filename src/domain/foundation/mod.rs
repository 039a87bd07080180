//! Shared foundation types for the domain layer.

mod errors;
mod timestamp;

pub use errors::DomainError;
pub use timestamp::Timestamp;

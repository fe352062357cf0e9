//! Core domain types shared across modules

pub mod error;
pub mod question;

pub use error::DomainError;
pub use question::Question;

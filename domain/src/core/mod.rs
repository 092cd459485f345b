//! Core domain concepts shared across all subdomains.
//!
//! - [`api_key::ApiKey`]: credential for the completion endpoint
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: text normalization helpers

pub mod api_key;
pub mod error;
pub mod string;

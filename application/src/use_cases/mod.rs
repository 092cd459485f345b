//! Use cases (application services)

pub mod generate_questions;
pub mod validate_api_key;

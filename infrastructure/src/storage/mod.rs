//! File-backed storage
//!
//! - [`JsonQuizRepository`]: library and API key as JSON files in the data
//!   directory

mod json_repository;

pub use json_repository::{API_KEY_FILE, JsonQuizRepository, LIBRARY_FILE};

//! Configuration value objects shared by the config loader and the binary.

mod validation;

pub use validation::{ConfigIssue, ConfigIssueCode, Severity};

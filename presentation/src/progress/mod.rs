//! Progress reporting for command-line generation

pub mod reporter;

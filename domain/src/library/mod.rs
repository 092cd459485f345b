//! Library domain
//!
//! Topics group sources; sources ground and own generated questions.
//!
//! - [`entities`]: [`Topic`], [`Source`], [`SourceDraft`]
//! - [`aggregate`]: [`Library`], the consistency boundary for all edits
//! - [`picker`]: importance-weighted random source selection

pub mod aggregate;
pub mod entities;
pub mod picker;

pub use aggregate::Library;
pub use entities::{DEFAULT_IMPORTANCE, MAX_IMPORTANCE, Source, SourceDraft, Topic};
pub use picker::pick_source;

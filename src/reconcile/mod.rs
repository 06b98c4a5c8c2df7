//! Cross-sample reconciliation
//!
//! Compares the per-sample schema trees produced by inference and turns their
//! disagreements into typed conflicts, resolutions and advisories:
//!
//! - [`flatten_schema`] projects a tree into path-addressed field records
//! - [`OccurrenceTable`] groups those records by path and counts them
//! - [`classify_conflicts`] derives null, type, optionality and format conflicts
//! - [`validate_arrays`] degrades arrays whose item shapes disagree
//! - [`apply_resolutions`] writes resolutions onto the merged tree
//! - [`compose_suggestions`] renders conflicts as human-readable advice

mod arrays;
mod conflict;
mod flatten;
mod occurrence;
mod resolve;
mod suggest;

pub use arrays::validate_arrays;
pub use conflict::{
    Conflict, ConflictKind, FormatAction, Resolution, ResolutionType, Severity, classify_conflicts,
};
pub use flatten::{FlattenedField, flatten_schema};
pub use occurrence::{Occurrence, OccurrenceTable};
pub use resolve::apply_resolutions;
pub use suggest::{Suggestion, compose_suggestions};

//! Core types shared across the zone pipeline crates.

pub mod error;
pub mod format;
pub mod ids;
pub mod source;

pub use error::{ModelError, Result};
pub use format::FileFormat;
pub use ids::RelationName;
pub use source::SourceSpec;

//! Entity resolution between two sources' spellings of the same entities.
//!
//! # Example
//!
//! ```
//! use zones_resolve::resolve;
//!
//! let mapping = resolve(&["Cote dIvoire"], &["Côte d'Ivoire", "Chile"]);
//! assert_eq!(mapping.get("Cote dIvoire"), Some("Côte d'Ivoire"));
//! ```

mod apply;
mod error;
mod resolver;

pub use apply::{distinct_labels, rewrite_column};
pub use error::{ResolveError, Result};
pub use resolver::{MatchKind, MatchedPair, ResolutionMapping, edit_distance, resolve};

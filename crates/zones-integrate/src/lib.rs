//! Version integration for the trusted zone.
//!
//! Relations loaded from successive snapshots of one source (`wgi_2019`,
//! `wgi_2020`, ...) are stacked on their union schema, stripped of exact
//! duplicate rows and written back as the source's canonical relation.

mod dedupe;
mod error;
mod frame;
mod integrator;
mod overview;

pub use dedupe::drop_duplicate_rows;
pub use error::{IntegrateError, Result};
pub use frame::{cell_key, concat_aligned, union_schema, widen};
pub use integrator::{IntegrationOutcome, integrate, integrate_all, version_relations};
pub use overview::{DuplicationOverview, duplication_overview};

//! Constituency-level views of a merged village layer: statistics grouped by
//! an AC column, and polygons dissolved by the same column.

mod aggregate;
mod dissolve;

pub use aggregate::{aggregate, round2, weighted_column, AcAggregate, AcStats};
pub use dissolve::{dissolve, AcLayer};

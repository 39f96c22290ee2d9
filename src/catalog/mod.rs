//! Objects to group and their pairwise relations.
//!
//! - [`ObjectCatalog`]: the read-only input contract
//! - [`MatrixCatalog`]: a dense in-memory implementation
//! - [`RelationTables`]: a sanitized snapshot with precomputed sorted lists,
//!   shared read-only by every worker during a run

mod matrix;
mod tables;
mod types;

pub use matrix::MatrixCatalog;
pub use tables::{Affinity, RelationTables};
pub use types::{ObjectCatalog, ObjectId};

#[cfg(test)]
pub(crate) use tables::OneWay;

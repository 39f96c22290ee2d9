//! Shared, read-only inputs of a grouping run.

use crate::catalog::{ObjectCatalog, RelationTables};

/// Hard constraints every group must satisfy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupConstraints {
    /// Maximum number of members in a group.
    pub max_group_size: usize,
    /// Groups smaller than this are broken up by the repair pass when
    /// their members fit elsewhere.
    pub min_group_size: usize,
    /// Every pair of members must have at least this similarity.
    pub min_similarity: f64,
    /// No pair of members may exceed this disagreement ratio.
    pub max_disagreement: f64,
    /// Whether objects sharing a parent may share a group.
    pub allow_same_parent: bool,
}

impl Default for GroupConstraints {
    fn default() -> Self {
        Self {
            max_group_size: usize::MAX,
            min_group_size: 1,
            min_similarity: 0.0,
            max_disagreement: 1.0,
            allow_same_parent: false,
        }
    }
}

/// Relation tables plus constraints, shared by reference across workers.
///
/// Nothing in a context changes during a run.
#[derive(Debug, Clone)]
pub struct GroupingContext {
    tables: RelationTables,
    constraints: GroupConstraints,
    max_groups: usize,
}

impl GroupingContext {
    /// Creates a context. `max_groups` caps the group pool and defaults to
    /// the object count.
    pub fn new(
        tables: RelationTables,
        constraints: GroupConstraints,
        max_groups: Option<usize>,
    ) -> Self {
        let max_groups = max_groups.unwrap_or(tables.len()).max(1);
        Self {
            tables,
            constraints,
            max_groups,
        }
    }

    /// Snapshots `catalog` and builds a context from it.
    pub fn from_catalog<C: ObjectCatalog + ?Sized>(
        catalog: &C,
        constraints: GroupConstraints,
        max_groups: Option<usize>,
    ) -> Self {
        Self::new(RelationTables::from_catalog(catalog), constraints, max_groups)
    }

    pub fn tables(&self) -> &RelationTables {
        &self.tables
    }

    pub fn constraints(&self) -> &GroupConstraints {
        &self.constraints
    }

    /// Hard capacity of each partition's group pool.
    pub fn max_groups(&self) -> usize {
        self.max_groups
    }

    pub fn object_count(&self) -> usize {
        self.tables.len()
    }
}

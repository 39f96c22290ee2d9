//! Constrained partitions and the heuristics that build them.
//!
//! # Key Types
//!
//! - [`GroupPartition`]: pooled groups plus an `object -> group` index
//! - [`GroupingContext`]: relation tables and [`GroupConstraints`], shared
//!   read-only during a run
//! - [`GroupingHeuristic`](heuristic::GroupingHeuristic): pluggable
//!   placement strategy, driven by [`run_heuristic`](heuristic::run_heuristic)
//!
//! # Invariants
//!
//! Once a heuristic run completes, every object belongs to exactly one
//! group, no group exceeds `max_group_size`, and every pair of members
//! satisfies the similarity, disagreement and parent constraints.

mod context;
mod criteria;
mod group;
pub mod heuristic;
mod partition;

pub use context::{GroupConstraints, GroupingContext};
pub use criteria::{CriteriaParams, CriterionParams};
pub use group::{Group, GroupId, GroupScores};
pub use heuristic::{GroupingHeuristic, HeuristicKind};
pub use partition::GroupPartition;

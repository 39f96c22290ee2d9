//! PROMETHEE multi-criteria outranking.
//!
//! Used twice by the engine: to rank whole chromosomes after each
//! generation, and inside the nearest-neighbour heuristic to choose the
//! best group for a single object.
//!
//! # Key Types
//!
//! - [`Criterion`]: direction, thresholds and weight of one criterion
//! - [`PrometheeKernel`]: computes net flows and `Fi` for a solution set
//!
//! # References
//!
//! - Brans & Vincke (1985), "A Preference Ranking Organisation Method"
//! - Brans, Vincke & Mareschal (1986), "How to select and how to rank
//!   projects: The PROMETHEE method"

mod criterion;
mod kernel;

pub use criterion::{Criterion, CriterionKind};
pub use kernel::{PrometheeKernel, Solution};

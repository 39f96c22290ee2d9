//! Constrained grouping with a grouping genetic algorithm and PROMETHEE
//! multi-criteria ranking.
//!
//! Partitions a catalog of objects into groups so that members are
//! similar, agree and rarely disagree, under hard constraints on group
//! size, pairwise similarity, pairwise disagreement and shared parents.
//!
//! - **Catalog**: the [`ObjectCatalog`](catalog::ObjectCatalog) trait
//!   supplies pairwise relations; [`RelationTables`](catalog::RelationTables)
//!   snapshots them with presorted lookup lists.
//! - **Grouping**: [`GroupPartition`](grouping::GroupPartition) with a
//!   pooled group arena, admissibility checks, and pluggable construction
//!   heuristics (first-fit, nearest-neighbour) plus repair passes.
//! - **PROMETHEE**: [`PrometheeKernel`](promethee::PrometheeKernel) ranks
//!   solutions on weighted criteria with linear preference functions.
//! - **GGA**: [`GgaRunner`](gga::GgaRunner) evolves partitions with
//!   group-level crossover and mutation, elitism, and parallel breeding
//!   and evaluation on a bounded rayon pool.
//!
//! # Quick start
//!
//! ```
//! use u_grouping::catalog::MatrixCatalog;
//! use u_grouping::{run_optimization, Configuration};
//!
//! let mut catalog = MatrixCatalog::new(4);
//! catalog.set_similarity(0, 1, 0.9);
//! catalog.set_similarity(2, 3, 0.9);
//!
//! let config = Configuration::fast()
//!     .with_max_group_size(2)
//!     .with_min_similarity(0.5)
//!     .with_max_generations(10);
//! let partition = run_optimization(&catalog, &config, 7).unwrap();
//! assert_eq!(partition.group_count(), 2);
//! ```

pub mod catalog;
pub mod error;
pub mod gga;
pub mod grouping;
pub mod promethee;
pub mod random;

pub use error::{OptimizationError, Result};
pub use gga::{run_optimization, Configuration, GgaResult, GgaRunner};

//! Grouping Genetic Algorithm.
//!
//! Evolves a population of [`GroupPartition`](crate::grouping::GroupPartition)s
//! whose genes are whole groups. Chromosomes are scored on three criteria
//! (summed average similarity, agreement and disagreement of their groups)
//! and ranked against each other and the best-ever chromosome with a
//! PROMETHEE kernel, so no scalar fitness function is needed.
//!
//! # Key Types
//!
//! - [`Configuration`]: constraints, operators, termination, presets
//! - [`GgaRunner`]: executes the evolutionary loop
//! - [`GgaResult`]: best partition with run statistics
//! - [`TraceSink`]: optional progress channel
//!
//! # Submodules
//!
//! - [`chromosome`]: group-level crossover, mutation and local optimization
//! - [`population`]: parallel construction, breeding and ranking
//!
//! # References
//!
//! - Falkenauer (1998), *Genetic Algorithms and Grouping Problems*
//! - Brans & Vincke (1985), "A Preference Ranking Organisation Method"
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*

pub mod chromosome;
mod config;
pub mod population;
mod runner;
mod selection;
mod trace;

pub use chromosome::{Chromosome, Workspace};
pub use config::Configuration;
pub use population::Population;
pub use runner::{run_optimization, GenerationStats, GgaResult, GgaRunner};
pub use selection::Selection;
pub use trace::{NoTrace, TraceSink, TracingSink};

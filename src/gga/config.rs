//! GGA configuration.
//!
//! [`Configuration`] holds every parameter of a grouping run: the hard
//! grouping constraints, the heuristic, the evolutionary operators and
//! the termination conditions.

use super::selection::Selection;
use crate::error::{OptimizationError, Result};
use crate::grouping::{CriteriaParams, GroupConstraints, HeuristicKind};

/// Configuration of a grouping genetic algorithm run.
///
/// # Defaults
///
/// ```
/// use u_grouping::gga::Configuration;
///
/// let config = Configuration::default();
/// assert_eq!(config.population_size, 32);
/// assert_eq!(config.max_generations, 100);
/// assert!(config.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_grouping::gga::{Configuration, Selection};
/// use u_grouping::grouping::HeuristicKind;
///
/// let config = Configuration::default()
///     .with_population_size(64)
///     .with_max_group_size(4)
///     .with_max_disagreement(0.3)
///     .with_heuristic(HeuristicKind::FirstFit)
///     .with_selection(Selection::Rank);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    /// Number of chromosomes in the population.
    pub population_size: usize,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Generations without a new best chromosome before stopping.
    ///
    /// Set to 0 to disable stagnation-based termination.
    pub stagnation_limit: usize,

    /// Minimum `Fi` margin by which a chromosome must outrank the best-ever
    /// chromosome to count as an improvement.
    ///
    /// Set to 0.0 to count any strict improvement (the default).
    pub convergence_epsilon: f64,

    /// Every pair of members of a group must have at least this similarity.
    pub min_similarity: f64,

    /// No pair of members of a group may exceed this disagreement ratio.
    pub max_disagreement: f64,

    /// Maximum number of members in a group.
    pub max_group_size: usize,

    /// Groups smaller than this are broken up when their members fit
    /// elsewhere. 1 disables the repair.
    pub min_group_size: usize,

    /// Whether objects sharing a parent may share a group.
    pub allow_same_parent: bool,

    /// Construction heuristic.
    pub heuristic: HeuristicKind,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Probability of building an offspring by crossover (0.0–1.0).
    ///
    /// When crossover is not applied, a copy of the first parent is used.
    pub crossover_rate: f64,

    /// Probability of mutating an offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Maximum number of groups dissolved by one mutation.
    pub mutation_groups: usize,

    /// Whether to run the singleton repair after crossover and mutation.
    pub local_optimization: bool,

    /// Number of nearest neighbours consulted by the nearest-neighbour
    /// heuristic.
    pub nearest_neighbors: usize,

    /// Hard cap on the number of groups. `None` allows one group per object.
    pub max_groups: Option<usize>,

    /// PROMETHEE parameters of the similarity, agreement and disagreement
    /// criteria.
    pub criteria: CriteriaParams,

    /// Whether chromosome criterion values are min-max scaled before ranking.
    pub normalize: bool,

    /// Whether to build and evaluate chromosomes on a worker pool.
    pub parallel: bool,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked at the end of each generation, so the actual runtime may
    /// exceed the limit by one generation's worth of work.
    pub time_limit_ms: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            population_size: 32,
            max_generations: 100,
            stagnation_limit: 20,
            convergence_epsilon: 0.0,
            min_similarity: 0.0,
            max_disagreement: 1.0,
            max_group_size: 30,
            min_group_size: 1,
            allow_same_parent: false,
            heuristic: HeuristicKind::default(),
            selection: Selection::default(),
            crossover_rate: 0.9,
            mutation_rate: 0.2,
            mutation_groups: 2,
            local_optimization: true,
            nearest_neighbors: 8,
            max_groups: None,
            criteria: CriteriaParams::default(),
            normalize: true,
            parallel: true,
            time_limit_ms: None,
        }
    }
}

impl Configuration {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the convergence epsilon.
    pub fn with_convergence_epsilon(mut self, epsilon: f64) -> Self {
        self.convergence_epsilon = epsilon.max(0.0);
        self
    }

    /// Sets the minimum pairwise similarity inside a group.
    pub fn with_min_similarity(mut self, value: f64) -> Self {
        self.min_similarity = value;
        self
    }

    /// Sets the maximum pairwise disagreement inside a group.
    pub fn with_max_disagreement(mut self, value: f64) -> Self {
        self.max_disagreement = value;
        self
    }

    /// Sets the maximum group size.
    pub fn with_max_group_size(mut self, n: usize) -> Self {
        self.max_group_size = n;
        self
    }

    /// Sets the minimum group size.
    pub fn with_min_group_size(mut self, n: usize) -> Self {
        self.min_group_size = n;
        self
    }

    /// Allows or forbids objects with the same parent in one group.
    pub fn with_allow_same_parent(mut self, allow: bool) -> Self {
        self.allow_same_parent = allow;
        self
    }

    /// Sets the construction heuristic.
    pub fn with_heuristic(mut self, heuristic: HeuristicKind) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets how many groups one mutation may dissolve.
    pub fn with_mutation_groups(mut self, n: usize) -> Self {
        self.mutation_groups = n;
        self
    }

    /// Enables or disables local optimization after crossover/mutation.
    pub fn with_local_optimization(mut self, enabled: bool) -> Self {
        self.local_optimization = enabled;
        self
    }

    /// Sets how many nearest neighbours the heuristic consults.
    pub fn with_nearest_neighbors(mut self, n: usize) -> Self {
        self.nearest_neighbors = n;
        self
    }

    /// Caps the number of groups.
    pub fn with_max_groups(mut self, n: usize) -> Self {
        self.max_groups = Some(n);
        self
    }

    /// Sets the PROMETHEE criterion parameters.
    pub fn with_criteria(mut self, criteria: CriteriaParams) -> Self {
        self.criteria = criteria;
        self
    }

    /// Enables or disables min-max scaling before ranking.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Enables or disables the worker pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Preset for fast runs: small population, few generations.
    ///
    /// - Population: 16, Generations: 50, Time limit: 5s
    /// - Stagnation limit: 10
    pub fn fast() -> Self {
        Self {
            population_size: 16,
            max_generations: 50,
            stagnation_limit: 10,
            time_limit_ms: Some(5_000),
            ..Self::default()
        }
    }

    /// Preset balancing quality and run time.
    ///
    /// - Population: 32, Generations: 200, Time limit: 30s
    /// - Stagnation limit: 30
    pub fn balanced() -> Self {
        Self {
            population_size: 32,
            max_generations: 200,
            stagnation_limit: 30,
            time_limit_ms: Some(30_000),
            ..Self::default()
        }
    }

    /// Preset favouring solution quality.
    ///
    /// - Population: 64, Generations: 500, Time limit: 120s
    /// - Stagnation limit: 60, Convergence epsilon: 0.001
    pub fn quality() -> Self {
        Self {
            population_size: 64,
            max_generations: 500,
            stagnation_limit: 60,
            convergence_epsilon: 0.001,
            time_limit_ms: Some(120_000),
            ..Self::default()
        }
    }

    /// Picks a preset from the number of objects to group.
    ///
    /// - `object_count < 100` → [`fast()`](Self::fast)
    /// - `100 ≤ object_count < 1000` → [`balanced()`](Self::balanced)
    /// - `object_count ≥ 1000` → [`quality()`](Self::quality)
    pub fn auto_select(object_count: usize) -> Self {
        if object_count < 100 {
            Self::fast()
        } else if object_count < 1000 {
            Self::balanced()
        } else {
            Self::quality()
        }
    }

    /// Hard constraints derived from this configuration.
    pub fn constraints(&self) -> GroupConstraints {
        GroupConstraints {
            max_group_size: self.max_group_size,
            min_group_size: self.min_group_size,
            min_similarity: self.min_similarity,
            max_disagreement: self.max_disagreement,
            allow_same_parent: self.allow_same_parent,
        }
    }

    /// Size of the worker pool: the smaller of the population size and
    /// the available cores, or 1 when parallelism is off.
    pub fn worker_count(&self) -> usize {
        if !self.parallel {
            return 1;
        }
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        cores.min(self.population_size).max(1)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`OptimizationError::InvalidConfiguration`] describing the first
    /// invalid parameter, or the criterion error for invalid PROMETHEE
    /// parameters.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(OptimizationError::InvalidConfiguration(msg.into()));

        if self.population_size == 0 {
            return invalid("population_size must be at least 1");
        }
        if self.max_generations == 0 {
            return invalid("max_generations must be at least 1");
        }
        if self.max_group_size == 0 {
            return invalid("max_group_size must be at least 1");
        }
        if self.min_group_size == 0 || self.min_group_size > self.max_group_size {
            return invalid("min_group_size must be in 1..=max_group_size");
        }
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return invalid("min_similarity must be in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.max_disagreement) {
            return invalid("max_disagreement must be in [0, 1]");
        }
        if !(self.convergence_epsilon >= 0.0) {
            return invalid("convergence_epsilon must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) || !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid("crossover_rate and mutation_rate must be in [0, 1]");
        }
        if self.mutation_groups == 0 {
            return invalid("mutation_groups must be at least 1");
        }
        if self.max_groups == Some(0) {
            return invalid("max_groups must be positive or None");
        }
        if self.time_limit_ms == Some(0) {
            return invalid("time_limit_ms must be positive or None");
        }
        if let Selection::Tournament(0) = self.selection {
            return invalid("tournament size must be at least 1");
        }
        self.criteria.build()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::CriterionParams;

    #[test]
    fn test_default_config() {
        let config = Configuration::default();
        assert_eq!(config.population_size, 32);
        assert_eq!(config.max_generations, 100);
        assert_eq!(config.stagnation_limit, 20);
        assert_eq!(config.heuristic, HeuristicKind::NearestNeighbor);
        assert_eq!(config.selection, Selection::Tournament(3));
        assert!(!config.allow_same_parent);
        assert!(config.parallel);
        assert!(config.max_groups.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = Configuration::default()
            .with_population_size(10)
            .with_max_generations(40)
            .with_stagnation_limit(5)
            .with_min_similarity(0.2)
            .with_max_disagreement(0.4)
            .with_max_group_size(5)
            .with_min_group_size(2)
            .with_allow_same_parent(true)
            .with_heuristic(HeuristicKind::FirstFit)
            .with_mutation_groups(3)
            .with_max_groups(8)
            .with_parallel(false)
            .with_time_limit_ms(1000);

        assert_eq!(config.population_size, 10);
        assert_eq!(config.max_generations, 40);
        assert_eq!(config.stagnation_limit, 5);
        assert!((config.min_similarity - 0.2).abs() < 1e-12);
        assert!((config.max_disagreement - 0.4).abs() < 1e-12);
        assert_eq!(config.max_group_size, 5);
        assert_eq!(config.min_group_size, 2);
        assert!(config.allow_same_parent);
        assert_eq!(config.heuristic, HeuristicKind::FirstFit);
        assert_eq!(config.mutation_groups, 3);
        assert_eq!(config.max_groups, Some(8));
        assert!(!config.parallel);
        assert_eq!(config.time_limit_ms, Some(1000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clamp_rates() {
        let config = Configuration::default()
            .with_crossover_rate(1.5)
            .with_mutation_rate(-0.5)
            .with_convergence_epsilon(-1.0);
        assert_eq!(config.crossover_rate, 1.0);
        assert_eq!(config.mutation_rate, 0.0);
        assert_eq!(config.convergence_epsilon, 0.0);
    }

    #[test]
    fn test_validate_population_zero() {
        let err = Configuration::default()
            .with_population_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, OptimizationError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            Configuration::default().with_max_generations(0),
            Configuration::default().with_max_group_size(0),
            Configuration::default().with_max_group_size(2).with_min_group_size(3),
            Configuration::default().with_min_group_size(0),
            Configuration::default().with_min_similarity(1.5),
            Configuration::default().with_max_disagreement(f64::NAN),
            Configuration::default().with_mutation_groups(0),
            Configuration::default().with_max_groups(0),
            Configuration::default().with_time_limit_ms(0),
            Configuration::default().with_selection(Selection::Tournament(0)),
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn test_validate_rejects_bad_criteria() {
        let config = Configuration::default().with_criteria(CriteriaParams {
            similarity: CriterionParams::new(0.1, 0.2, 1.0),
            ..CriteriaParams::default()
        });
        assert!(matches!(
            config.validate(),
            Err(OptimizationError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_constraints_mirror_config() {
        let config = Configuration::default()
            .with_max_group_size(4)
            .with_min_similarity(0.3)
            .with_allow_same_parent(true);
        let c = config.constraints();
        assert_eq!(c.max_group_size, 4);
        assert!((c.min_similarity - 0.3).abs() < 1e-12);
        assert!(c.allow_same_parent);
    }

    #[test]
    fn test_worker_count_bounds() {
        let config = Configuration::default().with_population_size(1);
        assert_eq!(config.worker_count(), 1);
        let config = Configuration::default().with_parallel(false);
        assert_eq!(config.worker_count(), 1);
        let config = Configuration::default().with_population_size(1000);
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_presets_validate() {
        for config in [
            Configuration::fast(),
            Configuration::balanced(),
            Configuration::quality(),
        ] {
            assert!(config.validate().is_ok());
        }
        assert_eq!(Configuration::auto_select(10).population_size, 16);
        assert_eq!(Configuration::auto_select(100).population_size, 32);
        assert_eq!(Configuration::auto_select(5000).population_size, 64);
    }
}

//! GGA evolutionary loop execution.
//!
//! [`GgaRunner`] orchestrates a complete run:
//! construction → evaluation → PROMETHEE ranking → selection → crossover →
//! mutation → local optimization → repeat.

use super::config::Configuration;
use super::population::Population;
use super::trace::{NoTrace, TraceSink};
use crate::catalog::ObjectCatalog;
use crate::error::Result;
use crate::grouping::{GroupPartition, GroupScores, GroupingContext};
use crate::promethee::PrometheeKernel;
use crate::random::create_rng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Result of a grouping run.
#[derive(Debug, Clone)]
pub struct GgaResult {
    /// Partition of the best-ever chromosome.
    pub best: GroupPartition,

    /// Summed group criterion values of `best`.
    pub best_values: GroupScores,

    /// Number of breeding steps executed.
    pub generations: usize,

    /// Whether the run stopped because the best-ever chromosome aged out.
    pub stagnated: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Whether the run stopped on the wall-clock limit.
    pub timed_out: bool,

    /// Best-ever statistics after each ranking pass, generation 0 first.
    pub history: Vec<GenerationStats>,
}

/// Snapshot taken after one ranking pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    /// Criterion values of the best-ever chromosome.
    pub best_values: GroupScores,
    /// Number of groups of the best-ever chromosome.
    pub best_groups: usize,
    pub age_of_best_ever: usize,
}

impl GenerationStats {
    fn record(population: &Population) -> Self {
        let best = population.best();
        Self {
            generation: population.generation(),
            best_values: best.values(),
            best_groups: best.partition().group_count(),
            age_of_best_ever: population.age_of_best_ever(),
        }
    }

    fn attrs(&self) -> String {
        format!(
            "generation={} groups={} similarity={:.6} agreement={:.6} disagreement={:.6} age_of_best_ever={}",
            self.generation,
            self.best_groups,
            self.best_values.similarity,
            self.best_values.agreement,
            self.best_values.disagreement,
            self.age_of_best_ever,
        )
    }
}

/// Executes the grouping genetic algorithm.
///
/// # Usage
///
/// ```
/// use u_grouping::catalog::MatrixCatalog;
/// use u_grouping::gga::{Configuration, GgaRunner};
///
/// let catalog = MatrixCatalog::uniform(6, 0.8);
/// let config = Configuration::fast()
///     .with_max_group_size(3)
///     .with_max_generations(10);
/// let result = GgaRunner::run(&catalog, &config, 42).unwrap();
/// assert!(result.best.is_complete());
/// ```
pub struct GgaRunner;

impl GgaRunner {
    /// Runs the GGA without tracing or cancellation.
    ///
    /// # Errors
    /// See [`run_with`](Self::run_with).
    pub fn run<C: ObjectCatalog + ?Sized>(
        catalog: &C,
        config: &Configuration,
        seed: u64,
    ) -> Result<GgaResult> {
        Self::run_with(catalog, config, seed, &NoTrace, None)
    }

    /// Runs the GGA with a trace sink and an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the run stops
    /// after the current ranking pass and returns the best chromosome
    /// found so far.
    ///
    /// # Errors
    /// - [`OptimizationError::InvalidConfiguration`](crate::OptimizationError::InvalidConfiguration)
    ///   or a criterion error when `config` is invalid; nothing runs.
    /// - [`OptimizationError::NoAdmissibleGroup`](crate::OptimizationError::NoAdmissibleGroup)
    ///   when the constraints cannot be met.
    /// - [`OptimizationError::WorkerPool`](crate::OptimizationError::WorkerPool)
    ///   when the worker threads cannot be spawned.
    #[instrument(level = "info", skip(catalog, config, trace, cancel), fields(objects = catalog.len()))]
    pub fn run_with<C: ObjectCatalog + ?Sized>(
        catalog: &C,
        config: &Configuration,
        seed: u64,
        trace: &dyn TraceSink,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GgaResult> {
        let result = execute(catalog, config, seed, trace, cancel.as_deref());
        if let Err(err) = &result {
            tracing::warn!(message = "Grouping run aborted", err = ?err);
            trace.emit("end", "status=error", &err.to_string());
        }
        result
    }
}

/// Runs the GGA and returns the best partition found.
///
/// # Errors
/// See [`GgaRunner::run_with`].
///
/// # Examples
///
/// ```
/// use u_grouping::catalog::MatrixCatalog;
/// use u_grouping::{run_optimization, Configuration};
///
/// // two siblings may not share a group
/// let catalog = MatrixCatalog::uniform(2, 1.0)
///     .with_parent(0, 7)
///     .with_parent(1, 7);
/// let config = Configuration::fast().with_max_generations(5);
/// let partition = run_optimization(&catalog, &config, 1).unwrap();
/// assert_eq!(partition.group_count(), 2);
/// ```
pub fn run_optimization<C: ObjectCatalog + ?Sized>(
    catalog: &C,
    config: &Configuration,
    seed: u64,
) -> Result<GroupPartition> {
    GgaRunner::run(catalog, config, seed).map(|r| r.best)
}

fn execute<C: ObjectCatalog + ?Sized>(
    catalog: &C,
    config: &Configuration,
    seed: u64,
    trace: &dyn TraceSink,
    cancel: Option<&AtomicBool>,
) -> Result<GgaResult> {
    config.validate()?;

    let ctx = GroupingContext::from_catalog(catalog, config.constraints(), config.max_groups);
    let mut kernel = PrometheeKernel::with_criteria(config.criteria.build()?, config.normalize);
    let pool = build_pool(config)?;
    let started = Instant::now();

    info!(
        objects = ctx.object_count(),
        population = config.population_size,
        heuristic = ?config.heuristic,
        workers = config.worker_count(),
        "Starting grouping run"
    );
    trace.emit(
        "start",
        &format!(
            "objects={} population={} workers={} seed={seed}",
            ctx.object_count(),
            config.population_size,
            config.worker_count()
        ),
        "",
    );

    let mut rng = create_rng(seed);
    let mut population = Population::initialize(&ctx, config, pool.as_ref(), &mut rng)?;
    let mut history = Vec::with_capacity(config.max_generations.min(1024) + 1);
    let mut stagnated = false;
    let mut cancelled = false;
    let mut timed_out = false;

    loop {
        population.evaluate(&ctx, pool.as_ref());
        let improved = population.rank(&mut kernel, config.convergence_epsilon)?;

        let stats = GenerationStats::record(&population);
        debug!(
            generation = stats.generation,
            groups = stats.best_groups,
            similarity = stats.best_values.similarity,
            agreement = stats.best_values.agreement,
            disagreement = stats.best_values.disagreement,
            age_of_best_ever = stats.age_of_best_ever,
            "Generation ranked"
        );
        let attrs = stats.attrs();
        trace.emit("generation", &attrs, "");
        if improved {
            trace.emit("improved", &attrs, "");
        }
        history.push(stats);

        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            cancelled = true;
            break;
        }
        if population.generation() >= config.max_generations {
            break;
        }
        if config.stagnation_limit > 0 && population.age_of_best_ever() >= config.stagnation_limit {
            stagnated = true;
            break;
        }
        if config
            .time_limit_ms
            .is_some_and(|ms| started.elapsed() >= Duration::from_millis(ms))
        {
            timed_out = true;
            break;
        }

        population.breed(&ctx, config, pool.as_ref(), &mut rng)?;
    }

    let generations = population.generation();
    let best = population.into_best();

    info!(
        generations,
        stagnated,
        cancelled,
        timed_out,
        groups = best.partition().group_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Grouping run finished"
    );
    trace.emit(
        "end",
        &format!(
            "status=ok generations={generations} groups={} stagnated={stagnated} cancelled={cancelled} timed_out={timed_out}",
            best.partition().group_count()
        ),
        "",
    );

    Ok(GgaResult {
        best_values: best.values(),
        best: best.into_partition(),
        generations,
        stagnated,
        cancelled,
        timed_out,
        history,
    })
}

fn build_pool(config: &Configuration) -> Result<Option<ThreadPool>> {
    if !config.parallel {
        return Ok(None);
    }
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.worker_count())
        .thread_name(|i| format!("u-grouping-{i}"))
        .build()?;
    Ok(Some(pool))
}

// ============================================================================
// Tests
// ============================================================================

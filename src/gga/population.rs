//! Population state and the per-generation steps.
//!
//! A [`Population`] owns the chromosomes, the best-ever chromosome and one
//! [`Workspace`] per worker. Construction, breeding and evaluation fan out
//! over an optional rayon pool; ranking and selection stay on the calling
//! thread.
//!
//! Every parallel task draws its randomness from a seed taken from the
//! master generator before the fan-out, and workspaces only hold scratch
//! buffers, so the outcome does not depend on how tasks land on workers.

use super::chromosome::{Chromosome, Workspace};
use super::config::Configuration;
use crate::error::Result;
use crate::grouping::GroupingContext;
use crate::promethee::PrometheeKernel;
use crate::random::create_rng;
use rand::Rng;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Breeding plan of one offspring, drawn on the master generator.
#[derive(Debug, Clone, Copy)]
struct Offspring {
    first: usize,
    second: usize,
    crossover: bool,
    mutate: bool,
    seed: u64,
}

/// The chromosomes of the current generation plus the best-ever record.
#[derive(Debug)]
pub struct Population {
    chromosomes: Vec<Chromosome>,
    workspaces: Vec<Workspace>,
    best: Option<Chromosome>,
    best_index: usize,
    generation: usize,
    age_of_best_ever: usize,
}

impl Population {
    /// Builds `population_size` chromosomes with the configured heuristic.
    ///
    /// # Errors
    /// [`OptimizationError::NoAdmissibleGroup`](crate::OptimizationError::NoAdmissibleGroup)
    /// when the constraints cannot be met.
    pub fn initialize<R: Rng + ?Sized>(
        ctx: &GroupingContext,
        config: &Configuration,
        pool: Option<&ThreadPool>,
        rng: &mut R,
    ) -> Result<Self> {
        let mut workspaces = (0..config.worker_count())
            .map(|_| Workspace::new(config))
            .collect::<Result<Vec<_>>>()?;

        let seeds: Vec<u64> = (0..config.population_size).map(|_| rng.random()).collect();
        let chromosomes = run_tasks(pool, &mut workspaces, &seeds, |&seed, ws| {
            Chromosome::construct(ctx, ws, &mut create_rng(seed))
        })?;

        Ok(Self {
            chromosomes,
            workspaces,
            best: None,
            best_index: 0,
            generation: 0,
            age_of_best_ever: 0,
        })
    }

    /// Evaluates every chromosome whose values are stale.
    pub fn evaluate(&mut self, ctx: &GroupingContext, pool: Option<&ThreadPool>) {
        let tables = ctx.tables();
        match pool {
            Some(pool) => pool.install(|| {
                self.chromosomes
                    .par_iter_mut()
                    .for_each(|c| c.evaluate(tables));
            }),
            None => self.chromosomes.iter_mut().for_each(|c| c.evaluate(tables)),
        }
    }

    /// Ranks the population together with the best-ever chromosome.
    ///
    /// The best-ever chromosome enters the kernel first, so it wins ties.
    /// The population best replaces it only when its `Fi` is higher by
    /// more than `epsilon`; otherwise the stagnation counter grows.
    /// Returns whether the best-ever chromosome changed.
    pub fn rank(&mut self, kernel: &mut PrometheeKernel, epsilon: f64) -> Result<bool> {
        kernel.clear_solutions();
        let offset = usize::from(self.best.is_some());
        if let Some(best) = &self.best {
            kernel.add_solution(self.chromosomes.len(), &best.values().as_array())?;
        }
        for (i, c) in self.chromosomes.iter().enumerate() {
            debug_assert!(c.is_evaluated(), "ranking an unevaluated chromosome");
            kernel.add_solution(i, &c.values().as_array())?;
        }

        let scores = kernel.scores();
        for (c, &fi) in self.chromosomes.iter_mut().zip(&scores[offset..]) {
            c.set_fi(fi);
        }

        let mut best_index = 0;
        for (i, c) in self.chromosomes.iter().enumerate().skip(1) {
            if c.fi() > self.chromosomes[best_index].fi() {
                best_index = i;
            }
        }
        for (i, c) in self.chromosomes.iter_mut().enumerate() {
            c.mark_best(i == best_index);
        }

        let improved = match &mut self.best {
            None => true,
            Some(best) => {
                best.set_fi(scores[0]);
                self.chromosomes[best_index].fi() > scores[0] + epsilon
            }
        };
        if improved {
            self.best = Some(self.chromosomes[best_index].clone());
            self.age_of_best_ever = 0;
        } else {
            self.age_of_best_ever += 1;
        }
        self.best_index = best_index;
        Ok(improved)
    }

    /// Replaces the population with the next generation.
    ///
    /// Slot 0 holds the current population best unchanged. Every other
    /// slot is bred from two selected parents: crossover with probability
    /// `crossover_rate` (otherwise a copy of the first parent), then
    /// mutation with probability `mutation_rate`, then local optimization
    /// when enabled and the offspring changed.
    ///
    /// Must follow [`rank`](Self::rank).
    pub fn breed<R: Rng + ?Sized>(
        &mut self,
        ctx: &GroupingContext,
        config: &Configuration,
        pool: Option<&ThreadPool>,
        rng: &mut R,
    ) -> Result<()> {
        let scores: Vec<f64> = self.chromosomes.iter().map(Chromosome::fi).collect();
        let plans: Vec<Offspring> = (1..self.chromosomes.len())
            .map(|_| Offspring {
                first: config.selection.select(&scores, rng),
                second: config.selection.select(&scores, rng),
                crossover: rng.random_range(0.0..1.0) < config.crossover_rate,
                mutate: rng.random_range(0.0..1.0) < config.mutation_rate,
                seed: rng.random(),
            })
            .collect();

        let parents = &self.chromosomes;
        let children = run_tasks(pool, &mut self.workspaces, &plans, |plan, ws| {
            let mut rng = create_rng(plan.seed);
            let mut child = if plan.crossover {
                Chromosome::crossover(&parents[plan.first], &parents[plan.second], ctx, ws, &mut rng)?
            } else {
                parents[plan.first].survivor()
            };
            if plan.mutate {
                child.mutate(ctx, ws, config.mutation_groups, &mut rng)?;
            }
            if config.local_optimization && (plan.crossover || plan.mutate) {
                child.local_optimize(ctx)?;
            }
            Ok(child)
        })?;

        let elite = self.chromosomes[self.best_index].survivor();
        self.chromosomes.clear();
        self.chromosomes.push(elite);
        self.chromosomes.extend(children);
        self.best_index = 0;
        self.generation += 1;
        Ok(())
    }

    /// Chromosomes of the current generation.
    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    /// Best chromosome of the last ranking pass.
    pub fn current_best(&self) -> &Chromosome {
        &self.chromosomes[self.best_index]
    }

    /// Best chromosome seen so far.
    ///
    /// Before the first ranking pass this is the chromosome in slot 0.
    pub fn best(&self) -> &Chromosome {
        self.best.as_ref().unwrap_or_else(|| self.current_best())
    }

    /// Whether a ranking pass has recorded a best-ever chromosome.
    pub fn is_ranked(&self) -> bool {
        self.best.is_some()
    }

    /// Consumes the population, returning the best-ever chromosome.
    pub fn into_best(mut self) -> Chromosome {
        match self.best.take() {
            Some(best) => best,
            None => self.chromosomes.swap_remove(self.best_index),
        }
    }

    /// Number of completed breeding steps.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Ranking passes since the best-ever chromosome last changed.
    pub fn age_of_best_ever(&self) -> usize {
        self.age_of_best_ever
    }
}

/// Runs one task per element of `tasks`, preserving order.
///
/// With a pool, tasks are split into one contiguous batch per workspace
/// and the batches run in parallel; otherwise the first workspace runs
/// them all.
fn run_tasks<T, F>(
    pool: Option<&ThreadPool>,
    workspaces: &mut [Workspace],
    tasks: &[T],
    f: F,
) -> Result<Vec<Chromosome>>
where
    T: Sync,
    F: Fn(&T, &mut Workspace) -> Result<Chromosome> + Sync,
{
    debug_assert!(!workspaces.is_empty(), "no workspace");
    match pool {
        Some(pool) if workspaces.len() > 1 => {
            let batch = tasks.len().div_ceil(workspaces.len()).max(1);
            let batches: Result<Vec<Vec<Chromosome>>> = pool.install(|| {
                tasks
                    .par_chunks(batch)
                    .zip(workspaces.par_iter_mut())
                    .map(|(chunk, ws)| chunk.iter().map(|t| f(t, ws)).collect::<Result<Vec<_>>>())
                    .collect()
            });
            Ok(batches?.into_iter().flatten().collect())
        }
        _ => {
            let ws = &mut workspaces[0];
            tasks.iter().map(|t| f(t, ws)).collect()
        }
    }
}

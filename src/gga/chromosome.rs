//! Chromosomes and their genetic operators.
//!
//! A chromosome is a [`GroupPartition`] plus its criterion values and
//! ranking state. Operators work at group level: crossover inherits whole
//! groups, mutation dissolves whole groups, and the construction heuristic
//! re-places whatever objects are left unassigned.
//!
//! # References
//!
//! Falkenauer (1998), *Genetic Algorithms and Grouping Problems*, Wiley

use super::config::Configuration;
use crate::catalog::{ObjectId, RelationTables};
use crate::error::Result;
use crate::grouping::heuristic::{repair, run_heuristic};
use crate::grouping::{GroupId, GroupPartition, GroupScores, GroupingContext, GroupingHeuristic};
use crate::random::RandomSource;
use rand::Rng;

/// Per-worker scratch space.
///
/// Holds a heuristic instance and reusable buffers; one workspace serves
/// one worker for the whole run.
pub struct Workspace {
    heuristic: Box<dyn GroupingHeuristic>,
    order: Vec<ObjectId>,
    picks: Vec<GroupId>,
}

impl Workspace {
    /// Creates a workspace for the heuristic named in `config`.
    ///
    /// # Errors
    /// Propagates invalid criterion parameters.
    pub fn new(config: &Configuration) -> Result<Self> {
        Ok(Self {
            heuristic: config
                .heuristic
                .build(config.nearest_neighbors, &config.criteria)?,
            order: Vec::new(),
            picks: Vec::new(),
        })
    }

    fn complete<R: Rng + ?Sized>(
        &mut self,
        partition: &mut GroupPartition,
        ctx: &GroupingContext,
        rng: &mut R,
    ) -> Result<usize> {
        run_heuristic(self.heuristic.as_mut(), partition, ctx, &mut self.order, rng)
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("heuristic", &self.heuristic.name())
            .finish_non_exhaustive()
    }
}

/// A candidate grouping.
#[derive(Debug, Clone)]
pub struct Chromosome {
    partition: GroupPartition,
    values: GroupScores,
    fi: f64,
    age: usize,
    age_of_best: usize,
    evaluated: bool,
}

impl Chromosome {
    fn from_partition(partition: GroupPartition) -> Self {
        Self {
            partition,
            values: GroupScores::default(),
            fi: 0.0,
            age: 0,
            age_of_best: 0,
            evaluated: false,
        }
    }

    /// Builds a complete chromosome with the workspace heuristic.
    ///
    /// # Errors
    /// [`OptimizationError::NoAdmissibleGroup`](crate::OptimizationError::NoAdmissibleGroup)
    /// when the constraints cannot be met.
    pub fn construct<R: Rng + ?Sized>(
        ctx: &GroupingContext,
        ws: &mut Workspace,
        rng: &mut R,
    ) -> Result<Self> {
        let mut partition = GroupPartition::for_context(ctx);
        ws.complete(&mut partition, ctx, rng)?;
        Ok(Self::from_partition(partition))
    }

    /// Group-level crossover.
    ///
    /// The child inherits a random non-empty subset of `a`'s groups, then
    /// every group of `b` whose members are all still unplaced. Remaining
    /// objects are placed by the heuristic.
    pub fn crossover<R: Rng + ?Sized>(
        a: &Chromosome,
        b: &Chromosome,
        ctx: &GroupingContext,
        ws: &mut Workspace,
        rng: &mut R,
    ) -> Result<Self> {
        let mut child = GroupPartition::for_context(ctx);

        ws.picks.clear();
        ws.picks.extend(a.partition.used_groups().iter().copied());
        if !ws.picks.is_empty() {
            rng.shuffle(&mut ws.picks);
            let take = rng.random_range(1..=ws.picks.len());
            for &g in &ws.picks[..take] {
                copy_group(&mut child, a.partition.members(g))?;
            }
        }

        for &g in b.partition.used_groups() {
            if child.group_count() >= child.capacity() {
                break;
            }
            let members = b.partition.members(g);
            if !members.is_empty() && members.iter().all(|&o| !child.is_assigned(o)) {
                copy_group(&mut child, members)?;
            }
        }

        ws.complete(&mut child, ctx, rng)?;
        Ok(Self::from_partition(child))
    }

    /// Dissolves between 1 and `max_groups` random groups and re-places
    /// their members.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        ctx: &GroupingContext,
        ws: &mut Workspace,
        max_groups: usize,
        rng: &mut R,
    ) -> Result<()> {
        ws.picks.clear();
        ws.picks.extend(self.partition.used_groups().iter().copied());
        if ws.picks.is_empty() {
            return Ok(());
        }
        rng.shuffle(&mut ws.picks);
        let count = rng.random_range(1..=max_groups.clamp(1, ws.picks.len()));
        for &g in &ws.picks[..count] {
            self.partition.dissolve(g)?;
        }

        ws.complete(&mut self.partition, ctx, rng)?;
        self.reset();
        Ok(())
    }

    /// Repairs the partition and merges singletons into their best hosts.
    pub fn local_optimize(&mut self, ctx: &GroupingContext) -> Result<()> {
        repair::repair_undersized_groups(&mut self.partition, ctx)?;
        repair::repair_social_singletons(&mut self.partition, ctx)?;
        repair::merge_singletons(&mut self.partition, ctx)?;
        self.reset();
        Ok(())
    }

    /// Recomputes dirty group scores and the criterion totals.
    pub fn evaluate(&mut self, tables: &RelationTables) {
        if self.evaluated {
            return;
        }
        self.partition.refresh_scores(tables);
        self.values = self.partition.total_scores();
        self.evaluated = true;
    }

    /// Copy of this chromosome carried into the next generation.
    pub(crate) fn survivor(&self) -> Self {
        let mut next = self.clone();
        next.age += 1;
        next
    }

    fn reset(&mut self) {
        self.evaluated = false;
        self.age = 0;
        self.age_of_best = 0;
    }

    pub(crate) fn set_fi(&mut self, fi: f64) {
        self.fi = fi;
    }

    pub(crate) fn mark_best(&mut self, is_best: bool) {
        self.age_of_best = if is_best { self.age_of_best + 1 } else { 0 };
    }

    /// The grouping.
    pub fn partition(&self) -> &GroupPartition {
        &self.partition
    }

    /// Consumes the chromosome, returning its grouping.
    pub fn into_partition(self) -> GroupPartition {
        self.partition
    }

    /// Summed group criterion values (valid after [`evaluate`](Self::evaluate)).
    pub fn values(&self) -> GroupScores {
        self.values
    }

    /// Whether the criterion values are current.
    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// Net outranking score from the last ranking pass.
    pub fn fi(&self) -> f64 {
        self.fi
    }

    /// Generations this chromosome has survived unchanged.
    pub fn age(&self) -> usize {
        self.age
    }

    /// Consecutive ranking passes in which this chromosome was the
    /// population best.
    pub fn age_of_best(&self) -> usize {
        self.age_of_best
    }
}

fn copy_group(child: &mut GroupPartition, members: &[ObjectId]) -> Result<()> {
    let g = child.reserve_group()?;
    for &o in members {
        child.insert(g, o)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MatrixCatalog;
    use crate::grouping::HeuristicKind;
    use crate::random::create_rng;

    fn setup(n: usize, max_group_size: usize) -> (GroupingContext, Configuration) {
        let mut catalog = MatrixCatalog::new(n);
        for a in 0..n {
            for b in (a + 1)..n {
                // two clusters: even and odd objects
                let sim = if a % 2 == b % 2 { 0.9 } else { 0.1 };
                catalog.set_similarity(a, b, sim);
            }
        }
        let config = Configuration::default()
            .with_max_group_size(max_group_size)
            .with_heuristic(HeuristicKind::NearestNeighbor);
        let ctx = GroupingContext::from_catalog(&catalog, config.constraints(), config.max_groups);
        (ctx, config)
    }

    #[test]
    fn test_construct_is_complete_and_sound() {
        let (ctx, config) = setup(12, 4);
        let mut ws = Workspace::new(&config).unwrap();
        let c = Chromosome::construct(&ctx, &mut ws, &mut create_rng(1)).unwrap();
        assert!(c.partition().is_complete());
        assert!(c.partition().check(&ctx).is_ok());
        assert!(!c.is_evaluated());
    }

    #[test]
    fn test_evaluate_sums_group_scores() {
        let catalog = MatrixCatalog::uniform(4, 0.5);
        let config = Configuration::default().with_max_group_size(2);
        let ctx = GroupingContext::from_catalog(&catalog, config.constraints(), None);
        let mut ws = Workspace::new(&config).unwrap();
        let mut c = Chromosome::construct(&ctx, &mut ws, &mut create_rng(3)).unwrap();
        c.evaluate(ctx.tables());

        assert!(c.is_evaluated());
        // two pairs, each averaging 0.5 similarity
        assert_eq!(c.partition().group_count(), 2);
        assert!((c.values().similarity - 1.0).abs() < 1e-12);
        assert_eq!(c.values().disagreement, 0.0);
    }

    #[test]
    fn test_crossover_child_is_complete_and_sound() {
        let (ctx, config) = setup(16, 3);
        let mut ws = Workspace::new(&config).unwrap();
        let mut rng = create_rng(7);
        let a = Chromosome::construct(&ctx, &mut ws, &mut rng).unwrap();
        let b = Chromosome::construct(&ctx, &mut ws, &mut rng).unwrap();

        for _ in 0..20 {
            let child = Chromosome::crossover(&a, &b, &ctx, &mut ws, &mut rng).unwrap();
            assert!(child.partition().is_complete());
            assert!(child.partition().check(&ctx).is_ok());
            assert_eq!(child.age(), 0);
        }
    }

    #[test]
    fn test_crossover_of_identical_parents_reproduces_them() {
        let (ctx, config) = setup(10, 5);
        let mut ws = Workspace::new(&config).unwrap();
        let mut rng = create_rng(11);
        let a = Chromosome::construct(&ctx, &mut ws, &mut rng).unwrap();

        let child = Chromosome::crossover(&a, &a, &ctx, &mut ws, &mut rng).unwrap();
        assert_eq!(child.partition().canonical_groups(), a.partition().canonical_groups());
    }

    #[test]
    fn test_mutate_keeps_partition_sound() {
        let (ctx, config) = setup(15, 4);
        let mut ws = Workspace::new(&config).unwrap();
        let mut rng = create_rng(5);
        let mut c = Chromosome::construct(&ctx, &mut ws, &mut rng).unwrap();
        c.evaluate(ctx.tables());

        for _ in 0..20 {
            c.mutate(&ctx, &mut ws, 3, &mut rng).unwrap();
            assert!(c.partition().is_complete());
            assert!(c.partition().check(&ctx).is_ok());
            assert!(!c.is_evaluated());
        }
    }

    #[test]
    fn test_local_optimize_merges_singletons() {
        let catalog = MatrixCatalog::uniform(3, 0.8);
        let config = Configuration::default().with_max_group_size(3);
        let ctx = GroupingContext::from_catalog(&catalog, config.constraints(), None);
        let mut p = GroupPartition::for_context(&ctx);
        for o in 0..3 {
            copy_group(&mut p, &[ObjectId(o)]).unwrap();
        }
        let mut c = Chromosome::from_partition(p);

        c.local_optimize(&ctx).unwrap();
        assert_eq!(c.partition().group_count(), 1);
        assert!(c.partition().check(&ctx).is_ok());
    }

    #[test]
    fn test_survivor_ages_without_reevaluation() {
        let (ctx, config) = setup(6, 3);
        let mut ws = Workspace::new(&config).unwrap();
        let mut c = Chromosome::construct(&ctx, &mut ws, &mut create_rng(2)).unwrap();
        c.evaluate(ctx.tables());
        let next = c.survivor().survivor();
        assert_eq!(next.age(), 2);
        assert!(next.is_evaluated());
        assert_eq!(next.values(), c.values());
    }

    #[test]
    fn test_mark_best_counts_consecutive_passes() {
        let mut c = Chromosome::from_partition(GroupPartition::new(0, 1));
        c.mark_best(true);
        c.mark_best(true);
        assert_eq!(c.age_of_best(), 2);
        c.mark_best(false);
        assert_eq!(c.age_of_best(), 0);
    }
}

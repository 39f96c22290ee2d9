//! Construction heuristics.
//!
//! A [`GroupingHeuristic`] decides, one object at a time, which group an
//! unassigned object joins. [`run_heuristic`] drives it over every
//! unassigned object of a partition in random order, then lets the
//! heuristic repair the result. The same driver builds chromosomes from
//! scratch and completes them after crossover or mutation.
//!
//! # Built-in heuristics
//!
//! - [`FirstFit`]: first admissible group in creation order
//! - [`NearestNeighbor`]: group of the closest admissible neighbour, with
//!   a PROMETHEE ranking of the open groups as fallback

mod first_fit;
mod nearest_neighbor;
pub mod repair;

pub use first_fit::FirstFit;
pub use nearest_neighbor::NearestNeighbor;

use super::context::GroupingContext;
use super::criteria::CriteriaParams;
use super::group::GroupId;
use super::partition::GroupPartition;
use crate::catalog::ObjectId;
use crate::error::{OptimizationError, Result};
use crate::random::RandomSource;

/// Strategy placing one object at a time.
///
/// Implementations may keep scratch buffers between calls; one instance
/// is used by one worker at a time.
pub trait GroupingHeuristic: Send {
    /// Returns a human-readable name for this heuristic.
    fn name(&self) -> &str;

    /// Called once before a run, after the order is built.
    fn init(&mut self, _partition: &GroupPartition, _ctx: &GroupingContext) {}

    /// Chooses a reserved group that admits `object`.
    ///
    /// The returned group must satisfy
    /// [`GroupPartition::can_insert`]; the driver inserts the object.
    ///
    /// # Errors
    /// [`OptimizationError::NoAdmissibleGroup`] if no existing or fresh
    /// group accepts the object.
    fn find_group(
        &mut self,
        partition: &mut GroupPartition,
        object: ObjectId,
        ctx: &GroupingContext,
    ) -> Result<GroupId>;

    /// Repairs the partition once every object is placed.
    ///
    /// The default breaks up undersized groups where their members fit
    /// elsewhere, then rehomes social objects left alone.
    fn post_run(&mut self, partition: &mut GroupPartition, ctx: &GroupingContext) -> Result<()> {
        repair::repair_undersized_groups(partition, ctx)?;
        repair::repair_social_singletons(partition, ctx)?;
        Ok(())
    }
}

/// Selects a built-in heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeuristicKind {
    /// See [`FirstFit`].
    FirstFit,
    /// See [`NearestNeighbor`].
    #[default]
    NearestNeighbor,
}

impl HeuristicKind {
    /// Instantiates the heuristic.
    ///
    /// `neighbors` bounds how many nearest neighbours are consulted and
    /// `criteria` parameterizes the fallback ranking; both are ignored by
    /// [`FirstFit`].
    pub fn build(
        self,
        neighbors: usize,
        criteria: &CriteriaParams,
    ) -> Result<Box<dyn GroupingHeuristic>> {
        Ok(match self {
            HeuristicKind::FirstFit => Box::new(FirstFit),
            HeuristicKind::NearestNeighbor => Box::new(NearestNeighbor::new(neighbors, criteria)?),
        })
    }
}

/// Reserves a fresh group for `object`.
///
/// Failure to obtain an admissible fresh group means the constraints
/// cannot be met and is reported as [`OptimizationError::NoAdmissibleGroup`].
pub fn reserve_admissible(
    partition: &mut GroupPartition,
    object: ObjectId,
    ctx: &GroupingContext,
) -> Result<GroupId> {
    let g = match partition.reserve_group() {
        Ok(g) => g,
        Err(OptimizationError::PoolExhausted { .. }) => {
            return Err(OptimizationError::NoAdmissibleGroup { object });
        }
        Err(e) => return Err(e),
    };
    if partition.can_insert(g, object, ctx) {
        Ok(g)
    } else {
        partition.release_group(g)?;
        Err(OptimizationError::NoAdmissibleGroup { object })
    }
}

/// Fills `order` with the unassigned objects of `partition`, shuffled.
pub fn build_order<R: RandomSource + ?Sized>(
    partition: &GroupPartition,
    order: &mut Vec<ObjectId>,
    rng: &mut R,
) {
    order.clear();
    order.extend(partition.unassigned());
    rng.shuffle(order);
}

/// Places every unassigned object of `partition`, then runs `post_run`.
///
/// `order` is a scratch buffer reused across calls. Returns the number
/// of objects placed.
///
/// # Errors
/// Propagates [`OptimizationError::NoAdmissibleGroup`] and any
/// partition misuse reported by the heuristic.
pub fn run_heuristic<R: RandomSource + ?Sized>(
    heuristic: &mut dyn GroupingHeuristic,
    partition: &mut GroupPartition,
    ctx: &GroupingContext,
    order: &mut Vec<ObjectId>,
    rng: &mut R,
) -> Result<usize> {
    build_order(partition, order, rng);
    heuristic.init(partition, ctx);

    for &object in order.iter() {
        let g = heuristic.find_group(partition, object, ctx)?;
        debug_assert!(
            partition.can_insert(g, object, ctx),
            "{} returned an inadmissible group",
            heuristic.name()
        );
        partition.insert(g, object)?;
    }

    heuristic.post_run(partition, ctx)?;
    Ok(order.len())
}

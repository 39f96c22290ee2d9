//! Nearest-neighbour placement with a PROMETHEE fallback.

use super::{reserve_admissible, GroupingHeuristic};
use crate::catalog::ObjectId;
use crate::error::Result;
use crate::grouping::{CriteriaParams, GroupId, GroupPartition, GroupingContext};
use crate::promethee::PrometheeKernel;

/// Joins the group of the closest already-placed neighbour.
///
/// For each object, the first `neighbors` entries of its precomputed
/// neighbour list (descending mean of similarity and agreement) are
/// scanned; the group of the first placed neighbour that admits the
/// object wins. When no neighbour qualifies, every open group is ranked
/// with PROMETHEE on the object's average similarity (max), agreement
/// (max) and disagreement (min) with the group's members, and the
/// highest-ranked group that admits the object wins. Inadmissible groups
/// still take part in the ranking. When no open group admits the object,
/// a new group is opened.
#[derive(Debug, Clone)]
pub struct NearestNeighbor {
    neighbors: usize,
    kernel: PrometheeKernel,
    candidates: Vec<GroupId>,
}

impl NearestNeighbor {
    /// Creates the heuristic.
    ///
    /// # Errors
    /// Propagates criterion validation from `criteria`.
    pub fn new(neighbors: usize, criteria: &CriteriaParams) -> Result<Self> {
        Ok(Self {
            neighbors,
            kernel: PrometheeKernel::with_criteria(criteria.build()?, false),
            candidates: Vec::new(),
        })
    }

    fn closest_neighbor_group(
        &self,
        partition: &GroupPartition,
        object: ObjectId,
        ctx: &GroupingContext,
    ) -> Option<GroupId> {
        ctx.tables()
            .neighbors(object)
            .iter()
            .take(self.neighbors)
            .filter_map(|&nb| partition.group_of(nb))
            .find(|&g| partition.can_insert(g, object, ctx))
    }

    fn rank_open_groups(
        &mut self,
        partition: &GroupPartition,
        object: ObjectId,
        ctx: &GroupingContext,
    ) -> Result<Option<GroupId>> {
        self.candidates.clear();
        self.candidates.extend_from_slice(partition.used_groups());
        if !self
            .candidates
            .iter()
            .any(|&g| partition.can_insert(g, object, ctx))
        {
            return Ok(None);
        }

        self.kernel.clear_solutions();
        for (i, &g) in self.candidates.iter().enumerate() {
            let affinity = ctx.tables().affinity(object, partition.members(g));
            self.kernel.add_solution(
                i,
                &[affinity.similarity, affinity.agreement, affinity.disagreement],
            )?;
        }
        Ok(self
            .kernel
            .ranking()
            .into_iter()
            .map(|i| self.candidates[i])
            .find(|&g| partition.can_insert(g, object, ctx)))
    }
}

impl GroupingHeuristic for NearestNeighbor {
    fn name(&self) -> &str {
        "NearestNeighbor"
    }

    fn find_group(
        &mut self,
        partition: &mut GroupPartition,
        object: ObjectId,
        ctx: &GroupingContext,
    ) -> Result<GroupId> {
        if let Some(g) = self.closest_neighbor_group(partition, object, ctx) {
            return Ok(g);
        }
        match self.rank_open_groups(partition, object, ctx)? {
            Some(g) => Ok(g),
            None => reserve_admissible(partition, object, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MatrixCatalog;
    use crate::grouping::GroupConstraints;

    fn nn(neighbors: usize) -> NearestNeighbor {
        NearestNeighbor::new(neighbors, &CriteriaParams::default()).unwrap()
    }

    #[test]
    fn test_follows_closest_neighbor() {
        // 2 is much closer to 1 than to 0
        let catalog = MatrixCatalog::new(3)
            .with_similarity(2, 0, 0.3)
            .with_similarity(2, 1, 0.9);
        let ctx = GroupingContext::from_catalog(&catalog, GroupConstraints::default(), None);
        let mut p = GroupPartition::for_context(&ctx);
        let g0 = p.reserve_group().unwrap();
        p.insert(g0, ObjectId(0)).unwrap();
        let g1 = p.reserve_group().unwrap();
        p.insert(g1, ObjectId(1)).unwrap();

        assert_eq!(nn(4).find_group(&mut p, ObjectId(2), &ctx).unwrap(), g1);
    }

    #[test]
    fn test_skips_inadmissible_neighbor() {
        let catalog = MatrixCatalog::new(3)
            .with_similarity(2, 0, 0.3)
            .with_similarity(2, 1, 0.9)
            .with_parent(1, 4)
            .with_parent(2, 4);
        let ctx = GroupingContext::from_catalog(&catalog, GroupConstraints::default(), None);
        let mut p = GroupPartition::for_context(&ctx);
        let g0 = p.reserve_group().unwrap();
        p.insert(g0, ObjectId(0)).unwrap();
        let g1 = p.reserve_group().unwrap();
        p.insert(g1, ObjectId(1)).unwrap();

        assert_eq!(nn(4).find_group(&mut p, ObjectId(2), &ctx).unwrap(), g0);
    }

    #[test]
    fn test_promethee_fallback_picks_best_group() {
        // 3 has no neighbours (zero similarity and agreement everywhere)
        // but disagrees strongly with the members of the first group.
        let catalog = MatrixCatalog::uniform(4, 0.0)
            .with_similarity(0, 1, 0.5)
            .with_disagreement(3, 0, 0.9)
            .with_disagreement(3, 1, 0.9);
        let ctx = GroupingContext::from_catalog(&catalog, GroupConstraints::default(), None);
        let mut p = GroupPartition::for_context(&ctx);
        let first = p.reserve_group().unwrap();
        p.insert(first, ObjectId(0)).unwrap();
        p.insert(first, ObjectId(1)).unwrap();
        let second = p.reserve_group().unwrap();
        p.insert(second, ObjectId(2)).unwrap();

        assert_eq!(nn(0).find_group(&mut p, ObjectId(3), &ctx).unwrap(), second);
    }

    #[test]
    fn test_fallback_ranks_inadmissible_groups_too() {
        // 3 sits alone against three singleton groups; the group of 2
        // shares its parent. Ranked together, 0 beats 1; ranked without
        // 2, 1 would beat 0.
        let catalog = MatrixCatalog::new(4)
            .with_similarity(3, 0, 0.7)
            .with_agreement(3, 0, 0.4)
            .with_disagreement(3, 0, 0.8)
            .with_similarity(3, 1, 0.2)
            .with_agreement(3, 1, 0.7)
            .with_disagreement(3, 1, 0.7)
            .with_similarity(3, 2, 0.3)
            .with_agreement(3, 2, 0.1)
            .with_disagreement(3, 2, 0.4)
            .with_parent(2, 9)
            .with_parent(3, 9);
        let ctx = GroupingContext::from_catalog(&catalog, GroupConstraints::default(), None);
        let mut p = GroupPartition::for_context(&ctx);
        let groups: Vec<GroupId> = (0..3)
            .map(|o| {
                let g = p.reserve_group().unwrap();
                p.insert(g, ObjectId(o)).unwrap();
                g
            })
            .collect();
        assert!(!p.can_insert(groups[2], ObjectId(3), &ctx));

        assert_eq!(nn(0).find_group(&mut p, ObjectId(3), &ctx).unwrap(), groups[0]);
    }

    #[test]
    fn test_opens_group_when_all_full() {
        let catalog = MatrixCatalog::uniform(3, 1.0);
        let ctx = GroupingContext::from_catalog(
            &catalog,
            GroupConstraints {
                max_group_size: 2,
                ..GroupConstraints::default()
            },
            None,
        );
        let mut p = GroupPartition::for_context(&ctx);
        let g = p.reserve_group().unwrap();
        p.insert(g, ObjectId(0)).unwrap();
        p.insert(g, ObjectId(1)).unwrap();

        let fresh = nn(4).find_group(&mut p, ObjectId(2), &ctx).unwrap();
        assert_ne!(fresh, g);
        assert!(p.group(fresh).is_empty());
    }
}

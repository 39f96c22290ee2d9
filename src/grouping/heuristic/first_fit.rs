//! First-fit placement.

use super::{reserve_admissible, GroupingHeuristic};
use crate::catalog::ObjectId;
use crate::error::Result;
use crate::grouping::{GroupId, GroupPartition, GroupingContext};

/// Puts each object into the first admissible group, in creation order,
/// opening a new group when none fits.
///
/// # References
///
/// Falkenauer (1998), *Genetic Algorithms and Grouping Problems*, ch. 5
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

impl GroupingHeuristic for FirstFit {
    fn name(&self) -> &str {
        "FirstFit"
    }

    fn find_group(
        &mut self,
        partition: &mut GroupPartition,
        object: ObjectId,
        ctx: &GroupingContext,
    ) -> Result<GroupId> {
        let existing = partition
            .used_groups()
            .iter()
            .copied()
            .find(|&g| partition.can_insert(g, object, ctx));
        match existing {
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

    #[test]
    fn test_prefers_oldest_group() {
        let catalog = MatrixCatalog::uniform(3, 1.0);
        let ctx = GroupingContext::from_catalog(&catalog, GroupConstraints::default(), None);
        let mut p = GroupPartition::for_context(&ctx);
        let first = p.reserve_group().unwrap();
        let _second = p.reserve_group().unwrap();

        let g = FirstFit.find_group(&mut p, ObjectId(0), &ctx).unwrap();
        assert_eq!(g, first);
    }

    #[test]
    fn test_opens_group_when_none_fits() {
        let catalog = MatrixCatalog::uniform(2, 0.0);
        let ctx = GroupingContext::from_catalog(
            &catalog,
            GroupConstraints {
                min_similarity: 0.5,
                ..GroupConstraints::default()
            },
            None,
        );
        let mut p = GroupPartition::for_context(&ctx);
        let g0 = FirstFit.find_group(&mut p, ObjectId(0), &ctx).unwrap();
        p.insert(g0, ObjectId(0)).unwrap();
        let g1 = FirstFit.find_group(&mut p, ObjectId(1), &ctx).unwrap();
        assert_ne!(g0, g1);
        assert_eq!(p.group_count(), 2);
    }
}

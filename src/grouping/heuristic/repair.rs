//! Repair passes applied after construction.
//!
//! All passes only move an object into a group that admits it, so they
//! never break a constraint. Objects that cannot be rehomed stay where
//! they are.

use crate::catalog::ObjectId;
use crate::error::Result;
use crate::grouping::{GroupId, GroupPartition, GroupingContext};

/// Best group other than `from` that admits `o` and holds no object with
/// the same parent, ranked by mean similarity to its members.
///
/// Only groups with at least `min_size` members are considered. Ties go
/// to the oldest group. With `positive_only`, a host must have a mean
/// similarity above zero.
fn best_host(
    partition: &GroupPartition,
    o: ObjectId,
    from: GroupId,
    ctx: &GroupingContext,
    min_size: usize,
    positive_only: bool,
) -> Option<GroupId> {
    let tables = ctx.tables();
    let mut best: Option<(GroupId, f64)> = None;

    for &h in partition.used_groups() {
        if h == from || partition.size(h) < min_size.max(1) {
            continue;
        }
        if partition.holds_same_parent(h, o, tables) || !partition.can_insert(h, o, ctx) {
            continue;
        }
        let score = tables.affinity(o, partition.members(h)).similarity;
        if positive_only && score <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((h, score));
        }
    }
    best.map(|(h, _)| h)
}

/// Moves `o` out of singleton group `g` into `host` and releases `g`.
fn move_single(partition: &mut GroupPartition, o: ObjectId, g: GroupId, host: GroupId) -> Result<()> {
    partition.remove(o);
    partition.release_group(g)?;
    partition.insert(host, o)
}

/// Dissolves singleton groups whose member is social, reinserting the
/// object into the most similar admissible other group.
///
/// A social object without an admissible host stays alone. Returns the
/// number of objects moved.
pub fn repair_social_singletons(partition: &mut GroupPartition, ctx: &GroupingContext) -> Result<usize> {
    let tables = ctx.tables();
    let singles: Vec<GroupId> = partition
        .used_groups()
        .iter()
        .copied()
        .filter(|&g| partition.size(g) == 1 && tables.is_social(partition.members(g)[0]))
        .collect();

    let mut moved = 0;
    for g in singles {
        // an earlier move may have joined this group
        if partition.size(g) != 1 {
            continue;
        }
        let o = partition.members(g)[0];
        if let Some(host) = best_host(partition, o, g, ctx, 1, false) {
            move_single(partition, o, g, host)?;
            moved += 1;
        }
    }
    Ok(moved)
}

/// Breaks up groups smaller than `min_group_size`.
///
/// A group is broken up only if every member finds a host of adequate
/// size; otherwise it is left intact. Returns the number of groups
/// released.
pub fn repair_undersized_groups(partition: &mut GroupPartition, ctx: &GroupingContext) -> Result<usize> {
    let min = ctx.constraints().min_group_size;
    if min <= 1 {
        return Ok(0);
    }

    let undersized: Vec<GroupId> = partition
        .used_groups()
        .iter()
        .copied()
        .filter(|&g| partition.size(g) < min)
        .collect();

    let mut released = 0;
    let mut moves: Vec<(ObjectId, GroupId)> = Vec::new();
    for g in undersized {
        let size = partition.size(g);
        if size == 0 || size >= min {
            continue;
        }

        moves.clear();
        let members = partition.members(g).to_vec();
        for o in members {
            match best_host(partition, o, g, ctx, min, false) {
                Some(host) => {
                    partition.remove(o);
                    partition.insert(host, o)?;
                    moves.push((o, host));
                }
                None => break,
            }
        }

        if partition.size(g) == 0 {
            partition.release_group(g)?;
            released += 1;
        } else {
            for &(o, _) in moves.iter().rev() {
                partition.remove(o);
                partition.insert(g, o)?;
            }
        }
    }
    Ok(released)
}

/// Moves every remaining singleton into the admissible host with the
/// highest positive mean similarity. Returns the number of objects moved.
pub fn merge_singletons(partition: &mut GroupPartition, ctx: &GroupingContext) -> Result<usize> {
    let singles: Vec<GroupId> = partition
        .used_groups()
        .iter()
        .copied()
        .filter(|&g| partition.size(g) == 1)
        .collect();

    let mut moved = 0;
    for g in singles {
        if partition.size(g) != 1 {
            continue;
        }
        let o = partition.members(g)[0];
        if let Some(host) = best_host(partition, o, g, ctx, 1, true) {
            move_single(partition, o, g, host)?;
            moved += 1;
        }
    }
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MatrixCatalog;
    use crate::grouping::GroupConstraints;

    fn singletons(partition: &mut GroupPartition, objects: &[usize]) -> Vec<GroupId> {
        objects
            .iter()
            .map(|&o| {
                let g = partition.reserve_group().unwrap();
                partition.insert(g, ObjectId(o)).unwrap();
                g
            })
            .collect()
    }

    #[test]
    fn test_social_singleton_moves_to_most_similar_group() {
        let catalog = MatrixCatalog::new(5)
            .with_social(4)
            .with_similarity(4, 0, 0.2)
            .with_similarity(4, 1, 0.2)
            .with_similarity(4, 2, 0.8)
            .with_similarity(4, 3, 0.8);
        let ctx = GroupingContext::from_catalog(&catalog, GroupConstraints::default(), None);
        let mut p = GroupPartition::for_context(&ctx);
        let a = p.reserve_group().unwrap();
        p.insert(a, ObjectId(0)).unwrap();
        p.insert(a, ObjectId(1)).unwrap();
        let b = p.reserve_group().unwrap();
        p.insert(b, ObjectId(2)).unwrap();
        p.insert(b, ObjectId(3)).unwrap();
        singletons(&mut p, &[4]);

        assert_eq!(repair_social_singletons(&mut p, &ctx).unwrap(), 1);
        assert_eq!(p.group_of(ObjectId(4)), Some(b));
        assert_eq!(p.group_count(), 2);
    }

    #[test]
    fn test_social_singleton_without_host_stays() {
        let catalog = MatrixCatalog::uniform(2, 1.0)
            .with_social(1)
            .with_parent(0, 3)
            .with_parent(1, 3);
        let ctx = GroupingContext::from_catalog(
            &catalog,
            GroupConstraints {
                allow_same_parent: true,
                ..GroupConstraints::default()
            },
            None,
        );
        let mut p = GroupPartition::for_context(&ctx);
        let gs = singletons(&mut p, &[0, 1]);

        // same-parent hosts are excluded even when the constraint is relaxed
        assert_eq!(repair_social_singletons(&mut p, &ctx).unwrap(), 0);
        assert_eq!(p.group_of(ObjectId(1)), Some(gs[1]));
        assert!(p.is_complete());
    }

    #[test]
    fn test_non_social_singletons_untouched() {
        let catalog = MatrixCatalog::uniform(2, 1.0);
        let ctx = GroupingContext::from_catalog(&catalog, GroupConstraints::default(), None);
        let mut p = GroupPartition::for_context(&ctx);
        singletons(&mut p, &[0, 1]);
        assert_eq!(repair_social_singletons(&mut p, &ctx).unwrap(), 0);
        assert_eq!(p.group_count(), 2);
    }

    #[test]
    fn test_two_social_singletons_merge_once() {
        let catalog = MatrixCatalog::uniform(2, 1.0).with_social(0).with_social(1);
        let ctx = GroupingContext::from_catalog(&catalog, GroupConstraints::default(), None);
        let mut p = GroupPartition::for_context(&ctx);
        singletons(&mut p, &[0, 1]);
        assert_eq!(repair_social_singletons(&mut p, &ctx).unwrap(), 1);
        assert_eq!(p.group_count(), 1);
        assert_eq!(p.group_of(ObjectId(0)), p.group_of(ObjectId(1)));
    }

    #[test]
    fn test_undersized_group_dissolved_when_members_fit() {
        let catalog = MatrixCatalog::uniform(5, 1.0);
        let ctx = GroupingContext::from_catalog(
            &catalog,
            GroupConstraints {
                min_group_size: 2,
                max_group_size: 3,
                ..GroupConstraints::default()
            },
            None,
        );
        let mut p = GroupPartition::for_context(&ctx);
        let a = p.reserve_group().unwrap();
        p.insert(a, ObjectId(0)).unwrap();
        p.insert(a, ObjectId(1)).unwrap();
        let b = p.reserve_group().unwrap();
        p.insert(b, ObjectId(2)).unwrap();
        p.insert(b, ObjectId(3)).unwrap();
        singletons(&mut p, &[4]);

        assert_eq!(repair_undersized_groups(&mut p, &ctx).unwrap(), 1);
        assert_eq!(p.group_count(), 2);
        assert!(p.check(&ctx).is_ok());
    }

    #[test]
    fn test_undersized_group_kept_when_a_member_has_no_host() {
        let catalog = MatrixCatalog::uniform(4, 1.0);
        let ctx = GroupingContext::from_catalog(
            &catalog,
            GroupConstraints {
                min_group_size: 3,
                max_group_size: 3,
                ..GroupConstraints::default()
            },
            None,
        );
        let mut p = GroupPartition::for_context(&ctx);
        let a = p.reserve_group().unwrap();
        p.insert(a, ObjectId(0)).unwrap();
        p.insert(a, ObjectId(1)).unwrap();
        p.insert(a, ObjectId(2)).unwrap();
        let b = singletons(&mut p, &[3])[0];

        // the full group cannot take object 3
        assert_eq!(repair_undersized_groups(&mut p, &ctx).unwrap(), 0);
        assert_eq!(p.members(b), &[ObjectId(3)]);
    }

    #[test]
    fn test_merge_requires_positive_similarity() {
        let catalog = MatrixCatalog::new(3).with_similarity(0, 1, 0.6);
        let ctx = GroupingContext::from_catalog(&catalog, GroupConstraints::default(), None);
        let mut p = GroupPartition::for_context(&ctx);
        singletons(&mut p, &[0, 1, 2]);

        assert_eq!(merge_singletons(&mut p, &ctx).unwrap(), 1);
        assert_eq!(p.group_of(ObjectId(0)), p.group_of(ObjectId(1)));
        assert_eq!(p.size(p.group_of(ObjectId(2)).unwrap()), 1);
    }
}

//! The constrained partition and its mutation primitives.

use super::context::GroupingContext;
use super::group::{Group, GroupId, GroupScores};
use crate::catalog::{ObjectId, RelationTables};
use crate::error::{OptimizationError, Result};

/// An assignment of objects to groups drawn from a fixed-capacity pool.
///
/// Groups live in an arena indexed by [`GroupId`]. Reserved groups are
/// kept in creation order in the used list; released slots go to a free
/// list and are handed out again before new slots are allocated. A dense
/// `object -> group` index gives O(1) membership lookup.
///
/// Each chromosome owns its own partition; nothing in here is shared
/// between threads.
#[derive(Debug, Clone)]
pub struct GroupPartition {
    groups: Vec<Group>,
    used: Vec<GroupId>,
    free: Vec<GroupId>,
    assignment: Vec<Option<GroupId>>,
    capacity: usize,
}

impl GroupPartition {
    /// Creates an empty partition for `object_count` objects with at most
    /// `capacity` simultaneously reserved groups.
    pub fn new(object_count: usize, capacity: usize) -> Self {
        Self {
            groups: Vec::new(),
            used: Vec::new(),
            free: Vec::new(),
            assignment: vec![None; object_count],
            capacity,
        }
    }

    /// Creates an empty partition sized for `ctx`.
    pub fn for_context(ctx: &GroupingContext) -> Self {
        Self::new(ctx.object_count(), ctx.max_groups())
    }

    pub fn object_count(&self) -> usize {
        self.assignment.len()
    }

    /// Maximum number of reserved groups.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of reserved groups.
    pub fn group_count(&self) -> usize {
        self.used.len()
    }

    /// Reserved groups in creation order.
    pub fn used_groups(&self) -> &[GroupId] {
        &self.used
    }

    /// Iterates over reserved groups in creation order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.used.iter().map(|g| &self.groups[g.0])
    }

    /// Returns the group slot `g`.
    ///
    /// # Panics
    /// Panics if `g` was never allocated by this partition.
    pub fn group(&self, g: GroupId) -> &Group {
        &self.groups[g.0]
    }

    /// Members of `g` in insertion order.
    pub fn members(&self, g: GroupId) -> &[ObjectId] {
        &self.groups[g.0].members
    }

    /// Number of members of `g`.
    pub fn size(&self, g: GroupId) -> usize {
        self.groups[g.0].members.len()
    }

    /// Group currently holding `o`.
    #[inline]
    pub fn group_of(&self, o: ObjectId) -> Option<GroupId> {
        self.assignment[o.0]
    }

    #[inline]
    pub fn is_assigned(&self, o: ObjectId) -> bool {
        self.assignment[o.0].is_some()
    }

    /// Objects not in any group, in id order.
    pub fn unassigned(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.assignment
            .iter()
            .enumerate()
            .filter(|(_, g)| g.is_none())
            .map(|(o, _)| ObjectId(o))
    }

    pub fn unassigned_count(&self) -> usize {
        self.assignment.iter().filter(|g| g.is_none()).count()
    }

    /// Whether every object belongs to a group.
    pub fn is_complete(&self) -> bool {
        self.assignment.iter().all(Option::is_some)
    }

    /// Hands out an empty group, reusing released slots first.
    ///
    /// # Errors
    /// [`OptimizationError::PoolExhausted`] when `capacity` groups are
    /// already reserved.
    pub fn reserve_group(&mut self) -> Result<GroupId> {
        let id = if let Some(id) = self.free.pop() {
            id
        } else if self.groups.len() < self.capacity {
            let id = GroupId(self.groups.len());
            self.groups.push(Group::new(id));
            id
        } else {
            return Err(OptimizationError::PoolExhausted {
                capacity: self.capacity,
            });
        };

        let group = &mut self.groups[id.0];
        debug_assert!(group.members.is_empty());
        group.reserved = true;
        group.to_eval = true;
        group.scores = GroupScores::default();
        self.used.push(id);
        Ok(id)
    }

    /// Returns an empty group to the free pool.
    ///
    /// # Errors
    /// - [`OptimizationError::UnknownGroup`] if `g` is not reserved
    /// - [`OptimizationError::NonEmptyGroupRelease`] if `g` has members
    pub fn release_group(&mut self, g: GroupId) -> Result<()> {
        let group = self.reserved_mut(g)?;
        if !group.members.is_empty() {
            return Err(OptimizationError::NonEmptyGroupRelease {
                group: g,
                members: group.members.len(),
            });
        }
        group.reserved = false;
        group.to_eval = false;
        self.used.retain(|&u| u != g);
        self.free.push(g);
        Ok(())
    }

    /// Adds `o` to `g` without checking constraints (see [`can_insert`](Self::can_insert)).
    ///
    /// # Errors
    /// - [`OptimizationError::UnknownGroup`] if `g` is not reserved
    /// - [`OptimizationError::AlreadyAssigned`] if `o` already has a group
    pub fn insert(&mut self, g: GroupId, o: ObjectId) -> Result<()> {
        if let Some(current) = self.assignment[o.0] {
            return Err(OptimizationError::AlreadyAssigned {
                object: o,
                group: current,
            });
        }
        let group = self.reserved_mut(g)?;
        group.members.push(o);
        group.to_eval = true;
        self.assignment[o.0] = Some(g);
        Ok(())
    }

    /// Takes `o` out of its group and returns that group.
    pub fn remove(&mut self, o: ObjectId) -> Option<GroupId> {
        let g = self.assignment[o.0].take()?;
        let group = &mut self.groups[g.0];
        if let Some(pos) = group.members.iter().position(|&m| m == o) {
            group.members.remove(pos);
        }
        group.to_eval = true;
        Some(g)
    }

    /// Removes every member of `g`, releases it, and returns the members.
    pub fn dissolve(&mut self, g: GroupId) -> Result<Vec<ObjectId>> {
        let group = self.reserved_mut(g)?;
        let members = std::mem::take(&mut group.members);
        for &o in &members {
            self.assignment[o.0] = None;
        }
        self.release_group(g)?;
        Ok(members)
    }

    /// Releases every group and unassigns every object.
    pub fn clear(&mut self) {
        for &g in &self.used {
            let group = &mut self.groups[g.0];
            group.members.clear();
            group.reserved = false;
            group.to_eval = false;
            self.free.push(g);
        }
        self.used.clear();
        self.assignment.iter_mut().for_each(|a| *a = None);
    }

    /// Whether `o` may join `g` under the constraints of `ctx`.
    ///
    /// The disagreement and similarity scans walk the object's presorted
    /// lists and stop at the first entry that can no longer violate the
    /// threshold, so their cost is bounded by the number of violators.
    pub fn can_insert(&self, g: GroupId, o: ObjectId, ctx: &GroupingContext) -> bool {
        let group = &self.groups[g.0];
        let limits = ctx.constraints();
        let tables = ctx.tables();

        if !group.reserved || group.members.len() >= limits.max_group_size {
            return false;
        }

        if !limits.allow_same_parent && self.holds_same_parent(g, o, tables) {
            return false;
        }

        for &(other, ratio) in tables.disagreements_desc(o) {
            if ratio <= limits.max_disagreement {
                break;
            }
            if self.assignment[other.0] == Some(g) {
                return false;
            }
        }

        for &(other, sim) in tables.similarities_asc(o) {
            if sim >= limits.min_similarity {
                break;
            }
            if self.assignment[other.0] == Some(g) {
                return false;
            }
        }

        true
    }

    /// Whether `g` holds an object with the same parent as `o`.
    pub fn holds_same_parent(&self, g: GroupId, o: ObjectId, tables: &RelationTables) -> bool {
        tables.parent_id(o).is_some()
            && self.groups[g.0]
                .members
                .iter()
                .any(|&m| tables.same_parent(o, m))
    }

    /// Recomputes the cached scores of every dirty group.
    pub fn refresh_scores(&mut self, tables: &RelationTables) {
        for &g in &self.used {
            let group = &mut self.groups[g.0];
            if group.to_eval {
                group.scores = GroupScores::compute(&group.members, tables);
                group.to_eval = false;
            }
        }
    }

    /// Cached scores of `g` (call [`refresh_scores`](Self::refresh_scores) first).
    pub fn scores(&self, g: GroupId) -> GroupScores {
        debug_assert!(!self.groups[g.0].to_eval, "scores read from a dirty group");
        self.groups[g.0].scores
    }

    /// Sum of the cached scores of all groups.
    pub fn total_scores(&self) -> GroupScores {
        let mut total = GroupScores::default();
        for g in self.groups() {
            debug_assert!(!g.to_eval, "scores read from a dirty group");
            total += g.scores;
        }
        total
    }

    /// Checks coverage, capacity and pairwise constraints.
    ///
    /// # Errors
    /// [`OptimizationError::ConstraintViolation`] describing the first
    /// violation found.
    pub fn check(&self, ctx: &GroupingContext) -> Result<()> {
        let violation = |msg: String| Err(OptimizationError::ConstraintViolation(msg));
        let limits = ctx.constraints();
        let tables = ctx.tables();

        if let Some(o) = self.unassigned().next() {
            return violation(format!("object {o} is not assigned"));
        }

        for group in self.groups() {
            let members = &group.members;
            if members.len() > limits.max_group_size {
                return violation(format!(
                    "group {} has {} members (max {})",
                    group.id,
                    members.len(),
                    limits.max_group_size
                ));
            }
            for (i, &a) in members.iter().enumerate() {
                if self.assignment[a.0] != Some(group.id) {
                    return violation(format!("index of {a} does not point to {}", group.id));
                }
                for &b in &members[i + 1..] {
                    if !limits.allow_same_parent && tables.same_parent(a, b) {
                        return violation(format!("{a} and {b} share a parent in {}", group.id));
                    }
                    let dis = tables.disagreement(a, b).max(tables.disagreement(b, a));
                    if dis > limits.max_disagreement {
                        return violation(format!("{a} and {b} disagree by {dis} in {}", group.id));
                    }
                    let sim = tables.similarity(a, b).min(tables.similarity(b, a));
                    if sim < limits.min_similarity {
                        return violation(format!("{a} and {b} too dissimilar ({sim}) in {}", group.id));
                    }
                }
            }
        }
        Ok(())
    }

    /// Groups as sorted member lists, sorted by first member.
    ///
    /// Two partitions with equal canonical forms group the objects
    /// identically, regardless of group ids or insertion order.
    pub fn canonical_groups(&self) -> Vec<Vec<ObjectId>> {
        let mut out: Vec<Vec<ObjectId>> = self
            .groups()
            .filter(|g| !g.members.is_empty())
            .map(|g| {
                let mut m = g.members.clone();
                m.sort_unstable();
                m
            })
            .collect();
        out.sort();
        out
    }

    fn reserved_mut(&mut self, g: GroupId) -> Result<&mut Group> {
        match self.groups.get_mut(g.0) {
            Some(group) if group.reserved => Ok(group),
            _ => Err(OptimizationError::UnknownGroup { group: g }),
        }
    }
}

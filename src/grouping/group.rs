//! Group identity and per-group cached scores.

use crate::catalog::{ObjectId, RelationTables};
use std::fmt;

/// Index of a group inside its partition's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

/// Average pairwise relations inside one group.
///
/// Averages are taken over ordered pairs `(i, j)` with `i != j`, so
/// asymmetric catalogs are handled. A group with fewer than two members
/// scores zero everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupScores {
    pub similarity: f64,
    pub agreement: f64,
    pub disagreement: f64,
}

impl GroupScores {
    /// Scores `members` against `tables`.
    pub fn compute(members: &[ObjectId], tables: &RelationTables) -> Self {
        let n = members.len();
        if n < 2 {
            return Self::default();
        }
        let mut scores = Self::default();
        for &a in members {
            for &b in members {
                if a == b {
                    continue;
                }
                scores.similarity += tables.similarity(a, b);
                scores.agreement += tables.agreement(a, b);
                scores.disagreement += tables.disagreement(a, b);
            }
        }
        let pairs = (n * (n - 1)) as f64;
        scores.similarity /= pairs;
        scores.agreement /= pairs;
        scores.disagreement /= pairs;
        scores
    }

    /// Criterion vector `[similarity, agreement, disagreement]`.
    pub fn as_array(&self) -> [f64; 3] {
        [self.similarity, self.agreement, self.disagreement]
    }
}

impl std::ops::AddAssign for GroupScores {
    fn add_assign(&mut self, rhs: Self) {
        self.similarity += rhs.similarity;
        self.agreement += rhs.agreement;
        self.disagreement += rhs.disagreement;
    }
}

/// A pooled group slot.
#[derive(Debug, Clone)]
pub struct Group {
    pub(crate) id: GroupId,
    pub(crate) members: Vec<ObjectId>,
    pub(crate) reserved: bool,
    pub(crate) to_eval: bool,
    pub(crate) scores: GroupScores,
}

impl Group {
    pub(crate) fn new(id: GroupId) -> Self {
        Self {
            id,
            members: Vec::new(),
            reserved: false,
            to_eval: false,
            scores: GroupScores::default(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[ObjectId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the slot is currently handed out by the pool.
    pub fn is_reserved(&self) -> bool {
        self.reserved
    }

    /// Whether the cached scores are stale.
    pub fn needs_eval(&self) -> bool {
        self.to_eval
    }
}

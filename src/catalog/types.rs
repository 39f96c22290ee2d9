//! Object identity and the catalog contract.

use std::fmt;

/// Dense identifier of an object to group (`0..catalog.len()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(pub usize);

impl ObjectId {
    /// Returns the dense index of this object.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only source of the objects to group and their pairwise relations.
///
/// Object ids are dense: a catalog of `len()` objects exposes
/// `ObjectId(0)..ObjectId(len() - 1)`.
///
/// Ratios are expected in `[0, 1]`. Non-finite values are tolerated and
/// treated as "no relation" (0) when the catalog is snapshotted into
/// [`RelationTables`](super::RelationTables).
///
/// Relations need not be symmetric. Group scores average both directions
/// of every pair, while the hard constraints use the stricter direction:
/// a pair is kept apart when either `disagreement(a, b)` or
/// `disagreement(b, a)` exceeds the limit, and likewise when either
/// similarity falls below the minimum.
///
/// # Implementing
///
/// ```ignore
/// struct Users { profiles: Vec<Profile> }
///
/// impl ObjectCatalog for Users {
///     fn len(&self) -> usize { self.profiles.len() }
///     fn parent_id(&self, o: ObjectId) -> Option<u64> { self.profiles[o.0].owner }
///     fn is_social(&self, o: ObjectId) -> bool { self.profiles[o.0].social }
///     fn similarity(&self, a: ObjectId, b: ObjectId) -> f64 { cosine(&self.profiles[a.0], &self.profiles[b.0]) }
///     fn agreement(&self, a: ObjectId, b: ObjectId) -> f64 { self.ratios.agree(a, b) }
///     fn disagreement(&self, a: ObjectId, b: ObjectId) -> f64 { self.ratios.disagree(a, b) }
/// }
/// ```
pub trait ObjectCatalog: Sync {
    /// Number of objects.
    fn len(&self) -> usize;

    /// Returns `true` if the catalog holds no objects.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all object ids.
    fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        (0..self.len()).map(ObjectId)
    }

    /// Owner of the object. Objects sharing an owner may be kept apart.
    fn parent_id(&self, object: ObjectId) -> Option<u64>;

    /// Whether the object must not end up alone in a group.
    fn is_social(&self, object: ObjectId) -> bool;

    /// Similarity between two objects, usually in `[0, 1]`.
    fn similarity(&self, a: ObjectId, b: ObjectId) -> f64;

    /// Agreement ratio between two objects, usually in `[0, 1]`.
    fn agreement(&self, a: ObjectId, b: ObjectId) -> f64;

    /// Disagreement ratio between two objects, usually in `[0, 1]`.
    fn disagreement(&self, a: ObjectId, b: ObjectId) -> f64;
}

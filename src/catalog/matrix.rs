//! Dense in-memory catalog.

use super::types::{ObjectCatalog, ObjectId};

/// An [`ObjectCatalog`] backed by three dense `n x n` matrices.
///
/// Pairs that are never set default to 0 (no relation). Setters are
/// symmetric: `a -> b` and `b -> a` receive the same value.
///
/// # Examples
///
/// ```
/// use u_grouping::catalog::{MatrixCatalog, ObjectCatalog, ObjectId};
///
/// let catalog = MatrixCatalog::new(3)
///     .with_similarity(0, 1, 0.9)
///     .with_disagreement(1, 2, 0.8)
///     .with_parent(2, 7)
///     .with_social(0);
///
/// assert_eq!(catalog.len(), 3);
/// assert!((catalog.similarity(ObjectId(1), ObjectId(0)) - 0.9).abs() < 1e-12);
/// assert_eq!(catalog.parent_id(ObjectId(2)), Some(7));
/// assert!(catalog.is_social(ObjectId(0)));
/// ```
#[derive(Debug, Clone)]
pub struct MatrixCatalog {
    n: usize,
    parents: Vec<Option<u64>>,
    social: Vec<bool>,
    similarity: Vec<f64>,
    agreement: Vec<f64>,
    disagreement: Vec<f64>,
}

impl MatrixCatalog {
    /// Creates a catalog of `n` unrelated objects.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            parents: vec![None; n],
            social: vec![false; n],
            similarity: vec![0.0; n * n],
            agreement: vec![0.0; n * n],
            disagreement: vec![0.0; n * n],
        }
    }

    /// Creates a catalog where every pair has the same similarity.
    pub fn uniform(n: usize, similarity: f64) -> Self {
        let mut catalog = Self::new(n);
        for a in 0..n {
            for b in 0..n {
                if a != b {
                    catalog.similarity[a * n + b] = similarity;
                }
            }
        }
        catalog
    }

    /// Sets the owner of object `o`. A parent id of 0 means "no parent".
    pub fn set_parent(&mut self, o: usize, parent: u64) {
        self.parents[o] = (parent != 0).then_some(parent);
    }

    /// Marks object `o` as social.
    pub fn set_social(&mut self, o: usize, social: bool) {
        self.social[o] = social;
    }

    /// Sets the symmetric similarity of `a` and `b`.
    pub fn set_similarity(&mut self, a: usize, b: usize, value: f64) {
        Self::set_pair(&mut self.similarity, self.n, a, b, value);
    }

    /// Sets the symmetric agreement ratio of `a` and `b`.
    pub fn set_agreement(&mut self, a: usize, b: usize, value: f64) {
        Self::set_pair(&mut self.agreement, self.n, a, b, value);
    }

    /// Sets the symmetric disagreement ratio of `a` and `b`.
    pub fn set_disagreement(&mut self, a: usize, b: usize, value: f64) {
        Self::set_pair(&mut self.disagreement, self.n, a, b, value);
    }

    /// Builder form of [`set_parent`](Self::set_parent).
    pub fn with_parent(mut self, o: usize, parent: u64) -> Self {
        self.set_parent(o, parent);
        self
    }

    /// Builder form of [`set_social`](Self::set_social).
    pub fn with_social(mut self, o: usize) -> Self {
        self.set_social(o, true);
        self
    }

    /// Builder form of [`set_similarity`](Self::set_similarity).
    pub fn with_similarity(mut self, a: usize, b: usize, value: f64) -> Self {
        self.set_similarity(a, b, value);
        self
    }

    /// Builder form of [`set_agreement`](Self::set_agreement).
    pub fn with_agreement(mut self, a: usize, b: usize, value: f64) -> Self {
        self.set_agreement(a, b, value);
        self
    }

    /// Builder form of [`set_disagreement`](Self::set_disagreement).
    pub fn with_disagreement(mut self, a: usize, b: usize, value: f64) -> Self {
        self.set_disagreement(a, b, value);
        self
    }

    fn set_pair(matrix: &mut [f64], n: usize, a: usize, b: usize, value: f64) {
        assert!(a < n && b < n, "object index out of range");
        matrix[a * n + b] = value;
        matrix[b * n + a] = value;
    }
}

impl ObjectCatalog for MatrixCatalog {
    fn len(&self) -> usize {
        self.n
    }

    fn parent_id(&self, object: ObjectId) -> Option<u64> {
        self.parents[object.0]
    }

    fn is_social(&self, object: ObjectId) -> bool {
        self.social[object.0]
    }

    fn similarity(&self, a: ObjectId, b: ObjectId) -> f64 {
        self.similarity[a.0 * self.n + b.0]
    }

    fn agreement(&self, a: ObjectId, b: ObjectId) -> f64 {
        self.agreement[a.0 * self.n + b.0]
    }

    fn disagreement(&self, a: ObjectId, b: ObjectId) -> f64 {
        self.disagreement[a.0 * self.n + b.0]
    }
}

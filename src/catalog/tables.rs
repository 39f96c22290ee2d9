//! Immutable relation snapshot shared by all workers of a run.
//!
//! [`RelationTables`] copies every pairwise value out of an
//! [`ObjectCatalog`] once, replacing non-finite values with 0, and
//! precomputes the per-object sorted lists used by the constraint scans
//! and the nearest-neighbour heuristic. The catalog is never consulted
//! again during a run, so the lists never go stale.
//!
//! Relations may be asymmetric. The matrices keep both directions for
//! scoring, while the constraint lists hold the stricter of the two:
//! the higher disagreement and the lower similarity of each pair.

use super::types::{ObjectCatalog, ObjectId};

/// Average relation of one object to a set of members.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Affinity {
    /// Mean similarity.
    pub similarity: f64,
    /// Mean agreement ratio.
    pub agreement: f64,
    /// Mean disagreement ratio.
    pub disagreement: f64,
}

/// Sanitized, read-only copy of a catalog with precomputed sorted lists.
#[derive(Debug, Clone)]
pub struct RelationTables {
    n: usize,
    parents: Vec<Option<u64>>,
    social: Vec<bool>,
    similarity: Vec<f64>,
    agreement: Vec<f64>,
    disagreement: Vec<f64>,
    /// Per object: other objects by descending pairwise worst disagreement.
    by_disagreement: Vec<Vec<(ObjectId, f64)>>,
    /// Per object: other objects by ascending pairwise worst similarity.
    by_similarity: Vec<Vec<(ObjectId, f64)>>,
    /// Per object: other objects with a positive composite score, closest first.
    neighbors: Vec<Vec<ObjectId>>,
}

#[inline]
fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

impl RelationTables {
    /// Snapshots `catalog`.
    ///
    /// # Complexity
    /// O(n² log n) time, O(n²) memory.
    pub fn from_catalog<C: ObjectCatalog + ?Sized>(catalog: &C) -> Self {
        let n = catalog.len();
        let mut similarity = vec![0.0; n * n];
        let mut agreement = vec![0.0; n * n];
        let mut disagreement = vec![0.0; n * n];

        for a in 0..n {
            for b in 0..n {
                if a == b {
                    continue;
                }
                let (oa, ob) = (ObjectId(a), ObjectId(b));
                similarity[a * n + b] = sanitize(catalog.similarity(oa, ob));
                agreement[a * n + b] = sanitize(catalog.agreement(oa, ob));
                disagreement[a * n + b] = sanitize(catalog.disagreement(oa, ob));
            }
        }

        let parents = (0..n)
            .map(|o| catalog.parent_id(ObjectId(o)).filter(|&p| p != 0))
            .collect();
        let social = (0..n).map(|o| catalog.is_social(ObjectId(o))).collect();

        let mut by_disagreement = Vec::with_capacity(n);
        let mut by_similarity = Vec::with_capacity(n);
        let mut neighbors = Vec::with_capacity(n);

        for a in 0..n {
            let others = (0..n).filter(|&b| b != a);

            let mut dis: Vec<(ObjectId, f64)> = others
                .clone()
                .map(|b| {
                    let worst = disagreement[a * n + b].max(disagreement[b * n + a]);
                    (ObjectId(b), worst)
                })
                .collect();
            dis.sort_by(|x, y| y.1.total_cmp(&x.1));
            by_disagreement.push(dis);

            let mut sim: Vec<(ObjectId, f64)> = others
                .clone()
                .map(|b| {
                    let worst = similarity[a * n + b].min(similarity[b * n + a]);
                    (ObjectId(b), worst)
                })
                .collect();
            sim.sort_by(|x, y| x.1.total_cmp(&y.1));
            by_similarity.push(sim);

            let mut near: Vec<(ObjectId, f64)> = others
                .map(|b| {
                    let composite = (similarity[a * n + b] + agreement[a * n + b]) / 2.0;
                    (ObjectId(b), composite)
                })
                .filter(|&(_, c)| c > 0.0)
                .collect();
            near.sort_by(|x, y| y.1.total_cmp(&x.1));
            neighbors.push(near.into_iter().map(|(o, _)| o).collect());
        }

        Self {
            n,
            parents,
            social,
            similarity,
            agreement,
            disagreement,
            by_disagreement,
            by_similarity,
            neighbors,
        }
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Returns `true` if there are no objects.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Iterates over all object ids.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> {
        (0..self.n).map(ObjectId)
    }

    /// Owner of `o`, `None` when it has no parent.
    pub fn parent_id(&self, o: ObjectId) -> Option<u64> {
        self.parents[o.0]
    }

    /// Whether `o` must not stay alone.
    pub fn is_social(&self, o: ObjectId) -> bool {
        self.social[o.0]
    }

    /// Returns `true` when `a` and `b` have the same (non-empty) parent.
    pub fn same_parent(&self, a: ObjectId, b: ObjectId) -> bool {
        matches!((self.parents[a.0], self.parents[b.0]), (Some(x), Some(y)) if x == y)
    }

    pub fn similarity(&self, a: ObjectId, b: ObjectId) -> f64 {
        self.similarity[a.0 * self.n + b.0]
    }

    pub fn agreement(&self, a: ObjectId, b: ObjectId) -> f64 {
        self.agreement[a.0 * self.n + b.0]
    }

    pub fn disagreement(&self, a: ObjectId, b: ObjectId) -> f64 {
        self.disagreement[a.0 * self.n + b.0]
    }

    /// Other objects ordered by descending disagreement with `o`.
    ///
    /// Each value is the higher of the two directions of the pair.
    pub fn disagreements_desc(&self, o: ObjectId) -> &[(ObjectId, f64)] {
        &self.by_disagreement[o.0]
    }

    /// Other objects ordered by ascending similarity with `o`.
    ///
    /// Each value is the lower of the two directions of the pair.
    pub fn similarities_asc(&self, o: ObjectId) -> &[(ObjectId, f64)] {
        &self.by_similarity[o.0]
    }

    /// Objects closest to `o` (descending mean of similarity and agreement).
    ///
    /// Only objects with a positive composite score are listed.
    pub fn neighbors(&self, o: ObjectId) -> &[ObjectId] {
        &self.neighbors[o.0]
    }

    /// Mean relation of `o` to `members`, skipping `o` itself.
    ///
    /// Returns all zeros when no other member exists.
    pub fn affinity(&self, o: ObjectId, members: &[ObjectId]) -> Affinity {
        let mut acc = Affinity::default();
        let mut count = 0usize;
        for &m in members {
            if m == o {
                continue;
            }
            acc.similarity += self.similarity(o, m);
            acc.agreement += self.agreement(o, m);
            acc.disagreement += self.disagreement(o, m);
            count += 1;
        }
        if count > 0 {
            let c = count as f64;
            acc.similarity /= c;
            acc.agreement /= c;
            acc.disagreement /= c;
        }
        acc
    }
}

/// Catalog where only the `from -> to` direction carries a low similarity
/// and a disagreement; every other pair is fully similar.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct OneWay {
    pub(crate) n: usize,
    pub(crate) from: usize,
    pub(crate) to: usize,
    pub(crate) similarity: f64,
    pub(crate) disagreement: f64,
}

#[cfg(test)]
impl ObjectCatalog for OneWay {
    fn len(&self) -> usize {
        self.n
    }
    fn parent_id(&self, _: ObjectId) -> Option<u64> {
        None
    }
    fn is_social(&self, _: ObjectId) -> bool {
        false
    }
    fn similarity(&self, a: ObjectId, b: ObjectId) -> f64 {
        if (a.0, b.0) == (self.from, self.to) {
            self.similarity
        } else {
            1.0
        }
    }
    fn agreement(&self, _: ObjectId, _: ObjectId) -> f64 {
        0.0
    }
    fn disagreement(&self, a: ObjectId, b: ObjectId) -> f64 {
        if (a.0, b.0) == (self.from, self.to) {
            self.disagreement
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MatrixCatalog;

    fn sample() -> RelationTables {
        let catalog = MatrixCatalog::new(4)
            .with_similarity(0, 1, 0.9)
            .with_similarity(0, 2, 0.1)
            .with_similarity(0, 3, 0.5)
            .with_agreement(0, 3, 0.5)
            .with_disagreement(0, 2, 0.8)
            .with_disagreement(0, 1, 0.3)
            .with_parent(1, 7)
            .with_parent(2, 7);
        RelationTables::from_catalog(&catalog)
    }

    #[test]
    fn test_sorted_lists() {
        let t = sample();
        let dis: Vec<usize> = t.disagreements_desc(ObjectId(0)).iter().map(|e| e.0 .0).collect();
        assert_eq!(dis, vec![2, 1, 3]);

        let sim: Vec<usize> = t.similarities_asc(ObjectId(0)).iter().map(|e| e.0 .0).collect();
        assert_eq!(sim, vec![2, 3, 1]);
    }

    #[test]
    fn test_neighbors_by_composite() {
        let t = sample();
        // composites: 1 -> 0.45, 2 -> 0.05, 3 -> 0.5
        assert_eq!(t.neighbors(ObjectId(0)), &[ObjectId(3), ObjectId(1), ObjectId(2)]);
        // object 1 only relates to 0
        assert_eq!(t.neighbors(ObjectId(1)), &[ObjectId(0)]);
    }

    #[test]
    fn test_same_parent() {
        let t = sample();
        assert!(t.same_parent(ObjectId(1), ObjectId(2)));
        assert!(!t.same_parent(ObjectId(0), ObjectId(1)));
        assert!(!t.same_parent(ObjectId(0), ObjectId(3)));
    }

    #[test]
    fn test_sorted_lists_take_worst_direction() {
        let catalog = OneWay {
            n: 3,
            from: 1,
            to: 0,
            similarity: 0.2,
            disagreement: 0.9,
        };
        let t = RelationTables::from_catalog(&catalog);

        // directional values are kept for scoring
        assert_eq!(t.disagreement(ObjectId(0), ObjectId(1)), 0.0);
        assert_eq!(t.disagreement(ObjectId(1), ObjectId(0)), 0.9);

        // both objects see the pair at its worst
        assert_eq!(t.disagreements_desc(ObjectId(0))[0], (ObjectId(1), 0.9));
        assert_eq!(t.disagreements_desc(ObjectId(1))[0], (ObjectId(0), 0.9));
        assert_eq!(t.similarities_asc(ObjectId(0))[0], (ObjectId(1), 0.2));
        assert_eq!(t.similarities_asc(ObjectId(1))[0], (ObjectId(0), 0.2));
    }

    #[test]
    fn test_nan_becomes_zero() {
        let catalog = MatrixCatalog::new(2)
            .with_similarity(0, 1, f64::NAN)
            .with_disagreement(0, 1, f64::INFINITY);
        let t = RelationTables::from_catalog(&catalog);
        assert_eq!(t.similarity(ObjectId(0), ObjectId(1)), 0.0);
        assert_eq!(t.disagreement(ObjectId(1), ObjectId(0)), 0.0);
        assert!(t.neighbors(ObjectId(0)).is_empty());
    }

    #[test]
    fn test_affinity_skips_self() {
        let t = sample();
        let a = t.affinity(ObjectId(0), &[ObjectId(0), ObjectId(1), ObjectId(3)]);
        assert!((a.similarity - 0.7).abs() < 1e-12);
        assert!((a.agreement - 0.25).abs() < 1e-12);
        assert!((a.disagreement - 0.15).abs() < 1e-12);

        let empty = t.affinity(ObjectId(0), &[ObjectId(0)]);
        assert_eq!(empty, Affinity::default());
    }
}

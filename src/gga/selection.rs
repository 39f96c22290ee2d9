//! Parent selection.
//!
//! Selection works on the net outranking scores (`Fi`) produced by the
//! PROMETHEE ranking of the population, so a higher score is better.
//! `Fi` lies in `[-1, 1]` and may be negative.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"

use rand::Rng;

/// Selection strategy for choosing parents.
///
/// All strategies assume **maximization** (higher score = better).
///
/// # Examples
///
/// ```
/// use u_grouping::gga::Selection;
///
/// let sel = Selection::Tournament(3);
/// let mut rng = u_grouping::random::create_rng(1);
/// let idx = sel.select(&[0.2, -0.4, 0.9], &mut rng);
/// assert!(idx < 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Tournament selection: pick `k` chromosomes at random, keep the best.
    ///
    /// Higher `k` = stronger selection pressure.
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Score-proportionate (roulette wheel) selection.
    ///
    /// Scores are shifted by the population minimum so the worst
    /// chromosome keeps a small positive weight.
    ///
    /// # Complexity
    /// O(n) per selection
    Roulette,

    /// Linear rank selection: weight `n - rank`, best rank 0.
    ///
    /// # Complexity
    /// O(n log n) per selection
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament(3)
    }
}

impl Selection {
    /// Selects an index into `scores`.
    ///
    /// # Panics
    /// Panics if `scores` is empty.
    pub fn select<R: Rng + ?Sized>(&self, scores: &[f64], rng: &mut R) -> usize {
        assert!(!scores.is_empty(), "cannot select from empty population");

        match self {
            Selection::Tournament(k) => tournament(scores, *k, rng),
            Selection::Roulette => roulette(scores, rng),
            Selection::Rank => rank(scores, rng),
        }
    }
}

fn tournament<R: Rng + ?Sized>(scores: &[f64], k: usize, rng: &mut R) -> usize {
    let n = scores.len();
    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k.max(1) {
        let idx = rng.random_range(0..n);
        if scores[idx] > scores[best_idx] {
            best_idx = idx;
        }
    }
    best_idx
}

/// weight_i = score_i - min_score + epsilon
fn roulette<R: Rng + ?Sized>(scores: &[f64], rng: &mut R) -> usize {
    let n = scores.len();
    if n == 1 {
        return 0;
    }

    let min_score = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let epsilon = 1e-10;
    let weights: Vec<f64> = scores
        .iter()
        .map(|&s| (s - min_score + epsilon).max(epsilon))
        .collect();

    let total: f64 = weights.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return rng.random_range(0..n);
    }

    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative > threshold {
            return i;
        }
    }

    n - 1 // floating-point fallback
}

fn rank<R: Rng + ?Sized>(scores: &[f64], rng: &mut R) -> usize {
    let n = scores.len();
    if n == 1 {
        return 0;
    }

    // best first
    let mut indexed: Vec<usize> = (0..n).collect();
    indexed.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let total = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (rank, &idx) in indexed.iter().enumerate() {
        cumulative += (n - rank) as f64;
        if cumulative > threshold {
            return idx;
        }
    }

    indexed[n - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn counts(sel: Selection, scores: &[f64], draws: u32) -> Vec<u32> {
        let mut rng = create_rng(42);
        let mut counts = vec![0u32; scores.len()];
        for _ in 0..draws {
            counts[sel.select(scores, &mut rng)] += 1;
        }
        counts
    }

    #[test]
    fn test_tournament_favors_best() {
        let c = counts(Selection::Tournament(4), &[-0.5, 0.1, 0.8, 0.0], 10_000);
        assert!(c[2] > 6000, "expected best to dominate, got {c:?}");
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let c = counts(Selection::Tournament(1), &[-0.5, 0.1, 0.8, 0.0], 10_000);
        for &n in &c {
            assert!(n > 1500, "expected uniform, got counts: {c:?}");
        }
    }

    #[test]
    fn test_roulette_favors_best() {
        let c = counts(Selection::Roulette, &[-0.9, 0.0, 0.9, 0.3], 10_000);
        assert!(c[2] > c[1], "best={}, middle={}", c[2], c[1]);
        assert!(c[0] < 100, "worst should be almost never drawn: {c:?}");
    }

    #[test]
    fn test_rank_favors_best() {
        let c = counts(Selection::Rank, &[-0.9, 0.0, 0.9, 0.3], 10_000);
        assert!(c[2] > c[0], "best={}, worst={}", c[2], c[0]);
    }

    #[test]
    fn test_single_chromosome() {
        let mut rng = create_rng(42);
        assert_eq!(Selection::Tournament(3).select(&[0.5], &mut rng), 0);
        assert_eq!(Selection::Roulette.select(&[0.5], &mut rng), 0);
        assert_eq!(Selection::Rank.select(&[0.5], &mut rng), 0);
    }

    #[test]
    fn test_equal_scores_roughly_uniform() {
        for sel in [Selection::Tournament(2), Selection::Roulette] {
            let c = counts(sel, &[0.0; 4], 10_000);
            for &n in &c {
                assert!(n > 1500, "{sel:?}: expected roughly uniform, got {c:?}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let mut rng = create_rng(42);
        Selection::Tournament(3).select(&[], &mut rng);
    }
}

//! PROMETHEE II ranking kernel.

use super::criterion::Criterion;
use crate::error::{OptimizationError, Result};

/// An alternative submitted to the kernel.
///
/// Holds one raw value per criterion. Flows are filled in by
/// [`PrometheeKernel::compute`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    id: usize,
    values: Vec<f64>,
    scaled: Vec<f64>,
    flows: Vec<f64>,
    fi: f64,
}

impl Solution {
    /// Caller-supplied identifier.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Raw criterion values, in criterion order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Per-criterion net flows (valid after `compute`).
    pub fn flows(&self) -> &[f64] {
        &self.flows
    }

    /// Weighted net flow (valid after `compute`).
    pub fn fi(&self) -> f64 {
        self.fi
    }
}

/// Multi-criteria outranking engine.
///
/// Solutions are compared pairwise on every criterion. For a solution `s`
/// and a criterion `c`, the net flow is
///
/// ```text
/// phi_c(s) = sum_{t != s} (P_c(s, t) - P_c(t, s)) / (N - 1)
/// ```
///
/// and the overall score is the weight-normalized average
/// `Fi(s) = sum_c w_c * phi_c(s) / sum_c w_c`.
///
/// # Examples
///
/// ```
/// use u_grouping::promethee::{Criterion, CriterionKind, PrometheeKernel};
///
/// let mut kernel = PrometheeKernel::new(false);
/// kernel.add_criterion(Criterion::new("gain", CriterionKind::Maximize, 0.0, 0.0, 1.0).unwrap());
/// kernel.add_criterion(Criterion::new("cost", CriterionKind::Minimize, 0.0, 0.0, 1.0).unwrap());
///
/// kernel.add_solution(0, &[1.0, 5.0]).unwrap();
/// kernel.add_solution(1, &[3.0, 2.0]).unwrap();
/// kernel.compute();
///
/// assert_eq!(kernel.best_solution().map(|s| s.id()), Some(1));
/// ```
///
/// # Complexity
/// `compute` is O(N² · C) for N solutions and C criteria.
///
/// # References
///
/// Brans, Vincke & Mareschal (1986), "How to select and how to rank
/// projects: The PROMETHEE method"
#[derive(Debug, Clone, Default)]
pub struct PrometheeKernel {
    criteria: Vec<Criterion>,
    solutions: Vec<Solution>,
    normalize: bool,
    computed: bool,
}

impl PrometheeKernel {
    /// Creates an empty kernel. With `normalize`, raw values are min-max
    /// scaled per criterion before preferences are computed.
    pub fn new(normalize: bool) -> Self {
        Self {
            criteria: Vec::new(),
            solutions: Vec::new(),
            normalize,
            computed: false,
        }
    }

    /// Creates a kernel with the given criteria.
    pub fn with_criteria(criteria: Vec<Criterion>, normalize: bool) -> Self {
        Self {
            criteria,
            solutions: Vec::new(),
            normalize,
            computed: false,
        }
    }

    /// Appends a criterion. Existing solutions are discarded.
    pub fn add_criterion(&mut self, criterion: Criterion) {
        self.criteria.push(criterion);
        self.clear_solutions();
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_normalized(&self) -> bool {
        self.normalize
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
        self.computed = false;
    }

    /// Removes all solutions, keeping the criteria.
    pub fn clear_solutions(&mut self) {
        self.solutions.clear();
        self.computed = false;
    }

    /// Adds a solution. Non-finite raw values are treated as 0.
    ///
    /// Returns the insertion index.
    ///
    /// # Errors
    /// [`OptimizationError::CriterionCountMismatch`] if `values.len()`
    /// differs from the number of criteria.
    pub fn add_solution(&mut self, id: usize, values: &[f64]) -> Result<usize> {
        if values.len() != self.criteria.len() {
            return Err(OptimizationError::CriterionCountMismatch {
                expected: self.criteria.len(),
                actual: values.len(),
            });
        }
        let values: Vec<f64> = values
            .iter()
            .map(|&v| if v.is_finite() { v } else { 0.0 })
            .collect();
        self.solutions.push(Solution {
            id,
            scaled: values.clone(),
            values,
            flows: vec![0.0; self.criteria.len()],
            fi: 0.0,
        });
        self.computed = false;
        Ok(self.solutions.len() - 1)
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Computes per-criterion net flows and `Fi` for every solution.
    pub fn compute(&mut self) {
        if self.normalize {
            self.normalize_values();
        } else {
            for s in &mut self.solutions {
                s.scaled.clone_from(&s.values);
            }
        }

        let n = self.solutions.len();
        let total_weight: f64 = self.criteria.iter().map(Criterion::weight).sum();

        for i in 0..n {
            let mut fi = 0.0;
            for (c_idx, criterion) in self.criteria.iter().enumerate() {
                let flow = if n > 1 {
                    let u = self.solutions[i].scaled[c_idx];
                    let sum: f64 = self
                        .solutions
                        .iter()
                        .enumerate()
                        .filter(|&(j, _)| j != i)
                        .map(|(_, t)| {
                            let v = t.scaled[c_idx];
                            criterion.preference(u, v) - criterion.preference(v, u)
                        })
                        .sum();
                    sum / (n - 1) as f64
                } else {
                    0.0
                };
                self.solutions[i].flows[c_idx] = flow;
                fi += criterion.weight() * flow;
            }
            self.solutions[i].fi = if total_weight > 0.0 {
                fi / total_weight
            } else {
                0.0
            };
        }

        self.computed = true;
    }

    fn normalize_values(&mut self) {
        for c_idx in 0..self.criteria.len() {
            let (min, max) = self.solutions.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), s| (lo.min(s.values[c_idx]), hi.max(s.values[c_idx])),
            );
            let range = max - min;
            for s in &mut self.solutions {
                s.scaled[c_idx] = if range > 0.0 {
                    (s.values[c_idx] - min) / range
                } else {
                    0.0
                };
            }
        }
    }

    fn ensure_computed(&mut self) {
        if !self.computed {
            self.compute();
        }
    }

    /// Net flow of the solution at `index` on criterion `criterion`.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn net_flow(&mut self, index: usize, criterion: usize) -> f64 {
        self.ensure_computed();
        self.solutions[index].flows[criterion]
    }

    /// Weighted net flow of the solution at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn fi(&mut self, index: usize) -> f64 {
        self.ensure_computed();
        self.solutions[index].fi
    }

    /// All `Fi` values in insertion order.
    pub fn scores(&mut self) -> Vec<f64> {
        self.ensure_computed();
        self.solutions.iter().map(Solution::fi).collect()
    }

    /// Index of the solution with the highest `Fi`.
    ///
    /// Ties go to the earliest inserted solution. `None` when empty.
    pub fn best_index(&mut self) -> Option<usize> {
        self.ensure_computed();
        let mut best: Option<usize> = None;
        for (i, s) in self.solutions.iter().enumerate() {
            let better = match best {
                Some(b) => s.fi > self.solutions[b].fi,
                None => true,
            };
            if better {
                best = Some(i);
            }
        }
        best
    }

    /// The solution with the highest `Fi` (earliest on ties).
    pub fn best_solution(&mut self) -> Option<&Solution> {
        let idx = self.best_index()?;
        Some(&self.solutions[idx])
    }

    /// Solution indices ordered by descending `Fi`, insertion order on ties.
    pub fn ranking(&mut self) -> Vec<usize> {
        self.ensure_computed();
        let mut order: Vec<usize> = (0..self.solutions.len()).collect();
        order.sort_by(|&a, &b| self.solutions[b].fi.total_cmp(&self.solutions[a].fi));
        order
    }
}

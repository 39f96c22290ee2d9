//! PROMETHEE criteria and the linear preference function.

use crate::error::{OptimizationError, Result};

/// Direction of a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CriterionKind {
    /// Higher raw values are preferred.
    Maximize,
    /// Lower raw values are preferred.
    Minimize,
}

/// A criterion with a linear preference function and an indifference zone.
///
/// `q` is the indifference threshold: differences up to `q` give no
/// preference. `p` is the strict-preference threshold: differences above
/// `p` give full preference. Between the two, preference grows linearly.
///
/// # References
///
/// Brans & Vincke (1985), "A Preference Ranking Organisation Method",
/// criterion of type V (linear with indifference area).
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    label: String,
    kind: CriterionKind,
    p: f64,
    q: f64,
    weight: f64,
}

impl Criterion {
    /// Creates a criterion.
    ///
    /// # Errors
    ///
    /// - [`OptimizationError::InvalidThreshold`] if `p < q`, or either
    ///   threshold is negative or not finite
    /// - [`OptimizationError::InvalidWeight`] if `weight` is not a finite
    ///   positive number
    ///
    /// # Examples
    ///
    /// ```
    /// use u_grouping::promethee::{Criterion, CriterionKind};
    ///
    /// let c = Criterion::new("similarity", CriterionKind::Maximize, 0.5, 0.2, 1.0).unwrap();
    /// assert_eq!(c.preference(0.8, 0.2), 1.0);
    /// assert!(Criterion::new("bad", CriterionKind::Maximize, 0.1, 0.2, 1.0).is_err());
    /// ```
    pub fn new(
        label: impl Into<String>,
        kind: CriterionKind,
        p: f64,
        q: f64,
        weight: f64,
    ) -> Result<Self> {
        let label = label.into();
        let thresholds_ok = p.is_finite() && q.is_finite() && q >= 0.0 && p >= q;
        if !thresholds_ok {
            return Err(OptimizationError::InvalidThreshold { label, p, q });
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(OptimizationError::InvalidWeight { label, weight });
        }
        Ok(Self {
            label,
            kind,
            p,
            q,
            weight,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> CriterionKind {
        self.kind
    }

    /// Strict-preference threshold.
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Indifference threshold.
    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Degree in `[0, 1]` to which value `u` is preferred over value `v`.
    pub fn preference(&self, u: f64, v: f64) -> f64 {
        let d = match self.kind {
            CriterionKind::Maximize => u - v,
            CriterionKind::Minimize => v - u,
        };
        if self.p == self.q {
            return if d > self.p { 1.0 } else { 0.0 };
        }
        if d <= self.q {
            0.0
        } else if d > self.p {
            1.0
        } else {
            (d - self.q) / (self.p - self.q)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_criterion() -> Criterion {
        Criterion::new("c", CriterionKind::Maximize, 0.5, 0.2, 1.0).unwrap()
    }

    #[test]
    fn test_linear_preference_maximize() {
        let c = max_criterion();
        assert_eq!(c.preference(0.0, 0.35), 0.0);
        assert_eq!(c.preference(0.8, 0.2), 1.0);
        assert!((c.preference(0.4, 0.1) - 1.0 / 3.0).abs() < 1e-12);
        // exactly at q: indifferent
        assert_eq!(c.preference(0.2, 0.0), 0.0);
        // exactly at p: still on the ramp
        assert!((c.preference(0.5, 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_preference_minimize_mirrors() {
        let c = Criterion::new("c", CriterionKind::Minimize, 0.5, 0.2, 1.0).unwrap();
        assert_eq!(c.preference(0.2, 0.8), 1.0);
        assert_eq!(c.preference(0.35, 0.0), 0.0);
        assert!((c.preference(0.1, 0.4) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(c.preference(0.8, 0.2), 0.0);
    }

    #[test]
    fn test_step_preference_when_p_equals_q() {
        let c = Criterion::new("c", CriterionKind::Maximize, 0.1, 0.1, 1.0).unwrap();
        assert_eq!(c.preference(0.3, 0.1), 1.0);
        assert_eq!(c.preference(0.2, 0.1), 0.0);

        let usual = Criterion::new("u", CriterionKind::Minimize, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(usual.preference(0.1, 0.2), 1.0);
        assert_eq!(usual.preference(0.2, 0.2), 0.0);
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        let err = Criterion::new("x", CriterionKind::Maximize, 0.1, 0.2, 1.0).unwrap_err();
        assert!(matches!(err, OptimizationError::InvalidThreshold { .. }));

        assert!(Criterion::new("x", CriterionKind::Maximize, 0.2, -0.1, 1.0).is_err());
        assert!(Criterion::new("x", CriterionKind::Maximize, f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_rejects_bad_weight() {
        let err = Criterion::new("x", CriterionKind::Maximize, 0.2, 0.1, 0.0).unwrap_err();
        assert!(matches!(err, OptimizationError::InvalidWeight { .. }));
        assert!(Criterion::new("x", CriterionKind::Maximize, 0.2, 0.1, -1.0).is_err());
    }
}

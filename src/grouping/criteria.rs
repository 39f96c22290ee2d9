//! The three grouping criteria and their PROMETHEE parameters.

use crate::error::Result;
use crate::promethee::{Criterion, CriterionKind};

/// Thresholds and weight of one criterion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriterionParams {
    /// Strict-preference threshold.
    pub p: f64,
    /// Indifference threshold.
    pub q: f64,
    /// Relative importance (> 0).
    pub weight: f64,
}

impl CriterionParams {
    pub fn new(p: f64, q: f64, weight: f64) -> Self {
        Self { p, q, weight }
    }
}

impl Default for CriterionParams {
    fn default() -> Self {
        Self {
            p: 0.2,
            q: 0.05,
            weight: 1.0,
        }
    }
}

/// Parameters of the similarity (max), agreement (max) and disagreement
/// (min) criteria, in that order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriteriaParams {
    pub similarity: CriterionParams,
    pub agreement: CriterionParams,
    pub disagreement: CriterionParams,
}

impl CriteriaParams {
    /// Builds the criteria in the order `[similarity, agreement, disagreement]`.
    ///
    /// # Errors
    /// Propagates threshold and weight validation from [`Criterion::new`].
    pub fn build(&self) -> Result<Vec<Criterion>> {
        let s = self.similarity;
        let a = self.agreement;
        let d = self.disagreement;
        Ok(vec![
            Criterion::new("similarity", CriterionKind::Maximize, s.p, s.q, s.weight)?,
            Criterion::new("agreement", CriterionKind::Maximize, a.p, a.q, a.weight)?,
            Criterion::new("disagreement", CriterionKind::Minimize, d.p, d.q, d.weight)?,
        ])
    }
}

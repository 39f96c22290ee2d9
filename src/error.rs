//! Error taxonomy for the grouping engine.
//!
//! Every fatal condition surfaces as an [`OptimizationError`]. Validation
//! errors are reported before any generation runs; construction errors
//! abort the current run and no partial partition is returned.

use crate::catalog::ObjectId;
use crate::grouping::GroupId;

/// Errors produced while configuring or running a grouping optimization.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizationError {
    /// A criterion was declared with `p < q` or a negative/non-finite threshold.
    #[error("invalid thresholds for criterion `{label}`: p={p}, q={q} (need p >= q >= 0)")]
    InvalidThreshold { label: String, p: f64, q: f64 },

    /// A criterion was declared with a non-positive or non-finite weight.
    #[error("invalid weight for criterion `{label}`: {weight} (need weight > 0)")]
    InvalidWeight { label: String, weight: f64 },

    /// The group pool reached its hard capacity.
    #[error("group pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    /// A group was released while it still had members.
    #[error("cannot release group {group}: it still holds {members} member(s)")]
    NonEmptyGroupRelease { group: GroupId, members: usize },

    /// No existing or freshly reserved group accepts the object.
    #[error("no admissible group for object {object}: constraints too strict")]
    NoAdmissibleGroup { object: ObjectId },

    /// The object is already a member of a group.
    #[error("object {object} is already assigned to group {group}")]
    AlreadyAssigned { object: ObjectId, group: GroupId },

    /// The group id does not refer to a reserved group.
    #[error("group {group} is not reserved")]
    UnknownGroup { group: GroupId },

    /// A solution was submitted with the wrong number of criterion values.
    #[error("expected {expected} criterion value(s), got {actual}")]
    CriterionCountMismatch { expected: usize, actual: usize },

    /// A partition breaks coverage, capacity or a pairwise constraint.
    #[error("constraint violated: {0}")]
    ConstraintViolation(String),

    /// The configuration was rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

impl From<rayon::ThreadPoolBuildError> for OptimizationError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        OptimizationError::WorkerPool(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OptimizationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = OptimizationError::NoAdmissibleGroup {
            object: ObjectId(4),
        };
        assert_eq!(
            err.to_string(),
            "no admissible group for object #4: constraints too strict"
        );

        let err = OptimizationError::InvalidThreshold {
            label: "similarity".into(),
            p: 0.1,
            q: 0.2,
        };
        assert!(err.to_string().contains("similarity"));
    }

    #[test]
    fn test_release_error_reports_member_count() {
        let err = OptimizationError::NonEmptyGroupRelease {
            group: GroupId(2),
            members: 3,
        };
        assert_eq!(
            err.to_string(),
            "cannot release group G2: it still holds 3 member(s)"
        );
    }
}

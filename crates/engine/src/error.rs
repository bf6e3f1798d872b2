use domain::DomainError;
use thiserror::Error;

/// Error taxonomy of the engine.
///
/// Nothing is logged-and-swallowed: every failure surfaces to the caller as
/// one of these variants. Database errors propagate without retry; an audit
/// write failure aborts the enclosing operation because the entity write and
/// the audit append share one transaction.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<validator::ValidationError> for EngineError {
    fn from(err: validator::ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
        EngineError::Validation(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_carries_message() {
        let mut err = validator::ValidationError::new("interval_bounds");
        err.message = Some("Interval end must be after its start".into());

        let engine_err: EngineError = err.into();
        assert_eq!(
            engine_err.to_string(),
            "Validation error: Interval end must be after its start"
        );
    }

    #[test]
    fn test_validation_error_falls_back_to_code() {
        let err = validator::ValidationError::new("period_bounds");
        let engine_err: EngineError = err.into();
        assert!(engine_err.to_string().contains("period_bounds"));
    }

    #[test]
    fn test_domain_error_is_transparent() {
        let err = DomainError::InvalidLeaveTransition {
            from: "approved".to_string(),
            to: "rejected".to_string(),
        };
        let engine_err: EngineError = err.into();
        assert_eq!(
            engine_err.to_string(),
            "Invalid leave status transition from approved to rejected"
        );
    }
}

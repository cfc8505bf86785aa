use thiserror::Error;

/// Failure taxonomy for tracker operations.
///
/// Callers branch on the variant: validation errors are user-fixable,
/// remote errors are retryable, parse errors mean the payload (backup file
/// or estimation reply) is unusable as-is.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Persistence(String),

    /// The estimation service could not be reached or refused the request.
    /// Retryable.
    #[error("{0}")]
    Remote(String),

    #[error("{0}")]
    Parse(String),
}

impl TrackerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_passes_message_through() {
        let e = TrackerError::validation("Age must be between 1 and 150");
        assert_eq!(e.to_string(), "Age must be between 1 and 150");
    }

    #[test]
    fn test_persistence_prefix() {
        let e = TrackerError::Persistence("disk full".to_string());
        assert_eq!(e.to_string(), "storage error: disk full");
    }
}

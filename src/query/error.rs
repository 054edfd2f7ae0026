use thiserror::Error;

/// Error type for query and mutation operations.
///
/// Errors are `Clone` because a single failed fetch is delivered to every
/// subscriber of the cache entry it settled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Transport failure, or a non-success status with no more specific meaning.
    #[error("Network error: {0}")]
    Network(String),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected the submitted payload.
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// The kind of a [`QueryError`], without its detail message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    NotFound,
    Validation,
}

impl QueryError {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Returns `true` if the resource was absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_display() {
        let err = QueryError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");

        let err = QueryError::NotFound("/blogs/7".to_string());
        assert_eq!(err.to_string(), "Not found: /blogs/7");

        let err = QueryError::Validation("title is required".to_string());
        assert_eq!(err.to_string(), "Validation failed: title is required");
    }

    #[test]
    fn test_kind() {
        assert_eq!(QueryError::Network(String::new()).kind(), ErrorKind::Network);
        assert_eq!(QueryError::NotFound(String::new()).kind(), ErrorKind::NotFound);
        assert_eq!(
            QueryError::Validation(String::new()).kind(),
            ErrorKind::Validation
        );
        assert!(QueryError::NotFound(String::new()).is_not_found());
        assert!(!QueryError::Network(String::new()).is_not_found());
    }
}

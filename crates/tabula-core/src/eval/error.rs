//! Evaluation error types.

use std::any::Any;

use thiserror::Error;

/// An error raised by a predicate or property implementation.
///
/// The evaluator never propagates these: a failing node is logged and
/// evaluates to an absent result for that row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
}

/// Why an implementation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    /// An argument had the right shape but an unusable value (e.g. an
    /// invalid regex).
    #[error("invalid argument")]
    InvalidArgument,
    /// The implementation panicked.
    #[error("panicked")]
    Panicked,
    #[error("internal error")]
    Internal,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::InvalidArgument, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Internal, message)
    }

    /// Wrap the payload of a caught panic.
    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => payload
                .downcast_ref::<&str>()
                .map_or_else(|| "unknown panic".to_string(), |s| s.to_string()),
        };
        Self::new(EvalErrorKind::Panicked, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = EvalError::invalid_argument("invalid pattern: (");
        assert_eq!(err.to_string(), "invalid argument: invalid pattern: (");
    }

    #[test]
    fn test_panic_payloads() {
        let err = EvalError::panicked(Box::new("static message"));
        assert_eq!(err.kind, EvalErrorKind::Panicked);
        assert_eq!(err.message, "static message");

        let err = EvalError::panicked(Box::new(format!("index {}", 3)));
        assert_eq!(err.message, "index 3");

        let err = EvalError::panicked(Box::new(42));
        assert_eq!(err.message, "unknown panic");
    }
}

//! Error types for the spec engine
//!
//! Assertion failures and aborts are not errors here: they are recorded in
//! the spec's context and surface only through its verdict. `EngineError`
//! covers misuse of the engine and scheduler faults.

use thiserror::Error;

/// Result type alias using the engine's error type.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for the spec engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A context-dependent operation ran with no spec bound to the thread
    #[error("call to {operation}() from outside the scope of a SPEC")]
    NoBoundContext { operation: &'static str },

    /// `bind` was called while a context was already bound
    #[error("cannot bind SPEC '{requested}': context already bound to '{current}'")]
    AlreadyBound { requested: String, current: String },

    /// The context was finalized and no longer accepts mutation
    #[error("call to {operation}() after the SPEC was finalized")]
    Sealed { operation: &'static str },

    /// A spec task could not be joined
    #[error("Join error: {0}")]
    Join(String),

    /// Scheduler failure (semaphore closed, runtime unavailable)
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl EngineError {
    /// Usage errors stay with the spec that caused them; other errors abort
    /// the bundle run.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            EngineError::NoBoundContext { .. }
                | EngineError::AlreadyBound { .. }
                | EngineError::Sealed { .. }
        )
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        EngineError::Join(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_classification() {
        assert!(EngineError::NoBoundContext { operation: "log" }.is_usage());
        assert!(EngineError::Sealed { operation: "assert" }.is_usage());
        assert!(!EngineError::Scheduler("closed".into()).is_usage());
        assert!(!EngineError::Join("cancelled".into()).is_usage());
    }

    #[test]
    fn test_messages() {
        let err = EngineError::NoBoundContext {
            operation: "get_userdata",
        };
        assert_eq!(
            err.to_string(),
            "call to get_userdata() from outside the scope of a SPEC"
        );

        let err = EngineError::AlreadyBound {
            requested: "b".into(),
            current: "a".into(),
        };
        assert!(err.to_string().contains("already bound to 'a'"));
    }
}

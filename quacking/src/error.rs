//! Errors raised while mixing, matching and dispatching.

use thiserror::Error;

/// Errors that can occur while composing or invoking a mixin.
#[derive(Debug, Error)]
pub enum QuackError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("producer `{producer}` returned null; a mixed instance cannot be null")]
    UnsatisfiedProducer { producer: String },

    #[error(
        "the mixin does not support the method `{method}` ({signature}); the implementing method \
         must be public and accept compatible arguments"
    )]
    UnsupportedDispatch { method: String, signature: String },

    #[error("failed to invoke method {signature} on {target}: the method is not accessible")]
    InaccessibleMember {
        signature: String,
        target: String,
        #[source]
        reason: AccessViolation,
    },

    #[error("method {signature} returned null where a `{expected}` was expected")]
    NullUnboxing { signature: String, expected: String },

    #[error("method {method} returned `{found}` where a `{expected}` was expected")]
    UnexpectedReturn {
        method: String,
        expected: String,
        found: String,
    },

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    User(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Why a method cannot be invoked from outside its owner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessViolation {
    #[error("method `{0}` is private")]
    PrivateMethod(String),

    #[error("`{0}` is not public")]
    PrivateOwner(String),
}

impl QuackError {
    /// Raises a plain user error, as a method body would throw one.
    pub fn raise(message: impl Into<String>) -> Self {
        let message: String = message.into();
        QuackError::User(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        QuackError::InvalidArgument(message.into())
    }

    /// Whether this error was raised by user code rather than the dispatcher.
    pub fn is_user(&self) -> bool {
        matches!(self, QuackError::User(_))
    }
}

/// Result type used throughout the crate.
pub type QuackResult<T> = Result<T, QuackError>;

use thiserror::Error;

/// Represents the ways an asynchronous operation can fail.
///
/// Whatever error type the wrapped operation produces is flattened into its
/// message, so the failure can be stored in an [`AsyncState`](crate::AsyncState)
/// snapshot and cloned to every observer. Operations that already fail with
/// an `AsyncError` keep their variant.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AsyncError {
    /// The operation failed with a message describing what went wrong.
    #[error("{0}")]
    Error(String),

    /// The operation returned None when a value was expected.
    #[error("Operation returned None!")]
    None,

    /// The operation panicked, either while being invoked or while running.
    #[error("Operation panicked: {0}")]
    Panicked(String),
}

impl AsyncError {
    /// Builds an [`AsyncError::Error`] from anything printable.
    pub fn message(message: impl Into<String>) -> Self {
        AsyncError::Error(message.into())
    }

    /// Returns true if this error represents a None result.
    pub fn is_none(&self) -> bool {
        matches!(self, AsyncError::None)
    }

    /// Returns true if this error is a general error with a message.
    pub fn is_error(&self) -> bool {
        matches!(self, AsyncError::Error { .. })
    }

    /// Returns true if the operation panicked.
    pub fn is_panicked(&self) -> bool {
        matches!(self, AsyncError::Panicked(_))
    }

    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        AsyncError::Panicked(message)
    }
}

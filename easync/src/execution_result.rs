use crate::AsyncError;
use std::any::Any;
use std::fmt::Display;

/// Converts whatever an operation resolves to into the outcome a controller
/// records.
///
/// Error types are flattened to their `Display` text, so operations can fail
/// with `reqwest::Error`, `String`, `&str` or any other printable error. An
/// [`AsyncError`] is kept as it is.
pub trait ExecutionResult<T: Clone> {
    fn into_outcome(self) -> Result<T, AsyncError>;
}

impl<T: Clone, E> ExecutionResult<T> for Result<T, E>
where
    E: Display + 'static,
{
    fn into_outcome(self) -> Result<T, AsyncError> {
        self.map_err(|error| match (&error as &dyn Any).downcast_ref::<AsyncError>() {
            Some(error) => error.clone(),
            None => AsyncError::Error(error.to_string()),
        })
    }
}

impl<T: Clone> ExecutionResult<T> for Option<T> {
    fn into_outcome(self) -> Result<T, AsyncError> {
        self.ok_or(AsyncError::None)
    }
}

use crate::{AsyncError, AsyncOptions, Output};
use std::fmt::{Display, Formatter};

/// Where an operation is in its lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AsyncStatus {
    #[default]
    NotRequested,
    Loading,
    Success,
    Error,
}

impl Display for AsyncStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AsyncStatus::NotRequested => "not-requested",
            AsyncStatus::Loading => "loading",
            AsyncStatus::Success => "success",
            AsyncStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// One snapshot of an operation's lifecycle.
///
/// Snapshots are never edited in place: every transition builds a new value
/// that replaces the previous one wholesale. When produced by the transition
/// functions, exactly one of `result`/`error` is present for a settled status
/// and both are absent otherwise. [`merge`](AsyncState::merge) does not uphold
/// this; see [`is_consistent`](AsyncState::is_consistent).
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AsyncState<T: Clone> {
    pub status: AsyncStatus,
    /// Mirror of `status == Loading`.
    pub loading: bool,
    pub result: Option<T>,
    pub error: Option<AsyncError>,
}

/// A partial update for [`AsyncState::merge`]. Fields left as `None` keep the
/// current value.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AsyncStatePatch<T: Clone> {
    pub status: Option<AsyncStatus>,
    pub loading: Option<bool>,
    pub result: Option<Option<T>>,
    pub error: Option<Option<AsyncError>>,
}

impl<T: Clone> Default for AsyncStatePatch<T> {
    fn default() -> Self {
        AsyncStatePatch {
            status: None,
            loading: None,
            result: None,
            error: None,
        }
    }
}

impl<T: Clone> AsyncStatePatch<T> {
    pub fn status(self, status: AsyncStatus) -> Self {
        Self {
            status: Some(status),
            ..self
        }
    }

    pub fn loading(self, loading: bool) -> Self {
        Self {
            loading: Some(loading),
            ..self
        }
    }

    pub fn result(self, result: Option<T>) -> Self {
        Self {
            result: Some(result),
            ..self
        }
    }

    pub fn error(self, error: Option<AsyncError>) -> Self {
        Self {
            error: Some(error),
            ..self
        }
    }
}

impl<T: Clone> AsyncState<T> {
    pub fn not_requested() -> Self {
        AsyncState {
            status: AsyncStatus::NotRequested,
            loading: false,
            result: None,
            error: None,
        }
    }

    pub fn loading() -> Self {
        AsyncState {
            status: AsyncStatus::Loading,
            loading: true,
            result: None,
            error: None,
        }
    }

    pub fn success(result: T) -> Self {
        AsyncState {
            status: AsyncStatus::Success,
            loading: false,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(error: AsyncError) -> Self {
        AsyncState {
            status: AsyncStatus::Error,
            loading: false,
            result: None,
            error: Some(error),
        }
    }

    pub fn error_with_message(message: impl Into<String>) -> Self {
        Self::error(AsyncError::Error(message.into()))
    }

    pub fn to_loading(&self) -> Self {
        Self::loading()
    }

    pub fn to_success(&self, result: T) -> Self {
        Self::success(result)
    }

    pub fn to_error(&self, error: AsyncError) -> Self {
        Self::error(error)
    }

    /// Overwrites every field the patch carries. No consistency checks are
    /// made, so a patch can leave `status` disagreeing with the other fields.
    pub fn merge(&self, patch: AsyncStatePatch<T>) -> Self {
        AsyncState {
            status: patch.status.unwrap_or(self.status),
            loading: patch.loading.unwrap_or(self.loading),
            result: patch.result.unwrap_or_else(|| self.result.clone()),
            error: patch.error.unwrap_or_else(|| self.error.clone()),
        }
    }

    /// Whether the fields agree with each other the way the transition
    /// functions leave them.
    pub fn is_consistent(&self) -> bool {
        if self.loading != (self.status == AsyncStatus::Loading) {
            return false;
        }
        match self.status {
            AsyncStatus::Success => self.result.is_some() && self.error.is_none(),
            AsyncStatus::Error => self.result.is_none() && self.error.is_some(),
            AsyncStatus::NotRequested | AsyncStatus::Loading => {
                self.result.is_none() && self.error.is_none()
            }
        }
    }

    pub fn is_not_requested(&self) -> bool {
        self.status == AsyncStatus::NotRequested
    }

    pub fn is_loading(&self) -> bool {
        self.status == AsyncStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == AsyncStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == AsyncStatus::Error
    }

    /// Settled, either way.
    pub fn is_complete(&self) -> bool {
        matches!(self.status, AsyncStatus::Success | AsyncStatus::Error)
    }

    pub fn result_ref(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn error_ref(&self) -> Option<&AsyncError> {
        self.error.as_ref()
    }
}

impl<T: Output> AsyncState<T> {
    /// The snapshot a controller starts from, and returns to on reset.
    ///
    /// A controller that runs on mount starts out loading, because its first
    /// operation is already pending by the time anyone can observe it.
    pub fn initial(options: &AsyncOptions<T>) -> Self {
        if options.execute_on_mount {
            Self::loading()
        } else {
            Self::not_requested()
        }
    }
}

impl<T: Clone> Default for AsyncState<T> {
    fn default() -> Self {
        AsyncState::not_requested()
    }
}

impl<T: Clone> From<Result<T, AsyncError>> for AsyncState<T> {
    fn from(value: Result<T, AsyncError>) -> Self {
        match value {
            Ok(result) => AsyncState::success(result),
            Err(error) => AsyncState::error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_requested() {
        let state: AsyncState<i32> = AsyncState::default();
        assert_eq!(state.status, AsyncStatus::NotRequested);
        assert!(!state.loading);
        assert!(!state.is_complete());
        assert!(state.result_ref().is_none());
        assert!(state.error_ref().is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_loading_discards_previous_outcome() {
        let success = AsyncState::success(7);
        let loading = success.to_loading();
        assert!(loading.is_loading());
        assert!(loading.loading);
        assert_eq!(loading.result, None);

        let failed: AsyncState<i32> = AsyncState::error_with_message("boom");
        let loading = failed.to_loading();
        assert_eq!(loading, AsyncState::loading());
        assert!(loading.is_consistent());
    }

    #[test]
    fn test_success() {
        let state = AsyncState::<i32>::loading().to_success(8);
        assert!(state.is_success());
        assert!(state.is_complete());
        assert!(!state.loading);
        assert_eq!(state.result_ref(), Some(&8));
        assert!(state.error.is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_error() {
        let state = AsyncState::success(8).to_error(AsyncError::message("Connection failed"));
        assert!(state.is_error());
        assert!(state.is_complete());
        assert_eq!(state.result, None);
        assert_eq!(
            state.error_ref(),
            Some(&AsyncError::Error("Connection failed".to_string()))
        );
        assert!(state.is_consistent());
    }

    #[test]
    fn test_initial_follows_execute_on_mount() {
        let on_mount = AsyncOptions::<i32>::default();
        assert_eq!(AsyncState::initial(&on_mount), AsyncState::loading());

        let manual = AsyncOptions::<i32>::default().execute_on_mount(false);
        assert_eq!(AsyncState::initial(&manual), AsyncState::not_requested());
    }

    #[test]
    fn test_merge_is_permissive() {
        let failed: AsyncState<String> = AsyncState::error_with_message("nope");
        let merged = failed.merge(AsyncStatePatch::default().status(AsyncStatus::Success));

        assert_eq!(merged.status, AsyncStatus::Success);
        assert_eq!(merged.error, Some(AsyncError::Error("nope".to_string())));
        assert_eq!(merged.result, None);
        assert!(!merged.is_consistent());
    }

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let state = AsyncState::success("a".to_string());
        let merged = state.merge(AsyncStatePatch::default().result(Some("b".to_string())));
        assert_eq!(merged, AsyncState::success("b".to_string()));

        let cleared = merged.merge(
            AsyncStatePatch::default()
                .status(AsyncStatus::NotRequested)
                .result(None),
        );
        assert_eq!(cleared, AsyncState::not_requested());
    }

    #[test]
    fn test_from_result() {
        let ok: AsyncState<i32> = Ok(1).into();
        assert_eq!(ok, AsyncState::success(1));

        let err: AsyncState<i32> = Err(AsyncError::None).into();
        assert_eq!(err, AsyncState::error(AsyncError::None));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AsyncStatus::NotRequested.to_string(), "not-requested");
        assert_eq!(AsyncStatus::Loading.to_string(), "loading");
        assert_eq!(AsyncStatus::Success.to_string(), "success");
        assert_eq!(AsyncStatus::Error.to_string(), "error");
    }
}

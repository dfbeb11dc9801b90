mod async_error;
mod async_state;
mod controller;
mod execution_result;
mod lifecycle;
mod operation;
mod options;
mod stream_ext;
#[cfg(feature = "http")]
pub mod fetch;
pub mod mock;

#[cfg(test)]
mod unit_tests;

pub use async_error::*;
pub use async_state::*;
pub use controller::*;
pub use execution_result::*;
pub use lifecycle::*;
pub use operation::{OperationHandle, OperationId, SettlementContext};
pub use options::*;
pub use stream_ext::*;

/// Values a controller can be invoked with and watch for changes.
pub trait Params: Clone + PartialEq + Send + Sync + 'static {}

impl<T> Params for T where T: Clone + PartialEq + Send + Sync + 'static {}

/// Values an operation can resolve to.
pub trait Output: Clone + Send + Sync + 'static {}

impl<T> Output for T where T: Clone + Send + Sync + 'static {}

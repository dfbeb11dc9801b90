use crate::{AsyncError, AsyncOptions, SettlementContext};
use std::sync::{Arc, Mutex};


/// What a settlement callback observed.
#[derive(Clone, Debug, PartialEq)]
pub enum Settlement {
    Success {
        value: String,
        current: bool,
        mounted: bool,
    },
    Error {
        error: AsyncError,
        current: bool,
        mounted: bool,
    },
}

/// Records every `on_success` / `on_error` call in order.
#[derive(Clone, Default)]
pub struct Settlements {
    events: Arc<Mutex<Vec<Settlement>>>,
}

impl Settlements {
    pub fn options(&self, options: AsyncOptions<String>) -> AsyncOptions<String> {
        let on_success = self.events.clone();
        let on_error = self.events.clone();
        options
            .on_success(move |value: &String, context: &SettlementContext| {
                on_success.lock().unwrap().push(Settlement::Success {
                    value: value.clone(),
                    current: context.is_current(),
                    mounted: context.is_mounted(),
                });
            })
            .on_error(move |error: &AsyncError, context: &SettlementContext| {
                on_error.lock().unwrap().push(Settlement::Error {
                    error: error.clone(),
                    current: context.is_current(),
                    mounted: context.is_mounted(),
                });
            })
    }

    pub fn events(&self) -> Vec<Settlement> {
        self.events.lock().unwrap().clone()
    }
}

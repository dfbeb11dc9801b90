use easync::{AsyncError, AsyncOptions, SettlementContext};
use std::sync::{Arc, Mutex};

/// Counts settlement callbacks and remembers which ones were current.
#[derive(Clone, Default)]
pub struct CallbackLog {
    entries: Arc<Mutex<Vec<(String, bool)>>>,
}

#[allow(dead_code)]
impl CallbackLog {
    pub fn options<T>(&self, options: AsyncOptions<T>) -> AsyncOptions<T>
    where
        T: easync::Output + std::fmt::Debug,
    {
        let on_success = self.entries.clone();
        let on_error = self.entries.clone();
        options
            .on_success(move |value: &T, context: &SettlementContext| {
                on_success
                    .lock()
                    .unwrap()
                    .push((format!("ok:{value:?}"), context.is_current()));
            })
            .on_error(move |error: &AsyncError, context: &SettlementContext| {
                on_error
                    .lock()
                    .unwrap()
                    .push((format!("err:{error}"), context.is_current()));
            })
    }

    pub fn entries(&self) -> Vec<(String, bool)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn current_entries(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(_, current)| *current)
            .map(|(entry, _)| entry)
            .collect()
    }
}

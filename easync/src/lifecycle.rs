use futures_signals::signal::{Mutable, MutableSignal};
use std::fmt::{Debug, Formatter};

/// Tracks whether the consumer that attached a controller is still around.
///
/// Clones share the same flag, so the rendering layer can keep one clone and
/// flip it on attach/detach while the controller only ever reads it.
#[derive(Clone)]
pub struct Mountedness {
    mounted: Mutable<bool>,
}

impl Mountedness {
    pub fn new() -> Self {
        Mountedness {
            mounted: Mutable::new(false),
        }
    }

    pub fn mount(&self) {
        self.mounted.set_neq(true);
    }

    pub fn unmount(&self) {
        self.mounted.set_neq(false);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Emits the current flag, then every change to it.
    pub fn signal(&self) -> MutableSignal<bool> {
        self.mounted.signal()
    }
}

impl Default for Mountedness {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Mountedness {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mountedness")
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

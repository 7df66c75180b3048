//! Timer observers

use std::{sync::Arc, time::Duration};

/// Receives countdown notifications.
///
/// Callbacks run synchronously on the tick task, outside the engine's state
/// lock, so they may query or drive the engine. Transitions requested from
/// other threads wait until the callbacks return, so they should be quick.
pub trait TimerListener: Send + Sync {
    /// Called on every tick with the freshly computed remaining time
    fn on_tick(&self, remaining: Duration);

    /// Called once when the countdown reaches zero, after the final tick
    fn on_elapsed(&self);
}

/// Ordered set of listeners, deduplicated by identity
#[derive(Default, Clone)]
pub struct ListenerSet {
    listeners: Vec<Arc<dyn TimerListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `listener` unless the same handle is already registered.
    /// Returns whether it was added.
    pub fn add(&mut self, listener: Arc<dyn TimerListener>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Remove `listener` if registered. Returns whether it was present.
    pub fn remove(&mut self, listener: &Arc<dyn TimerListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !same_listener(l, listener));
        self.listeners.len() != before
    }

    pub fn contains(&self, listener: &Arc<dyn TimerListener>) -> bool {
        self.listeners.iter().any(|l| same_listener(l, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Copy of the current handles, in registration order
    pub fn snapshot(&self) -> Vec<Arc<dyn TimerListener>> {
        self.listeners.clone()
    }
}

// Compare data pointers only; vtable pointers for the same type may differ
// between codegen units.
fn same_listener(a: &Arc<dyn TimerListener>, b: &Arc<dyn TimerListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

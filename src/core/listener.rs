// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Status listeners and their registry

use std::sync::Arc;

use super::AlarmStatus;

/// Observer of engine state changes.
///
/// Callbacks run synchronously inside the engine operation that caused them,
/// so implementations must not call back into the engine.
pub trait StatusListener: Send + Sync {
    /// Alarm status was set (fires even when the value did not change)
    fn on_status_changed(&self, status: AlarmStatus);

    /// Arming status changed, sensor flags may have been reset
    fn on_sensor_status_changed(&self);

    /// A camera frame was analysed
    fn on_cat_detected(&self, cat_detected: bool);
}

/// Deduplicated set of listeners, keyed by `Arc` identity
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn StatusListener>>,
}

impl ListenerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns false if it was already registered.
    pub fn add(&mut self, listener: Arc<dyn StatusListener>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Unregister a listener. Returns false if it was not registered.
    pub fn remove(&mut self, listener: &Arc<dyn StatusListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !same_listener(l, listener));
        self.listeners.len() != before
    }

    /// Whether this exact `Arc` is registered
    pub fn contains(&self, listener: &Arc<dyn StatusListener>) -> bool {
        self.listeners.iter().any(|l| same_listener(l, listener))
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True when nobody is listening
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Tell every listener, in registration order, that the alarm status was set
    pub fn notify_status(&self, status: AlarmStatus) {
        for listener in &self.listeners {
            listener.on_status_changed(status);
        }
    }

    /// Tell every listener that sensor flags were reset
    pub fn notify_sensors_changed(&self) {
        for listener in &self.listeners {
            listener.on_sensor_status_changed();
        }
    }

    /// Tell every listener about a camera verdict
    pub fn notify_cat_detected(&self, cat_detected: bool) {
        for listener in &self.listeners {
            listener.on_cat_detected(cat_detected);
        }
    }
}

// Compare data pointers only; vtable pointers for the same type may differ
// between codegen units.
fn same_listener(a: &Arc<dyn StatusListener>, b: &Arc<dyn StatusListener>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Counter {
        statuses: Mutex<Vec<AlarmStatus>>,
        sensor_changes: Mutex<usize>,
        cats: Mutex<Vec<bool>>,
    }

    impl StatusListener for Counter {
        fn on_status_changed(&self, status: AlarmStatus) {
            self.statuses.lock().push(status);
        }

        fn on_sensor_status_changed(&self) {
            *self.sensor_changes.lock() += 1;
        }

        fn on_cat_detected(&self, cat_detected: bool) {
            self.cats.lock().push(cat_detected);
        }
    }

    #[test]
    fn test_duplicate_registration_ignored() {
        let mut registry = ListenerRegistry::new();
        let counter = Arc::new(Counter::default());
        let listener: Arc<dyn StatusListener> = counter.clone();

        assert!(registry.add(listener.clone()));
        assert!(!registry.add(listener.clone()));
        assert_eq!(registry.len(), 1);

        registry.notify_status(AlarmStatus::Alarm);
        assert_eq!(*counter.statuses.lock(), vec![AlarmStatus::Alarm]);
    }

    #[test]
    fn test_remove_unregistered_is_noop() {
        let mut registry = ListenerRegistry::new();
        let registered: Arc<dyn StatusListener> = Arc::new(Counter::default());
        let stranger: Arc<dyn StatusListener> = Arc::new(Counter::default());

        registry.add(registered.clone());
        assert!(!registry.remove(&stranger));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(&registered));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_every_listener_notified() {
        let mut registry = ListenerRegistry::new();
        let a = Arc::new(Counter::default());
        let b = Arc::new(Counter::default());
        registry.add(a.clone());
        registry.add(b.clone());

        registry.notify_sensors_changed();
        registry.notify_cat_detected(true);

        for counter in [&a, &b] {
            assert_eq!(*counter.sensor_changes.lock(), 1);
            assert_eq!(*counter.cats.lock(), vec![true]);
        }
    }
}

//! Debounce Guard
//!
//! Suppresses repeated events for the same key within a time window.

use std::collections::HashMap;

use tokio::time::{Duration, Instant};

/// Keyed debouncer: a key fires at most once per window
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    fired: HashMap<String, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            fired: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether `key` may fire now. Records the firing when it may.
    pub fn should_fire(&mut self, key: &str) -> bool {
        self.should_fire_at(key, Instant::now())
    }

    pub fn should_fire_at(&mut self, key: &str, now: Instant) -> bool {
        self.expire(now);
        if self.fired.contains_key(key) {
            return false;
        }
        self.fired.insert(key.to_string(), now);
        true
    }

    /// Whether `key` is still inside its window
    pub fn is_guarded(&self, key: &str, now: Instant) -> bool {
        self.fired
            .get(key)
            .is_some_and(|&at| now.saturating_duration_since(at) < self.window)
    }

    /// Drop entries whose window has passed
    pub fn expire(&mut self, now: Instant) {
        let window = self.window;
        self.fired
            .retain(|_, at| now.saturating_duration_since(*at) < window);
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

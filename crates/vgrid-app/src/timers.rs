// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const DEFAULT_FILTER_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
struct Pending<V> {
    value: V,
    deadline: Instant,
}

/// Trailing-edge debounce with one pending slot per key.
///
/// Scheduling a key replaces whatever was pending for that key and restarts
/// its deadline; other keys are unaffected.
#[derive(Debug, Clone)]
pub struct Debouncer<K, V> {
    delay: Duration,
    pending: BTreeMap<K, Pending<V>>,
}

impl<K: Ord + Clone, V> Debouncer<K, V> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: BTreeMap::new(),
        }
    }

    pub fn schedule(&mut self, key: K, value: V, now: Instant) {
        let deadline = now + self.delay;
        self.pending.insert(key, Pending { value, deadline });
    }

    /// Removes and returns every entry whose deadline is at or before `now`.
    pub fn fire_due(&mut self, now: Instant) -> Vec<(K, V)> {
        let due = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();

        due.into_iter()
            .filter_map(|key| {
                self.pending
                    .remove(&key)
                    .map(|pending| (key, pending.value))
            })
            .collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|pending| pending.deadline).min()
    }

    pub fn cancel(&mut self, key: &K) -> Option<V> {
        self.pending.remove(key).map(|pending| pending.value)
    }

    pub fn pending_value(&self, key: &K) -> Option<&V> {
        self.pending.get(key).map(|pending| &pending.value)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use std::time::{Duration, Instant};

    #[test]
    fn burst_for_one_key_fires_once_with_last_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        for (step, value) in ["a", "am", "ama", "amaz"].into_iter().enumerate() {
            debouncer.schedule("merchant", value, start + Duration::from_millis(step as u64 * 100));
        }

        assert!(debouncer.fire_due(start + Duration::from_millis(599)).is_empty());
        assert_eq!(
            debouncer.fire_due(start + Duration::from_millis(600)),
            vec![("merchant", "amaz")]
        );
        assert!(debouncer.fire_due(start + Duration::from_secs(5)).is_empty());
        assert!(debouncer.is_idle());
    }

    #[test]
    fn keys_debounce_independently() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule("merchant", "tar", start);
        debouncer.schedule("category", "home", start + Duration::from_millis(200));

        assert_eq!(
            debouncer.fire_due(start + Duration::from_millis(300)),
            vec![("merchant", "tar")]
        );
        assert_eq!(debouncer.pending_value(&"category"), Some(&"home"));
        assert_eq!(
            debouncer.fire_due(start + Duration::from_millis(500)),
            vec![("category", "home")]
        );
    }

    #[test]
    fn next_deadline_is_the_earliest_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        assert_eq!(debouncer.next_deadline(), None);

        debouncer.schedule(2, "b", start + Duration::from_millis(50));
        debouncer.schedule(1, "a", start);
        assert_eq!(
            debouncer.next_deadline(),
            Some(start + Duration::from_millis(300))
        );

        assert_eq!(debouncer.cancel(&1), Some("a"));
        assert_eq!(
            debouncer.next_deadline(),
            Some(start + Duration::from_millis(350))
        );
    }
}

/// Named monotonic counters shared by the walk and report engines.
///
/// A `Counter` is written from many worker threads at once, so every update
/// takes a short `parking_lot` lock. Names are kept in a `BTreeMap` so the
/// rendered metric list comes out sorted without an extra pass.
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct Counter {
    inner: Mutex<BTreeMap<String, u64>>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` to the counter called `name`, creating it at zero first.
    pub fn add(&self, n: u64, name: &str) {
        let mut map = self.inner.lock();
        match map.get_mut(name) {
            Some(v) => *v = v.saturating_add(n),
            None => {
                map.insert(name.to_string(), n);
            }
        }
    }

    /// Current value, or `None` if the counter was never touched.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.inner.lock().get(name).copied()
    }

    /// Names of all counters, sorted.
    pub fn metrics(&self) -> Vec<String> {
        self.inner.lock().keys().cloned().collect()
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.inner.lock().clone()
    }
}

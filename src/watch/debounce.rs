// src/watch/debounce.rs

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Coalesces bursts of filesystem events into one batch.
///
/// A batch is ready once `window` has passed since the *last* change, so an
/// editor writing a file in several steps yields a single batch.
#[derive(Debug)]
pub struct ChangeBatcher {
    pending: BTreeSet<String>,
    last_change: Option<Instant>,
    window: Duration,
}

impl ChangeBatcher {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: BTreeSet::new(),
            last_change: None,
            window,
        }
    }

    pub fn add(&mut self, rel_path: String, now: Instant) {
        self.pending.insert(rel_path);
        self.last_change = Some(now);
    }

    /// When the pending batch becomes ready, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        match self.last_change {
            Some(last) if !self.pending.is_empty() => Some(last + self.window),
            _ => None,
        }
    }

    /// Drain the batch, sorted and deduplicated.
    pub fn take(&mut self) -> Vec<String> {
        self.last_change = None;
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_collapses_into_one_batch() {
        let t0 = Instant::now();
        let mut b = ChangeBatcher::new(Duration::from_millis(100));
        b.add("a.scss".into(), t0);
        b.add("b.scss".into(), t0 + Duration::from_millis(60));
        b.add("a.scss".into(), t0 + Duration::from_millis(90));

        // Window restarts on every change.
        assert_eq!(b.deadline(), Some(t0 + Duration::from_millis(190)));
        assert_eq!(b.take(), vec!["a.scss", "b.scss"]);
        assert_eq!(b.deadline(), None);
    }
}

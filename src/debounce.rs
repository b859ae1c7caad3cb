//! Quiescence timer for autosave
//!
//! Time is passed in by the caller, so the event loop decides when to poll
//! and tests can step through a burst without sleeping.

use std::time::{Duration, Instant};

/// Fires once after `delay` has passed without a `reset`
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the quiet period from `now`
    pub fn reset(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop a pending fire
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once per quiet period, on the first poll at or after the deadline
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::DEFAULT_AUTOSAVE_DELAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_idle_never_fires() {
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.poll(Instant::now() + ms(5000)));
    }

    #[test]
    fn test_fires_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.reset(start);

        assert!(!debouncer.poll(start + ms(999)));
        assert!(debouncer.poll(start + ms(1000)));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(start + ms(3000)));
    }

    #[test]
    fn test_burst_fires_once_after_last_reset() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        let mut fired = 0;
        for i in 0..10 {
            let t = start + ms(i * 300);
            if debouncer.poll(t) {
                fired += 1;
            }
            debouncer.reset(t);
        }
        let last = start + ms(9 * 300);
        assert_eq!(debouncer.deadline(), Some(last + ms(1000)));

        assert!(!debouncer.poll(last + ms(999)));
        if debouncer.poll(last + ms(1000)) {
            fired += 1;
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_cancel_drops_pending_fire() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(50));
        debouncer.reset(start);
        debouncer.cancel();
        assert!(!debouncer.poll(start + ms(100)));
    }
}

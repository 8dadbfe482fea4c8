//! Trailing-edge debouncing of observed container sizes
//!
//! The container size is observed every frame. Bursts of changes collapse
//! into one settled size, reported once after the size has stayed the same
//! for the settle period. The very first observation settles immediately so
//! there is something to draw.

/// Default quiet period before a new size is accepted
pub const DEFAULT_SETTLE_SECS: f64 = 0.1;

/// Coalesces container-size observations into settled surface sizes
#[derive(Clone, Debug)]
pub struct ResizeDebouncer {
    settle_secs: f64,
    /// Size last handed out by `poll`
    settled: Option<[usize; 2]>,
    /// Latest differing size and when it was first seen
    pending: Option<([usize; 2], f64)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_SECS)
    }
}

impl ResizeDebouncer {
    pub fn new(settle_secs: f64) -> Self {
        Self {
            settle_secs,
            settled: None,
            pending: None,
        }
    }

    pub fn set_settle_secs(&mut self, settle_secs: f64) {
        self.settle_secs = settle_secs;
    }

    /// The size most recently reported as settled
    pub fn settled(&self) -> Option<[usize; 2]> {
        self.settled
    }

    /// Record the container size seen at time `now` (seconds)
    pub fn observe(&mut self, size: [usize; 2], now: f64) {
        match self.pending {
            Some((pending, _)) if pending == size => {}
            _ if self.settled == Some(size) => self.pending = None,
            _ => self.pending = Some((size, now)),
        }
    }

    /// Take the settled size if a pending change has been quiet long enough.
    /// Returns each settled size exactly once.
    pub fn poll(&mut self, now: f64) -> Option<[usize; 2]> {
        let (size, since) = self.pending?;
        if self.settled.is_some() && now - since < self.settle_secs {
            return None;
        }
        self.pending = None;
        self.settled = Some(size);
        log::debug!("Surface resized to {}x{}", size[0], size[1]);
        Some(size)
    }

    /// Seconds until the pending size settles, if one is waiting
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.pending
            .map(|(_, since)| (self.settle_secs - (now - since)).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_size_settles_immediately() {
        let mut d = ResizeDebouncer::new(0.1);
        d.observe([800, 600], 0.0);
        assert_eq!(d.poll(0.0), Some([800, 600]));
        assert_eq!(d.poll(1.0), None, "Settled sizes are reported once");
    }

    #[test]
    fn test_burst_collapses_into_one_trailing_size() {
        let mut d = ResizeDebouncer::new(0.1);
        d.observe([800, 600], 0.0);
        d.poll(0.0);

        let mut reported = Vec::new();
        for (i, width) in (801..=820).enumerate() {
            let now = 1.0 + i as f64 * 0.016;
            d.observe([width, 600], now);
            reported.extend(d.poll(now));
        }
        assert!(reported.is_empty(), "No redraw while the size keeps changing");

        let last_change = 1.0 + 19.0 * 0.016;
        d.observe([820, 600], last_change + 0.05);
        assert_eq!(d.poll(last_change + 0.05), None);
        d.observe([820, 600], last_change + 0.11);
        assert_eq!(d.poll(last_change + 0.11), Some([820, 600]));
        assert_eq!(d.poll(last_change + 1.0), None);
    }

    #[test]
    fn test_returning_to_settled_size_cancels_pending() {
        let mut d = ResizeDebouncer::new(0.1);
        d.observe([100, 100], 0.0);
        d.poll(0.0);

        d.observe([120, 100], 1.0);
        d.observe([100, 100], 1.02);
        assert_eq!(d.poll(2.0), None);
        assert_eq!(d.remaining(2.0), None);
    }

    #[test]
    fn test_remaining_counts_down() {
        let mut d = ResizeDebouncer::new(0.2);
        d.observe([10, 10], 0.0);
        d.poll(0.0);
        d.observe([20, 10], 1.0);
        let left = d.remaining(1.05).unwrap();
        assert!((left - 0.15).abs() < 1e-9);
        assert_eq!(d.remaining(5.0), Some(0.0));
    }
}

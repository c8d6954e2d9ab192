//! Cancellable repeating timer handle
//!
//! The event loop asks the ticker how long it may block (`until_next`) and
//! then how many periods have passed (`due`). Nothing fires while cancelled.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// Schedule the first tick one period after `now`
    pub fn arm(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    /// Number of periods elapsed up to `now`; advances the schedule past them
    pub fn due(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next else {
            return 0;
        };
        let mut count = 0;
        while next <= now {
            count += 1;
            next += self.period;
        }
        self.next = Some(next);
        count
    }

    /// Time left until the next tick, or `None` when cancelled
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.next.map(|next| next.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn test_cancelled_ticker_never_fires() {
        let start = Instant::now();
        let mut ticker = Ticker::new(SEC);
        assert_eq!(ticker.due(start + SEC * 10), 0);
        assert_eq!(ticker.until_next(start), None);

        ticker.arm(start);
        ticker.cancel();
        assert!(!ticker.is_armed());
        assert_eq!(ticker.due(start + SEC * 10), 0);
    }

    #[test]
    fn test_due_counts_whole_periods() {
        let start = Instant::now();
        let mut ticker = Ticker::new(SEC);
        ticker.arm(start);

        assert_eq!(ticker.due(start + Duration::from_millis(999)), 0);
        assert_eq!(ticker.due(start + SEC), 1);
        assert_eq!(ticker.due(start + Duration::from_millis(3500)), 2);
        assert_eq!(
            ticker.until_next(start + Duration::from_millis(3500)),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_rearm_restarts_schedule() {
        let start = Instant::now();
        let mut ticker = Ticker::new(SEC);
        ticker.arm(start);
        ticker.arm(start + SEC * 5);
        assert_eq!(ticker.due(start + SEC * 5), 0);
        assert_eq!(ticker.due(start + SEC * 6), 1);
    }
}

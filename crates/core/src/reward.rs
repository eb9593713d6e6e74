//! Delivery-ratio reward.

use crate::counters::Counters;

/// Reward = `received / sent`, sticky across steps where `sent == 0`.
///
/// When nothing has been sent the previous value is returned unchanged;
/// before any nonzero `sent` that value is `0.0`.
#[derive(Debug, Clone, Default)]
pub struct RewardComputer {
    last: f64,
}

impl RewardComputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute(&mut self, counters: &Counters) -> f64 {
        if counters.sent() > 0 {
            self.last = counters.received() as f64 / counters.sent() as f64;
        }
        self.last
    }

    /// The value returned by the most recent [`compute`](Self::compute).
    pub fn last(&self) -> f64 {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_is_exact() {
        let mut reward = RewardComputer::new();
        assert_eq!(reward.compute(&Counters::from_counts(10, 4)), 0.4);
        assert_eq!(reward.compute(&Counters::from_counts(6, 6)), 1.0);
        assert_eq!(reward.compute(&Counters::from_counts(3, 1)), 1.0 / 3.0);
    }

    #[test]
    fn test_zero_before_any_traffic() {
        let mut reward = RewardComputer::new();
        assert_eq!(reward.compute(&Counters::new()), 0.0);
        assert_eq!(reward.compute(&Counters::new()), 0.0);
    }

    #[test]
    fn test_sticky_when_nothing_sent() {
        let mut reward = RewardComputer::new();
        reward.compute(&Counters::from_counts(12, 9));
        assert_eq!(reward.compute(&Counters::new()), 0.75);
        assert_eq!(reward.compute(&Counters::from_counts(0, 3)), 0.75);
        assert_eq!(reward.last(), 0.75);

        reward.reset();
        assert_eq!(reward.compute(&Counters::new()), 0.0);
    }
}

//! Fixed step-budget termination.

/// Counts evaluations and reports episode end once the budget is reached.
///
/// Every call to [`evaluate`](Self::evaluate) advances the counter. The
/// result stays `true` from the budget-th call until [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct TerminationPolicy {
    budget: u64,
    steps: u64,
}

impl TerminationPolicy {
    pub fn new(budget: u64) -> Self {
        Self { budget, steps: 0 }
    }

    pub fn evaluate(&mut self) -> bool {
        self.steps += 1;
        self.steps >= self.budget
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn reset(&mut self) {
        self.steps = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_on_twentieth_call() {
        let mut policy = TerminationPolicy::new(20);
        for call in 1..20 {
            assert!(!policy.evaluate(), "call {call} reported done");
        }
        assert!(policy.evaluate());
        assert_eq!(policy.steps(), 20);
    }

    #[test]
    fn test_stays_done_until_reset() {
        let mut policy = TerminationPolicy::new(2);
        assert!(!policy.evaluate());
        assert!(policy.evaluate());
        assert!(policy.evaluate());

        policy.reset();
        assert_eq!(policy.steps(), 0);
        assert!(!policy.evaluate());
    }
}

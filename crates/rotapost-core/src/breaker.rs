use crate::types::Outcome;

/// Counts failures across one cycle and trips once `threshold` is reached.
/// Successes do not reset the count.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    threshold: u32,
    failures: u32,
}

impl CircuitBreaker {
    /// A threshold of 0 is treated as 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            failures: 0,
        }
    }

    /// Record an outcome; returns true when this outcome tripped the breaker.
    pub fn record(&mut self, outcome: Outcome) -> bool {
        if outcome.is_success() {
            return false;
        }
        let was_tripped = self.is_tripped();
        self.failures += 1;
        !was_tripped && self.is_tripped()
    }

    pub fn is_tripped(&self) -> bool {
        self.failures >= self.threshold
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

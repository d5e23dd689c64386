use rand::Rng;
use rotapost_core::cycle::Pacer;
use std::time::Duration;

/// Sleeps a random number of minutes in `[min, max]` between posts.
pub struct RandomPacer {
    min_minutes: u64,
    max_minutes: u64,
}

impl RandomPacer {
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes: min_minutes.min(max_minutes),
            max_minutes: max_minutes.max(min_minutes),
        }
    }

    fn pick_seconds(&self) -> u64 {
        rand::thread_rng().gen_range(self.min_minutes * 60..=self.max_minutes * 60)
    }
}

impl Pacer for RandomPacer {
    fn wait(&mut self) {
        let secs = self.pick_seconds();
        tracing::info!(minutes = secs / 60, "waiting before next post");
        std::thread::sleep(Duration::from_secs(secs));
    }
}

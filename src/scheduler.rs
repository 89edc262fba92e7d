use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Ticker whose period can change from one tick to the next.
pub struct Scheduler {
    next: Instant,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            next: Instant::now(),
        }
    }

    /// Waits for the next tick, then schedules the following one `interval`
    /// later. The first tick fires immediately. After an overrun the schedule
    /// restarts from now instead of firing missed ticks back to back.
    pub async fn tick(&mut self, interval: Duration) {
        sleep_until(self.next).await;
        let now = Instant::now();
        let scheduled = self.next + interval;
        self.next = if scheduled <= now { now + interval } else { scheduled };
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

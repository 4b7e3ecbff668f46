use tokio::time::{sleep_until, Duration, Instant};

/// A cooperative rate gate shared by every request of a run.
///
/// Each completed request books the pause that must follow it with `mark`;
/// `wait_turn` suspends until that pause is over, whichever kind of request
/// comes next. The first call never waits.
#[derive(Debug, Default)]
pub struct Pacer {
    next_allowed: Option<Instant>,
}

impl Pacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the gate, if needed.
    pub async fn wait_turn(&mut self) {
        if let Some(deadline) = self.next_allowed {
            if Instant::now() < deadline {
                sleep_until(deadline).await;
            }
        }
    }

    /// Record that a request just completed; the next turn opens `pause` later.
    pub fn mark(&mut self, pause: Duration) {
        self.next_allowed = Some(Instant::now() + pause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_turn_is_free() {
        let start = Instant::now();
        let mut pacer = Pacer::new();

        pacer.wait_turn().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn spaces_consecutive_turns() {
        let start = Instant::now();
        let mut pacer = Pacer::new();

        for _ in 0..3 {
            pacer.wait_turn().await;
            pacer.mark(Duration::from_millis(500));
        }

        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_is_set_by_the_previous_request() {
        let start = Instant::now();
        let mut pacer = Pacer::new();

        pacer.wait_turn().await;
        pacer.mark(Duration::from_millis(2000));
        pacer.wait_turn().await;
        pacer.mark(Duration::from_millis(200));
        pacer.wait_turn().await;

        assert_eq!(start.elapsed(), Duration::from_millis(2200));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_pause_never_waits() {
        let start = Instant::now();
        let mut pacer = Pacer::new();

        for _ in 0..5 {
            pacer.wait_turn().await;
            pacer.mark(Duration::ZERO);
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

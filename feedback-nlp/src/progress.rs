// indicatif cannot report to a non-tty, so batch steps log their throughput instead
use {
    std::time::{Duration, Instant},
    tracing::info,
};

pub struct Progress {
    message: &'static str,
    report_interval: Duration,
    started_at: Instant,
    reported_at: Instant,
    total_processed: u64,
    total_failed: u64,
}

impl Progress {
    pub fn new(message: &'static str) -> Self {
        Self::with_interval(message, Duration::from_secs(10))
    }

    pub fn with_interval(message: &'static str, report_interval: Duration) -> Self {
        let now = Instant::now();

        Self {
            message,
            report_interval,
            started_at: now,
            reported_at: now,
            total_processed: 0,
            total_failed: 0,
        }
    }

    pub fn total_processed(&self) -> u64 {
        self.total_processed
    }

    pub fn total_failed(&self) -> u64 {
        self.total_failed
    }

    /// Counts one item. Returns true when a report line was logged.
    pub fn update(&mut self, succeeded: bool) -> bool {
        self.total_processed += 1;
        if !succeeded {
            self.total_failed += 1;
        }

        let now = Instant::now();
        if now - self.reported_at >= self.report_interval {
            self.reported_at = now;
            info!("{}: {} total, {} failed ({:.2}/second)", self.message, self.total_processed, self.total_failed, self.rate(now));
            true
        } else {
            false
        }
    }

    pub fn finish(&self) {
        let now = Instant::now();
        info!(
            "{}: done, {} total, {} failed in {:.1}s ({:.2}/second)",
            self.message,
            self.total_processed,
            self.total_failed,
            (now - self.started_at).as_secs_f32(),
            self.rate(now),
        );
    }

    fn rate(&self, now: Instant) -> f32 {
        let elapsed = (now - self.started_at).as_secs_f32();
        if elapsed > 0.0 {
            self.total_processed as f32 / elapsed
        } else {
            0.0
        }
    }
}

use std::time::{Duration, Instant};

/// Wall-clock timer for a whole run.
///
/// Reading the elapsed time before a completed start/stop pair is a
/// programmer error and panics.
#[derive(Debug, Default)]
pub struct RunTimer {
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
}

impl RunTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
        self.stopped_at = None;
    }

    pub fn stop(&mut self) {
        assert!(self.started_at.is_some(), "timer stopped before start");
        self.stopped_at = Some(Instant::now());
    }

    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => stop.duration_since(start),
            _ => panic!("elapsed time read before the timer ran"),
        }
    }

    pub fn report(&self) -> String {
        format_duration(self.elapsed())
    }
}

pub fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours} hours, {minutes} minutes, {seconds} seconds")
}

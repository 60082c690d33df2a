use std::time::Instant;

/// Monotonic wall-clock source in seconds.
pub trait TimeSource {
    fn now_secs(&self) -> f64;
}

/// `TimeSource` backed by `std::time::Instant`.
///
/// Seconds are measured from the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_secs(&self) -> f64 {
        (**self).now_secs()
    }
}

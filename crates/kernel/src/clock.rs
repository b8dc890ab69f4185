use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// A monotonic time reading relative to an arbitrary fixed origin.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Real time. Backed by `performance.now()` in the browser.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: web_time::Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Time that only moves when told to. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualTime(Rc<Cell<Duration>>);

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.0.set(to);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

/// Monotonic clock started at construction and never reset.
///
/// [`delta`](Clock::delta) samples the source and returns the time since the
/// previous sample; [`elapsed`](Clock::elapsed) is the time from start to
/// that same sample, so both stay consistent within one frame.
pub struct Clock {
    source: Rc<dyn TimeSource>,
    start: Duration,
    last: Duration,
    elapsed: Duration,
}

impl Clock {
    pub fn start(source: Rc<dyn TimeSource>) -> Self {
        let now = source.now();
        Self {
            source,
            start: now,
            last: now,
            elapsed: Duration::ZERO,
        }
    }

    pub fn delta(&mut self) -> Duration {
        let now = self.source.now().max(self.last);
        let delta = now - self.last;
        self.last = now;
        self.elapsed = now - self.start;
        delta
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_measures_time_between_samples() {
        let time = ManualTime::new();
        time.set(Duration::from_secs(5));
        let mut clock = Clock::start(Rc::new(time.clone()));
        assert_eq!(clock.elapsed(), Duration::ZERO);

        time.advance(Duration::from_millis(16));
        assert_eq!(clock.delta(), Duration::from_millis(16));
        time.advance(Duration::from_millis(20));
        assert_eq!(clock.delta(), Duration::from_millis(20));
        assert_eq!(clock.delta(), Duration::ZERO);
        assert_eq!(clock.elapsed(), Duration::from_millis(36));
    }

    #[test]
    fn elapsed_only_moves_on_sample() {
        let time = ManualTime::new();
        let mut clock = Clock::start(Rc::new(time.clone()));
        time.advance(Duration::from_secs(1));
        assert_eq!(clock.elapsed(), Duration::ZERO);
        clock.delta();
        assert_eq!(clock.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn source_going_backwards_is_ignored() {
        let time = ManualTime::new();
        time.set(Duration::from_secs(2));
        let mut clock = Clock::start(Rc::new(time.clone()));
        time.set(Duration::from_secs(1));
        assert_eq!(clock.delta(), Duration::ZERO);
        time.set(Duration::from_secs(3));
        assert_eq!(clock.delta(), Duration::from_secs(1));
    }

    #[test]
    fn monotonic_time_advances() {
        let time = MonotonicTime::new();
        let a = time.now();
        let b = time.now();
        assert!(b >= a);
    }
}

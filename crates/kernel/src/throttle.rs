use std::time::Duration;

/// Accumulator-based render throttle.
///
/// Real time is accumulated every loop iteration; a frame is due once the
/// accumulated time exceeds the target interval. Consuming a frame keeps
/// the remainder modulo the interval, so the average rate converges on the
/// target even when the display refresh is not a multiple of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameThrottle {
    interval: Duration,
    accumulated: Duration,
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    pub fn from_fps(fps: f64) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / fps))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time carried towards the next frame.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Add elapsed real time. Returns true if a frame is due.
    pub fn accumulate(&mut self, delta: Duration) -> bool {
        self.accumulated += delta;
        self.is_due()
    }

    pub fn is_due(&self) -> bool {
        self.accumulated > self.interval
    }

    /// Mark the due frame as rendered, keeping the sub-interval remainder.
    pub fn consume(&mut self) {
        let interval = self.interval.as_nanos();
        self.accumulated = if interval == 0 {
            Duration::ZERO
        } else {
            let rem = self.accumulated.as_nanos() % interval;
            Duration::from_nanos(u64::try_from(rem).unwrap_or(u64::MAX))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn not_due_until_interval_is_exceeded() {
        let mut t = FrameThrottle::new(ms(30));
        assert!(!t.accumulate(ms(10)));
        assert!(!t.accumulate(ms(20)));
        assert!(t.accumulate(ms(1)));
    }

    #[test]
    fn consume_keeps_remainder() {
        let mut t = FrameThrottle::new(ms(30));
        assert!(t.accumulate(ms(45)));
        t.consume();
        assert_eq!(t.accumulated(), ms(15));
        assert!(!t.is_due());
    }

    #[test]
    fn long_stall_yields_one_frame_and_the_remainder() {
        let mut t = FrameThrottle::new(ms(30));
        assert!(t.accumulate(ms(100)));
        t.consume();
        assert_eq!(t.accumulated(), ms(10));
        assert!(!t.is_due());
    }

    #[test]
    fn frame_count_matches_total_time() {
        let interval = Duration::from_secs_f64(1.0 / 30.0);
        let mut t = FrameThrottle::new(interval);
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut total = Duration::ZERO;
        let mut frames: u128 = 0;
        for _ in 0..5_000 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let delta = Duration::from_micros(4_000 + (seed >> 33) % 25_000);
            total += delta;
            if t.accumulate(delta) {
                t.consume();
                frames += 1;
            }
        }
        let expected = total.as_nanos() / interval.as_nanos();
        assert!(frames + 1 >= expected && frames <= expected + 1);

        let carried = total.as_nanos() - frames * interval.as_nanos();
        assert_eq!(t.accumulated().as_nanos(), carried);
        assert!(t.accumulated() <= interval);
    }

    #[test]
    fn sixty_hz_display_at_thirty_fps() {
        let mut t = FrameThrottle::from_fps(30.0);
        let tick = Duration::from_secs_f64(1.0 / 60.0);
        let frames = (0..60).filter(|_| {
            let due = t.accumulate(tick);
            if due {
                t.consume();
            }
            due
        });
        let count = frames.count();
        assert!((29..=31).contains(&count), "rendered {count} frames");
    }

    #[test]
    fn zero_interval_never_divides_by_zero() {
        let mut t = FrameThrottle::new(Duration::ZERO);
        assert!(t.accumulate(ms(1)));
        t.consume();
        assert_eq!(t.accumulated(), Duration::ZERO);
    }
}

/// Frame-timestamp accumulator for a single session or calibration run.
///
/// Timestamps arrive in milliseconds from the host's monotonic frame source.
/// Elapsed time is kept in whole microseconds and measured from the start of
/// the current running segment, so rounding never compounds frame over frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionClock {
    accumulated_us: u64,
    segment: Option<Segment>,
    pub last_emitted_second: i64,
    pub running: bool,
}

/// One uninterrupted stretch of frames between a (re)start and a pause.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    start_ms: f64,
    base_us: u64,
    last_ms: f64,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self {
            accumulated_us: 0,
            segment: None,
            last_emitted_second: -1,
            running: false,
        }
    }
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to `{0, no baseline, -1, stopped}`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one frame timestamp and return total elapsed seconds.
    ///
    /// The first frame after a reset or a pause only records the baseline.
    /// Large gaps are not clamped. A timestamp older than the newest one seen
    /// contributes nothing.
    pub fn advance(&mut self, frame_ms: f64) -> f64 {
        if !frame_ms.is_finite() {
            return self.elapsed_secs();
        }

        let base_us = self.accumulated_us;
        let segment = self.segment.get_or_insert(Segment {
            start_ms: frame_ms,
            base_us,
            last_ms: frame_ms,
        });

        if frame_ms > segment.last_ms {
            segment.last_ms = frame_ms;
        }

        let span_us = ((segment.last_ms - segment.start_ms) * 1_000.0).round() as u64;
        self.accumulated_us = segment.base_us.saturating_add(span_us);
        self.elapsed_secs()
    }

    /// Forget the baseline so the next frame re-bootstraps without a jump.
    pub fn clear_baseline(&mut self) {
        self.segment = None;
    }

    pub fn has_baseline(&self) -> bool {
        self.segment.is_some()
    }

    pub fn last_frame_ms(&self) -> Option<f64> {
        self.segment.map(|s| s.last_ms)
    }

    pub fn accumulated_us(&self) -> u64 {
        self.accumulated_us
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.accumulated_us as f64 / 1_000_000.0
    }

    pub fn has_accumulated(&self) -> bool {
        self.accumulated_us > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_baseline_only() {
        let mut clock = SessionClock::new();
        assert_eq!(clock.advance(12_345.0), 0.0);
        assert!(clock.has_baseline());
        assert_eq!(clock.last_frame_ms(), Some(12_345.0));
    }

    #[test]
    fn test_accumulates_deltas() {
        let mut clock = SessionClock::new();
        clock.advance(1_000.0);
        clock.advance(1_016.0);
        let elapsed = clock.advance(1_500.0);
        assert!((elapsed - 0.5).abs() < 1e-9);
        assert_eq!(clock.accumulated_us(), 500_000);
    }

    #[test]
    fn test_large_gap_is_not_clamped() {
        let mut clock = SessionClock::new();
        clock.advance(0.0);
        let elapsed = clock.advance(95_000.0);
        assert_eq!(elapsed, 95.0);
    }

    #[test]
    fn test_clear_baseline_prevents_jump_across_pause() {
        let mut clock = SessionClock::new();
        clock.advance(0.0);
        clock.advance(2_000.0);
        clock.clear_baseline();

        // Ten seconds "paused"; the next frame only re-bootstraps.
        assert_eq!(clock.advance(12_000.0), 2.0);
        assert_eq!(clock.advance(12_250.0), 2.25);
    }

    #[test]
    fn test_backwards_timestamp_adds_nothing() {
        let mut clock = SessionClock::new();
        clock.advance(1_000.0);
        clock.advance(2_000.0);
        assert_eq!(clock.advance(1_500.0), 1.0);
        assert_eq!(clock.advance(2_500.0), 1.5);
    }

    #[test]
    fn test_non_finite_timestamp_is_ignored() {
        let mut clock = SessionClock::new();
        clock.advance(0.0);
        clock.advance(1_000.0);
        assert_eq!(clock.advance(f64::NAN), 1.0);
        assert_eq!(clock.advance(f64::INFINITY), 1.0);
        assert_eq!(clock.advance(2_000.0), 2.0);
    }

    #[test]
    fn test_no_drift_over_long_run_of_fractional_frames() {
        let mut clock = SessionClock::new();
        let frame = 1_000.0 / 60.0;
        let mut ts = 0.0;
        clock.advance(ts);
        for _ in 0..(60 * 60 * 10) {
            ts += frame;
            clock.advance(ts);
        }
        // ten minutes of 60 Hz frames
        assert!((clock.elapsed_secs() - 600.0).abs() < 1e-5);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut clock = SessionClock::new();
        clock.advance(0.0);
        clock.advance(3_000.0);
        clock.last_emitted_second = 3;
        clock.running = true;

        clock.reset();

        assert_eq!(clock, SessionClock::default());
        assert_eq!(clock.last_emitted_second, -1);
        assert!(!clock.running);
        assert!(!clock.has_accumulated());
    }
}

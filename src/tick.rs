/// Ticks between two tip changes.
pub const TIP_ROTATION_TICKS: u32 = 15;

/// Detect a crossing of a whole-second boundary.
///
/// Returns whether a tick fires and the new last-emitted second. When one
/// frame skips several boundaries only a single catch-up tick fires.
pub fn check_tick(elapsed_secs: f64, last_emitted_second: i64) -> (bool, i64) {
    if !elapsed_secs.is_finite() {
        return (false, last_emitted_second);
    }
    let current_second = elapsed_secs.floor() as i64;
    if current_second > last_emitted_second {
        (true, current_second)
    } else {
        (false, last_emitted_second)
    }
}

/// Remaining whole seconds of a bounded run, or nothing for a free session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    remaining: Option<u32>,
    expired: bool,
}

impl Countdown {
    pub fn new(total_secs: Option<u32>) -> Self {
        Self {
            remaining: total_secs,
            expired: false,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_bounded(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn has_expired(&self) -> bool {
        self.expired
    }

    pub fn is_at_zero(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Take one second off. Returns true only on the tick that reaches zero.
    pub fn decrement(&mut self) -> bool {
        let Some(remaining) = self.remaining else {
            return false;
        };
        let next = remaining.saturating_sub(1);
        self.remaining = Some(next);
        if next == 0 && !self.expired {
            self.expired = true;
            return true;
        }
        false
    }
}

/// Cycles through a fixed list of tips, one step every [`TIP_ROTATION_TICKS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipRotation {
    counter: u32,
    index: usize,
    len: usize,
}

impl TipRotation {
    pub fn new(len: usize) -> Self {
        Self {
            counter: 0,
            index: 0,
            len,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.index = 0;
    }

    /// Count one tick. Returns true when the visible tip changed.
    pub fn on_tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter < TIP_ROTATION_TICKS {
            return false;
        }
        self.counter = 0;
        if self.len == 0 {
            return false;
        }
        self.index = (self.index + 1) % self.len;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_ticks_at_second_zero() {
        assert_eq!(check_tick(0.0, -1), (true, 0));
        assert_eq!(check_tick(0.4, 0), (false, 0));
        assert_eq!(check_tick(1.0, 0), (true, 1));
    }

    #[test]
    fn test_check_tick_is_idempotent() {
        let (fired, last) = check_tick(3.7, 2);
        assert!(fired);
        assert_eq!(check_tick(3.7, last), (false, 3));
    }

    #[test]
    fn test_skipped_boundaries_collapse_into_one_tick() {
        let (fired, last) = check_tick(9.2, 1);
        assert!(fired);
        assert_eq!(last, 9);
        assert_eq!(check_tick(9.9, last), (false, 9));
    }

    #[test]
    fn test_non_finite_elapsed_never_ticks() {
        assert_eq!(check_tick(f64::NAN, 4), (false, 4));
        assert_eq!(check_tick(f64::INFINITY, 4), (false, 4));
    }

    #[test]
    fn test_countdown_reaches_zero_once() {
        let mut countdown = Countdown::new(Some(3));
        assert!(!countdown.decrement());
        assert!(!countdown.decrement());
        assert!(countdown.decrement());
        assert_eq!(countdown.remaining(), Some(0));
        assert!(countdown.has_expired());

        assert!(!countdown.decrement());
        assert_eq!(countdown.remaining(), Some(0));
    }

    #[test]
    fn test_unbounded_countdown_never_expires() {
        let mut countdown = Countdown::unbounded();
        for _ in 0..1_000 {
            assert!(!countdown.decrement());
        }
        assert_eq!(countdown.remaining(), None);
        assert!(!countdown.has_expired());
        assert!(!countdown.is_bounded());
    }

    #[test]
    fn test_tip_rotation_every_fifteen_ticks_and_wraps() {
        let mut tips = TipRotation::new(2);
        for _ in 0..14 {
            assert!(!tips.on_tick());
        }
        assert!(tips.on_tick());
        assert_eq!(tips.index(), 1);

        for _ in 0..15 {
            tips.on_tick();
        }
        assert_eq!(tips.index(), 0);
    }

    #[test]
    fn test_tip_rotation_with_no_tips() {
        let mut tips = TipRotation::new(0);
        for _ in 0..30 {
            assert!(!tips.on_tick());
        }
        assert_eq!(tips.index(), 0);
    }
}

use crate::config::BreathConfig;

/// Largest progress value ever reported; a phase boundary belongs to the next phase.
pub const MAX_PROGRESS: f64 = 1.0 - f64::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Phase {
    Inhale,
    Exhale,
    Hold,
}

impl Phase {
    pub fn cue(&self) -> &'static str {
        match self {
            Phase::Inhale => "breathe in",
            Phase::Exhale => "breathe out",
            Phase::Hold => "hold",
        }
    }
}

/// Where a session is inside its breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseState {
    pub phase: Phase,
    /// Fraction of the current phase completed, in `[0, 1)`.
    pub progress: f64,
    pub cycle_index: u64,
}

impl Default for PhaseState {
    fn default() -> Self {
        Self {
            phase: Phase::Inhale,
            progress: 0.0,
            cycle_index: 0,
        }
    }
}

/// Map elapsed session time onto the breathing cycle described by `config`.
///
/// The cycle is inhale, then exhale, then hold. A zero-length phase reports
/// zero progress instead of dividing by zero, and a config without a positive
/// cycle length resolves to the start of the first inhale.
pub fn resolve(elapsed_secs: f64, config: &BreathConfig) -> PhaseState {
    let inhale = config.inhale_secs;
    let exhale = config.exhale_secs;
    let hold = config.hold_secs;
    let cycle_len = config.cycle_secs();

    if !(cycle_len > 0.0) || !cycle_len.is_finite() || !elapsed_secs.is_finite() {
        return PhaseState::default();
    }

    let elapsed = elapsed_secs.max(0.0);
    let cycle_index = (elapsed / cycle_len).floor() as u64;
    let time_in_cycle = elapsed % cycle_len;

    let (phase, progress) = if time_in_cycle < inhale {
        (Phase::Inhale, fraction(time_in_cycle, inhale))
    } else if time_in_cycle < inhale + exhale {
        (Phase::Exhale, fraction(time_in_cycle - inhale, exhale))
    } else {
        (Phase::Hold, fraction(time_in_cycle - inhale - exhale, hold))
    };

    PhaseState {
        phase,
        progress: progress.clamp(0.0, MAX_PROGRESS),
        cycle_index,
    }
}

fn fraction(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

use std::f64::consts::PI;

use crate::config::BreathConfig;
use crate::phase::{Phase, PhaseState};

/// Cycles over which the circle grows into its full swing.
pub const RAMP_CYCLES: u64 = 3;

/// Warm-up factor applied to the circle's swing for the first cycles.
pub fn ramp(cycle_index: u64) -> f64 {
    if cycle_index < RAMP_CYCLES {
        0.8 + 0.06 * cycle_index as f64
    } else {
        1.0
    }
}

/// Circle radius as a fraction of the drawing area, in `[0.5, 1.0]`.
pub fn circle_scale(state: &PhaseState, amplitude: f64) -> f64 {
    let swing = 0.5 * amplitude.clamp(0.0, 1.0) * ramp(state.cycle_index);
    match state.phase {
        Phase::Inhale => 0.5 + swing * state.progress,
        Phase::Exhale => 0.5 + swing * (1.0 - state.progress),
        Phase::Hold => 0.5,
    }
}

/// Height of the breathing wave for a phase at `progress`, in `[-amplitude, amplitude]`.
pub fn wave_height(phase: Phase, progress: f64, amplitude: f64) -> f64 {
    let shape = match phase {
        Phase::Inhale => -(PI * progress).cos(),
        Phase::Exhale => (PI * progress).cos(),
        Phase::Hold => -1.0,
    };
    shape * amplitude
}

/// One full cycle of the wave, `samples` points from 0 to the cycle length (seconds on x).
pub fn wave_points(config: &BreathConfig, samples: usize) -> Vec<(f64, f64)> {
    let cycle = config.cycle_secs();
    if samples < 2 || !(cycle > 0.0) {
        return Vec::new();
    }
    (0..samples)
        .map(|i| {
            let x = cycle * i as f64 / (samples - 1) as f64;
            let state = crate::phase::resolve(x.min(cycle - 1e-9), config);
            (x, wave_height(state.phase, state.progress, config.amplitude))
        })
        .collect()
}

/// Where `state` sits on the plot produced by [`wave_points`].
pub fn wave_marker(state: &PhaseState, config: &BreathConfig) -> (f64, f64) {
    let offset = match state.phase {
        Phase::Inhale => state.progress * config.inhale_secs,
        Phase::Exhale => config.inhale_secs + state.progress * config.exhale_secs,
        Phase::Hold => config.inhale_secs + config.exhale_secs + state.progress * config.hold_secs,
    };
    (
        offset,
        wave_height(state.phase, state.progress, config.amplitude),
    )
}

/// Dot position on the reduced-motion track, in `[0, 1]`.
pub fn track_position(state: &PhaseState) -> f64 {
    match state.phase {
        Phase::Inhale => 0.4 * state.progress,
        Phase::Exhale => 0.4 + 0.4 * state.progress,
        Phase::Hold => 0.8 + 0.2 * state.progress,
    }
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(phase: Phase, progress: f64, cycle_index: u64) -> PhaseState {
        PhaseState {
            phase,
            progress,
            cycle_index,
        }
    }

    #[test]
    fn test_ramp_reaches_full_swing_after_three_cycles() {
        assert_eq!(ramp(0), 0.8);
        assert!((ramp(2) - 0.92).abs() < 1e-12);
        assert_eq!(ramp(3), 1.0);
        assert_eq!(ramp(400), 1.0);
    }

    #[test]
    fn test_circle_scale_follows_phase() {
        assert_eq!(circle_scale(&state(Phase::Inhale, 0.0, 5), 1.0), 0.5);
        assert!((circle_scale(&state(Phase::Inhale, 0.5, 5), 1.0) - 0.75).abs() < 1e-12);
        assert!((circle_scale(&state(Phase::Exhale, 0.0, 5), 0.8) - 0.9).abs() < 1e-12);
        assert_eq!(circle_scale(&state(Phase::Hold, 0.3, 5), 1.0), 0.5);
        // first cycle is damped
        assert!((circle_scale(&state(Phase::Exhale, 0.0, 0), 1.0) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_wave_points_cover_one_cycle() {
        let config = BreathConfig::default();
        let points = wave_points(&config, 101);
        assert_eq!(points.len(), 101);
        assert_eq!(points[0], (0.0, -config.amplitude));
        assert!((points[40].1 - config.amplitude).abs() < 1e-9);
        assert!((points[100].0 - 10.0).abs() < 1e-9);
        assert!(points.iter().all(|(_, y)| y.abs() <= config.amplitude + 1e-12));
        assert!(wave_points(&config, 1).is_empty());
    }

    #[test]
    fn test_wave_marker_matches_wave() {
        let config = BreathConfig::default();
        let (x, y) = wave_marker(&state(Phase::Exhale, 0.5, 2), &config);
        assert_eq!(x, 7.0);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn test_track_position_segments() {
        assert_eq!(track_position(&state(Phase::Inhale, 0.0, 0)), 0.0);
        assert!((track_position(&state(Phase::Inhale, 0.5, 0)) - 0.2).abs() < 1e-12);
        assert!((track_position(&state(Phase::Exhale, 0.5, 0)) - 0.6).abs() < 1e-12);
        assert!((track_position(&state(Phase::Hold, 0.5, 0)) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(10.0), "10");
        assert_eq!(format_label(12.5), "12.5");
    }
}

use breathr::audio::CountingAudio;
use breathr::config::{BreathConfig, SessionDuration};
use breathr::phase::{resolve, Phase};
use breathr::runtime::{FrameDriver, ScriptedFrames, SyntheticFrames};
use breathr::session::{ScreenKind, SessionController};
use breathr::tick::{check_tick, Countdown};
use proptest::prelude::*;

fn calm() -> BreathConfig {
    BreathConfig::default()
}

fn controller(duration: SessionDuration) -> SessionController {
    SessionController::new(
        BreathConfig {
            duration,
            ..calm()
        },
        8,
    )
}

fn one_tick_per_second(c: &mut SessionController, audio: &mut CountingAudio, ticks: u32) {
    for i in 0..ticks {
        c.tick(i as f64 * 1_000.0, audio);
    }
}

#[test]
fn scenario_phase_lookups() {
    let at = |e: f64| resolve(e, &calm());

    let s = at(2.0);
    assert_eq!((s.phase, s.cycle_index), (Phase::Inhale, 0));
    assert!((s.progress - 0.5).abs() < 1e-9);

    let s = at(5.0);
    assert_eq!((s.phase, s.cycle_index), (Phase::Exhale, 0));
    assert!((s.progress - 1.0 / 6.0).abs() < 1e-4);

    let s = at(11.0);
    assert_eq!((s.phase, s.cycle_index), (Phase::Inhale, 1));
    assert!((s.progress - 0.25).abs() < 1e-9);
}

#[test]
fn scenario_calibration_expiry_stays_on_calibration() {
    let mut c = controller(SessionDuration::Minutes(5));
    let mut audio = CountingAudio::default();
    c.start_session(true).unwrap();

    one_tick_per_second(&mut c, &mut audio, 61);

    assert_eq!(c.remaining_secs(), Some(0));
    assert!(!c.is_running());
    assert_eq!(c.screen(), ScreenKind::Calibration);
}

#[test]
fn scenario_timed_session_expiry_goes_to_summary() {
    let mut c = controller(SessionDuration::Minutes(5));
    let mut audio = CountingAudio::default();
    c.start_session(false).unwrap();

    one_tick_per_second(&mut c, &mut audio, 300);

    assert_eq!(c.remaining_secs(), Some(0));
    assert!(!c.is_running());
    assert_eq!(c.screen(), ScreenKind::Summary);
    assert_eq!(audio.plays, 300);
}

#[test]
fn scenario_free_session_only_stops_on_request() {
    let mut c = controller(SessionDuration::Free);
    let mut audio = CountingAudio::default();
    c.start_session(false).unwrap();

    let mut frames = SyntheticFrames::new(0.0, 1_000.0).limited(3_600);
    let steps = FrameDriver::new().run(&mut c, &mut frames, &mut audio);

    assert_eq!(steps, 3_600);
    assert_eq!(c.screen(), ScreenKind::Session);
    assert!(c.is_running());

    c.stop();
    assert_eq!(c.screen(), ScreenKind::Setup);
    assert!(!c.frame_requested());
}

#[test]
fn frame_rate_does_not_change_tick_count() {
    for step_ms in [7.0, 16.0, 33.0, 100.0, 250.0] {
        let mut c = controller(SessionDuration::Minutes(2));
        let mut audio = CountingAudio::default();
        c.start_session(false).unwrap();
        FrameDriver::new().run(&mut c, &mut SyntheticFrames::new(1_000.0, step_ms), &mut audio);

        assert_eq!(audio.plays, 120, "step {step_ms} ms");
        assert_eq!(c.screen(), ScreenKind::Summary, "step {step_ms} ms");
    }
}

#[test]
fn pause_gap_is_not_counted() {
    let mut c = controller(SessionDuration::Free);
    let mut audio = CountingAudio::default();
    c.start_session(false).unwrap();

    FrameDriver::new().run(&mut c, &mut ScriptedFrames::new([0.0, 1_500.0, 2_500.0]), &mut audio);
    c.toggle_pause();
    // frames while paused are never requested
    assert_eq!(
        FrameDriver::new().run(&mut c, &mut ScriptedFrames::new([90_000.0]), &mut audio),
        0
    );
    c.toggle_pause();
    FrameDriver::new().run(&mut c, &mut ScriptedFrames::new([100_000.0, 100_400.0]), &mut audio);

    assert!((c.elapsed_secs() - 2.9).abs() < 1e-9);
    assert_eq!(c.clock().last_emitted_second, 2);
}

proptest! {
    #[test]
    fn progress_stays_in_unit_interval(
        inhale in 0.5f64..20.0,
        exhale in 0.5f64..20.0,
        hold in prop_oneof![Just(0.0f64), 0.0f64..10.0],
        elapsed in 0.0f64..100_000.0,
    ) {
        let config = BreathConfig { inhale_secs: inhale, exhale_secs: exhale, hold_secs: hold, ..calm() };
        let s = resolve(elapsed, &config);
        prop_assert!(s.progress >= 0.0 && s.progress < 1.0);
        prop_assert_eq!(s.cycle_index, (elapsed / config.cycle_secs()).floor() as u64);
        if hold == 0.0 {
            prop_assert_ne!(s.phase, Phase::Hold);
        }
    }

    #[test]
    fn cycle_index_is_monotonic(a in 0.0f64..10_000.0, b in 0.0f64..10_000.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(resolve(lo, &calm()).cycle_index <= resolve(hi, &calm()).cycle_index);
    }

    #[test]
    fn emitted_seconds_strictly_increase(deltas in proptest::collection::vec(0.0f64..3.0, 1..200)) {
        let mut last = -1i64;
        let mut elapsed = 0.0;
        for d in deltas {
            elapsed += d;
            let (fired, next) = check_tick(elapsed, last);
            if fired {
                prop_assert!(next > last);
            } else {
                prop_assert_eq!(next, last);
            }
            prop_assert_eq!(check_tick(elapsed, next), (false, next));
            last = next;
        }
    }

    #[test]
    fn countdown_never_goes_negative_and_expires_once(total in 1u32..500, extra in 0u32..50) {
        let mut countdown = Countdown::new(Some(total));
        let mut expiries = 0;
        for _ in 0..(total + extra) {
            if countdown.decrement() {
                expiries += 1;
            }
        }
        prop_assert_eq!(expiries, 1);
        prop_assert_eq!(countdown.remaining(), Some(0));
    }

    #[test]
    fn irregular_frames_tick_once_per_reached_second(steps in proptest::collection::vec(1.0f64..400.0, 1..300)) {
        let mut c = controller(SessionDuration::Free);
        let mut audio = CountingAudio::default();
        c.start_session(false).unwrap();
        let mut ts = 0.0;
        let mut stamps = vec![0.0];
        for s in &steps {
            ts += s;
            stamps.push(ts);
        }
        FrameDriver::new().run(&mut c, &mut ScriptedFrames::new(stamps), &mut audio);
        let reached = c.elapsed_secs().floor() as u32;
        // steps under a second never skip a boundary
        prop_assert_eq!(audio.plays, reached + 1);
    }
}

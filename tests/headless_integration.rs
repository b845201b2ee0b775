use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use breathr::app::App;
use breathr::config::{BreathConfig, Preferences, SessionDuration};
use breathr::history::HistoryDb;
use breathr::runtime::{AppEvent, FixedTicker, Runner, SyntheticFrames, TestEventSource};
use breathr::session::ScreenKind;

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn app(duration: SessionDuration) -> App {
    let config = BreathConfig {
        duration,
        ..BreathConfig::default()
    };
    App::new(config, Preferences::default())
        .with_history(HistoryDb::in_memory().unwrap())
        // one synthetic frame covers a full second so the loop stays short
        .with_frames(Box::new(SyntheticFrames::new(0.0, 1_000.0)))
}

// Headless integration using the internal runtime + App without a TTY
// Verifies that a timed session runs to the summary and is saved via Runner/TestEventSource.
#[test]
fn headless_timed_session_reaches_summary_and_saves() {
    let mut app = app(SessionDuration::Minutes(2));

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let ticker = FixedTicker::new(Duration::from_millis(1));
    let runner = Runner::new(es, ticker);

    tx.send(key(KeyCode::Enter)).unwrap();

    for _ in 0..1_000u32 {
        match runner.step() {
            AppEvent::Frame => {
                app.on_frame();
            }
            AppEvent::Resize => {}
            AppEvent::Key(k) => {
                app.on_key(k);
            }
        }
        if app.screen() == ScreenKind::Summary {
            break;
        }
    }

    assert_eq!(app.screen(), ScreenKind::Summary, "session should expire into the summary");
    assert_eq!(app.controller.remaining_secs(), Some(0));
    assert!(!app.controller.frame_requested());

    tx.send(key(KeyCode::Char('1'))).unwrap();
    tx.send(key(KeyCode::Enter)).unwrap();
    for _ in 0..10u32 {
        if let AppEvent::Key(k) = runner.step() {
            app.on_key(k);
        }
        if app.screen() == ScreenKind::Setup {
            break;
        }
    }

    assert_eq!(app.screen(), ScreenKind::Setup);
    let history = app.history().unwrap();
    assert_eq!(history.count().unwrap(), 1);
    assert_eq!(history.latest().unwrap().unwrap().total_secs, 119);
}

#[test]
fn headless_free_session_runs_until_stopped() {
    let mut app = app(SessionDuration::Free);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );
    tx.send(key(KeyCode::Enter)).unwrap();

    let mut frames = 0;
    while frames < 900 {
        match runner.step() {
            AppEvent::Frame => {
                if app.on_frame().is_some() {
                    frames += 1;
                }
            }
            AppEvent::Key(k) => {
                app.on_key(k);
            }
            AppEvent::Resize => {}
        }
    }

    assert_eq!(app.screen(), ScreenKind::Session);
    assert!(app.controller.is_running());
    assert_eq!(app.controller.remaining_secs(), None);

    app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    assert_eq!(app.screen(), ScreenKind::Setup);
    assert!(!app.controller.frame_requested());
    assert_eq!(app.history().unwrap().count().unwrap(), 0);
}

#[test]
fn headless_calibration_then_session_keeps_pace() {
    let mut app = app(SessionDuration::Minutes(5));
    app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE));
    for _ in 0..3 {
        app.on_key(KeyEvent::new(KeyCode::Char('+'), KeyModifiers::NONE));
    }
    for _ in 0..10 {
        app.on_frame();
    }
    assert_eq!(app.screen(), ScreenKind::Calibration);
    assert_eq!(app.controller.remaining_secs(), Some(50));

    app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
    assert_eq!(app.screen(), ScreenKind::Session);
    assert_eq!(app.controller.config().inhale_secs, 5.5);
    assert_eq!(app.controller.config().exhale_secs, 7.5);
    assert_eq!(app.controller.remaining_secs(), Some(300));
    assert_eq!(app.controller.elapsed_secs(), 0.0);
}

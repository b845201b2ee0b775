use thiserror::Error;
use tracing::{debug, info};

use crate::audio::AudioCue;
use crate::clock::SessionClock;
use crate::config::{BreathConfig, ConfigError};
use crate::phase::{resolve, PhaseState};
use crate::runtime::FrameSubscription;
use crate::tick::{check_tick, Countdown, TipRotation};

/// Countdown budget of a calibration run, in seconds.
pub const CALIBRATION_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum ScreenKind {
    Setup,
    Calibration,
    Session,
    Summary,
}

impl ScreenKind {
    /// The lifecycle's transition table. Returning to setup is always allowed.
    pub fn can_transition_to(self, next: ScreenKind) -> bool {
        use ScreenKind::*;
        matches!(
            (self, next),
            (Setup, Calibration) | (Setup, Session) | (Session, Summary) | (_, Setup)
        )
    }

    pub fn is_active_run(self) -> bool {
        matches!(self, ScreenKind::Calibration | ScreenKind::Session)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: ScreenKind, to: ScreenKind },
    #[error("the configuration cannot change while a session is running")]
    ConfigLocked,
}

/// Everything one frame step produced, for renderers and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    pub elapsed_secs: f64,
    pub phase: PhaseState,
    pub ticked: bool,
    pub expired: bool,
    pub tip_advanced: bool,
    pub screen: ScreenKind,
}

/// Owns the session lifecycle and all of its timing state.
#[derive(Debug, Clone)]
pub struct SessionController {
    config: BreathConfig,
    screen: ScreenKind,
    clock: SessionClock,
    phase: PhaseState,
    countdown: Countdown,
    tips: TipRotation,
    frames: FrameSubscription,
}

impl SessionController {
    pub fn new(config: BreathConfig, tip_count: usize) -> Self {
        Self {
            config,
            screen: ScreenKind::Setup,
            clock: SessionClock::new(),
            phase: PhaseState::default(),
            countdown: Countdown::unbounded(),
            tips: TipRotation::new(tip_count),
            frames: FrameSubscription::default(),
        }
    }

    pub fn config(&self) -> &BreathConfig {
        &self.config
    }

    pub fn screen(&self) -> ScreenKind {
        self.screen
    }

    pub fn phase(&self) -> PhaseState {
        self.phase
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    pub fn is_running(&self) -> bool {
        self.clock.running
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.clock.elapsed_secs()
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        self.countdown.remaining()
    }

    pub fn tip_index(&self) -> usize {
        self.tips.index()
    }

    pub fn frames(&self) -> &FrameSubscription {
        &self.frames
    }

    /// Whether the host should schedule another frame for this controller.
    pub fn frame_requested(&self) -> bool {
        self.frames.is_pending()
    }

    pub fn is_config_locked(&self) -> bool {
        self.screen == ScreenKind::Session && self.clock.running
    }

    /// Replace the configuration after validating it.
    pub fn set_config(&mut self, config: BreathConfig) -> Result<(), SessionError> {
        if self.is_config_locked() {
            return Err(SessionError::ConfigLocked);
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Begin a calibration run or a breathing session from setup.
    pub fn start_session(&mut self, is_calibration: bool) -> Result<(), SessionError> {
        let target = if is_calibration {
            ScreenKind::Calibration
        } else {
            ScreenKind::Session
        };
        if !self.screen.can_transition_to(target) {
            return Err(SessionError::InvalidTransition {
                from: self.screen,
                to: target,
            });
        }
        self.config.validate()?;

        self.clock.reset();
        self.phase = PhaseState::default();
        self.tips.reset();
        self.countdown = if is_calibration {
            Countdown::new(Some(CALIBRATION_SECS))
        } else {
            Countdown::new(self.config.duration.countdown_secs())
        };

        self.transition(target);
        self.clock.running = true;
        self.frames.request();

        info!(
            screen = %self.screen,
            inhale = self.config.inhale_secs,
            exhale = self.config.exhale_secs,
            hold = self.config.hold_secs,
            remaining = ?self.countdown.remaining(),
            "run started"
        );
        Ok(())
    }

    /// Leave calibration and immediately start a real session with the calibrated pace.
    pub fn start_from_calibration(&mut self) -> Result<(), SessionError> {
        if self.screen != ScreenKind::Calibration {
            return Err(SessionError::InvalidTransition {
                from: self.screen,
                to: ScreenKind::Session,
            });
        }
        self.stop();
        self.start_session(false)
    }

    /// One frame step: clock, then phase, then tick side effects, then transitions.
    ///
    /// Returns `None`, and releases the frame request, when the run is not active.
    pub fn tick(&mut self, frame_ms: f64, audio: &mut dyn AudioCue) -> Option<FrameOutcome> {
        if !self.clock.running {
            self.frames.cancel();
            return None;
        }

        let elapsed_secs = self.clock.advance(frame_ms);
        self.phase = resolve(elapsed_secs, &self.config);

        let (ticked, last_second) = check_tick(elapsed_secs, self.clock.last_emitted_second);
        let mut expired = false;
        let mut tip_advanced = false;
        if ticked {
            self.clock.last_emitted_second = last_second;
            audio.play_tick();
            if self.screen.is_active_run() {
                expired = self.countdown.decrement();
            }
            tip_advanced = self.tips.on_tick();
            debug!(second = last_second, remaining = ?self.countdown.remaining(), "tick");
        }

        if expired {
            self.clock.running = false;
            info!(screen = %self.screen, elapsed_secs, "countdown expired");
            self.settle_expiry();
        }

        if self.clock.running {
            self.frames.request();
        } else {
            self.frames.cancel();
        }

        Some(FrameOutcome {
            elapsed_secs,
            phase: self.phase,
            ticked,
            expired,
            tip_advanced,
            screen: self.screen,
        })
    }

    /// Pause or resume the current run. Returns the new running state.
    ///
    /// Has no effect outside calibration/session or once the countdown expired.
    pub fn toggle_pause(&mut self) -> bool {
        if !self.screen.is_active_run() || self.countdown.has_expired() {
            return self.clock.running;
        }
        self.clock.running = !self.clock.running;
        self.clock.clear_baseline();
        if self.clock.running {
            self.frames.request();
        } else {
            self.frames.cancel();
        }
        info!(running = self.clock.running, elapsed = self.clock.elapsed_secs(), "pause toggled");
        self.clock.running
    }

    /// Stop whatever is happening and return to setup.
    pub fn stop(&mut self) {
        self.clock.running = false;
        self.clock.clear_baseline();
        self.frames.cancel();
        if self.screen != ScreenKind::Setup {
            info!(from = %self.screen, elapsed = self.clock.elapsed_secs(), "run stopped");
        }
        self.transition(ScreenKind::Setup);
    }

    /// Calibration "slower" button. Ignored on other screens.
    pub fn slow_down(&mut self) -> bool {
        if self.screen != ScreenKind::Calibration {
            return false;
        }
        self.config = self.config.slower();
        true
    }

    /// Calibration "faster" button. Ignored on other screens.
    pub fn speed_up(&mut self) -> bool {
        if self.screen != ScreenKind::Calibration {
            return false;
        }
        self.config = self.config.faster();
        true
    }

    // Only a timed session that actually ran ends in the summary.
    fn settle_expiry(&mut self) {
        if self.screen == ScreenKind::Session
            && !self.clock.running
            && self.countdown.is_at_zero()
            && self.clock.has_accumulated()
        {
            self.transition(ScreenKind::Summary);
        }
    }

    fn transition(&mut self, next: ScreenKind) {
        debug_assert!(self.screen.can_transition_to(next));
        if self.screen != next {
            debug!(from = %self.screen, to = %next, "screen transition");
        }
        self.screen = next;
    }
}

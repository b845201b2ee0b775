use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::audio::{AudioCue, NullAudio};
use crate::config::{BreathConfig, Preferences, PreferencesStore};
use crate::history::{HistoryDb, SessionRecord};
use crate::runtime::{FrameDriver, FrameSource, MonotonicFrameSource};
use crate::session::{FrameOutcome, ScreenKind, SessionController, SessionError};
use crate::tips::TipSet;
use crate::ui::screen::current_screen;

/// Volume change applied by the setup screen's `v`/`V` keys.
pub const VOLUME_STEP: f64 = 0.1;

/// Everything the terminal front end needs: the engine plus its collaborators.
pub struct App {
    pub controller: SessionController,
    pub prefs: Preferences,
    pub tips: TipSet,
    /// Record prepared on the way into the summary, saved on finish.
    pub pending: Option<SessionRecord>,
    /// Most recent saved record, shown on the setup screen.
    pub last_record: Option<SessionRecord>,
    /// One-line status shown on setup, e.g. a rejected edit.
    pub notice: Option<String>,
    pub should_quit: bool,
    store: Option<Box<dyn PreferencesStore>>,
    history: Option<HistoryDb>,
    audio: Box<dyn AudioCue>,
    frames: Box<dyn FrameSource>,
    driver: FrameDriver,
}

impl App {
    pub fn new(config: BreathConfig, prefs: Preferences) -> Self {
        let tips = TipSet::builtin();
        let mut app = Self {
            controller: SessionController::new(config.sanitized(), tips.len()),
            prefs,
            tips,
            pending: None,
            last_record: None,
            notice: None,
            should_quit: false,
            store: None,
            history: None,
            audio: Box::new(NullAudio),
            frames: Box::new(MonotonicFrameSource::new()),
            driver: FrameDriver::new(),
        };
        app.sync_audio();
        app
    }

    pub fn with_store(mut self, store: Box<dyn PreferencesStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_history(mut self, history: HistoryDb) -> Self {
        self.last_record = match history.latest() {
            Ok(rec) => rec,
            Err(err) => {
                warn!(%err, "could not read session history");
                None
            }
        };
        self.history = Some(history);
        self
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioCue>) -> Self {
        self.audio = audio;
        self.sync_audio();
        self
    }

    pub fn with_frames(mut self, frames: Box<dyn FrameSource>) -> Self {
        self.frames = frames;
        self
    }

    pub fn screen(&self) -> ScreenKind {
        self.controller.screen()
    }

    pub fn history(&self) -> Option<&HistoryDb> {
        self.history.as_ref()
    }

    pub fn current_tip(&self) -> Option<&str> {
        self.tips.get(self.controller.tip_index())
    }

    /// Advance the engine by one frame if it asked for one.
    pub fn on_frame(&mut self) -> Option<FrameOutcome> {
        let outcome = self
            .driver
            .step(&mut self.controller, self.frames.as_mut(), self.audio.as_mut())?;
        if outcome.expired && outcome.screen == ScreenKind::Summary {
            let record = SessionRecord::from_controller(&self.controller);
            info!(id = %record.id, secs = record.total_secs, cycles = record.cycles, "session complete");
            self.pending = Some(record);
        }
        Some(outcome)
    }

    /// Global keys first, then the active screen's handler.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return true;
        }
        let screen = current_screen(self.screen());
        screen.on_key(key, self)
    }

    /// Leave the app. A session sitting on the summary is saved first.
    pub fn quit(&mut self) {
        if self.screen() == ScreenKind::Summary {
            self.finish_summary();
        }
        self.controller.stop();
        self.should_quit = true;
    }

    pub fn start(&mut self, is_calibration: bool) {
        self.pending = None;
        let result = self.controller.start_session(is_calibration);
        self.report(result);
    }

    pub fn start_from_calibration(&mut self) {
        let result = self.controller.start_from_calibration();
        self.report(result);
    }

    pub fn update_config(&mut self, edit: impl FnOnce(BreathConfig) -> BreathConfig) {
        let next = edit(*self.controller.config());
        let result = self.controller.set_config(next);
        self.report(result);
    }

    /// Save the pending record (if any) and go back to setup.
    pub fn finish_summary(&mut self) {
        if let Some(record) = self.pending.take() {
            if let Some(history) = &self.history {
                if let Err(err) = history.record(&record) {
                    warn!(%err, "could not save session");
                }
            }
            self.last_record = Some(record);
        }
        self.controller.stop();
    }

    pub fn update_prefs(&mut self, edit: impl FnOnce(&mut Preferences)) {
        edit(&mut self.prefs);
        self.prefs.audio_volume = self.prefs.audio_volume.clamp(0.0, 1.0);
        self.sync_audio();
        self.save_prefs();
    }

    pub fn save_prefs(&self) {
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&self.prefs) {
                warn!(%err, "could not save preferences");
            }
        }
    }

    fn sync_audio(&mut self) {
        self.audio.update_settings(
            self.prefs.audio_volume,
            self.prefs.is_muted,
            self.prefs.silent_mode,
        );
    }

    fn report(&mut self, result: Result<(), SessionError>) {
        match result {
            Ok(()) => self.notice = None,
            Err(err) => {
                warn!(%err, "action rejected");
                self.notice = Some(err.to_string());
            }
        }
    }
}

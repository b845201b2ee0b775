use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Calibration never lets inhale or exhale drop below this.
pub const CALIBRATION_FLOOR_SECS: f64 = 2.0;
/// Step used for every timing adjustment, in seconds.
pub const PACE_STEP_SECS: f64 = 0.5;
/// Smallest inhale/exhale accepted from setup edits.
pub const MIN_PHASE_SECS: f64 = 0.5;
pub const AMPLITUDE_STEP: f64 = 0.05;
pub const MIN_AMPLITUDE: f64 = 0.5;
pub const MAX_AMPLITUDE: f64 = 1.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("inhale must be longer than zero seconds (got {0})")]
    NonPositiveInhale(f64),
    #[error("exhale must be longer than zero seconds (got {0})")]
    NonPositiveExhale(f64),
    #[error("hold cannot be negative (got {0})")]
    NegativeHold(f64),
    #[error("a breathing cycle needs a positive total length")]
    EmptyCycle,
    #[error("session duration must be at least one minute")]
    ZeroDuration,
    #[error("amplitude must be between 0 and 1 (got {0})")]
    AmplitudeOutOfRange(f64),
    #[error("invalid duration '{0}': expected a number of minutes or 'free'")]
    InvalidDuration(String),
}

/// How long a session runs before its countdown expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionDuration {
    Minutes(u32),
    Free,
}

impl SessionDuration {
    /// Durations offered on the setup screen, in display order.
    pub const CHOICES: [SessionDuration; 4] = [
        SessionDuration::Minutes(2),
        SessionDuration::Minutes(5),
        SessionDuration::Minutes(10),
        SessionDuration::Free,
    ];

    /// Countdown budget in seconds, `None` for a free session.
    pub fn countdown_secs(&self) -> Option<u32> {
        match self {
            SessionDuration::Minutes(m) => Some(m.saturating_mul(60)),
            SessionDuration::Free => None,
        }
    }

    /// Next entry of [`Self::CHOICES`], wrapping. Custom values restart the list.
    pub fn next(self) -> Self {
        match Self::CHOICES.iter().position(|d| *d == self) {
            Some(i) => Self::CHOICES[(i + 1) % Self::CHOICES.len()],
            None => Self::CHOICES[0],
        }
    }

    pub fn label(&self) -> String {
        match self {
            SessionDuration::Minutes(m) => format!("{m} min"),
            SessionDuration::Free => "free".to_string(),
        }
    }
}

impl FromStr for SessionDuration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("free") {
            return Ok(SessionDuration::Free);
        }
        match trimmed.parse::<u32>() {
            Ok(0) => Err(ConfigError::ZeroDuration),
            Ok(m) => Ok(SessionDuration::Minutes(m)),
            Err(_) => Err(ConfigError::InvalidDuration(s.to_string())),
        }
    }
}

/// Which timing a setup edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PhaseField {
    Inhale,
    Exhale,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, strum_macros::Display)]
pub enum PresetId {
    Calm,
    Focus,
    Sleep,
    Recover,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub id: PresetId,
    pub name: &'static str,
    pub inhale_secs: f64,
    pub exhale_secs: f64,
    pub hold_secs: f64,
}

pub const PRESETS: [Preset; 4] = [
    Preset {
        id: PresetId::Calm,
        name: "Calm",
        inhale_secs: 4.0,
        exhale_secs: 6.0,
        hold_secs: 0.0,
    },
    Preset {
        id: PresetId::Focus,
        name: "Focus",
        inhale_secs: 4.0,
        exhale_secs: 4.0,
        hold_secs: 0.0,
    },
    Preset {
        id: PresetId::Sleep,
        name: "Sleep",
        inhale_secs: 4.0,
        exhale_secs: 6.0,
        hold_secs: 2.0,
    },
    Preset {
        id: PresetId::Recover,
        name: "Recover",
        inhale_secs: 5.0,
        exhale_secs: 5.0,
        hold_secs: 0.0,
    },
];

impl PresetId {
    pub fn preset(&self) -> &'static Preset {
        match self {
            PresetId::Calm => &PRESETS[0],
            PresetId::Focus => &PRESETS[1],
            PresetId::Sleep => &PRESETS[2],
            PresetId::Recover => &PRESETS[3],
        }
    }
}

/// Timing and shape of one breathing exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathConfig {
    pub inhale_secs: f64,
    pub exhale_secs: f64,
    pub hold_secs: f64,
    pub duration: SessionDuration,
    pub amplitude: f64,
}

impl Default for BreathConfig {
    fn default() -> Self {
        Self {
            inhale_secs: 4.0,
            exhale_secs: 6.0,
            hold_secs: 0.0,
            duration: SessionDuration::Minutes(5),
            amplitude: 0.8,
        }
    }
}

impl BreathConfig {
    pub fn cycle_secs(&self) -> f64 {
        self.inhale_secs + self.exhale_secs + self.hold_secs
    }

    pub fn breaths_per_minute(&self) -> f64 {
        let cycle = self.cycle_secs();
        if cycle > 0.0 {
            60.0 / cycle
        } else {
            0.0
        }
    }

    /// Reject anything the phase resolver cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // written as negated comparisons so NaN is rejected too
        if !(self.inhale_secs > 0.0) {
            return Err(ConfigError::NonPositiveInhale(self.inhale_secs));
        }
        if !(self.exhale_secs > 0.0) {
            return Err(ConfigError::NonPositiveExhale(self.exhale_secs));
        }
        if !(self.hold_secs >= 0.0) {
            return Err(ConfigError::NegativeHold(self.hold_secs));
        }
        if !(self.cycle_secs() > 0.0) || !self.cycle_secs().is_finite() {
            return Err(ConfigError::EmptyCycle);
        }
        if self.duration == SessionDuration::Minutes(0) {
            return Err(ConfigError::ZeroDuration);
        }
        if !(0.0..=1.0).contains(&self.amplitude) {
            return Err(ConfigError::AmplitudeOutOfRange(self.amplitude));
        }
        Ok(())
    }

    /// Clamp every field into its valid range. The result always validates.
    pub fn sanitized(self) -> Self {
        let phase = |v: f64| {
            if v.is_finite() && v > 0.0 {
                v
            } else {
                MIN_PHASE_SECS
            }
        };
        let hold = if self.hold_secs.is_finite() && self.hold_secs > 0.0 {
            self.hold_secs
        } else {
            0.0
        };
        let amplitude = if self.amplitude.is_finite() {
            self.amplitude.clamp(0.0, 1.0)
        } else {
            BreathConfig::default().amplitude
        };
        let duration = match self.duration {
            SessionDuration::Minutes(0) => SessionDuration::Minutes(1),
            d => d,
        };

        Self {
            inhale_secs: phase(self.inhale_secs),
            exhale_secs: phase(self.exhale_secs),
            hold_secs: hold,
            duration,
            amplitude,
        }
    }

    pub fn with_preset(self, preset: &Preset) -> Self {
        Self {
            inhale_secs: preset.inhale_secs,
            exhale_secs: preset.exhale_secs,
            hold_secs: preset.hold_secs,
            ..self
        }
    }

    pub fn matches_preset(&self, preset: &Preset) -> bool {
        self.inhale_secs == preset.inhale_secs
            && self.exhale_secs == preset.exhale_secs
            && self.hold_secs == preset.hold_secs
    }

    pub fn active_preset(&self) -> Option<&'static Preset> {
        PRESETS.iter().find(|p| self.matches_preset(p))
    }

    /// Calibration "slower": inhale and exhale both grow by one step.
    pub fn slower(self) -> Self {
        Self {
            inhale_secs: self.inhale_secs + PACE_STEP_SECS,
            exhale_secs: self.exhale_secs + PACE_STEP_SECS,
            ..self
        }
    }

    /// Calibration "faster": both shrink by one step, never below the floor.
    pub fn faster(self) -> Self {
        Self {
            inhale_secs: (self.inhale_secs - PACE_STEP_SECS).max(CALIBRATION_FLOOR_SECS),
            exhale_secs: (self.exhale_secs - PACE_STEP_SECS).max(CALIBRATION_FLOOR_SECS),
            ..self
        }
    }

    /// Setup edit of a single timing by `steps` increments.
    ///
    /// Lowering never pushes a value up to the floor; a value already below
    /// it (e.g. from the command line) stays where it is.
    pub fn adjust(self, field: PhaseField, steps: i32) -> Self {
        let delta = PACE_STEP_SECS * steps as f64;
        match field {
            PhaseField::Inhale => Self {
                inhale_secs: step_with_floor(self.inhale_secs, delta, MIN_PHASE_SECS),
                ..self
            },
            PhaseField::Exhale => Self {
                exhale_secs: step_with_floor(self.exhale_secs, delta, MIN_PHASE_SECS),
                ..self
            },
            PhaseField::Hold => Self {
                hold_secs: step_with_floor(self.hold_secs, delta, 0.0),
                ..self
            },
        }
    }

    pub fn adjust_amplitude(self, steps: i32) -> Self {
        let raw = self.amplitude + AMPLITUDE_STEP * steps as f64;
        // keep the value on the 0.05 grid so repeated edits don't wander
        let snapped = (raw / AMPLITUDE_STEP).round() * AMPLITUDE_STEP;
        let low = MIN_AMPLITUDE.min(self.amplitude);
        let high = MAX_AMPLITUDE.max(low);
        Self {
            amplitude: snapped.clamp(low, high),
            ..self
        }
    }

    pub fn with_duration(self, duration: SessionDuration) -> Self {
        Self { duration, ..self }
    }
}

fn step_with_floor(current: f64, delta: f64, floor: f64) -> f64 {
    (current + delta).max(floor.min(current))
}

/// User preferences persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Preferences {
    pub dark_mode: bool,
    pub reduce_motion: bool,
    pub audio_volume: f64,
    pub is_muted: bool,
    pub silent_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            reduce_motion: false,
            audio_volume: 0.5,
            is_muted: false,
            silent_mode: false,
        }
    }
}

pub trait PreferencesStore {
    fn load(&self) -> Preferences;
    fn save(&self, prefs: &Preferences) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FilePreferencesStore {
    path: PathBuf,
}

impl FilePreferencesStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "breathr") {
            pd.config_dir().join("prefs.json")
        } else {
            PathBuf::from("breathr_prefs.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FilePreferencesStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferencesStore for FilePreferencesStore {
    fn load(&self) -> Preferences {
        let Ok(bytes) = fs::read(&self.path) else {
            return Preferences::default();
        };
        match serde_json::from_slice::<Preferences>(&bytes) {
            Ok(prefs) => prefs,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring unreadable preferences");
                Preferences::default()
            }
        }
    }

    fn save(&self, prefs: &Preferences) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(prefs).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

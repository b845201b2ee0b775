use std::io::{self, Write};
use tracing::debug;

/// Consumer of the once-per-second tick.
///
/// Implementations decide for themselves whether a tick is audible; the
/// session engine always calls `play_tick` and never looks at the result.
pub trait AudioCue {
    fn play_tick(&mut self);
    fn update_settings(&mut self, volume: f64, muted: bool, silent: bool);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSettings {
    pub volume: f64,
    pub muted: bool,
    pub silent: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            silent: false,
        }
    }
}

impl AudioSettings {
    pub fn is_audible(&self) -> bool {
        !self.muted && !self.silent && self.volume > 0.0
    }
}

/// Rings the terminal bell (BEL) as the tick sound.
#[derive(Debug)]
pub struct TerminalBell<W: Write> {
    out: W,
    settings: AudioSettings,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            settings: AudioSettings::default(),
        }
    }

    pub fn settings(&self) -> AudioSettings {
        self.settings
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioCue for TerminalBell<W> {
    fn play_tick(&mut self) {
        if !self.settings.is_audible() {
            return;
        }
        if let Err(err) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            debug!(%err, "tick sound unavailable");
        }
    }

    fn update_settings(&mut self, volume: f64, muted: bool, silent: bool) {
        self.settings = AudioSettings {
            volume: volume.clamp(0.0, 1.0),
            muted,
            silent,
        };
    }
}

/// Discards every tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioCue for NullAudio {
    fn play_tick(&mut self) {}
    fn update_settings(&mut self, _volume: f64, _muted: bool, _silent: bool) {}
}

/// Counts ticks instead of playing them; used by headless runs and tests.
#[derive(Debug, Default, Clone)]
pub struct CountingAudio {
    pub plays: u32,
    pub settings: AudioSettings,
}

impl AudioCue for CountingAudio {
    fn play_tick(&mut self) {
        self.plays += 1;
    }

    fn update_settings(&mut self, volume: f64, muted: bool, silent: bool) {
        self.settings = AudioSettings {
            volume,
            muted,
            silent,
        };
    }
}

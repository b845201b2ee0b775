use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::audio::AudioCue;
use crate::session::{FrameOutcome, SessionController};

/// Default display refresh for the terminal host, roughly 30 Hz.
pub const FRAME_INTERVAL_MS: u64 = 33;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Frame,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(FRAME_INTERVAL_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/frame at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to one frame interval and returns the next event, or Frame on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Frame,
        }
    }
}

/// Supplies non-decreasing frame timestamps in milliseconds.
pub trait FrameSource {
    /// The next frame's timestamp, or `None` when the source is exhausted.
    fn next_frame(&mut self) -> Option<f64>;
}

/// Wall-clock frame timestamps measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicFrameSource {
    origin: Instant,
}

impl MonotonicFrameSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for MonotonicFrameSource {
    fn next_frame(&mut self) -> Option<f64> {
        Some(self.origin.elapsed().as_secs_f64() * 1_000.0)
    }
}

/// Evenly spaced synthetic frames, optionally limited to a number of frames.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticFrames {
    next_ms: f64,
    step_ms: f64,
    remaining: Option<usize>,
}

impl SyntheticFrames {
    pub fn new(start_ms: f64, step_ms: f64) -> Self {
        Self {
            next_ms: start_ms,
            step_ms,
            remaining: None,
        }
    }

    pub fn limited(mut self, frames: usize) -> Self {
        self.remaining = Some(frames);
        self
    }
}

impl FrameSource for SyntheticFrames {
    fn next_frame(&mut self) -> Option<f64> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        let ts = self.next_ms;
        self.next_ms += self.step_ms;
        Some(ts)
    }
}

/// A fixed script of timestamps, for irregular frame pacing in tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFrames {
    stamps: VecDeque<f64>,
}

impl ScriptedFrames {
    pub fn new<I: IntoIterator<Item = f64>>(stamps: I) -> Self {
        Self {
            stamps: stamps.into_iter().collect(),
        }
    }
}

impl FrameSource for ScriptedFrames {
    fn next_frame(&mut self) -> Option<f64> {
        self.stamps.pop_front()
    }
}

/// Handle for the "give me another frame" request a running session holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSubscription {
    pending: bool,
    requests: u64,
}

impl FrameSubscription {
    pub fn request(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Total number of frames requested over the subscription's life.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

/// Step-and-reschedule loop: keeps feeding frames while the controller asks for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDriver {
    max_steps: Option<usize>,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
        }
    }

    /// Run a single frame if one is requested and the source has one.
    pub fn step<F: FrameSource + ?Sized>(
        &self,
        controller: &mut SessionController,
        frames: &mut F,
        audio: &mut dyn AudioCue,
    ) -> Option<FrameOutcome> {
        if !controller.frame_requested() {
            return None;
        }
        let ts = frames.next_frame()?;
        controller.tick(ts, audio)
    }

    /// Drive frames until the controller stops requesting them, the source is
    /// exhausted, or the step budget runs out. Returns the number of steps taken.
    pub fn run<F: FrameSource + ?Sized>(
        &self,
        controller: &mut SessionController,
        frames: &mut F,
        audio: &mut dyn AudioCue,
    ) -> usize {
        let mut steps = 0;
        while self.max_steps.map_or(true, |max| steps < max) {
            if self.step(controller, frames, audio).is_none() {
                break;
            }
            steps += 1;
        }
        steps
    }
}

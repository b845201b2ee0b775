// Library surface for headless/integration tests and reuse.
// The binary in main.rs only parses flags and owns the terminal.
pub mod app;
pub mod app_dirs;
pub mod audio;
pub mod clock;
pub mod config;
pub mod history;
pub mod phase;
pub mod runtime;
pub mod session;
pub mod tick;
pub mod tips;
pub mod ui;
pub mod util;

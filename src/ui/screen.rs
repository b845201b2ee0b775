use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, VOLUME_STEP};
use crate::config::{PhaseField, PRESETS};
use crate::history::{Comfort, MAX_TENSION};
use crate::session::ScreenKind;
use crate::ui::{render_circle, render_wave, Palette, HORIZONTAL_MARGIN, VERTICAL_MARGIN};
use crate::util::{format_countdown, format_elapsed, humanize_ago};

/// A UI Screen boundary: responsible for rendering and optional key handling
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
    /// Optional per-screen key handling. Returns true if the key was handled.
    fn on_key(&self, _key: KeyEvent, _app: &mut App) -> bool {
        false
    }
}

/// Preset, timing and preference selection.
pub struct SetupScreen;

impl Screen for SetupScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let palette = Palette::for_theme(app.prefs.dark_mode);
        let config = app.controller.config();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3), // title
                Constraint::Length(3), // presets
                Constraint::Length(4), // timings
                Constraint::Length(2), // preferences
                Constraint::Length(2), // last session / notice
                Constraint::Min(0),
                Constraint::Length(3), // legend
            ])
            .split(f.area());

        let title = Paragraph::new("breathr")
            .block(Block::default().borders(Borders::BOTTOM))
            .style(palette.bold().fg(palette.accent))
            .alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        let active = config.active_preset().map(|p| p.id);
        let mut preset_spans = Vec::new();
        for (i, preset) in PRESETS.iter().enumerate() {
            let style = if Some(preset.id) == active {
                palette.bold().fg(palette.accent).add_modifier(Modifier::REVERSED)
            } else {
                palette.dim()
            };
            preset_spans.push(Span::styled(format!(" ({}) {} ", i + 1, preset.name), style));
            preset_spans.push(Span::raw("  "));
        }
        f.render_widget(
            Paragraph::new(Line::from(preset_spans)).alignment(Alignment::Center),
            chunks[1],
        );

        let timings = vec![
            Line::from(format!(
                "inhale {:.1}s   exhale {:.1}s   hold {:.1}s   ({:.1} breaths/min)",
                config.inhale_secs,
                config.exhale_secs,
                config.hold_secs,
                config.breaths_per_minute()
            )),
            Line::from(format!(
                "duration {}   amplitude {:.0}%",
                config.duration.label(),
                config.amplitude * 100.0
            )),
        ];
        f.render_widget(
            Paragraph::new(timings).style(palette.bold()).alignment(Alignment::Center),
            chunks[2],
        );

        let on_off = |b: bool| if b { "on" } else { "off" };
        let prefs = Paragraph::new(format!(
            "volume {:.0}%   mute {}   silent {}   reduce motion {}   theme {}",
            app.prefs.audio_volume * 100.0,
            on_off(app.prefs.is_muted),
            on_off(app.prefs.silent_mode),
            on_off(app.prefs.reduce_motion),
            if app.prefs.dark_mode { "dark" } else { "light" },
        ))
        .style(palette.dim())
        .alignment(Alignment::Center);
        f.render_widget(prefs, chunks[3]);

        let status = if let Some(notice) = &app.notice {
            Span::styled(notice.clone(), Style::default().fg(palette.warn))
        } else if let Some(last) = &app.last_record {
            let age = (chrono::Local::now() - last.date).to_std().unwrap_or_default();
            Span::styled(
                format!(
                    "last session {}: {} over {} cycles",
                    humanize_ago(age),
                    format_elapsed(last.total_secs as f64),
                    last.cycles
                ),
                palette.dim().add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::raw("")
        };
        f.render_widget(
            Paragraph::new(status).alignment(Alignment::Center).wrap(Wrap { trim: true }),
            chunks[4],
        );

        let legend = Paragraph::new(vec![
            Line::from("(1-4) preset / (i/I e/E h/H) timing / (a/A) amplitude / (d) duration"),
            Line::from("(m)ute / (s)ilent / (v/V) volume / (r)educe motion / (t)heme"),
            Line::from("(c)alibrate / (enter) start / (q)uit"),
        ])
        .style(palette.legend())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(legend, chunks[6]);
    }

    fn on_key(&self, key: KeyEvent, app: &mut App) -> bool {
        let KeyCode::Char(c) = key.code else {
            return match key.code {
                KeyCode::Enter => {
                    app.start(false);
                    true
                }
                KeyCode::Esc => {
                    app.quit();
                    true
                }
                _ => false,
            };
        };

        match c {
            '1'..='4' => {
                let preset = PRESETS[c as usize - '1' as usize];
                app.update_config(|cfg| cfg.with_preset(&preset));
            }
            'i' => app.update_config(|cfg| cfg.adjust(PhaseField::Inhale, 1)),
            'I' => app.update_config(|cfg| cfg.adjust(PhaseField::Inhale, -1)),
            'e' => app.update_config(|cfg| cfg.adjust(PhaseField::Exhale, 1)),
            'E' => app.update_config(|cfg| cfg.adjust(PhaseField::Exhale, -1)),
            'h' => app.update_config(|cfg| cfg.adjust(PhaseField::Hold, 1)),
            'H' => app.update_config(|cfg| cfg.adjust(PhaseField::Hold, -1)),
            'a' => app.update_config(|cfg| cfg.adjust_amplitude(1)),
            'A' => app.update_config(|cfg| cfg.adjust_amplitude(-1)),
            'd' => app.update_config(|cfg| cfg.with_duration(cfg.duration.next())),
            'm' => app.update_prefs(|p| p.is_muted = !p.is_muted),
            's' => app.update_prefs(|p| p.silent_mode = !p.silent_mode),
            'r' => app.update_prefs(|p| p.reduce_motion = !p.reduce_motion),
            't' => app.update_prefs(|p| p.dark_mode = !p.dark_mode),
            'v' => app.update_prefs(|p| p.audio_volume += VOLUME_STEP),
            'V' => app.update_prefs(|p| p.audio_volume -= VOLUME_STEP),
            'c' => app.start(true),
            'q' => app.quit(),
            _ => return false,
        }
        true
    }
}

/// Pace exploration with slower/faster controls.
pub struct CalibrationScreen;

impl Screen for CalibrationScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let palette = Palette::for_theme(app.prefs.dark_mode);
        let config = app.controller.config();
        let state = app.controller.phase();
        let chunks = run_layout(f.area());

        let header = if app.controller.countdown().has_expired() {
            "Calibration complete".to_string()
        } else {
            format!(
                "Calibration   {}",
                format_countdown(app.controller.remaining_secs())
            )
        };
        render_header(f, chunks[0], &header, state.phase.cue(), app, palette);
        render_circle(
            f,
            chunks[1],
            &state,
            config.amplitude,
            app.prefs.reduce_motion,
            palette,
        );
        render_wave(f, chunks[2], &state, config, app.prefs.reduce_motion, palette);

        let pace = Paragraph::new(format!(
            "inhale {:.1}s   exhale {:.1}s   {:.1} breaths/min",
            config.inhale_secs,
            config.exhale_secs,
            config.breaths_per_minute()
        ))
        .style(palette.bold())
        .alignment(Alignment::Center);
        f.render_widget(pace, chunks[3]);

        render_legend(
            f,
            chunks[4],
            "(+) slower / (-) faster / (space) pause / (enter) start session / (esc) back",
            palette,
        );
    }

    fn on_key(&self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') => {
                app.controller.slow_down();
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                app.controller.speed_up();
            }
            KeyCode::Char(' ') => {
                app.controller.toggle_pause();
            }
            KeyCode::Enter => app.start_from_calibration(),
            KeyCode::Esc | KeyCode::Char('b') => app.controller.stop(),
            _ => return false,
        }
        true
    }
}

/// The breathing session itself.
pub struct SessionScreen;

impl Screen for SessionScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let palette = Palette::for_theme(app.prefs.dark_mode);
        let config = app.controller.config();
        let state = app.controller.phase();
        let chunks = run_layout(f.area());

        let header = format!(
            "{}   cycle {}",
            format_countdown(app.controller.remaining_secs()),
            state.cycle_index + 1
        );
        let cue = if app.controller.is_running() {
            state.phase.cue()
        } else {
            "paused"
        };
        render_header(f, chunks[0], &header, cue, app, palette);
        render_circle(
            f,
            chunks[1],
            &state,
            config.amplitude,
            app.prefs.reduce_motion,
            palette,
        );
        render_wave(f, chunks[2], &state, config, app.prefs.reduce_motion, palette);

        let tip = Paragraph::new(app.current_tip().unwrap_or_default().to_string())
            .style(palette.dim().add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(tip, chunks[3]);

        render_legend(f, chunks[4], "(space) pause / (esc) end session", palette);
    }

    fn on_key(&self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Char(' ') => {
                app.controller.toggle_pause();
            }
            KeyCode::Esc | KeyCode::Char('q') => app.controller.stop(),
            _ => return false,
        }
        true
    }
}

/// End-of-session results and rating.
pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let palette = Palette::for_theme(app.prefs.dark_mode);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        let title = Paragraph::new("Session complete")
            .block(Block::default().borders(Borders::BOTTOM))
            .style(palette.bold().fg(palette.accent))
            .alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        let config = app.controller.config();
        let (total, cycles) = match &app.pending {
            Some(rec) => (rec.total_secs as f64, rec.cycles),
            None => (app.controller.elapsed_secs(), app.controller.phase().cycle_index),
        };
        let stats = Paragraph::new(vec![
            Line::from(format!("{}   {} cycles", format_elapsed(total), cycles)),
            Line::from(format!(
                "inhale {:.1}s   exhale {:.1}s   hold {:.1}s",
                config.inhale_secs, config.exhale_secs, config.hold_secs
            )),
        ])
        .style(palette.bold())
        .alignment(Alignment::Center);
        f.render_widget(stats, chunks[1]);

        let comfort = app.pending.as_ref().and_then(|r| r.comfort);
        let tension = app.pending.as_ref().and_then(|r| r.tension);
        let mut comfort_spans = vec![Span::styled("comfort ", palette.dim())];
        for (i, option) in [Comfort::Easy, Comfort::Medium, Comfort::Hard].iter().enumerate() {
            let style = if comfort == Some(*option) {
                palette.bold().fg(palette.accent).add_modifier(Modifier::REVERSED)
            } else {
                palette.dim()
            };
            comfort_spans.push(Span::styled(format!(" ({}) {} ", i + 1, option), style));
        }
        let tension_text = match tension {
            Some(t) => format!("tension {t}/{MAX_TENSION}"),
            None => "tension -".to_string(),
        };
        let rating = Paragraph::new(vec![
            Line::from(comfort_spans),
            Line::from(Span::styled(tension_text, palette.dim())),
        ])
        .alignment(Alignment::Center);
        f.render_widget(rating, chunks[2]);

        render_legend(
            f,
            chunks[4],
            "(1/2/3) comfort / (←/→) tension / (enter) finish",
            palette,
        );
    }

    fn on_key(&self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Char(c) if Comfort::from_key(c).is_some() => {
                if let Some(rec) = app.pending.as_mut() {
                    rec.comfort = Comfort::from_key(c);
                }
            }
            KeyCode::Left => {
                if let Some(rec) = app.pending.as_mut() {
                    rec.adjust_tension(-1);
                }
            }
            KeyCode::Right => {
                if let Some(rec) = app.pending.as_mut() {
                    rec.adjust_tension(1);
                }
            }
            KeyCode::Enter | KeyCode::Esc => app.finish_summary(),
            _ => return false,
        }
        true
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(kind: ScreenKind) -> Box<dyn Screen> {
    match kind {
        ScreenKind::Setup => Box::new(SetupScreen),
        ScreenKind::Calibration => Box::new(CalibrationScreen),
        ScreenKind::Session => Box::new(SessionScreen),
        ScreenKind::Summary => Box::new(SummaryScreen),
    }
}

// header, circle, wave, info line, legend
fn run_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(6),
            Constraint::Length(6),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(area)
}

fn render_header(f: &mut Frame, area: Rect, title: &str, cue: &str, app: &App, palette: Palette) {
    let cue_style = Style::default()
        .fg(palette.phase(app.controller.phase().phase))
        .add_modifier(Modifier::BOLD);
    let header = Paragraph::new(vec![
        Line::from(Span::styled(title.to_string(), palette.bold())),
        Line::from(Span::styled(cue.to_string(), cue_style)),
    ])
    .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn render_legend(f: &mut Frame, area: Rect, text: &str, palette: Palette) {
    f.render_widget(
        Paragraph::new(Span::styled(text.to_string(), palette.legend())).alignment(Alignment::Center),
        area,
    );
}

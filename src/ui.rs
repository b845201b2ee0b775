pub mod charting;
pub mod screen;

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle},
        Axis, Chart, Dataset, GraphType, Paragraph,
    },
    Frame,
};

use crate::app::App;
use crate::config::BreathConfig;
use crate::phase::{Phase, PhaseState};
use crate::ui::charting::{circle_scale, format_label, track_position, wave_marker, wave_points};
use crate::ui::screen::current_screen;

pub const HORIZONTAL_MARGIN: u16 = 5;
pub const VERTICAL_MARGIN: u16 = 2;
const WAVE_SAMPLES: usize = 120;
/// Circle size used when motion is reduced.
const STILL_SCALE: f64 = 0.75;

/// Foreground colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub inhale: Color,
    pub exhale: Color,
    pub hold: Color,
    pub warn: Color,
}

impl Palette {
    pub const DARK: Palette = Palette {
        text: Color::White,
        dim: Color::Gray,
        accent: Color::Cyan,
        inhale: Color::LightCyan,
        exhale: Color::LightMagenta,
        hold: Color::LightYellow,
        warn: Color::LightRed,
    };

    pub const LIGHT: Palette = Palette {
        text: Color::Black,
        dim: Color::DarkGray,
        accent: Color::Blue,
        inhale: Color::Blue,
        exhale: Color::Magenta,
        hold: Color::Yellow,
        warn: Color::Red,
    };

    pub fn for_theme(dark_mode: bool) -> Self {
        if dark_mode {
            Self::DARK
        } else {
            Self::LIGHT
        }
    }

    pub fn phase(&self, phase: Phase) -> Color {
        match phase {
            Phase::Inhale => self.inhale,
            Phase::Exhale => self.exhale,
            Phase::Hold => self.hold,
        }
    }

    pub fn bold(&self) -> Style {
        Style::default().fg(self.text).add_modifier(Modifier::BOLD)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn legend(&self) -> Style {
        Style::default().fg(self.dim).add_modifier(Modifier::ITALIC)
    }
}

/// Draw whatever screen the app is on.
pub fn draw(app: &App, f: &mut Frame) {
    current_screen(app.screen()).render(app, f);
}

/// Breathing circle centered in `area`.
pub fn render_circle(
    f: &mut Frame,
    area: Rect,
    state: &PhaseState,
    amplitude: f64,
    reduce_motion: bool,
    palette: Palette,
) {
    let radius = if reduce_motion {
        STILL_SCALE
    } else {
        circle_scale(state, amplitude)
    };
    let color = palette.phase(state.phase);
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius,
                color,
            });
        });
    f.render_widget(canvas, area);
}

/// One-cycle wave with the current position marked, or the plain track when motion is reduced.
pub fn render_wave(
    f: &mut Frame,
    area: Rect,
    state: &PhaseState,
    config: &BreathConfig,
    reduce_motion: bool,
    palette: Palette,
) {
    if reduce_motion {
        f.render_widget(
            Paragraph::new(track_line(state, area.width as usize, palette)).alignment(Alignment::Center),
            area,
        );
        return;
    }

    let points = wave_points(config, WAVE_SAMPLES);
    let marker = [wave_marker(state, config)];
    let cycle = config.cycle_secs();
    let datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(palette.dim())
            .data(&points),
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(palette.phase(state.phase)).add_modifier(Modifier::BOLD))
            .data(&marker),
    ];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .bounds([0.0, cycle])
                .labels(vec![
                    Span::styled("0", palette.dim()),
                    Span::styled(format!("{}s", format_label(cycle)), palette.dim()),
                ]),
        )
        .y_axis(Axis::default().bounds([-1.0, 1.0]));
    f.render_widget(chart, area);
}

/// `──●──────` with the dot at the reduced-motion track position.
pub fn track_line(state: &PhaseState, width: usize, palette: Palette) -> Line<'static> {
    let width = width.saturating_sub(2 * HORIZONTAL_MARGIN as usize).max(3);
    let dot = ((track_position(state) * (width - 1) as f64).round() as usize).min(width - 1);
    Line::from(vec![
        Span::styled("─".repeat(dot), palette.dim()),
        Span::styled("●", Style::default().fg(palette.phase(state.phase))),
        Span::styled("─".repeat(width - 1 - dot), palette.dim()),
    ])
}

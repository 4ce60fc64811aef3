use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, canvas::Canvas},
};

use super::app::App;
use super::picker_ui::draw_picker;
use crate::clip::AudioBackend;
use crate::sampler::PanelSize;
use crate::transport::PlaybackState;

/// Braille dots per terminal cell
const DOTS_PER_COLUMN: u32 = 2;
const DOTS_PER_ROW: u32 = 4;

const TRACE_COLOR: Color = Color::Red;

struct MainLayout {
    title: Rect,
    file: Rect,
    progress: Rect,
    visualization: Rect,
    controls: Rect,
    status: Rect,
}

fn main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // File path
            Constraint::Length(3), // Progress bar + time
            Constraint::Min(5),    // Visualization
            Constraint::Length(2), // Controls
            Constraint::Length(1), // Status
        ])
        .split(area);

    MainLayout {
        title: chunks[0],
        file: chunks[1],
        progress: chunks[2],
        visualization: chunks[3],
        controls: chunks[4],
        status: chunks[5],
    }
}

fn visualization_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

/// Drawing surface of the visualization canvas for a terminal of `area`.
pub fn visualization_panel(area: Rect) -> PanelSize {
    let inner = visualization_block().inner(main_layout(area).visualization);
    PanelSize::new(
        inner.width as u32 * DOTS_PER_COLUMN,
        inner.height as u32 * DOTS_PER_ROW,
    )
}

pub fn draw<B: AudioBackend>(f: &mut Frame, app: &App<B>) {
    let size = f.area();

    draw_main_ui(f, app);

    if let Some(picker) = &app.picker {
        draw_picker(f, size, picker);
    }
}

fn draw_main_ui<B: AudioBackend>(f: &mut Frame, app: &App<B>) {
    let layout = main_layout(f.area());

    let title = Paragraph::new("♫ Bounce Player")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, layout.title);

    draw_file_field(f, layout.file, app);
    draw_progress_bar(f, layout.progress, app);
    draw_visualization(f, layout.visualization, app);
    draw_controls(f, layout.controls, app);
    draw_status(f, layout.status, app);
}

fn draw_file_field<B: AudioBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let (text, style) = match &app.file_path {
        Some(path) => (
            path.display().to_string(),
            Style::default().fg(Color::White),
        ),
        None => (
            "No file selected - press [o] to choose one".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let field = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(" File "));
    f.render_widget(field, area);
}

fn draw_progress_bar<B: AudioBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let progress = app.controller.progress();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),    // Progress bar
            Constraint::Length(17), // Time display
        ])
        .split(area);

    let label_style = if progress.percent >= 50 {
        Style::default()
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(TRACE_COLOR))
        .percent(progress.percent)
        .label(Span::styled(format!("{}%", progress.percent), label_style));
    f.render_widget(gauge, chunks[0]);

    let time_widget = Paragraph::new(progress.label())
        .style(Style::default().fg(TRACE_COLOR))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(time_widget, chunks[1]);
}

fn draw_visualization<B: AudioBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let sampler = app.controller.sampler();
    let panel = sampler.panel();
    let segments = sampler.trace().segments(sampler.stride(), panel.height);
    let height = panel.height as f64;

    let canvas = Canvas::default()
        .block(visualization_block())
        .marker(Marker::Braille)
        .paint(|ctx| {
            // Screen coordinates grow downward, canvas coordinates upward
            for segment in &segments {
                ctx.draw(&ratatui::widgets::canvas::Line {
                    x1: segment.x as f64,
                    y1: height - segment.y_from as f64,
                    x2: segment.x as f64,
                    y2: height - segment.y_to as f64,
                    color: TRACE_COLOR,
                });
            }
        })
        .x_bounds([0.0, panel.width.max(1) as f64])
        .y_bounds([0.0, panel.height.max(1) as f64]);

    f.render_widget(canvas, area);
}

fn draw_controls<B: AudioBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let state = app.controller.state();
    let looping = app.controller.is_looping();

    let controls = vec![
        Span::styled("[o]", Style::default().fg(Color::Blue)),
        Span::raw(" choose  "),
        Span::styled("[p]", Style::default().fg(Color::Green)),
        Span::raw(" play  "),
        if state == PlaybackState::Paused {
            Span::styled("[space]", Style::default().fg(Color::Green))
        } else {
            Span::styled("[space]", Style::default().fg(Color::Yellow))
        },
        Span::raw(if state == PlaybackState::Paused {
            " resume  "
        } else {
            " pause  "
        }),
        if looping {
            Span::styled(
                "[l]",
                Style::default().fg(Color::Magenta).bg(Color::DarkGray),
            )
        } else {
            Span::styled("[l]", Style::default().fg(Color::Magenta))
        },
        Span::raw(if looping { " loop ●  " } else { " loop  " }),
        Span::styled("[q]", Style::default().fg(Color::Red)),
        Span::raw(" quit"),
    ];

    let border_widget = Block::default().borders(Borders::TOP);
    f.render_widget(border_widget, area);

    let row = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(1),
        ..area
    };
    let controls_widget = Paragraph::new(Line::from(controls)).alignment(Alignment::Center);
    f.render_widget(controls_widget, row);
}

fn draw_status<B: AudioBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let status = match &app.status_message {
        Some(message) => Span::styled(message.clone(), Style::default().fg(Color::Yellow)),
        None => match app.controller.state() {
            PlaybackState::Stopped => {
                Span::styled("■ Stopped", Style::default().fg(Color::DarkGray))
            }
            PlaybackState::Playing => Span::styled("▶ Playing", Style::default().fg(Color::Green)),
            PlaybackState::Paused => Span::styled("⏸ Paused", Style::default().fg(Color::Yellow)),
        },
    };

    f.render_widget(Paragraph::new(Line::from(status)), area);
}

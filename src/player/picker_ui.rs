use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use super::picker::{FilePicker, PickerEntry};

pub fn draw_picker(f: &mut Frame, area: Rect, picker: &FilePicker) {
    // Create a centered modal
    let modal_width = 60.min(area.width.saturating_sub(4));
    let modal_height = 20.min(area.height.saturating_sub(4));

    let modal_area = Rect {
        x: (area.width - modal_width) / 2,
        y: (area.height - modal_height) / 2,
        width: modal_width,
        height: modal_height,
    };

    f.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Choose WAV File ")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(block, modal_area);

    let inner_area = modal_area.inner(ratatui::layout::Margin {
        horizontal: 1,
        vertical: 1,
    });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Current path
            Constraint::Min(3),    // Entries
            Constraint::Length(1), // Controls
        ])
        .split(inner_area);

    let path_display = format!("📁 {}", picker.current_path.display());
    let path_widget = Paragraph::new(path_display)
        .style(Style::default().fg(Color::Blue))
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(path_widget, chunks[0]);

    let items: Vec<ListItem> = picker
        .entries
        .iter()
        .map(|entry| {
            let (prefix, style) = match entry {
                PickerEntry::Parent => ("↑ ", Style::default().fg(Color::Gray)),
                PickerEntry::Directory(_) => ("📁 ", Style::default().fg(Color::Blue)),
                PickerEntry::File(_) => ("♪ ", Style::default().fg(Color::White)),
            };
            ListItem::new(format!("{prefix}{}", entry.name())).style(style)
        })
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default().with_selected(Some(picker.selected_index));
    f.render_stateful_widget(list, chunks[1], &mut state);

    let controls = vec![
        Span::styled("[↑↓]", Style::default().fg(Color::Yellow)),
        Span::raw(" move  "),
        Span::styled("[Enter]", Style::default().fg(Color::Green)),
        Span::raw(" open  "),
        Span::styled("[⌫]", Style::default().fg(Color::Magenta)),
        Span::raw(" up  "),
        Span::styled("[Esc]", Style::default().fg(Color::Red)),
        Span::raw(" cancel"),
    ];
    let controls_widget = Paragraph::new(Line::from(controls)).alignment(Alignment::Center);
    f.render_widget(controls_widget, chunks[2]);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, InputField, InputMode};
use crate::format;
use crate::models::{TaskState, Task};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status
            Constraint::Min(0),    // Board
            Constraint::Length(3), // Help
        ].as_ref())
        .split(f.area());

    f.render_widget(status_bar(app), chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3].as_ref())
        .split(chunks[1]);

    for (i, state) in TaskState::ALL.into_iter().enumerate() {
        let rows: Vec<Row> = app.column(state).into_iter().map(task_row).collect();
        let focused = app.focus == state && app.input_mode == InputMode::Normal;
        let border = if focused { Style::default().fg(Color::Cyan) } else { Style::default() };

        let widths = [Constraint::Min(12), Constraint::Length(11), Constraint::Length(19)];
        let table = Table::new(rows, widths)
            .header(Row::new(vec!["Name", "Time", "Window"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1))
            .block(Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!("{} ({})", state, app.board.store().count(state))))
            .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
            .highlight_symbol(if focused { ">> " } else { "   " });

        f.render_stateful_widget(table, columns[i], &mut app.states[i]);
    }

    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | a: Add | Enter/>: Move right | <: Move left | Space: Play/Pause | x: Done | e: Edit | d: Del | J/K: Reorder | r: Rest | +/-: Rest length",
        InputMode::Editing => "Enter: Next/Save | Esc: Cancel",
        InputMode::Adding => "Enter: Add | Esc: Cancel",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if app.board.is_rest_mode() {
        let area = centered_rect(30, 5, f.area());
        f.render_widget(Clear, area);
        let rest = Paragraph::new(vec![
            Line::from(""),
            Line::from(format::countdown(app.board.rest_time())).centered(),
        ])
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title("Rest (r: stop)"));
        f.render_widget(rest, area);
    }

    // Render Input Box if needed
    if app.input_mode != InputMode::Normal {
        let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
        f.render_widget(Clear, area);
        let title = match app.input_mode {
            InputMode::Adding => "Add Task: Enter Name",
            _ => match app.input_field {
                InputField::Name => "Edit Name",
                InputField::Duration => "Edit Time Spent (H:MM:SS)",
                InputField::StartTime => "Edit Start Time (e.g. 11:55 PM)",
                InputField::EndTime => "Edit End Time (e.g. 12:30 PM)",
            },
        };
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
    }

    if let Some((msg, _)) = &app.notification {
        let area = centered_rect(50, 3, f.area());
        f.render_widget(Clear, area);
        let note = Paragraph::new(msg.as_str())
            .centered()
            .style(Style::default().fg(Color::White).bg(Color::Black))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(note, area);
    }
}

fn task_row(t: &Task) -> Row<'static> {
    let time = if t.is_completed && !t.is_running {
        format::friendly(t.time_spent)
    } else {
        format::clock(t.time_spent)
    };
    let style = if t.is_running {
        Style::default().fg(Color::Yellow)
    } else if t.is_completed {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    let marker = if t.is_running { "▶ " } else if t.is_completed { "✓ " } else { "" };
    Row::new(vec![
        Cell::from(format!("{}{}", marker, t.name)),
        Cell::from(time),
        Cell::from(t.window_label()),
    ]).style(style)
}

fn status_bar(app: &App) -> Paragraph<'static> {
    let timer = app.board.timer();
    let text = if timer.is_rest_mode() {
        format!("Resting: {} left", format::countdown(timer.rest_time()))
    } else if let Some(t) = app.board.store().running_task() {
        format!("Running: {} ({})", t.name, format::clock(t.time_spent))
    } else {
        format!("Idle | Rest length: {} min", timer.rest_minutes())
    };
    Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title("taskclock"))
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}

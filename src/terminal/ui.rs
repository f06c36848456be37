use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::terminal::state::{AppState, Status};

const HOW_IT_WORKS: &str = "Connects to your Gmail account, fetches unread emails and uses AI to \
write a short summary of each. The report is saved as a timestamped text file.";

pub fn render(f: &mut Frame, state: &AppState) {
    let [intro, body, status, footer] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .areas(f.area());

    let intro_block = Block::default()
        .title(" Gmail Summary Dashboard ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
    f.render_widget(
        Paragraph::new(HOW_IT_WORKS)
            .block(intro_block)
            .wrap(Wrap { trim: true }),
        intro,
    );

    let report_block = Block::default()
        .title(" Report ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let report_text = match &state.report {
        Some(r) => r.clone(),
        None => "No report yet.".to_string(),
    };
    f.render_widget(
        Paragraph::new(report_text)
            .block(report_block)
            .wrap(Wrap { trim: false })
            .scroll((state.scroll, 0)),
        body,
    );

    let status_style = match &state.status {
        Status::Failed(_) => Style::default().fg(Color::Red),
        Status::Saved {
            warning: Some(_), ..
        } => Style::default().fg(Color::Yellow),
        Status::Saved { .. } => Style::default().fg(Color::Green),
        Status::Idle | Status::Working => Style::default().fg(Color::Gray),
    };
    f.render_widget(
        Paragraph::new(Span::styled(state.status_line(), status_style)),
        status,
    );

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("g", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" generate summary  "),
        Span::styled("j/k", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" scroll  "),
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" exit"),
    ]));
    f.render_widget(hint, footer);
}

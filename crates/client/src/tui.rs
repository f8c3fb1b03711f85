use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::client::GameClient;

pub fn render(frame: &mut Frame, client: &GameClient) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Length(8), Constraint::Min(0)])
        .split(frame.area());

    render_header(frame, chunks[0], client);
    render_state(frame, chunks[1], client);
    render_help(frame, chunks[2]);
}

fn render_header(frame: &mut Frame, area: Rect, client: &GameClient) {
    let (label, color) = if client.is_connected() {
        ("connected", Color::Green)
    } else {
        ("connecting...", Color::Yellow)
    };

    let block = Block::default()
        .title(" Rewind Client ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = format!("{label}  |  tick {}", client.current_tick());
    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(color));

    frame.render_widget(paragraph, area);
}

fn render_state(frame: &mut Frame, area: Rect, client: &GameClient) {
    let block = Block::default()
        .title(" Predicted State ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let lines = match client.local_transform() {
        Some(transform) => vec![
            Line::from(vec![
                Span::styled("entity: ", Style::default().fg(Color::Gray)),
                Span::raw(
                    client
                        .local_entity_id()
                        .map(|id| id.0.to_string())
                        .unwrap_or_default(),
                ),
            ]),
            Line::from(vec![
                Span::styled("position: ", Style::default().fg(Color::Gray)),
                Span::raw(format!(
                    "{:.2}, {:.2}, {:.2}",
                    transform.position.x, transform.position.y, transform.position.z
                )),
            ]),
            Line::from(vec![
                Span::styled("net: ", Style::default().fg(Color::Gray)),
                Span::raw(format!(
                    "{} sent / {} recv",
                    client.stats().packets_sent,
                    client.stats().packets_received
                )),
            ]),
        ],
        None => vec![Line::from("waiting for the host to assign an entity...")],
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = Paragraph::new("WASD move, arrows look, space jump, c crouch, q/esc quit")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));

    frame.render_widget(text, area);
}

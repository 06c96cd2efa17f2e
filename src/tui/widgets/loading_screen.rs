use crate::theme::Theme;
use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_STEP_MS: i64 = 100;

/// Popup shown over the content area until the first snapshot for the
/// current server arrives.
pub struct LoadingScreen;

impl LoadingScreen {
    pub fn render(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(5),
                Constraint::Fill(1),
            ])
            .split(area);

        let popup = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(popup_width(message, area.width)),
                Constraint::Fill(1),
            ])
            .split(rows[1])[1];

        frame.render_widget(Clear, popup);

        let spinner = spinner_frame(Local::now().timestamp_millis());
        let text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(spinner, Style::default().fg(theme.highlight())),
                Span::raw(" "),
                Span::styled(message.to_string(), Style::default().fg(theme.primary())),
            ]),
        ];

        let widget = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .title(" Loading ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.primary()))
                .style(Style::default().bg(theme.background())),
        );

        frame.render_widget(widget, popup);
    }
}

fn spinner_frame(now_ms: i64) -> &'static str {
    let index = (now_ms / SPINNER_STEP_MS).rem_euclid(SPINNER.len() as i64) as usize;
    SPINNER[index]
}

fn popup_width(message: &str, available: u16) -> u16 {
    let wanted = message.chars().count() as u16 + 8;
    wanted.max(24).min(available)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_advances_every_step() {
        assert_eq!(spinner_frame(0), "⠋");
        assert_eq!(spinner_frame(99), "⠋");
        assert_eq!(spinner_frame(100), "⠙");
        assert_eq!(spinner_frame(1000), "⠋");
    }

    #[test]
    fn test_popup_width_fits_message_and_terminal() {
        assert_eq!(popup_width("hi", 100), 24);
        assert_eq!(popup_width("Connecting to production-eu-west...", 100), 43);
        assert_eq!(popup_width("Connecting to production-eu-west...", 30), 30);
    }
}

use crate::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Transient error banner pinned to the bottom right of the screen.
pub struct ErrorToast;

impl ErrorToast {
    pub fn render(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
        let toast_area = Self::toast_rect(area);
        if toast_area.width == 0 || toast_area.height == 0 {
            return;
        }

        frame.render_widget(Clear, toast_area);

        let block = Block::default()
            .title(" Error ")
            .title_alignment(Alignment::Left)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.error()))
            .style(Style::default().bg(theme.background()));

        let text = Paragraph::new(format!("⚠️  {}", message))
            .block(block)
            .style(Style::default().fg(theme.error()))
            .wrap(Wrap { trim: true });

        frame.render_widget(text, toast_area);
    }

    fn toast_rect(area: Rect) -> Rect {
        let width = (area.width / 2).max(30).min(area.width);
        let height = 5.min(area.height);
        Rect::new(
            area.x + area.width - width,
            area.y + area.height - height,
            width,
            height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_sits_in_bottom_right_corner() {
        let area = Rect::new(0, 0, 120, 40);
        let rect = ErrorToast::toast_rect(area);
        assert_eq!(rect, Rect::new(60, 35, 60, 5));
    }

    #[test]
    fn test_toast_fits_tiny_terminals() {
        let area = Rect::new(0, 0, 20, 3);
        let rect = ErrorToast::toast_rect(area);
        assert_eq!(rect, Rect::new(0, 0, 20, 3));
    }
}

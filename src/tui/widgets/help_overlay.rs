use crate::theme::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

type KeySection = (&'static str, &'static [(&'static str, &'static str)]);

const SECTIONS: [KeySection; 3] = [
    (
        "Global",
        &[("q / Ctrl+C", "Quit"), ("?", "Toggle this help screen")],
    ),
    (
        "Navigation",
        &[
            ("1-6", "Overview / CPU / Memory / Network / Disk / System"),
            ("h / ← / Shift+Tab", "Previous tab"),
            ("l / → / Tab", "Next tab"),
            ("j k / ↑ ↓", "Move in the server list"),
            ("Enter / Esc", "Connect / close the server list"),
        ],
    ),
    (
        "Polling",
        &[
            ("r / Ctrl+R", "Refresh now (System tab: hardware too)"),
            ("c", "Clear collected history"),
            ("s", "Switch server"),
            ("+ / =", "Poll more often"),
            ("-", "Poll less often"),
        ],
    ),
];

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = Self::centered_rect(70, 80, area);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Block::default()
                .title(" Help - Press ? or Esc to close ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused()))
                .style(Style::default().bg(theme.background())),
            popup_area,
        );

        let inner_area = popup_area.inner(Margin {
            horizontal: 2,
            vertical: 1,
        });

        // One border row per section plus its key rows, then the footer.
        let mut constraints: Vec<Constraint> = SECTIONS
            .iter()
            .map(|(_, keys)| Constraint::Length(keys.len() as u16 + 1))
            .collect();
        constraints.push(Constraint::Min(0));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner_area);

        for ((title, keys), chunk) in SECTIONS.iter().zip(chunks.iter()) {
            Self::render_section(frame, *chunk, title, keys, theme);
        }

        let about = Paragraph::new(format!(
            "srvmon v{}\nServers are listed in servers.toml in the config directory.",
            env!("CARGO_PKG_VERSION")
        ))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title(" About ")
                .border_style(Style::default().fg(theme.border())),
        )
        .style(Style::default().fg(theme.text_dim()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

        frame.render_widget(about, chunks[SECTIONS.len()]);
    }

    fn render_section(
        frame: &mut Frame,
        area: Rect,
        title: &str,
        keys: &[(&str, &str)],
        theme: &Theme,
    ) {
        let rows = keys.iter().map(|(key, desc)| {
            Row::new(vec![
                Cell::from(*key).style(Style::default().fg(theme.highlight()).bold()),
                Cell::from(*desc).style(Style::default().fg(theme.text())),
            ])
        });

        let table = Table::new(rows, [Constraint::Length(20), Constraint::Fill(1)])
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .title(format!(" {} ", title))
                    .border_style(Style::default().fg(theme.border())),
            )
            .column_spacing(2);

        frame.render_widget(table, area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(vertical[1])[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = HelpOverlay::centered_rect(70, 80, area);
        assert_eq!(popup.width, 70);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
    }

    #[test]
    fn test_every_action_key_is_listed() {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                HelpOverlay::render(frame, area, &Theme::new());
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();

        for needle in ["Refresh now", "Switch server", "Clear collected history"] {
            assert!(text.contains(needle), "missing {needle}");
        }
    }
}

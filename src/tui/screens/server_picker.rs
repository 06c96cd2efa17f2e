use crate::config::ServerEntry;
use crate::theme::Theme;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

pub struct ServerPickerScreen {
    pub servers: Vec<ServerEntry>,
    pub list_state: ListState,
}

impl ServerPickerScreen {
    pub fn new(servers: Vec<ServerEntry>, selected_id: Option<&str>) -> Self {
        let mut list_state = ListState::default();
        if !servers.is_empty() {
            let index = selected_id
                .and_then(|id| servers.iter().position(|s| s.id == id))
                .unwrap_or(0);
            list_state.select(Some(index));
        }
        Self {
            servers,
            list_state,
        }
    }

    pub fn next(&mut self) {
        if self.servers.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.servers.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.servers.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.servers.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_server(&self) -> Option<&ServerEntry> {
        self.list_state.selected().and_then(|i| self.servers.get(i))
    }

    pub fn render(&mut self, frame: &mut Frame, theme: &Theme) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        let title = Paragraph::new("srvmon - Select Server")
            .style(
                Style::default()
                    .fg(theme.primary())
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL));

        frame.render_widget(title, chunks[0]);

        let items: Vec<ListItem> = self
            .servers
            .iter()
            .map(|server| {
                let content = if server.description.is_empty() {
                    format!("{}  ({})", server.name, truncate(&server.url, 60))
                } else {
                    format!(
                        "{} - {}  ({})",
                        server.name,
                        server.description,
                        truncate(&server.url, 60)
                    )
                };
                ListItem::new(content).style(Style::default().fg(theme.text()))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Servers"))
            .highlight_style(
                Style::default()
                    .bg(theme.primary())
                    .fg(theme.background())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        frame.render_stateful_widget(list, chunks[1], &mut self.list_state);

        let help = Paragraph::new("↑/k: Up | ↓/j: Down | Enter: Connect | Esc: Back | q: Quit")
            .style(Style::default().fg(theme.text_dim()))
            .block(Block::default().borders(Borders::ALL).title("Controls"));

        frame.render_widget(help, chunks[2]);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

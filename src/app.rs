use crate::config::ServerEntry;
use crate::metrics::sample::Family;
use crate::theme::Theme;
use std::time::{Duration, Instant};

const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Cpu,
    Memory,
    Network,
    Disk,
    System,
}

impl Tab {
    pub fn next(self) -> Self {
        match self {
            Tab::Overview => Tab::Cpu,
            Tab::Cpu => Tab::Memory,
            Tab::Memory => Tab::Network,
            Tab::Network => Tab::Disk,
            Tab::Disk => Tab::System,
            Tab::System => Tab::Overview,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Tab::Overview => Tab::System,
            Tab::Cpu => Tab::Overview,
            Tab::Memory => Tab::Cpu,
            Tab::Network => Tab::Memory,
            Tab::Disk => Tab::Network,
            Tab::System => Tab::Disk,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Tab::Overview),
            1 => Some(Tab::Cpu),
            2 => Some(Tab::Memory),
            3 => Some(Tab::Network),
            4 => Some(Tab::Disk),
            5 => Some(Tab::System),
            _ => None,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Tab::Overview => "Overview",
            Tab::Cpu => "CPU",
            Tab::Memory => "Memory",
            Tab::Network => "Network",
            Tab::Disk => "Disk I/O",
            Tab::System => "System",
        }
    }

    /// The history family charted on this tab.
    pub fn family(&self) -> Option<Family> {
        match self {
            Tab::Overview | Tab::System => None,
            Tab::Cpu => Some(Family::Cpu),
            Tab::Memory => Some(Family::Memory),
            Tab::Network => Some(Family::Network),
            Tab::Disk => Some(Family::Disk),
        }
    }

    pub fn all() -> [Tab; 6] {
        [
            Tab::Overview,
            Tab::Cpu,
            Tab::Memory,
            Tab::Network,
            Tab::Disk,
            Tab::System,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Help,
    Loading(String),
    PickServer,
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    shown_at: Instant,
}

#[derive(Debug, Clone)]
pub struct App {
    pub should_quit: bool,
    pub current_tab: Tab,
    pub mode: AppMode,
    pub server: ServerEntry,
    pub theme: Theme,
    interval_choices: Vec<Duration>,
    interval_index: usize,
    toast: Option<Toast>,
}

impl App {
    /// `interval` is selected among `interval_choices`; an interval that is
    /// not one of the choices is added to them.
    pub fn new(server: ServerEntry, mut interval_choices: Vec<Duration>, interval: Duration) -> Self {
        if !interval_choices.contains(&interval) {
            interval_choices.push(interval);
            interval_choices.sort();
        }
        let interval_index = interval_choices
            .iter()
            .position(|d| *d == interval)
            .unwrap_or(0);

        Self {
            should_quit: false,
            current_tab: Tab::Overview,
            mode: AppMode::Normal,
            server,
            theme: Theme,
            interval_choices,
            interval_index,
            toast: None,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn next_tab(&mut self) {
        self.current_tab = self.current_tab.next();
    }

    pub fn previous_tab(&mut self) {
        self.current_tab = self.current_tab.previous();
    }

    pub fn select_tab(&mut self, index: usize) {
        if let Some(tab) = Tab::from_index(index) {
            self.current_tab = tab;
        }
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            AppMode::Help => AppMode::Normal,
            _ => AppMode::Help,
        };
    }

    pub fn show_server_picker(&mut self) {
        self.mode = AppMode::PickServer;
    }

    pub fn close_server_picker(&mut self) {
        if self.mode == AppMode::PickServer {
            self.mode = AppMode::Normal;
        }
    }

    pub fn switch_server(&mut self, server: ServerEntry) {
        self.show_loading(format!("Connecting to {}...", server.name));
        self.server = server;
    }

    pub fn show_loading(&mut self, message: String) {
        self.mode = AppMode::Loading(message);
    }

    pub fn clear_loading(&mut self) {
        if matches!(self.mode, AppMode::Loading(_)) {
            self.mode = AppMode::Normal;
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.mode, AppMode::Loading(_))
    }

    pub fn interval(&self) -> Duration {
        self.interval_choices[self.interval_index]
    }

    /// Steps to the next longer refresh interval, returning it if it changed.
    pub fn slower_interval(&mut self) -> Option<Duration> {
        if self.interval_index + 1 < self.interval_choices.len() {
            self.interval_index += 1;
            Some(self.interval())
        } else {
            None
        }
    }

    pub fn faster_interval(&mut self) -> Option<Duration> {
        if self.interval_index > 0 {
            self.interval_index -= 1;
            Some(self.interval())
        } else {
            None
        }
    }

    pub fn show_toast(&mut self, message: String) {
        self.toast = Some(Toast {
            message,
            shown_at: Instant::now(),
        });
    }

    pub fn hide_toast(&mut self) {
        self.toast = None;
    }

    pub fn visible_toast(&self) -> Option<&str> {
        self.toast
            .as_ref()
            .filter(|t| t.shown_at.elapsed() < TOAST_TTL)
            .map(|t| t.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(id: &str) -> ServerEntry {
        ServerEntry {
            id: id.to_string(),
            name: id.to_uppercase(),
            url: format!("http://{}/api/status", id),
            description: String::new(),
        }
    }

    fn choices() -> Vec<Duration> {
        vec![Duration::from_secs(5), Duration::from_secs(10), Duration::from_secs(30)]
    }

    #[test]
    fn test_tab_cycle() {
        let mut app = App::new(server("a"), choices(), Duration::from_secs(5));
        app.previous_tab();
        assert_eq!(app.current_tab, Tab::System);
        assert_eq!(app.current_tab.family(), None);
        app.next_tab();
        app.next_tab();
        assert_eq!(app.current_tab, Tab::Cpu);
        app.select_tab(3);
        assert_eq!(app.current_tab.family(), Some(Family::Network));
        app.select_tab(5);
        assert_eq!(app.current_tab, Tab::System);
        app.select_tab(6);
        assert_eq!(app.current_tab, Tab::System);
    }

    #[test]
    fn test_interval_steps_stop_at_bounds() {
        let mut app = App::new(server("a"), choices(), Duration::from_secs(10));
        assert_eq!(app.slower_interval(), Some(Duration::from_secs(30)));
        assert_eq!(app.slower_interval(), None);
        assert_eq!(app.faster_interval(), Some(Duration::from_secs(10)));
        assert_eq!(app.faster_interval(), Some(Duration::from_secs(5)));
        assert_eq!(app.faster_interval(), None);
    }

    #[test]
    fn test_custom_interval_joins_choices() {
        let app = App::new(server("a"), choices(), Duration::from_secs(7));
        assert_eq!(app.interval(), Duration::from_secs(7));
    }

    #[test]
    fn test_switch_server_shows_loading() {
        let mut app = App::new(server("a"), choices(), Duration::from_secs(5));
        app.switch_server(server("b"));
        assert!(app.is_loading());
        assert_eq!(app.server.id, "b");
        app.clear_loading();
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_toast_visible_until_hidden() {
        let mut app = App::new(server("a"), choices(), Duration::from_secs(5));
        assert!(app.visible_toast().is_none());
        app.show_toast("Refresh failed".to_string());
        assert_eq!(app.visible_toast(), Some("Refresh failed"));
        app.hide_toast();
        assert!(app.visible_toast().is_none());
    }
}

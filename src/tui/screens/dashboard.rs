use crate::app::{App, AppMode, Tab};
use crate::status::poller::HardwareState;
use crate::tui::view_state::ViewState;
use crate::tui::views::{
    history_chart::HistoryChartView, overview::OverviewView, system_info::SystemInfoView,
};
use crate::tui::widgets::{
    error_toast::ErrorToast, help_overlay::HelpOverlay, loading_screen::LoadingScreen,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::{Block, Borders, Paragraph, Tabs},
};

pub struct DashboardScreen;

impl DashboardScreen {
    pub fn render(frame: &mut Frame, app: &App, view: &ViewState, hardware: &HardwareState) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        Self::render_header(frame, chunks[0], app, view);
        Self::render_tabs(frame, chunks[1], app);
        Self::render_content(frame, chunks[2], app, view, hardware);
        Self::render_footer(frame, chunks[3], app);

        match &app.mode {
            AppMode::Help => HelpOverlay::render(frame, area, &app.theme),
            AppMode::Loading(message) => {
                LoadingScreen::render(frame, chunks[2], message, &app.theme)
            }
            AppMode::Normal | AppMode::PickServer => {}
        }

        if let Some(message) = app.visible_toast() {
            ErrorToast::render(frame, area, message, &app.theme);
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, app: &App, view: &ViewState) {
        let theme = &app.theme;

        let (status, status_color) = match view.api_ok {
            Some(true) => ("API OK", theme.success()),
            Some(false) => ("API ERROR", theme.error()),
            None => ("CONNECTING", theme.warning()),
        };

        let last_update = view
            .last_update
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());

        let mut spans = vec![
            Span::styled(
                app.server.name.clone(),
                Style::default()
                    .fg(theme.primary())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            Span::styled(
                status,
                Style::default()
                    .fg(status_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                " │ Updated: {} │ Every {}",
                last_update,
                humantime::format_duration(app.interval())
            )),
        ];

        if view.stale {
            spans.push(Span::styled(
                " │ STALE",
                Style::default().fg(theme.warning()),
            ));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("srvmon │ {}", app.server.url)),
        );

        frame.render_widget(header, area);
    }

    fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let titles: Vec<Line> = Tab::all()
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                let num = i + 1;
                let title = format!("{}:{}", num, tab.title());
                if *tab == app.current_tab {
                    Line::from(format!("[{}]", title)).style(
                        Style::default()
                            .fg(theme.highlight())
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Line::from(title).style(Style::default().fg(theme.text_dim()))
                }
            })
            .collect();

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("Views"))
            .divider(" ");

        frame.render_widget(tabs, area);
    }

    fn render_content(
        frame: &mut Frame,
        area: Rect,
        app: &App,
        view: &ViewState,
        hardware: &HardwareState,
    ) {
        let snapshot = view.snapshot.as_ref();
        match (app.current_tab, app.current_tab.family()) {
            (Tab::System, _) => SystemInfoView::render(frame, area, hardware, &app.theme),
            (_, Some(family)) => {
                HistoryChartView::render(frame, area, family, snapshot, &app.theme)
            }
            (_, None) => OverviewView::render(frame, area, snapshot, &app.theme),
        }
    }

    fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
        let footer_text = match app.current_tab {
            Tab::Overview => {
                "1-6: Switch Tab | h/l: Prev/Next | r: Refresh | s: Server | +/-: Interval | q: Quit | ?: Help"
            }
            Tab::System => {
                "1-6: Switch Tab | h/l: Prev/Next | r: Refresh Hardware | s: Server | q: Quit | ?: Help"
            }
            _ => "1-6: Switch Tab | h/l: Prev/Next | r: Refresh | c: Clear History | q: Quit | ?: Help",
        };

        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(app.theme.text_dim()))
            .block(Block::default().borders(Borders::ALL).title("Controls"));

        frame.render_widget(footer, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerEntry;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn app() -> App {
        let server = ServerEntry {
            id: "local".to_string(),
            name: "Local".to_string(),
            url: "http://localhost:48877/api/status".to_string(),
            description: String::new(),
        };
        App::new(server, vec![Duration::from_secs(5)], Duration::from_secs(5))
    }

    fn rendered_text(app: &App, view: &ViewState) -> String {
        rendered_with_hardware(app, view, &HardwareState::default())
    }

    fn rendered_with_hardware(app: &App, view: &ViewState, hardware: &HardwareState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal
            .draw(|frame| DashboardScreen::render(frame, app, view, hardware))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_header_shows_connecting_before_first_snapshot() {
        let text = rendered_text(&app(), &ViewState::default());
        assert!(text.contains("CONNECTING"));
        assert!(text.contains("Waiting for the first status report"));
    }

    #[test]
    fn test_failed_cycle_shows_error_status() {
        let mut view = ViewState::default();
        view.mark_failed();
        let text = rendered_text(&app(), &view);
        assert!(text.contains("API ERROR"));
    }

    #[test]
    fn test_system_tab_shows_hardware_placeholder() {
        let mut app = app();
        app.select_tab(5);
        let text = rendered_text(&app, &ViewState::default());
        assert!(text.contains("[6:System]"));
        assert!(text.contains("Loading hardware info"));
        assert!(text.contains("r: Refresh Hardware"));
    }

    #[test]
    fn test_system_tab_does_not_depend_on_metric_state() {
        let mut app = app();
        app.select_tab(5);
        let mut view = ViewState::default();
        view.mark_failed();
        let mut hardware = HardwareState::default();
        hardware.last_error = Some("HTTP 404: Not Found".to_string());

        let text = rendered_with_hardware(&app, &view, &hardware);
        assert!(text.contains("API ERROR"));
        assert!(text.contains("HTTP 404: Not Found"));
    }

    #[test]
    fn test_toast_is_drawn() {
        let mut app = app();
        app.show_toast("connection refused".to_string());
        let text = rendered_text(&app, &ViewState::default());
        assert!(text.contains("connection refused"));
    }
}

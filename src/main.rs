use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use srvmon::{
    app::{App, AppMode, Tab},
    cli::Cli,
    config::{Config, ServerEntry},
    error::CycleError,
    logging,
    metrics::collector::{CycleOutcome, PollingController},
    status::{
        client::{HttpStatusClient, StatusClient},
        poller::HardwarePoller,
    },
    tui::{
        event::{poll_event, Event},
        screens::{dashboard::DashboardScreen, server_picker::ServerPickerScreen},
        terminal::{self, Tui},
        view_state::{TerminalRenderTarget, ViewState},
    },
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

const EVENT_POLL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(history) = cli.history {
        config.history_size = history;
    }

    let log_file = cli.log_file.clone().unwrap_or_else(|| config.log_file());
    logging::init_tracing(&config.logging.level, &log_file)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        servers = config.servers.len(),
        log_file = %log_file.display(),
        "srvmon starting"
    );

    let preselected = resolve_server(&cli, &config)?;
    let interval = config.clamp_interval(cli.interval.unwrap_or_else(|| config.refresh_interval()));

    let mut terminal = terminal::setup_terminal()?;
    let result = run(&mut terminal, &config, preselected, interval).await;
    terminal::restore_terminal(&mut terminal)?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "srvmon exited with an error");
    }
    result
}

/// The server named on the command line, or `None` when the user should pick
/// one from the configured list.
fn resolve_server(cli: &Cli, config: &Config) -> Result<Option<ServerEntry>> {
    if let Some(url) = &cli.url {
        return Ok(Some(ServerEntry {
            id: "adhoc".to_string(),
            name: url.clone(),
            url: url.clone(),
            description: "from --url".to_string(),
        }));
    }

    if let Some(id) = &cli.server {
        return config
            .find_server(id)
            .cloned()
            .map(Some)
            .ok_or_else(|| eyre!("no server with id '{}' in the server list", id));
    }

    if config.servers.len() > 1 {
        return Ok(None);
    }

    Ok(config.default_server().cloned())
}

async fn run(
    terminal: &mut Tui,
    config: &Config,
    preselected: Option<ServerEntry>,
    interval: Duration,
) -> Result<()> {
    let server = match preselected {
        Some(server) => server,
        None => match pick_initial_server(terminal, config)? {
            Some(server) => server,
            None => return Ok(()),
        },
    };

    let view = Arc::new(RwLock::new(ViewState::default()));
    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<CycleError>();

    let client: Arc<dyn StatusClient> = Arc::new(HttpStatusClient::new());
    let hardware = Arc::new(HardwarePoller::new(
        client.clone(),
        config.hardware_refresh_interval(),
    ));
    let hardware_state = hardware.state();

    let controller = Arc::new(PollingController::with_error_hook(
        client,
        Arc::new(TerminalRenderTarget::new(view.clone())),
        config.history_size,
        move |error: &CycleError| {
            let _ = error_tx.send(error.clone());
        },
    ));

    let mut app = App::new(server, config.interval_choices(), interval);
    controller
        .start(config.polling_config(&app.server.url, app.interval())?)
        .await?;
    if let Err(e) = hardware.watch(&app.server.url).await {
        tracing::warn!(error = %e, "hardware info disabled for this server");
    }
    app.show_loading(format!("Connecting to {}...", app.server.name));

    let mut picker: Option<ServerPickerScreen> = None;

    loop {
        let view_snapshot = view.read().await.clone();
        let hardware_snapshot = hardware_state.read().await.clone();

        terminal.draw(|frame| {
            DashboardScreen::render(frame, &app, &view_snapshot, &hardware_snapshot);
            if let (AppMode::PickServer, Some(picker)) = (&app.mode, picker.as_mut()) {
                picker.render(frame, &app.theme);
            }
        })?;

        let event = poll_event(EVENT_POLL)?;

        while let Ok(error) = error_rx.try_recv() {
            if error.is_cancelled() {
                continue;
            }
            view.write().await.mark_failed();
            app.show_toast(format!("Refresh failed: {}", error));
            app.clear_loading();
        }

        if app.is_loading() && view_snapshot.snapshot.is_some() {
            app.clear_loading();
        }

        match app.mode.clone() {
            AppMode::Help => match event {
                Event::Help | Event::Back | Event::Quit => app.toggle_help(),
                _ => {}
            },
            AppMode::PickServer => match event {
                Event::Up => {
                    if let Some(picker) = picker.as_mut() {
                        picker.previous();
                    }
                }
                Event::Down => {
                    if let Some(picker) = picker.as_mut() {
                        picker.next();
                    }
                }
                Event::Enter => {
                    let selected = picker.as_ref().and_then(|p| p.selected_server()).cloned();
                    picker = None;
                    app.close_server_picker();
                    if let Some(server) = selected {
                        switch_server(&controller, &hardware, &view, &mut app, config, server)
                            .await;
                    }
                }
                Event::Back => {
                    picker = None;
                    app.close_server_picker();
                }
                Event::Quit => app.quit(),
                _ => {}
            },
            AppMode::Loading(_) => match event {
                Event::Quit => app.quit(),
                Event::SwitchServer => {
                    picker = Some(ServerPickerScreen::new(
                        config.servers.clone(),
                        Some(&app.server.id),
                    ));
                    app.show_server_picker();
                }
                _ => {}
            },
            AppMode::Normal => match event {
                Event::Quit => app.quit(),
                Event::Tab(index) => app.select_tab(index),
                Event::NextTab => app.next_tab(),
                Event::PrevTab => app.previous_tab(),
                Event::Help => app.toggle_help(),
                Event::Refresh if app.current_tab == Tab::System => {
                    let hardware = hardware.clone();
                    tokio::spawn(async move {
                        let _ = hardware.refresh().await;
                    });
                }
                Event::Refresh => {
                    let controller = controller.clone();
                    tokio::spawn(async move {
                        if let Ok(CycleOutcome::Skipped) = controller.poll_now().await {
                            tracing::debug!("manual refresh skipped");
                        }
                    });
                }
                Event::ResetHistory => {
                    controller.reset_history().await;
                    view.write().await.clear_history();
                    tracing::info!("history cleared");
                }
                Event::SwitchServer => {
                    picker = Some(ServerPickerScreen::new(
                        config.servers.clone(),
                        Some(&app.server.id),
                    ));
                    app.show_server_picker();
                }
                Event::FasterRefresh => {
                    if let Some(interval) = app.faster_interval() {
                        apply_interval(&controller, &mut app, config, interval).await;
                    }
                }
                Event::SlowerRefresh => {
                    if let Some(interval) = app.slower_interval() {
                        apply_interval(&controller, &mut app, config, interval).await;
                    }
                }
                _ => {}
            },
        }

        if app.should_quit {
            break;
        }
    }

    controller.stop().await;
    hardware.stop().await;
    tracing::info!("srvmon shutting down");
    Ok(())
}

/// Full-screen picker shown before anything is polled. `None` means the user
/// quit.
fn pick_initial_server(terminal: &mut Tui, config: &Config) -> Result<Option<ServerEntry>> {
    let default_id = config.default_server().map(|s| s.id.clone());
    let mut picker = ServerPickerScreen::new(config.servers.clone(), default_id.as_deref());
    let theme = srvmon::theme::Theme::new();

    loop {
        terminal.draw(|frame| {
            picker.render(frame, &theme);
        })?;

        match poll_event(EVENT_POLL)? {
            Event::Quit | Event::Back => return Ok(None),
            Event::Down => picker.next(),
            Event::Up => picker.previous(),
            Event::Enter => {
                if let Some(server) = picker.selected_server() {
                    return Ok(Some(server.clone()));
                }
            }
            _ => {}
        }
    }
}

async fn switch_server(
    controller: &PollingController,
    hardware: &HardwarePoller,
    view: &RwLock<ViewState>,
    app: &mut App,
    config: &Config,
    server: ServerEntry,
) {
    if server.id == app.server.id && server.url == app.server.url {
        return;
    }

    let polling = match config.polling_config(&server.url, app.interval()) {
        Ok(polling) => polling,
        Err(e) => {
            app.show_toast(format!("Cannot switch to {}: {}", server.name, e));
            return;
        }
    };

    // Held across the switch so no snapshot from the old server lands after
    // the reset.
    let mut view = view.write().await;
    controller.reconfigure(polling).await;
    view.reset(controller.generation().await);
    drop(view);

    if let Err(e) = hardware.watch(&server.url).await {
        hardware.stop().await;
        tracing::warn!(error = %e, "hardware info disabled for this server");
    }

    tracing::info!(server = %server.id, url = %server.url, "switched server");
    app.hide_toast();
    app.switch_server(server);
}

async fn apply_interval(
    controller: &PollingController,
    app: &mut App,
    config: &Config,
    interval: Duration,
) {
    match config.polling_config(&app.server.url, interval) {
        Ok(polling) => {
            controller.reconfigure(polling).await;
            tracing::info!(interval = %humantime::format_duration(interval), "refresh interval changed");
        }
        Err(e) => app.show_toast(format!("Cannot change interval: {}", e)),
    }
}

use crate::metrics::collector::DashboardSnapshot;
use crate::metrics::sample::Family;
use crate::status::types::{bytes_to_gb, format_uptime, ConnectionLoad, GpuStatus, StatusReport};
use crate::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph},
};

pub struct OverviewView;

impl OverviewView {
    pub fn render(frame: &mut Frame, area: Rect, snapshot: Option<&DashboardSnapshot>, theme: &Theme) {
        let Some(report) = snapshot.and_then(|s| s.report.as_ref()) else {
            let waiting = Paragraph::new("Waiting for the first status report...")
                .block(Block::default().borders(Borders::ALL).title("Overview"))
                .style(Style::default().fg(theme.text_dim()));
            frame.render_widget(waiting, area);
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);

        let gauges = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(rows[0]);

        Self::render_cpu_gauge(frame, gauges[0], report, theme);
        Self::render_memory_gauge(frame, gauges[1], report, theme);
        Self::render_gpu_gauge(frame, gauges[2], report.gpu.as_ref(), theme);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(rows[1]);

        let samples = snapshot
            .and_then(|s| s.history.get(&Family::Cpu))
            .map_or(0, |h| h.len());

        Self::render_io_panel(frame, panels[0], report, theme);
        Self::render_network_panel(frame, panels[1], report, theme);
        Self::render_system_panel(frame, panels[2], report, samples, theme);
    }

    fn render_cpu_gauge(frame: &mut Frame, area: Rect, report: &StatusReport, theme: &Theme) {
        let usage = report.cpu.usage_percent;
        let title = format!(
            "CPU │ {} cores │ {:.2} GHz",
            report.cpu.core_count,
            report.cpu.current_freq / 1000.0
        );

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .gauge_style(
                Style::default()
                    .fg(theme.usage_color(usage, theme.primary()))
                    .bg(theme.gauge_background()),
            )
            .label(format!("{:.1}%", usage))
            .ratio(percent_ratio(usage));

        frame.render_widget(gauge, area);
    }

    fn render_memory_gauge(frame: &mut Frame, area: Rect, report: &StatusReport, theme: &Theme) {
        let usage = report.memory.usage_percent;
        let title = format!(
            "Memory │ {:.1} / {:.1} GB",
            bytes_to_gb(report.memory.used),
            bytes_to_gb(report.memory.total)
        );

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .gauge_style(
                Style::default()
                    .fg(theme.usage_color(usage, theme.secondary()))
                    .bg(theme.gauge_background()),
            )
            .label(format!("{:.1}%", usage))
            .ratio(percent_ratio(usage));

        frame.render_widget(gauge, area);
    }

    fn render_gpu_gauge(frame: &mut Frame, area: Rect, gpu: Option<&GpuStatus>, theme: &Theme) {
        match gpu.filter(|g| g.has_gpu) {
            Some(gpu) => {
                let title = format!(
                    "GPU │ {} │ {:.1} / {:.1} GB",
                    gpu.gpu_name,
                    gpu.gpu_memory_used / 1024.0,
                    gpu.gpu_memory_total / 1024.0
                );

                let gauge = Gauge::default()
                    .block(Block::default().borders(Borders::ALL).title(title))
                    .gauge_style(
                        Style::default()
                            .fg(theme.usage_color(gpu.gpu_usage, theme.warning()))
                            .bg(theme.gauge_background()),
                    )
                    .label(format!("{:.1}%", gpu.gpu_usage))
                    .ratio(percent_ratio(gpu.gpu_usage));

                frame.render_widget(gauge, area);
            }
            None => {
                let no_gpu = Paragraph::new("No GPU on this server")
                    .block(Block::default().borders(Borders::ALL).title("GPU"))
                    .style(Style::default().fg(theme.text_dim()));
                frame.render_widget(no_gpu, area);
            }
        }
    }

    fn render_io_panel(frame: &mut Frame, area: Rect, report: &StatusReport, theme: &Theme) {
        let text = format!(
            "Read:  {:.2} MB/s\n\
             Write: {:.2} MB/s\n\
             \n\
             Total read:    {:.2} GB\n\
             Total written: {:.2} GB",
            report.disk_io.read_speed_mb,
            report.disk_io.write_speed_mb,
            bytes_to_gb(report.disk_io.read_bytes),
            bytes_to_gb(report.disk_io.write_bytes),
        );

        let panel = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Disk I/O"))
            .style(Style::default().fg(theme.text()));

        frame.render_widget(panel, area);
    }

    fn render_network_panel(frame: &mut Frame, area: Rect, report: &StatusReport, theme: &Theme) {
        let mut lines = vec![
            Line::from(format!("Upload:   {:.2} MB/s", report.network.upload_speed_mb)),
            Line::from(format!("Download: {:.2} MB/s", report.network.download_speed_mb)),
            Line::from(""),
            Line::from(format!("Today:    {:.2} GB", report.today_traffic_gb())),
        ];

        if let Some(connections) = report.network_connections {
            let load = ConnectionLoad::from_count(connections);
            let color = match load {
                ConnectionLoad::High => theme.error(),
                ConnectionLoad::Medium => theme.warning(),
                ConnectionLoad::Normal => theme.success(),
            };
            lines.push(Line::from(vec![
                Span::raw(format!("Connections: {} ", connections)),
                Span::styled(format!("[{}]", load.label()), Style::default().fg(color)),
            ]));
        }

        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Network"))
            .style(Style::default().fg(theme.text()));

        frame.render_widget(panel, area);
    }

    fn render_system_panel(
        frame: &mut Frame,
        area: Rect,
        report: &StatusReport,
        samples: usize,
        theme: &Theme,
    ) {
        let uptime = report
            .uptime
            .map(format_uptime)
            .unwrap_or_else(|| "N/A".to_string());

        let load = report
            .system_load
            .as_ref()
            .map(|l| format!("{:.2} / {:.2} / {:.2}", l.load_1min, l.load_5min, l.load_15min))
            .unwrap_or_else(|| "N/A".to_string());

        let text = format!(
            "Uptime:  {}\n\
             Load:    {}\n\
             Version: {}\n\
             \n\
             Samples collected: {}",
            uptime,
            load,
            report.version.as_deref().unwrap_or("unknown"),
            samples
        );

        let panel = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("System"))
            .style(Style::default().fg(theme.text()));

        frame.render_widget(panel, area);
    }
}

fn percent_ratio(percent: f64) -> f64 {
    (percent / 100.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_ratio_is_clamped() {
        assert_eq!(percent_ratio(50.0), 0.5);
        assert_eq!(percent_ratio(130.0), 1.0);
        assert_eq!(percent_ratio(-3.0), 0.0);
    }
}

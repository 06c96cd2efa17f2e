use crate::status::hardware::{
    format_bytes, format_frequency, DiskPartition, GpuDevice, HardwareInfo,
};
use crate::status::poller::HardwareState;
use crate::status::types::format_uptime;
use crate::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

pub struct SystemInfoView;

impl SystemInfoView {
    pub fn render(frame: &mut Frame, area: Rect, hardware: &HardwareState, theme: &Theme) {
        let Some(info) = hardware.info.as_ref() else {
            let (message, color) = match &hardware.last_error {
                Some(error) => (format!("Hardware info unavailable: {}", error), theme.error()),
                None => ("Loading hardware info...".to_string(), theme.text_dim()),
            };
            let placeholder = Paragraph::new(message)
                .block(Block::default().borders(Borders::ALL).title("System"))
                .style(Style::default().fg(color))
                .wrap(Wrap { trim: true });
            frame.render_widget(placeholder, area);
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(area);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(rows[0]);

        Self::render_os_panel(frame, panels[0], info, hardware, theme);
        Self::render_cpu_panel(frame, panels[1], info, theme);
        Self::render_memory_panel(frame, panels[2], info, theme);

        let devices = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);

        Self::render_disks(frame, devices[0], &info.disk_info, theme);
        Self::render_gpus(frame, devices[1], &info.gpu_info, theme);
    }

    fn render_os_panel(
        frame: &mut Frame,
        area: Rect,
        info: &HardwareInfo,
        hardware: &HardwareState,
        theme: &Theme,
    ) {
        let updated = hardware
            .last_update
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());

        let mut lines = vec![
            Line::from(format!("OS:      {}", info.os_info.display_name())),
            Line::from(format!("Kernel:  {}", or_unknown(&info.os_info.release))),
            Line::from(format!(
                "Arch:    {} ({})",
                or_unknown(&info.os_info.machine),
                or_unknown(&info.os_info.architecture)
            )),
            Line::from(format!("Uptime:  {}", format_uptime(info.system_uptime.seconds))),
            Line::from(format!("Updated: {}", updated)),
        ];

        if let Some(error) = hardware.last_error.as_ref().filter(|_| hardware.is_stale()) {
            lines.push(Line::styled(
                format!("STALE: {}", error),
                Style::default().fg(theme.warning()),
            ));
        }

        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("System"))
            .style(Style::default().fg(theme.text()));

        frame.render_widget(panel, area);
    }

    fn render_cpu_panel(frame: &mut Frame, area: Rect, info: &HardwareInfo, theme: &Theme) {
        let cpu = &info.cpu_info;
        let cores = match (cpu.physical_cores, cpu.total_cores) {
            (Some(physical), Some(total)) => format!("{} physical / {} logical", physical, total),
            (None, Some(total)) => format!("{} logical", total),
            (Some(physical), None) => format!("{} physical", physical),
            (None, None) => "Unknown".to_string(),
        };

        let text = format!(
            "Model:  {}\n\
             Vendor: {}\n\
             Cores:  {}\n\
             Clock:  {} (max {})",
            or_unknown(&cpu.model),
            or_unknown(&cpu.vendor),
            cores,
            format_frequency(cpu.current_frequency),
            format_frequency(cpu.max_frequency),
        );

        let panel = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Processor"))
            .style(Style::default().fg(theme.text()))
            .wrap(Wrap { trim: false });

        frame.render_widget(panel, area);
    }

    fn render_memory_panel(frame: &mut Frame, area: Rect, info: &HardwareInfo, theme: &Theme) {
        let memory = &info.memory_info;
        let text = format!(
            "Total:     {}\n\
             Available: {}\n\
             Swap:      {} / {}\n\
             \n\
             BIOS:      {} ({})",
            format_bytes(memory.total),
            format_bytes(memory.available),
            format_bytes(memory.swap_used),
            format_bytes(memory.swap_total),
            or_unknown(&info.bios_info.bios_version),
            or_unknown(&info.bios_info.bios_date),
        );

        let panel = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Memory & Firmware"))
            .style(Style::default().fg(theme.text()));

        frame.render_widget(panel, area);
    }

    fn render_disks(frame: &mut Frame, area: Rect, disks: &[DiskPartition], theme: &Theme) {
        let header = Row::new(vec!["Mount", "Device", "Type", "Used / Total", "Usage"])
            .style(Style::default().fg(theme.primary()).bold());

        let rows = disks.iter().map(|disk| {
            Row::new(vec![
                Cell::from(disk.mountpoint.clone()),
                Cell::from(disk.device.clone()),
                Cell::from(disk.fstype.clone()),
                Cell::from(format!("{} / {}", format_bytes(disk.used), format_bytes(disk.total))),
                Cell::from(format!("{:.1}%", disk.usage_percent))
                    .style(
                        Style::default()
                            .fg(theme.usage_color(disk.usage_percent, theme.success())),
                    ),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Fill(2),
                Constraint::Fill(2),
                Constraint::Length(6),
                Constraint::Length(22),
                Constraint::Length(7),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Disks ({})", disks.len())),
        )
        .style(Style::default().fg(theme.text()));

        frame.render_widget(table, area);
    }

    fn render_gpus(frame: &mut Frame, area: Rect, gpus: &[GpuDevice], theme: &Theme) {
        let lines: Vec<Line> = if gpus.is_empty() {
            vec![Line::styled("No GPU detected", Style::default().fg(theme.text_dim()))]
        } else {
            gpus.iter()
                .flat_map(|gpu| {
                    let temperature = gpu
                        .temperature
                        .map(|t| format!("{:.0}°C", t))
                        .unwrap_or_else(|| "N/A".to_string());
                    let name = if gpu.name.is_empty() {
                        gpu.vendor.clone()
                    } else {
                        gpu.name.clone()
                    };
                    [
                        Line::styled(name, Style::default().fg(theme.highlight())),
                        Line::from(format!(
                            "  {:.1} / {:.1} GB │ {:.1}% │ {}",
                            gpu.memory_used / 1024.0,
                            gpu.memory_total / 1024.0,
                            gpu.usage_percent,
                            temperature
                        )),
                    ]
                })
                .collect()
        };

        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("GPUs"))
            .style(Style::default().fg(theme.text()));

        frame.render_widget(panel, area);
    }
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "Unknown"
    } else {
        value
    }
}

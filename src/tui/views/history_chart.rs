use crate::metrics::collector::DashboardSnapshot;
use crate::metrics::sample::{Family, Sample};
use crate::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

/// One line on a chart: the sample field it plots and how it is drawn.
struct Series {
    field: &'static str,
    name: &'static str,
    color: Color,
}

/// How a panel scales its y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scale {
    Percent,
    Auto,
}

struct Panel {
    title: &'static str,
    unit: &'static str,
    scale: Scale,
    series: Vec<Series>,
}

pub struct HistoryChartView;

impl HistoryChartView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        family: Family,
        snapshot: Option<&DashboardSnapshot>,
        theme: &Theme,
    ) {
        let samples: &[Sample] = snapshot
            .and_then(|s| s.history.get(&family))
            .map(|h| h.as_slice())
            .unwrap_or(&[]);

        let panels = panels_for(family, theme);

        if samples.is_empty() {
            let placeholder = Paragraph::new(format!("Waiting for {} data...", family))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("{} History", family)),
                )
                .style(Style::default().fg(theme.text_dim()));
            frame.render_widget(placeholder, area);
            return;
        }

        let constraints: Vec<Constraint> = panels
            .iter()
            .map(|_| Constraint::Ratio(1, panels.len() as u32))
            .collect();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (panel, chunk) in panels.iter().zip(chunks.iter()) {
            Self::render_panel(frame, *chunk, panel, samples, theme);
        }
    }

    fn render_panel(frame: &mut Frame, area: Rect, panel: &Panel, samples: &[Sample], theme: &Theme) {
        let data: Vec<Vec<(f64, f64)>> = panel
            .series
            .iter()
            .map(|series| points(samples, series.field))
            .collect();

        let datasets: Vec<Dataset> = panel
            .series
            .iter()
            .zip(data.iter())
            .map(|(series, points)| {
                Dataset::default()
                    .name(series.name)
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(series.color))
                    .data(points)
            })
            .collect();

        let y_max = y_upper_bound(panel.scale, data.iter().flatten().map(|(_, y)| *y));
        let x_max = (samples.len().saturating_sub(1)).max(1) as f64;

        let latest = panel
            .series
            .iter()
            .filter_map(|series| {
                samples
                    .last()
                    .and_then(|s| s.get(series.field))
                    .map(|v| format!("{} {:.2}{}", series.name, v, panel.unit))
            })
            .collect::<Vec<_>>()
            .join(" │ ");

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} │ {}", panel.title, latest)),
            )
            .x_axis(
                Axis::default()
                    .title("Time")
                    .style(Style::default().fg(theme.text_dim()))
                    .bounds([0.0, x_max])
                    .labels(time_labels(samples)),
            )
            .y_axis(
                Axis::default()
                    .title(panel.unit.trim())
                    .style(Style::default().fg(theme.text_dim()))
                    .bounds([0.0, y_max])
                    .labels(vec![
                        "0".to_string(),
                        format!("{:.1}", y_max / 2.0),
                        format!("{:.1}", y_max),
                    ]),
            );

        frame.render_widget(chart, area);
    }
}

fn panels_for(family: Family, theme: &Theme) -> Vec<Panel> {
    match family {
        Family::Cpu => vec![Panel {
            title: "CPU Usage",
            unit: "%",
            scale: Scale::Percent,
            series: vec![Series {
                field: "usage",
                name: "Usage",
                color: theme.chart_line_primary(),
            }],
        }],
        // Percent and absolute size get separate panels so each keeps its own axis.
        Family::Memory => vec![
            Panel {
                title: "Memory Usage",
                unit: "%",
                scale: Scale::Percent,
                series: vec![Series {
                    field: "usage",
                    name: "Usage",
                    color: theme.chart_line_secondary(),
                }],
            },
            Panel {
                title: "Memory Used",
                unit: " GB",
                scale: Scale::Auto,
                series: vec![Series {
                    field: "used_gb",
                    name: "Used",
                    color: theme.chart_line_primary(),
                }],
            },
        ],
        Family::Network => vec![Panel {
            title: "Network Throughput",
            unit: " MB/s",
            scale: Scale::Auto,
            series: vec![
                Series {
                    field: "upload",
                    name: "Upload",
                    color: theme.chart_upload(),
                },
                Series {
                    field: "download",
                    name: "Download",
                    color: theme.chart_download(),
                },
            ],
        }],
        Family::Disk => vec![Panel {
            title: "Disk Throughput",
            unit: " MB/s",
            scale: Scale::Auto,
            series: vec![
                Series {
                    field: "read",
                    name: "Read",
                    color: theme.chart_read(),
                },
                Series {
                    field: "write",
                    name: "Write",
                    color: theme.chart_write(),
                },
            ],
        }],
    }
}

fn points(samples: &[Sample], field: &str) -> Vec<(f64, f64)> {
    samples
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.get(field).map(|v| (i as f64, v)))
        .collect()
}

fn y_upper_bound(scale: Scale, values: impl Iterator<Item = f64>) -> f64 {
    match scale {
        Scale::Percent => 100.0,
        Scale::Auto => {
            let max = values.fold(0.0_f64, f64::max);
            (max * 1.2).max(1.0)
        }
    }
}

/// First, middle and last sample times.
fn time_labels(samples: &[Sample]) -> Vec<String> {
    match samples.len() {
        0 => Vec::new(),
        1 => vec![samples[0].time_label()],
        2 => vec![samples[0].time_label(), samples[1].time_label()],
        n => vec![
            samples[0].time_label(),
            samples[n / 2].time_label(),
            samples[n - 1].time_label(),
        ],
    }
}

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme;

impl Theme {
    pub fn new() -> Self {
        Self
    }

    pub fn primary(&self) -> Color {
        Color::Cyan
    }

    pub fn secondary(&self) -> Color {
        Color::Green
    }

    pub fn text(&self) -> Color {
        Color::Reset
    }

    pub fn text_dim(&self) -> Color {
        Color::Indexed(8)
    }

    pub fn background(&self) -> Color {
        Color::Reset
    }

    pub fn success(&self) -> Color {
        Color::Green
    }

    pub fn warning(&self) -> Color {
        Color::Yellow
    }

    pub fn error(&self) -> Color {
        Color::Red
    }

    pub fn border(&self) -> Color {
        Color::Indexed(8)
    }

    pub fn border_focused(&self) -> Color {
        Color::Cyan
    }

    pub fn highlight(&self) -> Color {
        Color::Yellow
    }

    pub fn gauge_background(&self) -> Color {
        Color::Reset
    }

    pub fn usage_critical(&self) -> Color {
        Color::Red
    }

    pub fn usage_high(&self) -> Color {
        Color::Yellow
    }

    /// Gauge colour for a 0-100 percentage: above 80 is critical, above 60
    /// is high, anything else uses `normal`.
    pub fn usage_color(&self, percent: f64, normal: Color) -> Color {
        if percent > 80.0 {
            self.usage_critical()
        } else if percent > 60.0 {
            self.usage_high()
        } else {
            normal
        }
    }

    pub fn chart_line_primary(&self) -> Color {
        Color::Cyan
    }

    pub fn chart_line_secondary(&self) -> Color {
        Color::Magenta
    }

    pub fn chart_upload(&self) -> Color {
        Color::Red
    }

    pub fn chart_download(&self) -> Color {
        Color::Green
    }

    pub fn chart_read(&self) -> Color {
        Color::Blue
    }

    pub fn chart_write(&self) -> Color {
        Color::Yellow
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_color_thresholds() {
        let theme = Theme::new();
        assert_eq!(theme.usage_color(81.0, Color::Cyan), Color::Red);
        assert_eq!(theme.usage_color(80.0, Color::Cyan), Color::Yellow);
        assert_eq!(theme.usage_color(61.0, Color::Cyan), Color::Yellow);
        assert_eq!(theme.usage_color(60.0, Color::Cyan), Color::Cyan);
    }
}

use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub placeholder: Color,
    pub table_header_fg: Color,
    pub table_header_bg: Color,
    pub statusbar_bg: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    /// Used for %CPU cells at or above [`Theme::HOT_CPU_PERCENT`].
    pub cpu_hot: Color,
    pub cpu_busy: Color,
    pub running_state: Color,
}

impl Theme {
    pub const HOT_CPU_PERCENT: f64 = 50.0;
    pub const BUSY_CPU_PERCENT: f64 = 10.0;

    /// Unknown names fall back to the dark palette.
    pub fn from_config(theme_name: &str) -> Self {
        match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" => Self::mono(),
            _ => Self::dark(),
        }
    }

    pub fn cpu_color(&self, percent: f64) -> Color {
        if percent >= Self::HOT_CPU_PERCENT {
            self.cpu_hot
        } else if percent >= Self::BUSY_CPU_PERCENT {
            self.cpu_busy
        } else {
            self.text_primary
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            placeholder: Color::DarkGray,
            table_header_fg: Color::Black,
            table_header_bg: Color::Rgb(103, 232, 249),
            statusbar_bg: Color::DarkGray,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            cpu_hot: Color::Rgb(239, 68, 68),
            cpu_busy: Color::Rgb(251, 146, 60),
            running_state: Color::Rgb(16, 185, 129),
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Blue,
            header_accent_fg: Color::White,
            overlay_border: Color::Rgb(150, 150, 150),
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            placeholder: Color::Rgb(150, 150, 150),
            table_header_fg: Color::White,
            table_header_bg: Color::Rgb(70, 130, 180),
            statusbar_bg: Color::Rgb(220, 220, 220),
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            cpu_hot: Color::Rgb(200, 60, 60),
            cpu_busy: Color::Rgb(220, 120, 80),
            running_state: Color::Rgb(0, 120, 0),
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            header_accent_bg: Color::White,
            header_accent_fg: Color::Black,
            overlay_border: Color::White,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            placeholder: Color::Gray,
            table_header_fg: Color::Black,
            table_header_bg: Color::White,
            statusbar_bg: Color::Black,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::Black,
            cpu_hot: Color::White,
            cpu_busy: Color::White,
            running_state: Color::White,
        }
    }
}

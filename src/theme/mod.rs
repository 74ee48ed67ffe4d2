use crate::data::snapshot::{ColorScheme, Unit};
use ratatui::style::{Color, Modifier, Style};

/// Colours one scheme assigns to each role in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub surface: Color,
    pub border: Color,
    pub accent: Color,
    pub ok: Color,
    pub warn: Color,
    pub error: Color,
    pub voltage: Color,
    pub current: Color,
    pub power: Color,
    pub temperature: Color,
}

const GRAPHITE: Palette = Palette {
    text: Color::Rgb(228, 236, 245),
    muted: Color::Rgb(140, 158, 182),
    surface: Color::Rgb(29, 41, 58),
    border: Color::Rgb(58, 74, 96),
    accent: Color::Rgb(94, 213, 221),
    ok: Color::Rgb(108, 212, 149),
    warn: Color::Rgb(243, 197, 109),
    error: Color::Rgb(241, 126, 126),
    voltage: Color::Rgb(126, 170, 255),
    current: Color::Rgb(243, 197, 109),
    power: Color::Rgb(108, 212, 149),
    temperature: Color::Rgb(198, 157, 255),
};

const NORD: Palette = Palette {
    text: Color::Rgb(229, 233, 240),
    muted: Color::Rgb(129, 161, 193),
    surface: Color::Rgb(59, 66, 82),
    border: Color::Rgb(76, 86, 106),
    accent: Color::Rgb(136, 192, 208),
    ok: Color::Rgb(163, 190, 140),
    warn: Color::Rgb(235, 203, 139),
    error: Color::Rgb(191, 97, 106),
    voltage: Color::Rgb(129, 161, 193),
    current: Color::Rgb(235, 203, 139),
    power: Color::Rgb(163, 190, 140),
    temperature: Color::Rgb(180, 142, 173),
};

const GRUVBOX: Palette = Palette {
    text: Color::Rgb(235, 219, 178),
    muted: Color::Rgb(168, 153, 132),
    surface: Color::Rgb(60, 56, 54),
    border: Color::Rgb(80, 73, 69),
    accent: Color::Rgb(142, 192, 124),
    ok: Color::Rgb(184, 187, 38),
    warn: Color::Rgb(250, 189, 47),
    error: Color::Rgb(251, 73, 52),
    voltage: Color::Rgb(131, 165, 152),
    current: Color::Rgb(250, 189, 47),
    power: Color::Rgb(184, 187, 38),
    temperature: Color::Rgb(211, 134, 155),
};

const SOLARIZED: Palette = Palette {
    text: Color::Rgb(238, 232, 213),
    muted: Color::Rgb(88, 110, 117),
    surface: Color::Rgb(7, 54, 66),
    border: Color::Rgb(88, 110, 117),
    accent: Color::Rgb(42, 161, 152),
    ok: Color::Rgb(133, 153, 0),
    warn: Color::Rgb(181, 137, 0),
    error: Color::Rgb(220, 50, 47),
    voltage: Color::Rgb(38, 139, 210),
    current: Color::Rgb(181, 137, 0),
    power: Color::Rgb(133, 153, 0),
    temperature: Color::Rgb(211, 54, 130),
};

#[derive(Debug, Clone)]
pub struct Theme {
    pub color_scheme: ColorScheme,
    pub palette: Palette,
}

impl Theme {
    pub fn new(color_scheme: ColorScheme) -> Self {
        let palette = match color_scheme {
            ColorScheme::Default => GRAPHITE,
            ColorScheme::Nord => NORD,
            ColorScheme::Gruvbox => GRUVBOX,
            ColorScheme::Solarized => SOLARIZED,
        };
        Self {
            color_scheme,
            palette,
        }
    }

    pub fn cycle() -> &'static [ColorScheme] {
        &[
            ColorScheme::Default,
            ColorScheme::Nord,
            ColorScheme::Gruvbox,
            ColorScheme::Solarized,
        ]
    }

    pub fn next(&self) -> Self {
        let cycle = Self::cycle();
        let idx = cycle
            .iter()
            .position(|scheme| *scheme == self.color_scheme)
            .unwrap_or(0);
        Self::new(cycle[(idx + 1) % cycle.len()])
    }

    pub fn name(&self) -> &'static str {
        match self.color_scheme {
            ColorScheme::Default => "Graphite",
            ColorScheme::Nord => "Nord",
            ColorScheme::Gruvbox => "Gruvbox",
            ColorScheme::Solarized => "Solarized",
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.palette.text)
    }

    pub fn title_style(&self) -> Style {
        self.text_style().add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.palette.border)
    }

    pub fn unit_color(&self, unit: Unit) -> Color {
        match unit {
            Unit::Volt => self.palette.voltage,
            Unit::Ampere => self.palette.current,
            Unit::Watt => self.palette.power,
            Unit::Celsius => self.palette.temperature,
        }
    }
}

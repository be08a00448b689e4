use serde::{Deserialize, Serialize};

/// Color theme for the TUI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

/// All color definitions for a theme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeColors {
    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // UI element colors
    pub title: Color,
    pub selected_bg: Color,
    pub status: Color,
    pub error: Color,
    pub muted: Color,

    // Freshness row colors
    pub fresh: Color,
    pub soon: Color,
    pub expired: Color,
}

/// RGB color representation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn rgb(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

impl Theme {
    /// Get default dark theme
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            colors: ThemeColors {
                background: Color::rgb(0x2e2e2e),
                foreground: Color::rgb(0xf4f4f9),
                border: Color::rgb(0x555555),
                border_focused: Color::rgb(0x4caf50),

                title: Color::rgb(0x4caf50),
                selected_bg: Color::rgb(0x444444),
                status: Color::rgb(0x98fb98),
                error: Color::rgb(0xff6347),
                muted: Color::rgb(0x8a8a8a),

                fresh: Color::rgb(0x98fb98),
                soon: Color::rgb(0xf0e68c),
                expired: Color::rgb(0xff6347),
            },
        }
    }

    /// Get light theme
    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            colors: ThemeColors {
                background: Color::rgb(0xf4f4f9),
                foreground: Color::rgb(0x333333),
                border: Color::rgb(0xbcbcc4),
                border_focused: Color::rgb(0x4caf50),

                title: Color::rgb(0x2e7d32),
                selected_bg: Color::rgb(0xdcdce4),
                status: Color::rgb(0x2e7d32),
                error: Color::rgb(0xc62828),
                muted: Color::rgb(0x9090a0),

                fresh: Color::rgb(0x98fb98),
                soon: Color::rgb(0xf0e68c),
                expired: Color::rgb(0xff6347),
            },
        }
    }

    /// Get all available themes
    pub fn all_themes() -> Vec<Theme> {
        vec![Self::dark(), Self::light()]
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Option<Theme> {
        Self::all_themes()
            .into_iter()
            .find(|t| t.name.to_lowercase() == name.to_lowercase())
    }

    /// The other theme in the dark/light pair.
    pub fn toggle(&self) -> Theme {
        if self.name == "Dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(Theme::by_name("dark").unwrap().name, "Dark");
        assert_eq!(Theme::by_name("LIGHT").unwrap().name, "Light");
        assert!(Theme::by_name("Solarized").is_none());
    }

    #[test]
    fn toggle_flips_between_dark_and_light() {
        let dark = Theme::dark();
        assert_eq!(dark.toggle().name, "Light");
        assert_eq!(dark.toggle().toggle().name, "Dark");
    }

    #[test]
    fn rgb_unpacks_channels() {
        let c = Color::rgb(0xff6347);
        assert_eq!((c.r, c.g, c.b), (0xff, 0x63, 0x47));
    }
}

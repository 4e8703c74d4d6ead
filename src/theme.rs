//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::game::TileColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile colours, indexed by `TileColor`: blue, yellow, red, green, white.
    pub tiles: [Color; 5],
    /// Board background.
    pub bg: Color,
    /// Border.
    pub div_line: Color,
    /// Text (help line).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Keyboard cursor and secondary text.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

impl Theme {
    /// Hardcoded One Dark defaults: exact hex values from onedark.theme.
    pub fn onedark_default() -> Self {
        Self {
            tiles: [
                rgb(0x61AFEF), // cpu_box / blue
                rgb(0xE5C07B), // title / cpu_mid / yellow
                rgb(0xE06C75), // cpu_end / temp_end / red
                rgb(0x98C379), // mem_box / green
                rgb(0xDCDFE4), // white
            ],
            bg: rgb(0x31353F),          // meter_bg
            div_line: rgb(0x3F444F),    // div_line
            main_fg: rgb(0xABB2BF),     // main_fg
            title: rgb(0xE5C07B),       // title
            inactive_fg: rgb(0x5C6370), // inactive_fg
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override tile colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.tiles = [
                    rgb(0x0088FF), // blue
                    rgb(0xFFFF00), // yellow
                    rgb(0xFF0000), // red
                    rgb(0x00FF00), // green
                    rgb(0xFFFFFF), // white
                ];
            }
            crate::Palette::Colorblind => {
                // Paul Tol's vibrant scheme: distinguishable without red/green.
                self.tiles = [
                    rgb(0x0077BB), // blue
                    rgb(0xEE7733), // orange
                    rgb(0xCC3311), // red
                    rgb(0x009988), // teal
                    rgb(0xBBBBBB), // grey
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let base = Self::onedark_default();
        Self {
            tiles: [
                get("cpu_box").unwrap_or(base.tiles[0]),
                get("title")
                    .or_else(|| get("cpu_mid"))
                    .unwrap_or(base.tiles[1]),
                get("cpu_end")
                    .or_else(|| get("temp_end"))
                    .unwrap_or(base.tiles[2]),
                get("mem_box")
                    .or_else(|| get("cpu_start"))
                    .unwrap_or(base.tiles[3]),
                get("hi_fg").unwrap_or(base.tiles[4]),
            ],
            bg: get("meter_bg").unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
        }
    }

    #[inline]
    pub fn tile_color(&self, color: TileColor) -> Color {
        self.tiles[color.index()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let digits = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|d| u8::from_str_radix(d, 16).ok())
            .ok_or_else(invalid)
    };
    match digits.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(matches!(parse_hex("#12"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#GG0000"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_tiles() {
        let map = parse_theme_file(
            "# comment\ntheme[cpu_box]=\"#010203\"\ntheme[temp_end]='#FF0000'\nnot a theme line",
        );
        let theme = Theme::from_map(&map);
        assert_eq!(theme.tile_color(TileColor::Blue), Color::Rgb(1, 2, 3));
        assert_eq!(theme.tile_color(TileColor::Red), Color::Rgb(255, 0, 0));
        assert_eq!(theme.bg, Theme::onedark_default().bg);
    }

    #[test]
    fn test_missing_file_uses_palette_defaults() {
        let theme = Theme::load(
            Some(Path::new("/nonexistent/clumptui.theme")),
            crate::Palette::HighContrast,
        )
        .unwrap();
        assert_eq!(theme.tile_color(TileColor::Yellow), Color::Rgb(255, 255, 0));
    }
}

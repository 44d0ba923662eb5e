use eframe::egui;

use crate::error::ColorError;

/// Colors handed out to newly created board items, in rotation.
pub const ITEM_PALETTE: [&str; 5] = ["#00ffff", "#ff0080", "#00ff41", "#ff8000", "#8000ff"];

/// Colors offered when recoloring a graph vertex.
pub const VERTEX_PALETTE: [&str; 7] = [
    "#00ffff", "#ff0080", "#00ff41", "#ff8000", "#8000ff", "#ffff00", "#ff4444",
];

/// Substituted whenever a stored color string cannot be parsed.
pub const ACCENT_HEX: &str = "#00ffff";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const ACCENT: Rgba = Rgba {
        r: 0,
        g: 255,
        b: 255,
        a: 255,
    };

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parses `#rrggbb` or `#aarrggbb`.
    pub fn parse_hex(s: &str) -> Result<Self, ColorError> {
        let hex = s.trim().strip_prefix('#').ok_or(ColorError::MissingHash)?;
        if !hex.is_ascii() {
            return Err(ColorError::BadDigit(s.to_string()));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorError::BadDigit(s.to_string()))
        };
        match hex.len() {
            6 => Ok(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: 255,
            }),
            8 => Ok(Self {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            n => Err(ColorError::BadLength(n)),
        }
    }

    /// Like [`Rgba::parse_hex`], but never fails: invalid input yields the accent color.
    pub fn resolve(s: &str) -> Self {
        match Self::parse_hex(s) {
            Ok(c) => c,
            Err(err) => {
                log::debug!("color {s:?} unusable ({err}), using accent");
                Self::ACCENT
            }
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
        }
    }
}

/// Deterministic palette rotation for new entities.
pub fn palette_color(palette: &[&str], index: usize) -> String {
    if palette.is_empty() {
        return ACCENT_HEX.to_string();
    }
    palette[index % palette.len()].to_string()
}

pub(crate) fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

pub(crate) fn finite_pos(p: egui::Pos2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_argb() {
        assert_eq!(
            Rgba::parse_hex("#ff8000").unwrap(),
            Rgba {
                r: 255,
                g: 128,
                b: 0,
                a: 255
            }
        );
        assert_eq!(
            Rgba::parse_hex("#80ff0000").unwrap(),
            Rgba {
                r: 255,
                g: 0,
                b: 0,
                a: 128
            }
        );
    }

    #[test]
    fn rejects_malformed_colors() {
        assert_eq!(Rgba::parse_hex("00ffff"), Err(ColorError::MissingHash));
        assert_eq!(Rgba::parse_hex("#fff"), Err(ColorError::BadLength(3)));
        assert!(matches!(
            Rgba::parse_hex("#gg0000"),
            Err(ColorError::BadDigit(_))
        ));
        assert!(matches!(
            Rgba::parse_hex("#ééé"),
            Err(ColorError::BadDigit(_))
        ));
    }

    #[test]
    fn resolve_falls_back_to_accent() {
        assert_eq!(Rgba::resolve("not a color"), Rgba::ACCENT);
        assert_eq!(Rgba::resolve("#333333").to_hex(), "#333333");
    }

    #[test]
    fn palette_rotates() {
        assert_eq!(palette_color(&ITEM_PALETTE, 0), "#00ffff");
        assert_eq!(palette_color(&ITEM_PALETTE, 6), "#ff0080");
    }
}

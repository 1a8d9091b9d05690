//! Color palettes.
//!
//! ## Learning: `const fn`
//!
//! `Color::rgb` is a `const fn`, so the whole Nord palette is built at compile
//! time and the `NORD` constants cost nothing at runtime.

use nordcat_syntax::Category;
use serde::{Deserialize, Serialize};

/// A 24-bit terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// The SGR escape that switches the foreground to this color.
    pub fn foreground_escape(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }
}

/// The Nord color scheme.
pub mod nord {
    use super::Color;

    pub const POLAR_NIGHT_3: Color = Color::rgb(0x4C, 0x56, 0x6A); // nord3
    pub const SNOW_STORM_0: Color = Color::rgb(0xD8, 0xDE, 0xE9); // nord4
    pub const FROST_0: Color = Color::rgb(0x8F, 0xBC, 0xBB); // nord7
    pub const FROST_1: Color = Color::rgb(0x88, 0xC0, 0xD0); // nord8
    pub const FROST_2: Color = Color::rgb(0x81, 0xA1, 0xC1); // nord9
    pub const AURORA_RED: Color = Color::rgb(0xBF, 0x61, 0x6A); // nord11
    pub const AURORA_ORANGE: Color = Color::rgb(0xD0, 0x87, 0x70); // nord12
    pub const AURORA_YELLOW: Color = Color::rgb(0xEB, 0xCB, 0x8B); // nord13
    pub const AURORA_GREEN: Color = Color::rgb(0xA3, 0xBE, 0x8C); // nord14
}

/// Foreground color per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub keyword: Color,
    pub type_name: Color,
    pub constant: Color,
    pub operator: Color,
    pub string: Color,
    pub number: Color,
    pub function: Color,
    pub builtin: Color,
    pub qualified_call: Color,
    pub special: Color,
    pub comment: Color,
    pub identifier: Color,
    pub text: Color,
}

impl Palette {
    /// The default Nord palette.
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            keyword: nord::FROST_2,
            type_name: nord::FROST_0,
            constant: nord::AURORA_YELLOW,
            operator: nord::FROST_1,
            string: nord::AURORA_GREEN,
            number: nord::AURORA_RED,
            function: nord::FROST_1,
            builtin: nord::FROST_1,
            qualified_call: nord::FROST_1,
            special: nord::AURORA_ORANGE,
            comment: nord::POLAR_NIGHT_3,
            identifier: nord::SNOW_STORM_0,
            text: nord::SNOW_STORM_0,
        }
    }

    /// Returns the color for a category.
    pub fn color(&self, category: Category) -> Color {
        match category {
            Category::Keyword => self.keyword,
            Category::Type => self.type_name,
            Category::Constant => self.constant,
            Category::Operator => self.operator,
            Category::String => self.string,
            Category::Number => self.number,
            Category::FunctionCall => self.function,
            Category::Builtin => self.builtin,
            Category::QualifiedCall => self.qualified_call,
            Category::Special => self.special,
            Category::Comment => self.comment,
            Category::Identifier => self.identifier,
            Category::Text => self.text,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::nord()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#81A1C1"), Some(nord::FROST_2));
        assert_eq!(Color::from_hex("#d8dee9"), Some(nord::SNOW_STORM_0));
        assert_eq!(Color::from_hex("81A1C1"), None);
        assert_eq!(Color::from_hex("#81A1"), None);
        assert_eq!(Color::from_hex("#GGGGGG"), None);
    }

    #[test]
    fn test_foreground_escape() {
        assert_eq!(nord::FROST_2.foreground_escape(), "\x1b[38;2;129;161;193m");
    }

    #[test]
    fn test_nord_palette_matches_scheme() {
        let palette = Palette::nord();
        assert_eq!(palette.color(Category::Keyword), Color::from_hex("#81A1C1").unwrap());
        assert_eq!(palette.color(Category::String), Color::from_hex("#A3BE8C").unwrap());
        assert_eq!(palette.color(Category::Number), Color::from_hex("#BF616A").unwrap());
        assert_eq!(palette.color(Category::Comment), Color::from_hex("#4C566A").unwrap());
        assert_eq!(palette.color(Category::Text), palette.color(Category::Identifier));
    }
}

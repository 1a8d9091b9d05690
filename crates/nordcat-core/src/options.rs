//! Highlighting options.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[serde(default)]` fills every missing field from `Default::default()`,
//! so a partial options document still deserializes.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Options that shape how every document in a run is highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightOptions {
    /// Line splitter or whole-document lexer
    pub mode: Mode,

    /// Whether classification state survives a line break
    pub carry: CarryPolicy,

    /// Language assumed for standard input
    pub stdin_language: String,

    /// Output encoding
    pub format: OutputFormat,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            carry: CarryPolicy::default(),
            stdin_language: "go".to_string(),
            format: OutputFormat::default(),
        }
    }
}

/// How a document is broken into units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Split each line on whitespace and delimiters, classify with carried state.
    #[default]
    Lines,
    /// Lex the whole document, then run the cross-reference pass.
    Lexer,
}

/// When the carried classification state is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarryPolicy {
    /// Only at the start of a document.
    #[default]
    Document,
    /// At the start of every line.
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Ansi,
    Json,
}

macro_rules! keyword_enum {
    ($ty:ident, $label:literal { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(CoreError::Config(format!(
                        "invalid {}: {other} (expected one of: {})",
                        $label,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum!(Mode, "mode" { "lines" => Lines, "lexer" => Lexer });
keyword_enum!(CarryPolicy, "carry policy" { "document" => Document, "line" => Line });
keyword_enum!(OutputFormat, "output format" { "ansi" => Ansi, "json" => Json });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = HighlightOptions::default();
        assert_eq!(options.mode, Mode::Lines);
        assert_eq!(options.carry, CarryPolicy::Document);
        assert_eq!(options.stdin_language, "go");
        assert_eq!(options.format, OutputFormat::Ansi);
    }

    #[test]
    fn test_parse_from_cli_words() {
        assert_eq!("lexer".parse::<Mode>().unwrap(), Mode::Lexer);
        assert_eq!("line".parse::<CarryPolicy>().unwrap(), CarryPolicy::Line);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);

        let err = "tokens".parse::<Mode>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Config error: invalid mode: tokens (expected one of: lines, lexer)"
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mode in [Mode::Lines, Mode::Lexer] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_partial_options_fill_from_default() {
        let options: HighlightOptions = serde_json::from_str(r#"{"mode": "lexer"}"#).unwrap();
        assert_eq!(options.mode, Mode::Lexer);
        assert_eq!(options.stdin_language, "go");
    }
}

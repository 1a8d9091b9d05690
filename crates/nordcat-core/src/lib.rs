//! # Nordcat Core
//!
//! Documents and the per-document highlighting pipeline.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       Highlighter                         │
//! │  ┌──────────────┐   ┌──────────────┐   ┌───────────────┐  │
//! │  │ GrammarTable │   │   Options    │   │   Renderer    │  │
//! │  └──────────────┘   └──────────────┘   └───────────────┘  │
//! │          │                                    ▲           │
//! │  ┌───────┴────────┐   ┌────────────────┐      │           │
//! │  │    Document    │──►│   ImportSet    │──► tokens        │
//! │  └────────────────┘   └────────────────┘                  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Every document gets a fresh import set and classification state, so no
//! mutable state is shared between documents.

pub mod document;
pub mod highlight;
pub mod options;

pub use document::{Document, Source};
pub use highlight::{Highlighted, Highlighter};
pub use options::{CarryPolicy, HighlightOptions, Mode, OutputFormat};

use std::path::PathBuf;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while processing one document.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot read {name}: {source}")]
    Read {
        name: String,
        source: std::io::Error,
    },

    #[error("Unsupported file type: {name} ({extension})")]
    UnsupportedLanguage { name: String, extension: String },

    #[error(transparent)]
    Syntax(#[from] nordcat_syntax::SyntaxError),

    #[error("Output error: {0}")]
    Output(#[source] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl CoreError {
    /// Returns true if the error leaves the rest of the run unaffected.
    ///
    /// Output failures mean stdout is gone, so there is no point in moving on
    /// to the next document.
    pub fn is_per_document(&self) -> bool {
        !matches!(self, CoreError::Output(_))
    }
}

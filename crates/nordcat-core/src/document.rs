//! Documents: one file or the standard input stream, read fully into memory.
//!
//! ## Learning: Lossy Decoding
//!
//! Source files are not guaranteed to be UTF-8. `String::from_utf8_lossy`
//! replaces invalid sequences with U+FFFD instead of failing, which is the
//! right trade for a highlighter that only ever displays the text.

use nordcat_syntax::GrammarTable;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::{CoreError, CoreResult};

/// Where a document's text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
}

/// A document ready to highlight.
#[derive(Debug, Clone)]
pub struct Document {
    /// Display name used in diagnostics
    name: String,

    source: Source,

    /// Grammar name in the table
    language: String,

    text: String,
}

impl Document {
    /// Creates a document from text already in memory.
    pub fn new(
        name: impl Into<String>,
        language: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: Source::Stdin,
            language: language.into(),
            text: text.into(),
        }
    }

    /// Opens a file, picks its grammar, then reads it.
    ///
    /// `language` overrides extension-based detection. The file is opened
    /// before detection so a missing file is reported as such even when its
    /// extension is unknown.
    pub fn open(
        path: impl AsRef<Path>,
        table: &GrammarTable,
        language: Option<&str>,
    ) -> CoreResult<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();

        let file = File::open(path).map_err(|source| CoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let language = match language {
            Some(forced) => table.require(forced)?.name().to_string(),
            None => match table.detect(path) {
                Some(grammar) => grammar.name().to_string(),
                None => {
                    let extension = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(|e| format!(".{e}"))
                        .unwrap_or_else(|| "no extension".to_string());
                    return Err(CoreError::UnsupportedLanguage { name, extension });
                }
            },
        };
        tracing::debug!(document = %name, language = %language, "Detected language");

        let text = read_text(file, &name)?;
        Ok(Self {
            name,
            source: Source::File(path.to_path_buf()),
            language,
            text,
        })
    }

    /// Reads a whole stream as one document in the given language.
    pub fn from_reader(
        reader: impl Read,
        name: impl Into<String>,
        table: &GrammarTable,
        language: &str,
    ) -> CoreResult<Self> {
        let name = name.into();
        let language = table.require(language)?.name().to_string();
        let text = read_text(reader, &name)?;
        Ok(Self {
            name,
            source: Source::Stdin,
            language,
            text,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

fn read_text(mut reader: impl Read, name: &str) -> CoreResult<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|source| CoreError::Read {
        name: name.to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

//! Renderers that turn classified tokens into output bytes.

use crate::palette::Palette;
use nordcat_syntax::{Category, Token};
use serde::Serialize;
use std::io::{self, Write};

/// SGR reset.
pub const RESET: &str = "\x1b[0m";

/// Output backend for highlighted documents.
///
/// A renderer is driven one document at a time: [`Renderer::begin`] once,
/// then either [`Renderer::line`] per input line (line mode),
/// [`Renderer::stream`] once (lexer mode), or [`Renderer::plain`] when the
/// document could not be classified at all.
pub trait Renderer {
    /// Resets per-document state.
    fn begin(&mut self) {}

    /// Renders the units of one input line.
    fn line(&mut self, out: &mut dyn Write, tokens: &[Token<'_>]) -> io::Result<()>;

    /// Renders a whole-document token stream that already contains its own spacing.
    fn stream(&mut self, out: &mut dyn Write, tokens: &[Token<'_>]) -> io::Result<()>;

    /// Writes text that has not been classified.
    fn plain(&mut self, out: &mut dyn Write, text: &str) -> io::Result<()>;
}

/// 24-bit ANSI color output.
#[derive(Debug, Clone, Default)]
pub struct AnsiRenderer {
    palette: Palette,
}

impl AnsiRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn paint(&self, out: &mut dyn Write, token: &Token<'_>) -> io::Result<()> {
        let color = self.palette.color(token.category);
        write!(out, "{}{}{}", color.foreground_escape(), token.text, RESET)
    }
}

impl Renderer for AnsiRenderer {
    fn line(&mut self, out: &mut dyn Write, tokens: &[Token<'_>]) -> io::Result<()> {
        for token in tokens {
            self.paint(out, token)?;
            out.write_all(b" ")?;
        }
        out.write_all(b"\n")
    }

    fn stream(&mut self, out: &mut dyn Write, tokens: &[Token<'_>]) -> io::Result<()> {
        for token in tokens {
            if token.text.trim().is_empty() {
                out.write_all(token.text.as_bytes())?;
            } else {
                self.paint(out, token)?;
            }
        }
        Ok(())
    }

    fn plain(&mut self, out: &mut dyn Write, text: &str) -> io::Result<()> {
        out.write_all(text.as_bytes())
    }
}

#[derive(Serialize)]
struct JsonToken<'a> {
    line: usize,
    category: Category,
    text: &'a str,
}

/// One JSON object per token, one object per output line.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer {
    line: usize,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&self, out: &mut dyn Write, category: Category, text: &str) -> io::Result<()> {
        let record = JsonToken {
            line: self.line,
            category,
            text,
        };
        serde_json::to_writer(&mut *out, &record)?;
        out.write_all(b"\n")
    }
}

impl Renderer for JsonRenderer {
    fn begin(&mut self) {
        self.line = 1;
    }

    fn line(&mut self, out: &mut dyn Write, tokens: &[Token<'_>]) -> io::Result<()> {
        for token in tokens {
            self.emit(out, token.category, token.text)?;
        }
        self.line += 1;
        Ok(())
    }

    fn stream(&mut self, out: &mut dyn Write, tokens: &[Token<'_>]) -> io::Result<()> {
        for token in tokens {
            if token.text.trim().is_empty() {
                self.line += token.text.matches('\n').count();
                continue;
            }
            self.emit(out, token.category, token.text)?;
        }
        Ok(())
    }

    fn plain(&mut self, out: &mut dyn Write, text: &str) -> io::Result<()> {
        for line in text.lines() {
            self.emit(out, Category::Text, line)?;
            self.line += 1;
        }
        Ok(())
    }
}

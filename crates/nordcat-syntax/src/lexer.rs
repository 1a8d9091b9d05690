//! Whole-document lexer.
//!
//! Unlike the line splitter, the lexer keeps every byte of the input: spacing,
//! punctuation and comments come back as tokens, so the renderer can color the
//! document in place. Words are classified with the same rule chain as line
//! mode; everything else gets its category straight from the scanner.
//!
//! Strings and comments never span lines.

use crate::classifier::Classifier;
use crate::grammar::Grammar;
use crate::splitter::Unit;
use crate::{Category, SyntaxError, SyntaxResult, Token};

/// What the scanner saw, before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexKind {
    Whitespace,
    Word,
    Number,
    Str,
    Comment,
    Operator,
    Punct,
    Other,
}

/// A scanned span of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: LexKind,
    pub start: usize,
    pub end: usize,
}

const OPERATOR_CHARS: &[u8] = b"=!<>+-*/%&|^~?:";
const PUNCT_CHARS: &[u8] = b"()[]{},;.";

/// Byte-level scanner over one document.
struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    grammar: &'a Grammar,
    lexemes: Vec<Lexeme>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str, grammar: &'a Grammar) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            grammar,
            lexemes: Vec::new(),
        }
    }

    fn push(&mut self, kind: LexKind, start: usize) {
        self.lexemes.push(Lexeme {
            kind,
            start,
            end: self.pos,
        });
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn line_end(&self) -> usize {
        self.rest()
            .find('\n')
            .map_or(self.bytes.len(), |n| self.pos + n)
    }

    fn current_char(&self) -> char {
        self.rest().chars().next().unwrap_or('\0')
    }

    fn run(mut self) -> SyntaxResult<Vec<Lexeme>> {
        let len = self.bytes.len();

        while self.pos < len {
            let start = self.pos;
            let b = self.bytes[self.pos];
            let c = self.current_char();

            if c.is_whitespace() {
                while self.pos < len && self.current_char().is_whitespace() {
                    self.pos += self.current_char().len_utf8();
                }
                self.push(LexKind::Whitespace, start);
                continue;
            }

            if let Some(marker) = self.grammar.line_comment() {
                if self.rest().starts_with(marker) {
                    self.pos = self.line_end();
                    self.push(LexKind::Comment, start);
                    continue;
                }
            }

            if let Some((open, close)) = self.grammar.block_comment() {
                if self.rest().starts_with(open) {
                    let line_end = self.line_end();
                    let body = &self.text[self.pos + open.len()..line_end];
                    self.pos = match body.find(close) {
                        Some(n) => self.pos + open.len() + n + close.len(),
                        None => line_end,
                    };
                    self.push(LexKind::Comment, start);
                    continue;
                }
            }

            if matches!(b, b'"' | b'\'' | b'`') {
                self.string(b);
                continue;
            }

            if b.is_ascii_digit()
                || (b == b'.' && self.bytes.get(self.pos + 1).is_some_and(u8::is_ascii_digit))
            {
                self.number();
                self.push(LexKind::Number, start);
                continue;
            }

            if c.is_alphabetic() || c == '_' {
                self.word(start);
                self.push(LexKind::Word, start);
                continue;
            }

            if b == b'.' {
                match self.longest_operator(&["...", "..=", ".."]) {
                    Some(op) => {
                        self.pos += op;
                        self.push(LexKind::Operator, start);
                    }
                    None => {
                        self.pos += 1;
                        self.push(LexKind::Punct, start);
                    }
                }
                continue;
            }

            if OPERATOR_CHARS.contains(&b) {
                self.operator();
                self.push(LexKind::Operator, start);
                continue;
            }

            self.pos += c.len_utf8();
            let kind = if PUNCT_CHARS.contains(&b) {
                LexKind::Punct
            } else {
                LexKind::Other
            };
            self.push(kind, start);
        }

        Ok(self.lexemes)
    }

    /// Scans a quoted string up to its closing quote or the end of the line.
    /// A lone single quote with no partner on the line is just a character.
    fn string(&mut self, quote: u8) {
        let start = self.pos;
        let line_end = self.line_end();
        let mut i = self.pos + 1;
        let mut closed = false;

        while i < line_end {
            match self.bytes[i] {
                b'\\' => i += 2,
                b if b == quote => {
                    i += 1;
                    closed = true;
                    break;
                }
                _ => i += 1,
            }
        }

        if !closed && quote == b'\'' {
            self.pos += 1;
            self.push(LexKind::Other, start);
            return;
        }

        self.pos = i.min(line_end);
        self.push(LexKind::Str, start);
    }

    fn number(&mut self) {
        let len = self.bytes.len();
        let bytes = self.bytes;

        if bytes[self.pos] == b'0' && self.pos + 1 < len {
            let radix = match bytes[self.pos + 1] {
                b'x' | b'X' => Some(16),
                b'o' | b'O' => Some(8),
                b'b' | b'B' => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                while self.pos < len
                    && ((bytes[self.pos] as char).is_digit(radix) || bytes[self.pos] == b'_')
                {
                    self.pos += 1;
                }
                return;
            }
        }

        while self.pos < len {
            match bytes[self.pos] {
                b'0'..=b'9' | b'_' => self.pos += 1,
                b'.' if bytes.get(self.pos + 1).is_some_and(u8::is_ascii_digit) => self.pos += 1,
                b'e' | b'E' => {
                    self.pos += 1;
                    if matches!(bytes.get(self.pos), Some(b'+' | b'-')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn word(&mut self, start: usize) {
        while self.pos < self.bytes.len() {
            let c = self.current_char();
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            self.pos += c.len_utf8();
        }

        // `println!` is one word when the grammar knows it as a built-in.
        if self.bytes.get(self.pos) == Some(&b'!') && self.bytes.get(self.pos + 1) != Some(&b'=') {
            if self.grammar.is_builtin(&self.text[start..=self.pos]) {
                self.pos += 1;
            }
        }
    }

    /// Takes the longest run of operator characters the grammar knows, or a
    /// single character when it knows none of them.
    fn operator(&mut self) {
        let run = self.bytes[self.pos..]
            .iter()
            .take_while(|b| OPERATOR_CHARS.contains(b))
            .count();
        let longest = (1..=run)
            .rev()
            .find(|&n| self.grammar.is_operator(&self.text[self.pos..self.pos + n]))
            .unwrap_or(1);
        self.pos += longest;
    }

    fn longest_operator(&self, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .find(|op| self.rest().starts_with(*op) && self.grammar.is_operator(op))
            .map(|op| op.len())
    }
}

/// Scans a document into raw lexemes.
///
/// Fails only on input that is clearly not text (a NUL byte).
pub fn lex(text: &str, grammar: &Grammar) -> SyntaxResult<Vec<Lexeme>> {
    if let Some(offset) = text.bytes().position(|b| b == 0) {
        return Err(SyntaxError::BinaryInput { offset });
    }
    Lexer::new(text, grammar).run()
}

/// Lexes and classifies a whole document.
pub fn tokenize_document<'t>(
    text: &'t str,
    classifier: &Classifier<'_>,
) -> SyntaxResult<Vec<Token<'t>>> {
    let grammar = classifier.grammar();
    let lexemes = lex(text, grammar)?;
    let bytes = text.as_bytes();

    let tokens = lexemes
        .iter()
        .map(|lexeme| {
            let slice = &text[lexeme.start..lexeme.end];
            let category = match lexeme.kind {
                LexKind::Word => {
                    let unit = Unit {
                        text: slice,
                        call_site: bytes.get(lexeme.end) == Some(&b'('),
                    };
                    classifier.classify_word(unit)
                }
                LexKind::Number => Category::Number,
                LexKind::Str => Category::String,
                LexKind::Comment => Category::Comment,
                LexKind::Operator if grammar.is_operator(slice) => Category::Operator,
                LexKind::Operator | LexKind::Whitespace | LexKind::Punct | LexKind::Other => {
                    Category::Text
                }
            };
            Token::new(category, slice)
        })
        .collect();

    Ok(tokens)
}

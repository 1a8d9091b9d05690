//! # Nordcat Syntax
//!
//! Heuristic lexical classification for terminal highlighting.
//!
//! ## Pipeline
//!
//! ```text
//!   document text
//!        │
//!        ├──► ImportSet::scan        (once per document)
//!        │
//!        ├──► line mode:  split_line ──► Classifier::classify_line
//!        │                               (state folded across units)
//!        │
//!        └──► lexer mode: tokenize_document ──► cross_reference
//! ```
//!
//! This is best-effort highlighting, not parsing: there is no AST, no scope
//! tracking, and a unit that no rule recognises is simply plain text.
//!
//! ## Learning: Borrowed Tokens
//!
//! [`Token`] holds a `&str` slice of the document rather than an owned
//! `String`. The lifetime parameter ties every token to the text it came from,
//! so the compiler rejects any attempt to keep tokens around after the
//! document is dropped.

pub mod classifier;
pub mod grammar;
pub mod imports;
pub mod lexer;
pub mod splitter;
pub mod xref;

pub use classifier::{Classifier, ClassifyState, RULES, Rule};
pub use grammar::{Grammar, GrammarTable, ImportSyntax};
pub use imports::ImportSet;
pub use lexer::{LexKind, Lexeme, lex, tokenize_document};
pub use splitter::{Unit, split_line};
pub use xref::cross_reference;

use serde::Serialize;

/// Result type for syntax operations
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Errors that can occur while loading grammars or lexing documents.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Grammar file error: {0}")]
    GrammarFile(#[from] toml::de::Error),

    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("Input looks binary (NUL byte at offset {offset})")]
    BinaryInput { offset: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The semantic category of a lexical unit. Drives its display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// `module.function` where the module is imported and exports the function.
    QualifiedCall,
    Builtin,
    FunctionCall,
    Keyword,
    Type,
    Constant,
    /// Conventional names like `err` or `self`.
    Special,
    Identifier,
    Operator,
    String,
    Number,
    /// Only produced by the whole-document lexer.
    Comment,
    /// Fallback: rendered without special treatment.
    Text,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::QualifiedCall,
        Category::Builtin,
        Category::FunctionCall,
        Category::Keyword,
        Category::Type,
        Category::Constant,
        Category::Special,
        Category::Identifier,
        Category::Operator,
        Category::String,
        Category::Number,
        Category::Comment,
        Category::Text,
    ];

    /// Returns true if the cross-reference pass may replace this category.
    pub fn is_upgradable(self) -> bool {
        matches!(self, Category::Identifier | Category::FunctionCall)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::QualifiedCall => "qualified_call",
            Category::Builtin => "builtin",
            Category::FunctionCall => "function_call",
            Category::Keyword => "keyword",
            Category::Type => "type",
            Category::Constant => "constant",
            Category::Special => "special",
            Category::Identifier => "identifier",
            Category::Operator => "operator",
            Category::String => "string",
            Category::Number => "number",
            Category::Comment => "comment",
            Category::Text => "text",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified unit of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    pub category: Category,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(category: Category, text: &'a str) -> Self {
        Self { category, text }
    }
}

/// `[letter or _][letters, digits, _]*`
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

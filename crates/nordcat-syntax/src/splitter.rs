//! Line splitter.
//!
//! Breaks one line into candidate units on whitespace and the delimiter set
//! `( ) [ ] { } , ;`. Boundaries are dropped, never emitted. Dots get special
//! treatment:
//!
//! - `fmt.Println` (exactly two identifier halves) stays a single unit.
//! - Other dotted chains made of identifiers (`a.b.c`, `fmt.`, `.Println`)
//!   are broken up and each `.` is emitted as its own separator unit, which is
//!   what the carried classification state keys on.
//! - Anything else containing a dot (`3.14`, `"a.b"`, `...`) is left whole.
//!
//! The splitter never looks at a grammar.

use crate::is_identifier;

/// Characters that end a unit and are then discarded.
pub const DELIMITERS: &[char] = &['(', ')', '[', ']', '{', '}', ',', ';'];

/// The qualifier separator between a module and one of its functions.
pub const SEPARATOR: &str = ".";

/// One candidate lexical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit<'a> {
    /// The unit's text, a slice of the original line.
    pub text: &'a str,
    /// The unit was immediately followed by `(` in the source.
    pub call_site: bool,
}

impl<'a> Unit<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            call_site: false,
        }
    }

    pub fn call(text: &'a str) -> Self {
        Self {
            text,
            call_site: true,
        }
    }

    pub fn is_separator(&self) -> bool {
        self.text == SEPARATOR
    }
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace() || DELIMITERS.contains(&c)
}

/// Splits a line into units, in order.
pub fn split_line(line: &str) -> Vec<Unit<'_>> {
    let mut units = Vec::new();
    let mut start = None;

    for (i, c) in line.char_indices() {
        if is_boundary(c) {
            if let Some(s) = start.take() {
                push_chunk(&mut units, &line[s..i], c == '(');
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }

    if let Some(s) = start {
        push_chunk(&mut units, &line[s..], false);
    }

    units
}

fn push_chunk<'a>(units: &mut Vec<Unit<'a>>, chunk: &'a str, call_site: bool) {
    if !chunk.contains('.') || is_compound(chunk) || !is_dotted_chain(chunk) {
        units.push(Unit {
            text: chunk,
            call_site,
        });
        return;
    }

    let mut rest = chunk;
    while let Some(dot) = rest.find('.') {
        if dot > 0 {
            units.push(Unit::new(&rest[..dot]));
        }
        units.push(Unit::new(&rest[dot..dot + 1]));
        rest = &rest[dot + 1..];
    }
    if !rest.is_empty() {
        units.push(Unit {
            text: rest,
            call_site,
        });
    } else if call_site {
        // `fmt.(` has nothing to attach the call to; the dot keeps it.
        if let Some(last) = units.last_mut() {
            last.call_site = true;
        }
    }
}

/// `module.function`: exactly two identifier halves.
pub fn is_compound(text: &str) -> bool {
    text.split_once('.')
        .is_some_and(|(module, function)| is_identifier(module) && is_identifier(function))
}

/// Every dot-separated piece is empty or an identifier, and at least one is
/// an identifier.
fn is_dotted_chain(text: &str) -> bool {
    let mut any = false;
    for piece in text.split('.') {
        if piece.is_empty() {
            continue;
        }
        if !is_identifier(piece) {
            return false;
        }
        any = true;
    }
    any
}

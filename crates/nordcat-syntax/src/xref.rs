//! Cross-reference pass over a whole-document token stream.
//!
//! Walks the tokens once and upgrades a plain identifier (or bare call) to
//! [`Category::QualifiedCall`] when the two tokens right before it are a known
//! module name and the `.` separator. The pass only ever upgrades, and the
//! decision depends only on token text, so running it again is a no-op.

use crate::grammar::Grammar;
use crate::imports::ImportSet;
use crate::splitter::SEPARATOR;
use crate::{Category, Token, is_identifier};

/// Upgrades qualified calls in place and returns how many tokens changed.
pub fn cross_reference(tokens: &mut [Token<'_>], grammar: &Grammar, imports: &ImportSet) -> usize {
    let mut module: Option<&str> = None;
    let mut after_separator = false;
    let mut upgraded = 0;

    for token in tokens.iter_mut() {
        if is_identifier(token.text) {
            let qualifies = after_separator
                && token.category.is_upgradable()
                && module.is_some_and(|m| is_module(m, grammar, imports));
            if qualifies {
                tracing::trace!(module = ?module, function = token.text, "qualified call");
                token.category = Category::QualifiedCall;
                upgraded += 1;
            }
            module = Some(token.text);
            after_separator = false;
        } else if token.text == SEPARATOR {
            if after_separator {
                module = None;
            }
            after_separator = true;
        } else {
            module = None;
            after_separator = false;
        }
    }

    upgraded
}

fn is_module(name: &str, grammar: &Grammar, imports: &ImportSet) -> bool {
    imports.resolve(name).is_some() || grammar.is_prelude(name)
}

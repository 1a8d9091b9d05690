//! The ordered rule chain.
//!
//! Classification is a pure function of the unit, the grammar, the document's
//! import set, and the state carried over from the previous unit. Rules are
//! tried in [`RULES`] order and the first match wins; [`Category::Text`] is the
//! fallback, so every unit gets exactly one category.
//!
//! Reordering [`RULES`] changes output and should be treated as a
//! compatibility break.

use crate::grammar::Grammar;
use crate::imports::ImportSet;
use crate::splitter::{self, Unit};
use crate::{Category, Token, is_identifier};

/// State carried from one unit to the next.
///
/// Threaded through [`Classifier::classify`] by value, so two documents never
/// share one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifyState {
    /// Text of the most recent unit that was not a separator.
    last: Option<String>,
    /// The unit directly before the current one was a separator.
    after_separator: bool,
}

impl ClassifyState {
    /// Returns the state to carry past `unit`.
    pub fn advance(self, unit: &Unit<'_>) -> Self {
        if unit.is_separator() {
            // `a . . b` has no module directly before `b`.
            Self {
                last: if self.after_separator { None } else { self.last },
                after_separator: true,
            }
        } else {
            Self {
                last: Some(unit.text.to_string()),
                after_separator: false,
            }
        }
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    pub fn after_separator(&self) -> bool {
        self.after_separator
    }
}

/// Everything a rule may look at.
pub struct RuleInput<'p> {
    pub unit: Unit<'p>,
    pub grammar: &'p Grammar,
    pub imports: &'p ImportSet,
    pub state: &'p ClassifyState,
}

impl RuleInput<'_> {
    /// Resolves a name to a module, either imported or in the grammar prelude.
    fn module(&self, name: &str) -> Option<String> {
        self.imports
            .resolve(name)
            .or_else(|| self.grammar.is_prelude(name).then(|| name.to_string()))
    }

    fn module_exports(&self, module: &str, function: &str) -> bool {
        self.module(module)
            .is_some_and(|m| self.grammar.exports(&m, function))
    }
}

/// One entry of the rule chain.
pub struct Rule {
    pub name: &'static str,
    pub category: Category,
    pub test: fn(&RuleInput<'_>) -> bool,
}

/// The rule chain, highest priority first.
pub const RULES: &[Rule] = &[
    Rule {
        name: "qualified-call",
        category: Category::QualifiedCall,
        test: qualified_call,
    },
    Rule {
        name: "builtin",
        category: Category::Builtin,
        test: |p| p.grammar.is_builtin(p.unit.text),
    },
    Rule {
        name: "call-shape",
        category: Category::FunctionCall,
        test: call_shape,
    },
    Rule {
        name: "keyword",
        category: Category::Keyword,
        test: |p| p.grammar.is_keyword(p.unit.text),
    },
    Rule {
        name: "type",
        category: Category::Type,
        test: |p| p.grammar.is_type(p.unit.text),
    },
    Rule {
        name: "constant",
        category: Category::Constant,
        test: |p| p.grammar.is_constant(p.unit.text),
    },
    Rule {
        name: "special",
        category: Category::Special,
        test: |p| p.grammar.is_special(p.unit.text),
    },
    Rule {
        name: "identifier",
        category: Category::Identifier,
        test: |p| is_identifier(p.unit.text),
    },
    Rule {
        name: "operator",
        category: Category::Operator,
        test: |p| p.grammar.is_operator(p.unit.text),
    },
    Rule {
        name: "string",
        category: Category::String,
        test: |p| p.unit.text.starts_with(['"', '\'']),
    },
    Rule {
        name: "number",
        category: Category::Number,
        test: |p| !p.unit.text.is_empty() && p.unit.text.bytes().all(|b| b.is_ascii_digit()),
    },
];

fn qualified_call(p: &RuleInput<'_>) -> bool {
    if splitter::is_compound(p.unit.text) {
        return p
            .unit
            .text
            .split_once('.')
            .is_some_and(|(module, function)| p.module_exports(module, function));
    }

    p.state.after_separator()
        && is_identifier(p.unit.text)
        && p.state
            .last()
            .is_some_and(|module| p.module_exports(module, p.unit.text))
}

/// An identifier (or dotted member chain) sitting directly before `(`.
/// Keywords are never call targets: `if(` and `while(` stay keywords.
fn call_shape(p: &RuleInput<'_>) -> bool {
    p.unit.call_site
        && !p.grammar.is_keyword(p.unit.text)
        && p.unit.text.split('.').all(is_identifier)
}

/// Classifies units against one grammar and one document's imports.
#[derive(Clone, Copy)]
pub struct Classifier<'a> {
    grammar: &'a Grammar,
    imports: &'a ImportSet,
}

impl<'a> Classifier<'a> {
    pub fn new(grammar: &'a Grammar, imports: &'a ImportSet) -> Self {
        Self { grammar, imports }
    }

    pub fn grammar(&self) -> &'a Grammar {
        self.grammar
    }

    pub fn imports(&self) -> &'a ImportSet {
        self.imports
    }

    /// Returns the first matching rule for `unit`, if any.
    pub fn matching_rule(&self, unit: Unit<'_>, state: &ClassifyState) -> Option<&'static Rule> {
        let input = RuleInput {
            unit,
            grammar: self.grammar,
            imports: self.imports,
            state,
        };
        RULES.iter().find(|rule| (rule.test)(&input))
    }

    /// Assigns a category to `unit` and returns the state for the next unit.
    pub fn classify(&self, unit: Unit<'_>, state: ClassifyState) -> (Category, ClassifyState) {
        let category = self
            .matching_rule(unit, &state)
            .map_or(Category::Text, |rule| rule.category);
        (category, state.advance(&unit))
    }

    /// Classifies a unit with no carried context.
    pub fn classify_word(&self, unit: Unit<'_>) -> Category {
        self.classify(unit, ClassifyState::default()).0
    }

    /// Splits and classifies one line, folding `state` across its units.
    pub fn classify_line<'l>(
        &self,
        line: &'l str,
        state: ClassifyState,
    ) -> (Vec<Token<'l>>, ClassifyState) {
        splitter::split_line(line)
            .into_iter()
            .fold((Vec::new(), state), |(mut tokens, state), unit| {
                let (category, next) = self.classify(unit, state);
                tokens.push(Token::new(category, unit.text));
                (tokens, next)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GrammarTable;
    use proptest::prelude::*;

    const HELLO: &str = "package main\nimport \"fmt\"\nfunc main() { fmt.Println(\"hi\") }\n";

    fn go() -> Grammar {
        GrammarTable::builtin().get("go").unwrap().clone()
    }

    fn categories(grammar: &Grammar, text: &str) -> Vec<(Category, String)> {
        let imports = ImportSet::scan(text, grammar);
        let classifier = Classifier::new(grammar, &imports);
        let mut state = ClassifyState::default();
        let mut out = Vec::new();
        for line in text.lines() {
            let (tokens, next) = classifier.classify_line(line, state);
            state = next;
            out.extend(tokens.into_iter().map(|t| (t.category, t.text.to_string())));
        }
        out
    }

    fn category_of(out: &[(Category, String)], text: &str) -> Vec<Category> {
        out.iter().filter(|(_, t)| t == text).map(|(c, _)| *c).collect()
    }

    #[test]
    fn test_hello_world_scenario() {
        let grammar = go();
        let out = categories(&grammar, HELLO);

        assert_eq!(category_of(&out, "fmt.Println"), vec![Category::QualifiedCall]);
        assert_eq!(category_of(&out, "package"), vec![Category::Keyword]);
        assert_eq!(category_of(&out, "import"), vec![Category::Keyword]);
        assert_eq!(category_of(&out, "func"), vec![Category::Keyword]);
        assert_eq!(category_of(&out, "\"hi\""), vec![Category::String]);
        assert_eq!(category_of(&out, "\"fmt\""), vec![Category::String]);
        for category in category_of(&out, "main") {
            assert!(matches!(category, Category::Identifier | Category::FunctionCall));
        }
    }

    #[test]
    fn test_split_qualified_call_with_carried_state() {
        let grammar = go();
        let text = "import \"fmt\"\nfmt . Println x\n";
        let out = categories(&grammar, text);
        assert_eq!(category_of(&out, "Println"), vec![Category::QualifiedCall]);
        assert_eq!(category_of(&out, "."), vec![Category::Text]);
    }

    #[test]
    fn test_doubled_separator_breaks_qualified_call() {
        let grammar = go();
        let out = categories(&grammar, "import \"fmt\"\nfmt . . Println x\n");
        assert_eq!(category_of(&out, "Println"), vec![Category::Identifier]);

        let state = ClassifyState::default()
            .advance(&Unit::new("fmt"))
            .advance(&Unit::new("."))
            .advance(&Unit::new("."));
        assert_eq!(state.last(), None);
        assert!(state.after_separator());
    }

    #[test]
    fn test_qualified_call_requires_import_and_export() {
        let grammar = go();
        let out = categories(&grammar, "fmt.Println(x)\n");
        assert_eq!(category_of(&out, "fmt.Println"), vec![Category::FunctionCall]);

        let out = categories(&grammar, "import \"fmt\"\nfmt.Nope(x)\nfmt.Println\n");
        assert_eq!(category_of(&out, "fmt.Nope"), vec![Category::FunctionCall]);
        assert_eq!(category_of(&out, "fmt.Println"), vec![Category::QualifiedCall]);
    }

    #[test]
    fn test_alias_resolves_to_module_exports() {
        let grammar = go();
        let out = categories(&grammar, "import f \"fmt\"\nf.Printf(x)\n");
        assert_eq!(category_of(&out, "f.Printf"), vec![Category::QualifiedCall]);
    }

    #[test]
    fn test_prelude_modules_need_no_import() {
        let table = GrammarTable::builtin();
        let js = table.get("javascript").unwrap();
        let out = categories(js, "console.log('x')\n");
        assert_eq!(category_of(&out, "console.log"), vec![Category::QualifiedCall]);
    }

    #[test]
    fn test_rule_order_for_each_set() {
        let grammar = go();
        let out = categories(&grammar, "len nil string := err 42 'c' foo @");
        assert_eq!(
            out.into_iter().map(|(c, _)| c).collect::<Vec<_>>(),
            vec![
                Category::Builtin,
                Category::Constant,
                Category::Type,
                Category::Operator,
                Category::Special,
                Category::Number,
                Category::String,
                Category::Identifier,
                Category::Text,
            ]
        );
    }

    #[test]
    fn test_builtin_beats_keyword() {
        let grammar = Grammar::new("toy")
            .with_keywords(&["print", "if"])
            .with_builtins(&["print"]);
        let imports = ImportSet::default();
        let classifier = Classifier::new(&grammar, &imports);
        assert_eq!(classifier.classify_word(Unit::new("print")), Category::Builtin);
        assert_eq!(classifier.classify_word(Unit::new("if")), Category::Keyword);
    }

    #[test]
    fn test_call_shape_needs_call_site() {
        let grammar = go();
        let imports = ImportSet::default();
        let classifier = Classifier::new(&grammar, &imports);
        assert_eq!(classifier.classify_word(Unit::new("main")), Category::Identifier);
        assert_eq!(classifier.classify_word(Unit::call("main")), Category::FunctionCall);
        assert_eq!(classifier.classify_word(Unit::call("len")), Category::Builtin);
        assert_eq!(classifier.classify_word(Unit::call("if")), Category::Keyword);
    }

    #[test]
    fn test_identifier_shape_precedes_operator_and_string() {
        let grammar = Grammar::new("toy").with_operators(&["and"]);
        let imports = ImportSet::default();
        let classifier = Classifier::new(&grammar, &imports);
        assert_eq!(classifier.classify_word(Unit::new("and")), Category::Identifier);
        assert_eq!(classifier.classify_word(Unit::new("_x1")), Category::Identifier);
        assert_eq!(classifier.classify_word(Unit::new("1x")), Category::Text);
    }

    #[test]
    fn test_state_advances_past_separator() {
        let state = ClassifyState::default()
            .advance(&Unit::new("fmt"))
            .advance(&Unit::new("."));
        assert_eq!(state.last(), Some("fmt"));
        assert!(state.after_separator());

        let state = state.advance(&Unit::new("Println"));
        assert_eq!(state.last(), Some("Println"));
        assert!(!state.after_separator());
    }

    #[test]
    fn test_matching_rule_reports_name() {
        let grammar = go();
        let imports = ImportSet::default();
        let classifier = Classifier::new(&grammar, &imports);
        let state = ClassifyState::default();
        assert_eq!(
            classifier.matching_rule(Unit::new("func"), &state).map(|r| r.name),
            Some("keyword")
        );
        assert!(classifier.matching_rule(Unit::new("@"), &state).is_none());
    }

    proptest! {
        #[test]
        fn prop_every_unit_gets_one_category(text in "[ -~\t\n]{0,200}") {
            let grammar = go();
            let imports = ImportSet::scan(&text, &grammar);
            let classifier = Classifier::new(&grammar, &imports);
            let mut state = ClassifyState::default();
            for line in text.lines() {
                let units = splitter::split_line(line);
                let (tokens, next) = classifier.classify_line(line, state);
                prop_assert_eq!(tokens.len(), units.len());
                for (token, unit) in tokens.iter().zip(&units) {
                    prop_assert_eq!(token.text, unit.text);
                }
                state = next;
            }
        }
    }
}

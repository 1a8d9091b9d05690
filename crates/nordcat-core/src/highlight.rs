//! The per-document highlighting pipeline.
//!
//! ```text
//! Document ──► ImportSet::scan ──┬─► lines: classify_line per line ─┐
//!                                └─► lexer: tokenize + xref ────────┴─► Renderer
//! ```

use nordcat_syntax::{
    Classifier, ClassifyState, GrammarTable, ImportSet, SyntaxError, Token, cross_reference,
    tokenize_document,
};
use nordcat_term::{AnsiRenderer, JsonRenderer, Palette, Renderer};
use std::io::Write;

use crate::options::{CarryPolicy, HighlightOptions, Mode, OutputFormat};
use crate::{CoreError, CoreResult, Document};

/// Classified output for one document, borrowing its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlighted<'d> {
    /// One token list per input line.
    Lines(Vec<Vec<Token<'d>>>),
    /// A whole-document stream, spacing included.
    Stream(Vec<Token<'d>>),
    /// The lexer refused the input; show it as-is.
    Plain(&'d str),
}

/// Runs documents through the classifier and a renderer.
///
/// Holds only read-only configuration, so a single highlighter can serve any
/// number of documents.
pub struct Highlighter<'g> {
    table: &'g GrammarTable,
    options: HighlightOptions,
}

impl<'g> Highlighter<'g> {
    pub fn new(table: &'g GrammarTable, options: HighlightOptions) -> Self {
        Self { table, options }
    }

    pub fn options(&self) -> &HighlightOptions {
        &self.options
    }

    pub fn table(&self) -> &'g GrammarTable {
        self.table
    }

    /// Creates the renderer selected by the output format.
    pub fn renderer(&self) -> Box<dyn Renderer> {
        match self.options.format {
            OutputFormat::Ansi => Box::new(AnsiRenderer::new(Palette::nord())),
            OutputFormat::Json => Box::new(JsonRenderer::new()),
        }
    }

    /// Classifies a document without rendering it.
    pub fn highlight<'d>(&self, doc: &'d Document) -> CoreResult<Highlighted<'d>> {
        let grammar = self.table.require(doc.language())?;
        let imports = ImportSet::scan(doc.text(), grammar);
        tracing::debug!(
            document = doc.name(),
            language = grammar.name(),
            imports = imports.len(),
            mode = %self.options.mode,
            "Highlighting document"
        );

        let classifier = Classifier::new(grammar, &imports);
        match self.options.mode {
            Mode::Lines => Ok(Highlighted::Lines(self.classify_lines(doc.text(), &classifier))),
            Mode::Lexer => match tokenize_document(doc.text(), &classifier) {
                Ok(mut tokens) => {
                    let upgraded = cross_reference(&mut tokens, grammar, &imports);
                    tracing::debug!(tokens = tokens.len(), upgraded, "Cross-referenced");
                    Ok(Highlighted::Stream(tokens))
                }
                Err(SyntaxError::BinaryInput { offset }) => {
                    tracing::warn!(
                        document = doc.name(),
                        offset,
                        "Lexer rejected input, emitting it uncolored"
                    );
                    Ok(Highlighted::Plain(doc.text()))
                }
                Err(err) => Err(err.into()),
            },
        }
    }

    fn classify_lines<'d>(
        &self,
        text: &'d str,
        classifier: &Classifier<'_>,
    ) -> Vec<Vec<Token<'d>>> {
        let mut state = ClassifyState::default();
        let mut lines = Vec::new();

        for (number, line) in text.lines().enumerate() {
            if self.options.carry == CarryPolicy::Line {
                state = ClassifyState::default();
            }
            let (tokens, next) = classifier.classify_line(line, state);
            tracing::trace!(line = number + 1, units = tokens.len(), "Classified line");
            lines.push(tokens);
            state = next;
        }

        lines
    }

    /// Classifies a document and writes it through `renderer`.
    pub fn render(
        &self,
        doc: &Document,
        renderer: &mut dyn Renderer,
        out: &mut dyn Write,
    ) -> CoreResult<()> {
        let highlighted = self.highlight(doc)?;

        renderer.begin();
        let written = match &highlighted {
            Highlighted::Lines(lines) => lines
                .iter()
                .try_for_each(|tokens| renderer.line(out, tokens)),
            Highlighted::Stream(tokens) => renderer.stream(out, tokens),
            Highlighted::Plain(text) => renderer.plain(out, text),
        };
        written.and_then(|()| out.flush()).map_err(CoreError::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nordcat_syntax::Category;
    use proptest::prelude::*;

    const HELLO: &str = "package main\nimport \"fmt\"\nfunc main() { fmt.Println(\"hi\") }\n";

    fn options(mode: Mode, carry: CarryPolicy) -> HighlightOptions {
        HighlightOptions {
            mode,
            carry,
            ..HighlightOptions::default()
        }
    }

    fn find<'t>(tokens: impl IntoIterator<Item = &'t Token<'t>>, text: &str) -> Vec<Category> {
        tokens
            .into_iter()
            .filter(|t| t.text == text)
            .map(|t| t.category)
            .collect()
    }

    fn render_to_string(highlighter: &Highlighter<'_>, doc: &Document) -> String {
        let mut renderer = highlighter.renderer();
        let mut out = Vec::new();
        highlighter.render(doc, renderer.as_mut(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_hello_world_in_line_mode() {
        let table = GrammarTable::builtin();
        let highlighter = Highlighter::new(&table, HighlightOptions::default());
        let doc = Document::new("hello.go", "go", HELLO);

        let Highlighted::Lines(lines) = highlighter.highlight(&doc).unwrap() else {
            panic!("expected line output");
        };
        assert_eq!(lines.len(), 3);

        let all: Vec<&Token<'_>> = lines.iter().flatten().collect();
        assert_eq!(find(all.iter().copied(), "fmt.Println"), vec![Category::QualifiedCall]);
        assert_eq!(find(all.iter().copied(), "package"), vec![Category::Keyword]);
        assert_eq!(find(all.iter().copied(), "func"), vec![Category::Keyword]);
        assert_eq!(find(all.iter().copied(), "\"hi\""), vec![Category::String]);
        for category in find(all.iter().copied(), "main") {
            assert_ne!(category, Category::Keyword);
        }
    }

    #[test]
    fn test_hello_world_in_lexer_mode() {
        let table = GrammarTable::builtin();
        let highlighter = Highlighter::new(&table, options(Mode::Lexer, CarryPolicy::Document));
        let doc = Document::new("hello.go", "go", HELLO);

        let Highlighted::Stream(tokens) = highlighter.highlight(&doc).unwrap() else {
            panic!("expected stream output");
        };
        assert_eq!(find(&tokens, "fmt"), vec![Category::Identifier]);
        assert_eq!(find(&tokens, "Println"), vec![Category::QualifiedCall]);
        assert_eq!(find(&tokens, "import"), vec![Category::Keyword]);

        let joined: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(joined, HELLO);
    }

    #[test]
    fn test_carry_policy_decides_split_qualified_calls() {
        let table = GrammarTable::builtin();
        let doc = Document::new("split.go", "go", "import \"os\"\nx := os.\nExit(1)\n");

        let carried = Highlighter::new(&table, options(Mode::Lines, CarryPolicy::Document));
        let Highlighted::Lines(lines) = carried.highlight(&doc).unwrap() else {
            panic!("expected line output");
        };
        assert_eq!(find(&lines[2], "Exit"), vec![Category::QualifiedCall]);

        let reset = Highlighter::new(&table, options(Mode::Lines, CarryPolicy::Line));
        let Highlighted::Lines(lines) = reset.highlight(&doc).unwrap() else {
            panic!("expected line output");
        };
        assert_eq!(find(&lines[2], "Exit"), vec![Category::FunctionCall]);
    }

    #[test]
    fn test_empty_document_renders_nothing() {
        let table = GrammarTable::builtin();
        let doc = Document::new("empty.go", "go", "");
        for mode in [Mode::Lines, Mode::Lexer] {
            let highlighter = Highlighter::new(&table, options(mode, CarryPolicy::Document));
            assert_eq!(render_to_string(&highlighter, &doc), "");
        }
    }

    #[test]
    fn test_line_mode_ansi_output() {
        let table = GrammarTable::builtin();
        let highlighter = Highlighter::new(&table, HighlightOptions::default());
        let doc = Document::new("x.go", "go", "return nil\n\n");
        assert_eq!(
            render_to_string(&highlighter, &doc),
            "\x1b[38;2;129;161;193mreturn\x1b[0m \x1b[38;2;235;203;139mnil\x1b[0m \n\n"
        );
    }

    #[test]
    fn test_binary_input_falls_back_to_plain_text() {
        let table = GrammarTable::builtin();
        let highlighter = Highlighter::new(&table, options(Mode::Lexer, CarryPolicy::Document));
        let doc = Document::new("blob.go", "go", "func\0main\n");

        assert_eq!(highlighter.highlight(&doc).unwrap(), Highlighted::Plain("func\0main\n"));
        assert_eq!(render_to_string(&highlighter, &doc), "func\0main\n");
    }

    #[test]
    fn test_nul_inside_string_still_falls_back() {
        let table = GrammarTable::builtin();
        let highlighter = Highlighter::new(&table, options(Mode::Lexer, CarryPolicy::Document));
        let text = "x := \"a\0b\" // c\0d\n";
        let doc = Document::new("blob.go", "go", text);

        assert_eq!(highlighter.highlight(&doc).unwrap(), Highlighted::Plain(text));
        assert_eq!(render_to_string(&highlighter, &doc), text);
    }

    #[test]
    fn test_json_format() {
        let table = GrammarTable::builtin();
        let highlighter = Highlighter::new(
            &table,
            HighlightOptions {
                format: OutputFormat::Json,
                ..HighlightOptions::default()
            },
        );
        let doc = Document::new("x.go", "go", "if x {\n}\n");
        let output = render_to_string(&highlighter, &doc);
        let first: serde_json::Value =
            serde_json::from_str(output.lines().next().unwrap()).unwrap();
        assert_eq!(first["category"], "keyword");
        assert_eq!(first["text"], "if");
        assert_eq!(first["line"], 1);
    }

    #[test]
    fn test_unknown_language_is_an_error() {
        let table = GrammarTable::builtin();
        let highlighter = Highlighter::new(&table, HighlightOptions::default());
        let doc = Document::new("x.cob", "cobol", "DISPLAY 'HI'.\n");
        assert!(matches!(
            highlighter.highlight(&doc),
            Err(CoreError::Syntax(SyntaxError::UnknownLanguage(_)))
        ));
    }

    #[test]
    fn test_documents_do_not_share_imports() {
        let table = GrammarTable::builtin();
        let highlighter = Highlighter::new(&table, HighlightOptions::default());
        let first = Document::new("a.go", "go", "import \"fmt\"\nfmt.Println\n");
        let second = Document::new("b.go", "go", "fmt.Println\n");

        let Highlighted::Lines(lines) = highlighter.highlight(&first).unwrap() else {
            panic!("expected line output");
        };
        assert_eq!(lines[1][0].category, Category::QualifiedCall);

        let Highlighted::Lines(lines) = highlighter.highlight(&second).unwrap() else {
            panic!("expected line output");
        };
        assert_ne!(lines[0][0].category, Category::QualifiedCall);
    }

    proptest! {
        #[test]
        fn prop_one_rendered_line_per_input_line(text in "[a-z(). \"\n]{0,200}") {
            let table = GrammarTable::builtin();
            let highlighter = Highlighter::new(&table, HighlightOptions::default());
            let doc = Document::new("p.go", "go", text.as_str());
            let output = render_to_string(&highlighter, &doc);
            prop_assert_eq!(output.matches('\n').count(), text.lines().count());
        }
    }
}

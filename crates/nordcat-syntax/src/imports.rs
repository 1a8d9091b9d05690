//! Whole-document import pre-scan.
//!
//! Runs once over the full text before any line is classified and records the
//! document's own module name plus every module it imports. Lines that match
//! no recognised pattern are skipped, so partial or malformed input never
//! fails the scan.

use std::collections::{BTreeSet, HashMap};

use crate::grammar::Grammar;

/// Characters stripped from both ends of an import path.
const PATH_TRIM: &[char] = &['"', '`', '\'', '<', '>', ';', ' ', '\t'];

/// Modules a single document depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    declared: Option<String>,
    paths: BTreeSet<String>,
    aliases: HashMap<String, String>,
}

impl ImportSet {
    /// Scans `text` using the import syntax of `grammar`.
    pub fn scan(text: &str, grammar: &Grammar) -> Self {
        let syntax = grammar.import_syntax();
        let mut set = Self::default();
        let mut in_block = false;

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || grammar.line_comment().is_some_and(|c| line.starts_with(c)) {
                continue;
            }

            if let Some(rest) = strip_marker(line, syntax.declaration.as_deref()) {
                let name = rest.trim_matches(PATH_TRIM);
                if !name.is_empty() {
                    set.declared = Some(name.to_string());
                }
                continue;
            }

            if syntax.block_open.as_deref() == Some(line) {
                in_block = true;
                continue;
            }

            if in_block && syntax.block_close.as_deref() == Some(line) {
                in_block = false;
                continue;
            }

            let statement = if in_block {
                Some(line)
            } else {
                strip_marker(line, syntax.keyword.as_deref())
            };

            if let Some(statement) = statement {
                set.record(statement);
            }
        }

        tracing::debug!(
            declared = ?set.declared,
            imports = set.paths.len(),
            "import scan finished"
        );
        set
    }

    /// Records one import statement body (the line minus its keyword).
    fn record(&mut self, statement: &str) {
        let fields: Vec<&str> = statement.split_whitespace().collect();
        let Some(last) = fields.last() else {
            return;
        };

        let path = last.trim_matches(PATH_TRIM);
        if path.is_empty() {
            return;
        }

        // `import f "fmt"`: the field before a quoted path names it locally.
        if fields.len() >= 2 && last.starts_with(['"', '`']) {
            let alias = fields[fields.len() - 2];
            if crate::is_identifier(alias) {
                self.aliases.insert(alias.to_string(), path.to_string());
            }
        }

        self.paths.insert(path.to_string());
    }

    /// The document's own module name, if it declared one.
    pub fn declared(&self) -> Option<&str> {
        self.declared.as_deref()
    }

    /// Imported module paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Resolves a name used in code to the module it refers to.
    ///
    /// `name` matches an import by alias, by the full path, by the last path
    /// segment (`filepath` for `path/filepath`, `Arrays` for
    /// `java.util.Arrays`), or by the first dotted segment (`os` for
    /// `os.path`). Returns the module name to look exports up under.
    pub fn resolve(&self, name: &str) -> Option<String> {
        if let Some(path) = self.aliases.get(name) {
            return Some(last_segment(path).to_string());
        }

        self.paths
            .iter()
            .any(|path| {
                path == name
                    || last_segment(path) == name
                    || (!path.contains('/') && path.split('.').next() == Some(name))
            })
            .then(|| name.to_string())
    }
}

fn strip_marker<'a>(line: &'a str, marker: Option<&str>) -> Option<&'a str> {
    let rest = line.strip_prefix(marker?)?;
    rest.starts_with(char::is_whitespace).then_some(rest)
}

fn last_segment(path: &str) -> &str {
    if let Some((_, tail)) = path.rsplit_once('/') {
        return tail;
    }
    let tail = path.rsplit("::").next().unwrap_or(path);
    tail.rsplit('.').next().unwrap_or(tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GrammarTable;

    fn scan(lang: &str, text: &str) -> ImportSet {
        let table = GrammarTable::builtin();
        ImportSet::scan(text, table.get(lang).unwrap())
    }

    #[test]
    fn test_import_block_collects_paths() {
        let set = scan(
            "go",
            "package main\n\nimport (\n\t\"fmt\"\n\t\"path/filepath\"\n)\n\nfunc main() {}\n",
        );
        assert_eq!(set.declared(), Some("main"));
        assert_eq!(set.paths().collect::<Vec<_>>(), vec!["fmt", "path/filepath"]);
        assert!(!set.contains("main"));
    }

    #[test]
    fn test_empty_comment_marker_skips_nothing() {
        let grammar = Grammar::new("toy")
            .with_line_comment("")
            .with_imports(crate::ImportSyntax {
                keyword: Some("import".into()),
                ..Default::default()
            });
        let set = ImportSet::scan("import \"fmt\"\n", &grammar);
        assert!(set.contains("fmt"));
    }

    #[test]
    fn test_single_line_import() {
        let set = scan("go", "package demo\nimport \"fmt\"\n");
        assert_eq!(set.len(), 1);
        assert!(set.contains("fmt"));
        assert_eq!(set.declared(), Some("demo"));
    }

    #[test]
    fn test_aliased_import_takes_last_field() {
        let set = scan("go", "import (\n\tf \"fmt\"\n\tyaml `gopkg.in/yaml.v3`\n)\n");
        assert!(set.contains("fmt"));
        assert!(set.contains("gopkg.in/yaml.v3"));
        assert_eq!(set.resolve("f").as_deref(), Some("fmt"));
    }

    #[test]
    fn test_block_closes_only_on_bare_delimiter() {
        let set = scan("go", "import (\n\t\"os\"\n)\nfunc f() {\n\tx := g(\n)\n");
        assert_eq!(set.paths().collect::<Vec<_>>(), vec!["os"]);
    }

    #[test]
    fn test_resolve_by_segment() {
        let set = scan("go", "import (\n\t\"path/filepath\"\n\t\"fmt\"\n)\n");
        assert_eq!(set.resolve("filepath").as_deref(), Some("filepath"));
        assert_eq!(set.resolve("fmt").as_deref(), Some("fmt"));
        assert_eq!(set.resolve("path"), None);
        assert_eq!(set.resolve("os"), None);
    }

    #[test]
    fn test_python_and_java_imports() {
        let py = scan("python", "import os.path\nimport numpy as np\n");
        assert_eq!(py.resolve("os").as_deref(), Some("os"));
        assert_eq!(py.resolve("np").as_deref(), Some("np"));

        let java = scan("java", "package com.example;\nimport java.util.Arrays;\n");
        assert_eq!(java.declared(), Some("com.example"));
        assert!(java.contains("java.util.Arrays"));
        assert_eq!(java.resolve("Arrays").as_deref(), Some("Arrays"));
    }

    #[test]
    fn test_c_includes() {
        let set = scan("c", "#include <stdio.h>\n#include \"local.h\"\nint main(void) {}\n");
        assert!(set.contains("stdio.h"));
        assert!(set.contains("local.h"));
    }

    #[test]
    fn test_malformed_input_is_skipped() {
        let set = scan("go", "import\npackage\nimport (\n\n// comment\n");
        assert!(set.is_empty());
        assert_eq!(set.declared(), None);
        assert!(scan("go", "").is_empty());
    }
}

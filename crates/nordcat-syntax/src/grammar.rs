//! Per-language grammar tables.
//!
//! A [`Grammar`] is a bag of exact-match string sets: keywords, types,
//! constants, operators, special identifiers, built-in functions, and the
//! exported functions of well-known modules. The [`GrammarTable`] holds every
//! grammar known for a run and resolves file extensions to languages.
//!
//! ## Learning: Immutable Configuration Values
//!
//! The table is built once (from the built-in definitions, optionally merged
//! with a TOML file) and then only ever handed out as `&Grammar`. Nothing in
//! the crate holds a `&mut Grammar` after construction, so the borrow checker
//! guarantees a grammar is never mutated mid-run.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::{SyntaxError, SyntaxResult};

/// How a language declares its own module and pulls in others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSyntax {
    /// Line prefix naming the document's own module (`package` in Go).
    pub declaration: Option<String>,

    /// Line prefix of a single-line import (`import`, `use`, `#include`).
    pub keyword: Option<String>,

    /// Whole line that opens a multi-line import block (`import (`).
    pub block_open: Option<String>,

    /// Whole line that closes the import block.
    pub block_close: Option<String>,
}

/// The classification tables for one language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Grammar {
    name: String,
    extensions: Vec<String>,
    keywords: HashSet<String>,
    types: HashSet<String>,
    constants: HashSet<String>,
    operators: HashSet<String>,
    special: HashSet<String>,
    builtins: HashSet<String>,
    modules: HashMap<String, HashSet<String>>,
    /// Modules callable without an import (`console` in JavaScript).
    prelude: HashSet<String>,
    imports: ImportSyntax,
    line_comment: Option<String>,
    block_comment: Option<(String, String)>,
}

impl Grammar {
    /// Creates an empty grammar. Use the `with_*` methods to fill it in.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_extensions(mut self, items: &[&str]) -> Self {
        self.extensions.extend(owned(items));
        self
    }

    pub fn with_keywords(mut self, items: &[&str]) -> Self {
        self.keywords.extend(owned(items));
        self
    }

    pub fn with_types(mut self, items: &[&str]) -> Self {
        self.types.extend(owned(items));
        self
    }

    pub fn with_constants(mut self, items: &[&str]) -> Self {
        self.constants.extend(owned(items));
        self
    }

    pub fn with_operators(mut self, items: &[&str]) -> Self {
        self.operators.extend(owned(items));
        self
    }

    pub fn with_special(mut self, items: &[&str]) -> Self {
        self.special.extend(owned(items));
        self
    }

    pub fn with_builtins(mut self, items: &[&str]) -> Self {
        self.builtins.extend(owned(items));
        self
    }

    /// Declares the functions exported by `module`.
    pub fn with_module(mut self, module: &str, exports: &[&str]) -> Self {
        self.modules
            .entry(module.to_string())
            .or_default()
            .extend(owned(exports));
        self
    }

    pub fn with_prelude(mut self, modules: &[&str]) -> Self {
        self.prelude.extend(owned(modules));
        self
    }

    pub fn with_imports(mut self, imports: ImportSyntax) -> Self {
        self.imports = imports;
        self
    }

    pub fn with_line_comment(mut self, marker: &str) -> Self {
        self.line_comment = Some(marker.to_string());
        self
    }

    pub fn with_block_comment(mut self, open: &str, close: &str) -> Self {
        self.block_comment = Some((open.to_string(), close.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File extensions, each with its leading dot.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    pub fn is_type(&self, word: &str) -> bool {
        self.types.contains(word)
    }

    pub fn is_constant(&self, word: &str) -> bool {
        self.constants.contains(word)
    }

    pub fn is_operator(&self, word: &str) -> bool {
        self.operators.contains(word)
    }

    pub fn is_special(&self, word: &str) -> bool {
        self.special.contains(word)
    }

    pub fn is_builtin(&self, word: &str) -> bool {
        self.builtins.contains(word)
    }

    pub fn is_prelude(&self, module: &str) -> bool {
        self.prelude.contains(module)
    }

    /// Returns true if `module` is known to export `function`.
    pub fn exports(&self, module: &str, function: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|exports| exports.contains(function))
    }

    pub fn import_syntax(&self) -> &ImportSyntax {
        &self.imports
    }

    /// The line comment marker. An empty marker counts as none.
    pub fn line_comment(&self) -> Option<&str> {
        self.line_comment.as_deref().filter(|m| !m.is_empty())
    }

    /// The block comment delimiters. Empty delimiters count as none.
    pub fn block_comment(&self) -> Option<(&str, &str)> {
        self.block_comment
            .as_ref()
            .filter(|(open, close)| !open.is_empty() && !close.is_empty())
            .map(|(open, close)| (open.as_str(), close.as_str()))
    }

    /// Returns true if this grammar claims the given extension (with dot).
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }

    /// Rejects definitions the scanners cannot work with.
    ///
    /// Every marker and set entry must be non-empty: an empty comment marker
    /// matches at every position and would stop the lexer from advancing.
    pub fn validate(&self) -> SyntaxResult<()> {
        let invalid = |what: &str| {
            Err(SyntaxError::InvalidGrammar(format!(
                "{}: {what} must not be empty",
                self.name
            )))
        };

        if self.name.is_empty() {
            return Err(SyntaxError::InvalidGrammar("language has no name".to_string()));
        }

        let sets = [
            ("extensions", self.extensions.iter().collect::<Vec<_>>()),
            ("keywords", self.keywords.iter().collect()),
            ("types", self.types.iter().collect()),
            ("constants", self.constants.iter().collect()),
            ("operators", self.operators.iter().collect()),
            ("special", self.special.iter().collect()),
            ("builtins", self.builtins.iter().collect()),
            ("prelude", self.prelude.iter().collect()),
        ];
        for (what, entries) in sets {
            if entries.iter().any(|e| e.is_empty()) {
                return invalid(&format!("an entry of {what}"));
            }
        }

        for (module, exports) in &self.modules {
            if module.is_empty() {
                return invalid("a module name");
            }
            if exports.iter().any(|e| e.is_empty()) {
                return invalid(&format!("an export of {module}"));
            }
        }

        let markers = [
            ("imports.declaration", self.imports.declaration.as_deref()),
            ("imports.keyword", self.imports.keyword.as_deref()),
            ("imports.block_open", self.imports.block_open.as_deref()),
            ("imports.block_close", self.imports.block_close.as_deref()),
            ("line_comment", self.line_comment.as_deref()),
            ("block_comment opener", self.block_comment.as_ref().map(|(o, _)| o.as_str())),
            ("block_comment closer", self.block_comment.as_ref().map(|(_, c)| c.as_str())),
        ];
        for (what, marker) in markers {
            if marker == Some("") {
                return invalid(what);
            }
        }

        Ok(())
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Every grammar available for a run, in detection order.
#[derive(Debug, Clone, Default)]
pub struct GrammarTable {
    grammars: Vec<Grammar>,
}

/// On-disk layout of a grammar file: `[[language]]` tables.
#[derive(Debug, Deserialize)]
struct GrammarFile {
    #[serde(default)]
    language: Vec<Grammar>,
}

impl GrammarTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The languages shipped with nordcat.
    pub fn builtin() -> Self {
        Self {
            grammars: vec![go(), rust(), c(), cpp(), javascript(), python(), java()],
        }
    }

    /// Parses grammar definitions from TOML.
    pub fn from_toml_str(source: &str) -> SyntaxResult<Self> {
        let file: GrammarFile = toml::from_str(source)?;
        if let Some(unnamed) = file.language.iter().position(|g| g.name.is_empty()) {
            return Err(SyntaxError::InvalidGrammar(format!(
                "language #{} has no name",
                unnamed + 1
            )));
        }
        for grammar in &file.language {
            grammar.validate()?;
        }
        Ok(Self {
            grammars: file.language,
        })
    }

    /// Loads grammar definitions from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SyntaxResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Adds a grammar, replacing any existing grammar with the same name.
    pub fn insert(&mut self, grammar: Grammar) {
        match self.grammars.iter_mut().find(|g| g.name == grammar.name) {
            Some(slot) => *slot = grammar,
            None => self.grammars.push(grammar),
        }
    }

    /// Merges another table into this one; `other` wins on name clashes.
    pub fn extend(&mut self, other: GrammarTable) {
        for grammar in other.grammars {
            tracing::debug!(language = %grammar.name, "registering grammar");
            self.insert(grammar);
        }
    }

    /// Looks up a grammar by language name.
    pub fn get(&self, name: &str) -> Option<&Grammar> {
        self.grammars.iter().find(|g| g.name == name)
    }

    /// Looks up a grammar by name, failing for unknown languages.
    pub fn require(&self, name: &str) -> SyntaxResult<&Grammar> {
        self.get(name)
            .ok_or_else(|| SyntaxError::UnknownLanguage(name.to_string()))
    }

    /// Detects the language of a file from its extension.
    ///
    /// The first grammar in table order claiming the extension wins, so `.h`
    /// resolves to C rather than C++.
    pub fn detect(&self, path: &Path) -> Option<&Grammar> {
        let ext = path.extension()?.to_str()?;
        let ext = format!(".{ext}");
        self.grammars.iter().find(|g| g.matches_extension(&ext))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grammar> {
        self.grammars.iter()
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}

// ============================================================================
// Built-in languages
// ============================================================================

fn go() -> Grammar {
    Grammar::new("go")
        .with_extensions(&[".go"])
        .with_keywords(&[
            "break", "case", "chan", "const", "continue", "default", "defer",
            "else", "fallthrough", "for", "func", "go", "goto", "if", "import",
            "interface", "map", "package", "range", "return", "select", "struct",
            "switch", "type", "var",
        ])
        .with_types(&[
            "bool", "byte", "complex64", "complex128", "error", "float32",
            "float64", "int", "int8", "int16", "int32", "int64", "rune",
            "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
            "any",
        ])
        .with_constants(&["nil", "true", "false", "iota"])
        .with_operators(&[
            ":=", "!=", "==", ">=", "<=", "->", "<-", "&&", "||", "=", "+",
            "-", "*", "/", "%", "<", ">", "!", "&", "|", "^", "+=", "-=",
            "*=", "/=", "++", "--", "...",
        ])
        .with_special(&["err", "ctx"])
        .with_builtins(&[
            "append", "cap", "clear", "close", "complex", "copy", "delete",
            "imag", "len", "make", "max", "min", "new", "panic", "print",
            "println", "real", "recover",
        ])
        .with_module("fmt", &[
            "Errorf", "Fprint", "Fprintf", "Fprintln", "Print", "Printf",
            "Println", "Scan", "Scanf", "Scanln", "Sprint", "Sprintf",
            "Sprintln", "Sscanf",
        ])
        .with_module("os", &[
            "Chdir", "Create", "Exit", "Getenv", "Getwd", "Mkdir", "MkdirAll",
            "Open", "OpenFile", "ReadDir", "ReadFile", "Remove", "RemoveAll",
            "Rename", "Setenv", "Stat", "WriteFile",
        ])
        .with_module("strings", &[
            "Contains", "ContainsRune", "Count", "EqualFold", "Fields",
            "HasPrefix", "HasSuffix", "Index", "Join", "NewReader",
            "NewReplacer", "Repeat", "Replace", "ReplaceAll", "Split",
            "SplitN", "Title", "ToLower", "ToUpper", "Trim", "TrimLeft",
            "TrimPrefix", "TrimRight", "TrimSpace", "TrimSuffix",
        ])
        .with_module("strconv", &[
            "Atoi", "FormatBool", "FormatFloat", "FormatInt", "Itoa",
            "ParseBool", "ParseFloat", "ParseInt", "Quote", "Unquote",
        ])
        .with_module("io", &["Copy", "CopyN", "ReadAll", "ReadFull", "WriteString"])
        .with_module("bufio", &["NewReader", "NewScanner", "NewWriter"])
        .with_module("errors", &["As", "Is", "Join", "New", "Unwrap"])
        .with_module("filepath", &[
            "Abs", "Base", "Clean", "Dir", "Ext", "Glob", "Join", "Match",
            "Rel", "Split", "Walk", "WalkDir",
        ])
        .with_module("regexp", &["Compile", "MatchString", "MustCompile", "QuoteMeta"])
        .with_module("sort", &["Ints", "Search", "Slice", "SliceStable", "Sort", "Strings"])
        .with_module("time", &[
            "After", "NewTicker", "NewTimer", "Now", "Parse", "Since", "Sleep", "Tick",
        ])
        .with_imports(ImportSyntax {
            declaration: Some("package".into()),
            keyword: Some("import".into()),
            block_open: Some("import (".into()),
            block_close: Some(")".into()),
        })
        .with_line_comment("//")
        .with_block_comment("/*", "*/")
}

fn rust() -> Grammar {
    Grammar::new("rust")
        .with_extensions(&[".rs"])
        .with_keywords(&[
            "as", "async", "await", "break", "const", "continue", "crate", "dyn",
            "else", "enum", "extern", "fn", "for", "if", "impl", "in", "let",
            "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
            "static", "struct", "super", "trait", "type", "unsafe", "use",
            "where", "while", "yield", "macro_rules",
        ])
        .with_types(&[
            "bool", "char", "f32", "f64", "i8", "i16", "i32", "i64", "i128",
            "isize", "str", "u8", "u16", "u32", "u64", "u128", "usize",
            "String", "Vec", "Option", "Result", "Box", "Rc", "Arc",
            "HashMap", "HashSet", "BTreeMap", "BTreeSet", "VecDeque",
            "PathBuf", "Path", "Cow", "Cell", "RefCell", "Mutex", "RwLock",
        ])
        .with_constants(&["None", "Some", "Ok", "Err", "true", "false"])
        .with_operators(&[
            "::", "=>", "->", "&&", "||", "==", "!=", "<=", ">=", "=", "+",
            "-", "*", "/", "%", "<", ">", "!", "&", "|", "^", "+=", "-=",
            "..", "..=", "?",
        ])
        .with_special(&["self", "Self"])
        .with_builtins(&[
            "println!", "print!", "eprintln!", "eprint!", "format!", "vec!",
            "panic!", "assert!", "assert_eq!", "assert_ne!", "debug_assert!",
            "write!", "writeln!", "todo!", "unimplemented!", "unreachable!",
            "matches!", "dbg!",
        ])
        .with_imports(ImportSyntax {
            keyword: Some("use".into()),
            ..Default::default()
        })
        .with_line_comment("//")
        .with_block_comment("/*", "*/")
}

fn c() -> Grammar {
    Grammar::new("c")
        .with_extensions(&[".c", ".h"])
        .with_keywords(&[
            "break", "case", "const", "continue", "default", "do", "else",
            "enum", "extern", "for", "goto", "if", "inline", "register",
            "restrict", "return", "sizeof", "static", "struct", "switch",
            "typedef", "union", "volatile", "while",
        ])
        .with_types(&[
            "int", "char", "void", "float", "double", "long", "short",
            "signed", "unsigned", "size_t", "ssize_t", "FILE", "bool",
            "int8_t", "int16_t", "int32_t", "int64_t", "uint8_t", "uint16_t",
            "uint32_t", "uint64_t",
        ])
        .with_constants(&["NULL", "EOF", "true", "false", "stdin", "stdout", "stderr"])
        .with_operators(&[
            "->", "&&", "||", "<<", ">>", "==", "!=", "<=", ">=", "=", "+",
            "-", "*", "/", "%", "<", ">", "!", "&", "|", "^", "++", "--",
            "+=", "-=",
        ])
        .with_special(&["errno", "argc", "argv"])
        .with_builtins(&[
            "printf", "fprintf", "sprintf", "snprintf", "scanf", "puts",
            "fputs", "fgets", "fopen", "fclose", "fread", "fwrite", "malloc",
            "calloc", "realloc", "free", "strlen", "strcmp", "strncmp",
            "strcpy", "strncpy", "memcpy", "memset", "perror", "exit",
        ])
        .with_imports(ImportSyntax {
            keyword: Some("#include".into()),
            ..Default::default()
        })
        .with_line_comment("//")
        .with_block_comment("/*", "*/")
}

fn cpp() -> Grammar {
    Grammar::new("cpp")
        .with_extensions(&[".cpp", ".cc", ".cxx", ".hpp", ".hh", ".h"])
        .with_keywords(&[
            "break", "case", "catch", "class", "const", "constexpr",
            "continue", "default", "delete", "do", "else", "enum", "explicit",
            "export", "extern", "final", "for", "friend", "if", "inline",
            "namespace", "new", "noexcept", "operator", "override", "private",
            "protected", "public", "return", "sizeof", "static", "struct",
            "switch", "template", "throw", "try", "typedef", "typename",
            "union", "using", "virtual", "volatile", "while",
        ])
        .with_types(&[
            "int", "char", "bool", "void", "auto", "float", "double", "long",
            "short", "unsigned", "signed", "size_t", "string", "vector", "map",
            "set", "unordered_map", "unordered_set", "array", "pair", "tuple",
            "optional", "shared_ptr", "unique_ptr", "weak_ptr",
        ])
        .with_constants(&["nullptr", "true", "false", "NULL"])
        .with_operators(&[
            "::", "->", "<<", ">>", "&&", "||", "==", "!=", "<=", ">=", "=",
            "+", "-", "*", "/", "%", "<", ">", "!", "&", "|", "^", "++", "--",
        ])
        .with_special(&["this", "errno"])
        .with_builtins(&["printf", "malloc", "free", "memcpy", "strlen", "exit"])
        .with_imports(ImportSyntax {
            keyword: Some("#include".into()),
            ..Default::default()
        })
        .with_line_comment("//")
        .with_block_comment("/*", "*/")
}

fn javascript() -> Grammar {
    Grammar::new("javascript")
        .with_extensions(&[".js", ".jsx", ".mjs", ".cjs"])
        .with_keywords(&[
            "async", "await", "break", "case", "catch", "class", "const",
            "continue", "debugger", "default", "delete", "do", "else", "export",
            "extends", "finally", "for", "from", "function", "if", "import",
            "in", "instanceof", "let", "new", "of", "return", "static", "super",
            "switch", "throw", "try", "typeof", "var", "void", "while", "with",
            "yield",
        ])
        .with_types(&[
            "Array", "Object", "String", "Number", "Boolean", "Function",
            "Symbol", "BigInt", "Map", "Set", "WeakMap", "WeakSet", "Promise",
            "RegExp", "Error", "TypeError", "Date",
        ])
        .with_constants(&["null", "undefined", "true", "false", "NaN", "Infinity"])
        .with_operators(&[
            "=>", "===", "!==", "==", "!=", "&&", "||", "??", "<=", ">=", "=",
            "+", "-", "*", "/", "%", "<", ">", "!", "++", "--", "+=", "-=",
            "...",
        ])
        .with_special(&["this", "err", "error"])
        .with_builtins(&[
            "parseInt", "parseFloat", "isNaN", "isFinite", "setTimeout",
            "setInterval", "clearTimeout", "clearInterval", "require", "fetch",
            "structuredClone",
        ])
        .with_module("console", &["log", "error", "warn", "info", "debug", "table", "trace"])
        .with_module("Math", &[
            "abs", "ceil", "floor", "max", "min", "pow", "random", "round", "sqrt",
        ])
        .with_module("JSON", &["parse", "stringify"])
        .with_module("Object", &["assign", "entries", "freeze", "keys", "values"])
        .with_module("fs", &[
            "existsSync", "readFile", "readFileSync", "writeFile", "writeFileSync",
        ])
        .with_module("path", &["basename", "dirname", "extname", "join", "resolve"])
        .with_prelude(&["console", "Math", "JSON", "Object"])
        .with_imports(ImportSyntax {
            keyword: Some("import".into()),
            ..Default::default()
        })
        .with_line_comment("//")
        .with_block_comment("/*", "*/")
}

fn python() -> Grammar {
    Grammar::new("python")
        .with_extensions(&[".py", ".pyi"])
        .with_keywords(&[
            "and", "as", "assert", "async", "await", "break", "class", "continue",
            "def", "del", "elif", "else", "except", "finally", "for", "from",
            "global", "if", "import", "in", "is", "lambda", "nonlocal", "not",
            "or", "pass", "raise", "return", "try", "while", "with", "yield",
        ])
        .with_types(&[
            "int", "float", "str", "bool", "list", "dict", "tuple", "set",
            "frozenset", "bytes", "bytearray", "complex", "object",
        ])
        .with_constants(&["True", "False", "None"])
        .with_operators(&[
            "==", "!=", "<=", ">=", "=", "+", "-", "*", "/", "//", "%", "**",
            "<", ">", "+=", "-=", "->", ":=",
        ])
        .with_special(&["self", "cls"])
        .with_builtins(&[
            "print", "len", "range", "enumerate", "zip", "map", "filter",
            "sorted", "reversed", "min", "max", "sum", "abs", "round",
            "isinstance", "issubclass", "hasattr", "getattr", "setattr",
            "open", "input", "repr", "format", "iter", "next", "any", "all",
            "super",
        ])
        .with_module("os", &["getcwd", "getenv", "listdir", "makedirs", "remove", "rename", "walk"])
        .with_module("sys", &["exit"])
        .with_module("json", &["dump", "dumps", "load", "loads"])
        .with_module("math", &["ceil", "cos", "floor", "log", "sin", "sqrt"])
        .with_module("re", &["compile", "findall", "match", "search", "split", "sub"])
        .with_module("time", &["monotonic", "sleep", "time"])
        .with_imports(ImportSyntax {
            keyword: Some("import".into()),
            ..Default::default()
        })
        .with_line_comment("#")
}

fn java() -> Grammar {
    Grammar::new("java")
        .with_extensions(&[".java"])
        .with_keywords(&[
            "abstract", "assert", "break", "case", "catch", "class", "continue",
            "default", "do", "else", "enum", "extends", "final", "finally",
            "for", "if", "implements", "import", "instanceof", "interface",
            "new", "package", "private", "protected", "public", "return",
            "static", "switch", "synchronized", "throw", "throws", "try",
            "var", "void", "volatile", "while", "record",
        ])
        .with_types(&[
            "boolean", "byte", "char", "double", "float", "int", "long", "short",
            "String", "Integer", "Long", "Double", "Boolean", "Object",
            "List", "ArrayList", "Map", "HashMap", "Set", "HashSet", "Optional",
        ])
        .with_constants(&["true", "false", "null"])
        .with_operators(&[
            "==", "!=", "<=", ">=", "&&", "||", "=", "+", "-", "*", "/", "%",
            "<", ">", "!", "++", "--", "+=", "-=", "->", "::",
        ])
        .with_special(&["this", "super"])
        .with_module("Math", &["abs", "max", "min", "pow", "sqrt"])
        .with_module("String", &["format", "join", "valueOf"])
        .with_module("Integer", &["parseInt", "toString", "valueOf"])
        .with_module("Arrays", &["asList", "fill", "sort", "stream"])
        .with_module("Collections", &["emptyList", "sort", "unmodifiableList"])
        .with_prelude(&["Math", "String", "Integer"])
        .with_imports(ImportSyntax {
            declaration: Some("package".into()),
            keyword: Some("import".into()),
            ..Default::default()
        })
        .with_line_comment("//")
        .with_block_comment("/*", "*/")
}

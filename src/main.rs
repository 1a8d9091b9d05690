//! # Nordcat - Heuristic Syntax Highlighting for the Terminal
//!
//! Prints source files with Nord-colored lexical elements.
//!
//! ## Quick Start
//!
//! ```bash
//! # Highlight a file
//! cargo run -- src/main.go
//!
//! # Highlight standard input as Rust
//! cat lib.rs | cargo run -- --language rust
//!
//! # Whole-document lexer with preserved spacing
//! cargo run -- --mode lexer main.go
//! ```

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nordcat_core::{
    CarryPolicy, CoreResult, Document, HighlightOptions, Highlighter, Mode, OutputFormat,
};
use nordcat_syntax::GrammarTable;
use nordcat_term::Renderer;

/// Nordcat - cat with heuristic syntax highlighting
#[derive(Parser, Debug)]
#[command(name = "nordcat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to highlight; standard input is read when none are given
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Language for standard input (default: go); also overrides detection for files
    #[arg(short, long, value_name = "LANG")]
    language: Option<String>,

    /// Highlighting mode: lines or lexer
    #[arg(short, long, default_value_t = Mode::Lines)]
    mode: Mode,

    /// When classification state resets: document or line
    #[arg(long, default_value_t = CarryPolicy::Document)]
    carry: CarryPolicy,

    /// Output format: ansi or json
    #[arg(long, default_value_t = OutputFormat::Ansi)]
    format: OutputFormat,

    /// TOML file with extra or replacement grammars
    #[arg(long, value_name = "FILE")]
    grammars: Option<PathBuf>,

    /// List the known languages and exit
    #[arg(long)]
    list_languages: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> HighlightOptions {
        let defaults = HighlightOptions::default();
        HighlightOptions {
            mode: self.mode,
            carry: self.carry,
            stdin_language: self.language.clone().unwrap_or(defaults.stdin_language),
            format: self.format,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging; stdout is reserved for highlighted text
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting nordcat v{}", env!("CARGO_PKG_VERSION"));

    let table = load_table(args.grammars.as_deref())?;

    if args.list_languages {
        list_languages(&table, &mut io::stdout().lock())?;
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(language) = &args.language {
        table
            .require(language)
            .with_context(|| format!("--language {language}"))?;
    }

    let highlighter = Highlighter::new(&table, args.options());
    let mut renderer = highlighter.renderer();
    let mut out = BufWriter::new(io::stdout().lock());

    let failed = run(&args, &highlighter, renderer.as_mut(), &mut out)?;
    tracing::info!(failed, "Finished");

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Builds the grammar table, layering `--grammars` over the built-in languages.
fn load_table(grammars: Option<&Path>) -> anyhow::Result<GrammarTable> {
    let mut table = GrammarTable::builtin();
    if let Some(path) = grammars {
        let extra = GrammarTable::load(path)
            .with_context(|| format!("Failed to load grammars from {}", path.display()))?;
        tracing::info!(count = extra.len(), "Loaded grammar file");
        table.extend(extra);
    }
    Ok(table)
}

fn list_languages(table: &GrammarTable, out: &mut dyn Write) -> io::Result<()> {
    for grammar in table.iter() {
        writeln!(out, "{:<12} {}", grammar.name(), grammar.extensions().join(" "))?;
    }
    Ok(())
}

/// Highlights every requested document in order and returns how many failed.
///
/// Per-document failures are reported and skipped; only output failures end
/// the run early.
fn run(
    args: &Args,
    highlighter: &Highlighter<'_>,
    renderer: &mut dyn Renderer,
    out: &mut dyn Write,
) -> anyhow::Result<usize> {
    let table = highlighter.table();
    let mut failed = 0;

    let mut report = |result: CoreResult<()>| -> anyhow::Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_per_document() => {
                eprintln!("nordcat: {err}");
                failed += 1;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    };

    if args.files.is_empty() {
        let language = &highlighter.options().stdin_language;
        report(
            Document::from_reader(io::stdin().lock(), "<stdin>", table, language)
                .and_then(|doc| highlighter.render(&doc, renderer, out)),
        )?;
    } else {
        for path in &args.files {
            report(
                Document::open(path, table, args.language.as_deref())
                    .and_then(|doc| highlighter.render(&doc, renderer, out)),
            )?;
        }
    }

    Ok(failed)
}

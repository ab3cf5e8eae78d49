//! Compiscript front end: lexer, parser, semantic analyzer, and TAC
//! generator.
//!
//! - `lexer` - logos-derived tokenizer
//! - `parser` - recursive descent into the typed AST
//! - `ast` - node definitions with parser-minted node ids
//! - `analyze` - scope stack, symbol table, semantic analysis
//! - `tacgen` - lowering to three-address code
//! - `dump` - AST inspection artifacts (text and Graphviz)
//! - `diagnostics` - collected findings and snippet rendering
//!
//! The pipeline is strictly pass-sequential: parse, analyze, then (only when
//! both are clean) address/label assignment followed by TAC emission.

pub mod analyze;
pub mod ast;
pub mod diagnostics;
pub mod dump;
pub mod lexer;
pub mod parser;
pub mod tacgen;

#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
pub mod test_utils;

use compiscript_core::LineIndex;
use compiscript_tac::Tac;

pub use analyze::{Analysis, SymbolTable, analyze};
pub use diagnostics::{Diagnostic, Diagnostics, DiagnosticsPrinter, Severity};
pub use parser::{ParseResult, parse};

/// Fatal pipeline outcomes. Collected findings ride along; they never abort
/// a pass midway.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("parsing failed with {} errors", .0.error_count())]
    Parse(Diagnostics),

    #[error("semantic analysis failed with {} errors", .0.error_count())]
    Analyze(Diagnostics),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A successfully analyzed program, ready for code generation.
pub struct Compilation {
    pub source: String,
    pub program: ast::Program,
    pub analysis: Analysis,
}

impl Compilation {
    /// Parses and analyzes. Syntax errors stop the pipeline before
    /// analysis; semantic errors stop it before code generation.
    pub fn compile(source: &str) -> Result<Compilation> {
        let parsed = parse(source);
        if parsed.diagnostics.has_errors() {
            return Err(Error::Parse(parsed.diagnostics));
        }

        let line_index = LineIndex::new(source);
        let analysis = analyze(&parsed.program, parsed.node_count, &line_index);
        if analysis.diagnostics.has_errors() {
            return Err(Error::Analyze(analysis.diagnostics));
        }

        Ok(Compilation {
            source: source.to_owned(),
            program: parsed.program,
            analysis,
        })
    }

    /// Assigns global addresses and function labels, then lowers to TAC.
    ///
    /// The assignment must happen before emission so every reference the
    /// generator lowers sees a stable address.
    pub fn generate_tac(&mut self) -> Vec<Tac> {
        self.analysis.symbols.assign_memory_addresses();
        self.analysis.symbols.assign_function_labels();
        tacgen::generate(&self.program)
    }
}

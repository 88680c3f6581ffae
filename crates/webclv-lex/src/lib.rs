//! Hand-written OpenCL C lexer and parser standing in for an external front end.
//!
//! No external OpenCL-C parsing crate exists in the ecosystem this workspace
//! draws from, so this crate plays the same role here that a hand-decoded
//! instruction set plays elsewhere: a from-scratch reader for a niche input
//! format with no off-the-shelf library.

mod lexer;
mod parser;
mod token;

pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenKind};

use webclv_ast::TranslationUnit;
use webclv_source::{DiagnosticBag, FileId};

/// Lex and parse one source file's text into a `TranslationUnit`.
///
/// Returns `None` if a fatal diagnostic (lex or parse error) was raised;
/// the caller should stop before running the Restrictor or Analyser.
#[must_use]
pub fn parse_translation_unit(text: &str, file: FileId, diagnostics: &mut DiagnosticBag) -> Option<TranslationUnit> {
    let tokens = Lexer::new(text, file).tokenize(diagnostics);
    if diagnostics.has_fatal() {
        return None;
    }
    Parser::new(tokens, file, diagnostics).parse_translation_unit()
}

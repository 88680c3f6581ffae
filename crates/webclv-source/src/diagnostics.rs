//! Uniform error/warning/fatal reporter, keyed by source location (C3).

use std::fmt;

use crate::location::SourceLocation;
use crate::manager::SourceManager;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// Which section-7 error kind produced a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Setup,
    Input,
    Validation,
    Analysis,
    Rewrite,
    BuiltinAdvisory,
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: Kind,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(severity: Severity, kind: Kind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn render(&self, sources: &SourceManager) -> String {
        match self.location {
            Some(loc) => {
                let lc = sources.line_col(loc);
                let file = sources.file(loc.file);
                format!(
                    "{}:{}:{}: {}: {}",
                    file.display_name(),
                    lc.line,
                    lc.column,
                    self.severity,
                    self.message
                )
            }
            None => format!("{}: {}", self.severity, self.message),
        }
    }
}

/// Accumulates diagnostics for one run; replaces the original's global
/// diagnostic-consumer state with an explicit, threaded value.
#[derive(Default, Debug)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(kind = ?diagnostic.kind, "{}", diagnostic.message),
            Severity::Error | Severity::Fatal => tracing::error!(kind = ?diagnostic.kind, "{}", diagnostic.message),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn warning(&mut self, kind: Kind, message: impl Into<String>, loc: Option<SourceLocation>) {
        let mut d = Diagnostic::new(Severity::Warning, kind, message);
        if let Some(loc) = loc {
            d = d.at(loc);
        }
        self.push(d);
    }

    pub fn error(&mut self, kind: Kind, message: impl Into<String>, loc: Option<SourceLocation>) {
        let mut d = Diagnostic::new(Severity::Error, kind, message);
        if let Some(loc) = loc {
            d = d.at(loc);
        }
        self.push(d);
    }

    pub fn fatal(&mut self, kind: Kind, message: impl Into<String>, loc: Option<SourceLocation>) {
        let mut d = Diagnostic::new(Severity::Fatal, kind, message);
        if let Some(loc) = loc {
            d = d.at(loc);
        }
        self.push(d);
    }

    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Fatal)
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn fatal_detection() {
        let mut bag = DiagnosticBag::new();
        assert!(!bag.has_fatal());
        bag.warning(Kind::BuiltinAdvisory, "unsafe builtin", None);
        assert!(!bag.has_fatal());
        bag.fatal(Kind::Validation, "recursion not allowed", None);
        assert!(bag.has_fatal());
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn render_includes_location() {
        let mut sources = SourceManager::new();
        let id = sources.add_text(PathBuf::from("k.cl"), "abc\ndef".to_string(), true);
        let diag = Diagnostic::new(Severity::Error, Kind::Validation, "bad thing")
            .at(SourceLocation::new(id, 4));
        let rendered = diag.render(&sources);
        assert_eq!(rendered, "k.cl:2:1: error: bad thing");
    }
}

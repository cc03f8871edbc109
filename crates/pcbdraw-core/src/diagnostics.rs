use std::fmt;

/// Warning-class conditions. None of them stops a run on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// No library provides the footprint drawing.
    NotFound,
    /// A drawing has no `origin` anchor; `(0, 0)` is used.
    MissingOrigin,
    /// A resistance value could not be turned into color bands.
    InvalidValue,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::NotFound => "not-found",
            DiagnosticKind::MissingOrigin => "missing-origin",
            DiagnosticKind::InvalidValue => "invalid-value",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Designator of the instance the warning is about, if any.
    pub reference: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            Some(r) => write!(f, "{} ({}): {}", self.kind, r, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{} warning(s) treated as errors", .diagnostics.len())]
pub struct WarningsAsErrors {
    pub diagnostics: Vec<Diagnostic>,
}

/// Warnings accumulated over one run, in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(kind = %diagnostic.kind, reference = ?diagnostic.reference, "{}", diagnostic.message);
        self.items.push(diagnostic);
    }

    pub fn warn(
        &mut self,
        kind: DiagnosticKind,
        reference: Option<&str>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic {
            kind,
            reference: reference.map(str::to_string),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    /// Strict mode: any accumulated warning becomes an error.
    pub fn ensure_clean(&self) -> Result<(), WarningsAsErrors> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(WarningsAsErrors {
                diagnostics: self.items.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_mode_fails_once_anything_was_recorded() {
        let mut d = Diagnostics::new();
        assert!(d.ensure_clean().is_ok());
        d.warn(DiagnosticKind::NotFound, Some("U1"), "Lib:SOIC-8 not found");
        assert_eq!(d.count(DiagnosticKind::NotFound), 1);
        let err = d.ensure_clean().unwrap_err();
        assert_eq!(err.diagnostics.len(), 1);
        assert_eq!(
            err.diagnostics[0].to_string(),
            "not-found (U1): Lib:SOIC-8 not found"
        );
    }
}

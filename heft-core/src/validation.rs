//! Validation System - Advisory Diagnostics
//!
//! Checks produce structured diagnostics.
//! Nothing recorded here ever blocks rendering.

use serde::{Deserialize, Serialize};

use crate::contrast::{contrast_ratio, Color, MIN_CONTRAST_RATIO};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A section references a theme or condition that does not exist.
    MissingRecord,
    /// An extends chain names a record that does not exist.
    MissingParent,
    /// A theme field's identifier is not in the style table.
    MissingStyle,
    /// Foreground and background colors are too close.
    LowContrast,
    /// A section produced no conditions and no actions.
    EmptyRule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// What the diagnostic is about (section, record or style name).
    pub subject: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            subject: subject.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn with_measure(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

/// Sink for recoverable conditions, logged as they are recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            kind = ?diagnostic.kind,
            subject = %diagnostic.subject,
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolved colors of one assembled rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleColors {
    pub text: Option<Color>,
    pub border: Option<Color>,
    pub background: Option<Color>,
}

/// Advisory check over one assembled rule.
pub trait RuleCheck {
    fn name(&self) -> &'static str;
    fn check(&self, section: &str, colors: &RuleColors) -> Vec<Diagnostic>;
}

/// Foreground/background contrast for one color pair.
pub struct ContrastRule {
    pub pair: &'static str,
    pub foreground: fn(&RuleColors) -> Option<Color>,
}

impl RuleCheck for ContrastRule {
    fn name(&self) -> &'static str {
        self.pair
    }

    fn check(&self, section: &str, colors: &RuleColors) -> Vec<Diagnostic> {
        let (Some(fg), Some(bg)) = ((self.foreground)(colors), colors.background) else {
            return vec![];
        };

        let ratio = contrast_ratio(fg, bg);
        if ratio < MIN_CONTRAST_RATIO {
            vec![Diagnostic::warning(
                DiagnosticKind::LowContrast,
                section,
                format!("low {} contrast in section \"{}\": {:.2}", self.pair, section, ratio),
            )
            .with_measure(format!(">= {}", MIN_CONTRAST_RATIO), format!("{:.2}", ratio))]
        } else {
            vec![]
        }
    }
}

/// Validator runs every check against a rule
pub struct Validator {
    rules: Vec<Box<dyn RuleCheck>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(ContrastRule {
                    pair: "text/background",
                    foreground: |c| c.text,
                }),
                Box::new(ContrastRule {
                    pair: "border/background",
                    foreground: |c| c.border,
                }),
            ],
        }
    }

    pub fn validate(&self, section: &str, colors: &RuleColors, diagnostics: &mut Diagnostics) {
        for rule in &self.rules {
            for diagnostic in rule.check(section, colors) {
                diagnostics.record(diagnostic);
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

//! Core diagnostic types for grpcguard.
//!
//! The analysis pass produces `Diagnostic` values; all formatters (human,
//! JSON) consume them.

use serde::{Deserialize, Serialize};

/// A diagnostic produced by the nil-response analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique ID: RULE_CODE-file:line (e.g., "RESP001-handler.go:18").
    pub id: String,
    /// Rule code (e.g., "RESP001").
    pub rule: String,
    /// Severity level.
    pub severity: Severity,
    /// Analysis confidence (0.0 to 1.0). Below 0.7 may be a false positive.
    pub confidence: f64,
    /// One-line message in the fixed diagnostic shape.
    pub title: String,
    /// Detailed explanation of why this is a bug.
    pub explanation: String,
    /// Where the issue manifests.
    pub location: Location,
    /// Service name of the offending handler's receiver.
    pub service: String,
    /// Method name of the offending handler.
    pub method: String,
    /// Short name of the response message type.
    pub response_type: String,
    /// Name of the risky field.
    pub field: String,
}

/// Severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding.
    Info,
    /// Potential issue that should be addressed.
    Warning,
    /// Definite bug or serious issue.
    Error,
    /// Critical safety issue.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl Severity {
    /// Check if this severity is at or above a threshold.
    pub fn is_at_least(&self, threshold: Severity) -> bool {
        *self >= threshold
    }

    /// Parse the lowercase form used by config and CLI flags.
    pub fn parse(s: &str) -> Option<Severity> {
        match s {
            "info" => Some(Severity::Info),
            "warning" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

/// Source code location.
///
/// Lines and columns are 1-based (matching Go's `token.Position`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    /// Line number (1-based).
    pub line: u32,
    /// Column offset (1-based).
    pub column: u32,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Builder for creating diagnostics conveniently.
pub struct DiagnosticBuilder {
    rule: String,
    severity: Severity,
    title: String,
    file: String,
    line: u32,
    column: u32,
    confidence: f64,
    explanation: String,
    service: String,
    method: String,
    response_type: String,
    field: String,
}

impl DiagnosticBuilder {
    pub fn new(rule: impl Into<String>, severity: Severity, title: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity,
            title: title.into(),
            file: String::new(),
            line: 0,
            column: 0,
            confidence: 0.9,
            explanation: String::new(),
            service: String::new(),
            method: String::new(),
            response_type: String::new(),
            field: String::new(),
        }
    }

    pub fn location(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = file.into();
        self.line = line;
        self.column = column;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn handler(mut self, service: impl Into<String>, method: impl Into<String>) -> Self {
        self.service = service.into();
        self.method = method.into();
        self
    }

    pub fn response_field(
        mut self,
        response_type: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.response_type = response_type.into();
        self.field = field.into();
        self
    }

    pub fn build(self) -> Diagnostic {
        let id = format!("{}-{}:{}", self.rule, self.file, self.line);
        Diagnostic {
            id,
            rule: self.rule,
            severity: self.severity,
            confidence: self.confidence,
            title: self.title,
            explanation: self.explanation,
            location: Location {
                file: self.file,
                line: self.line,
                column: self.column,
            },
            service: self.service,
            method: self.method,
            response_type: self.response_type,
            field: self.field,
        }
    }
}

/// Summary of analysis results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub critical: usize,
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl AnalysisSummary {
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut summary = Self {
            critical: 0,
            error: 0,
            warning: 0,
            info: 0,
        };
        for diag in diagnostics {
            match diag.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Error => summary.error += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.critical + self.error + self.warning + self.info
    }

    /// Whether there are any issues at or above a severity threshold.
    pub fn has_issues_above(&self, threshold: Severity) -> bool {
        match threshold {
            Severity::Info => self.total() > 0,
            Severity::Warning => self.warning + self.error + self.critical > 0,
            Severity::Error => self.error + self.critical > 0,
            Severity::Critical => self.critical > 0,
        }
    }
}

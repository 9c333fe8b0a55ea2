//! Human-readable diagnostic output formatter.
//!
//! Uses ariadne for rich terminal output with source context; falls back to a
//! single-line form when the source file cannot be read (the usual case when
//! the analyzer runs away from the checkout that produced the IR).

use crate::diagnostic::{Diagnostic, Severity};
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use std::collections::HashMap;

/// Format diagnostics for human-readable terminal output.
pub fn format_human(diags: &[Diagnostic], use_color: bool) -> String {
    if diags.is_empty() {
        return "No issues found\n".to_string();
    }

    let mut output = Vec::new();
    let mut source_cache: HashMap<String, String> = HashMap::new();

    let config = Config::default().with_color(use_color);

    for diag in diags {
        let file = &diag.location.file;

        let source_text = source_cache
            .entry(file.clone())
            .or_insert_with(|| std::fs::read_to_string(file).unwrap_or_default());

        if source_text.is_empty() {
            output.push(format_fallback(diag));
            continue;
        }

        let kind = match diag.severity {
            Severity::Critical | Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };
        let color = match diag.severity {
            Severity::Critical | Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Info => Color::Cyan,
        };

        let offset = line_col_to_offset(source_text, diag.location.line, diag.location.column);
        let label_end = (offset + 1).min(source_text.len());

        let report = Report::build(kind, file.as_str(), offset)
            .with_config(config)
            .with_code(&diag.rule)
            .with_message(&diag.title)
            .with_label(
                Label::new((file.as_str(), offset..label_end))
                    .with_message(&diag.explanation)
                    .with_color(color),
            )
            .with_note(format!("handler {}.{}", diag.service, diag.method));

        let mut buf = Vec::new();
        report
            .finish()
            .write(
                (file.as_str(), Source::from(source_text.as_str())),
                &mut buf,
            )
            .ok();

        output.push(String::from_utf8_lossy(&buf).to_string());
    }

    let errors = diags
        .iter()
        .filter(|d| d.severity >= Severity::Error)
        .count();
    let warnings = diags
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    output.push(format!(
        "\nFound {} issue(s): {} error, {} warning\n",
        diags.len(),
        errors,
        warnings,
    ));

    output.join("\n")
}

/// Convert 1-based line:column to byte offset in source text.
fn line_col_to_offset(source: &str, line: u32, col: u32) -> usize {
    let line = line.saturating_sub(1) as usize;
    let col = col.saturating_sub(1) as usize;

    let offset: usize = source
        .lines()
        .take(line)
        .map(|l| l.len() + 1) // +1 for newline
        .sum();

    (offset + col).min(source.len().saturating_sub(1))
}

/// Fallback format when the source file is not available.
fn format_fallback(diag: &Diagnostic) -> String {
    format!(
        "{}:{}:{}: {} [{}] {}\n",
        diag.location.file,
        diag.location.line,
        diag.location.column,
        diag.severity,
        diag.rule,
        diag.title,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticBuilder;

    fn make_diag(rule: &str, severity: Severity, file: &str, line: u32) -> Diagnostic {
        DiagnosticBuilder::new(
            rule,
            severity,
            format!("potential nil field in gRPC response Resp.F (handler S.M) [{rule}]"),
        )
        .location(file, line, 3)
        .handler("S", "M")
        .response_field("Resp", "F")
        .build()
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(format_human(&[], false), "No issues found\n");
    }

    #[test]
    fn test_fallback_when_source_missing() {
        let diags = vec![make_diag("RESP001", Severity::Error, "/no/such/file.go", 18)];
        let out = format_human(&diags, false);
        assert!(out.contains("/no/such/file.go:18:3"));
        assert!(out.contains("RESP001"));
        assert!(out.contains("Found 1 issue(s): 1 error, 0 warning"));
    }

    #[test]
    fn test_summary_counts() {
        let diags = vec![
            make_diag("RESP001", Severity::Error, "/no/a.go", 1),
            make_diag("RESP003", Severity::Warning, "/no/b.go", 2),
        ];
        let out = format_human(&diags, false);
        assert!(out.contains("Found 2 issue(s): 1 error, 1 warning"));
    }

    #[test]
    fn test_line_col_to_offset() {
        let src = "line one\nline two\nline three\n";
        assert_eq!(line_col_to_offset(src, 1, 1), 0);
        assert_eq!(line_col_to_offset(src, 2, 1), 9);
        assert_eq!(line_col_to_offset(src, 2, 6), 14);
    }
}

//! Analysis orchestrator — loads IR, runs the pass, filters output.

use std::path::Path;

use grpcguard_diagnostics::diagnostic::{AnalysisSummary, Diagnostic, Severity};
use grpcguard_ir::ir::AnalysisInput;
use grpcguard_nil::ResponseNilAnalyzer;

use crate::config::Config;

/// Complete output from an analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub diagnostics: Vec<Diagnostic>,
    pub summary: AnalysisSummary,
    pub packages_analyzed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Load(#[from] grpcguard_ir::LoadError),
}

/// Load bridge IR from a file and analyze it.
pub fn analyze_file(path: &Path, config: &Config) -> Result<AnalysisOutput, OrchestratorError> {
    let ir = grpcguard_ir::load_ir_file(path)?;
    Ok(analyze_ir(&ir, config))
}

/// Run the analysis pass on already-loaded IR.
/// Used by both the CLI (after loading) and tests (from fixtures).
pub fn analyze_ir(ir: &AnalysisInput, config: &Config) -> AnalysisOutput {
    let rule = &config.rules.response_nil;

    let mut diagnostics = Vec::new();
    let mut packages_analyzed = 0;

    if rule.enabled {
        for pkg in &ir.packages {
            if rule
                .exclude_packages
                .iter()
                .any(|prefix| pkg.import_path.starts_with(prefix.as_str()))
            {
                continue;
            }
            packages_analyzed += 1;
            diagnostics.extend(ResponseNilAnalyzer::analyze_package(pkg));
        }
    }

    let diagnostics = postprocess(diagnostics, config);
    let summary = AnalysisSummary::from_diagnostics(&diagnostics);
    AnalysisOutput {
        diagnostics,
        summary,
        packages_analyzed,
    }
}

/// Apply embedder-level filters. Order is preserved: filters are stable, and
/// the cap truncates from the tail.
fn postprocess(diagnostics: Vec<Diagnostic>, config: &Config) -> Vec<Diagnostic> {
    let rule = &config.rules.response_nil;
    let threshold =
        Severity::parse(&config.grpcguard.severity_threshold).unwrap_or(Severity::Warning);

    let mut filtered: Vec<Diagnostic> = diagnostics
        .into_iter()
        .filter(|d| !rule.exclude_fields.iter().any(|f| f == &d.field))
        .filter(|d| d.confidence >= rule.min_confidence)
        .filter(|d| d.severity.is_at_least(threshold))
        .collect();

    let cap = config.grpcguard.max_diagnostics;
    if cap > 0 && filtered.len() > cap {
        filtered.truncate(cap);
    }
    filtered
}

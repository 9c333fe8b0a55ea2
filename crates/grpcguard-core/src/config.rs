//! Configuration loading from grpcguard.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grpcguard: GrpcguardConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GrpcguardConfig {
    pub severity_threshold: String,
    pub max_diagnostics: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub response_nil: ResponseNilConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponseNilConfig {
    pub enabled: bool,
    /// Import-path prefixes excluded from analysis entirely.
    pub exclude_packages: Vec<String>,
    /// Field names whose diagnostics are suppressed.
    pub exclude_fields: Vec<String>,
    /// Diagnostics below this confidence are dropped.
    pub min_confidence: f64,
}

impl Default for GrpcguardConfig {
    fn default() -> Self {
        Self {
            severity_threshold: "warning".to_string(),
            max_diagnostics: 100,
        }
    }
}

impl Default for ResponseNilConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exclude_packages: vec![],
            exclude_fields: vec![],
            min_confidence: 0.0,
        }
    }
}

/// Find and load grpcguard.toml, walking up from `start_dir`.
/// Returns default config if no file found.
pub fn load_config(start_dir: &Path) -> Config {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = std::fs::read_to_string(&path).unwrap_or_default();
            toml::from_str(&content).unwrap_or_default()
        }
        None => Config::default(),
    }
}

/// Walk up directories looking for grpcguard.toml.
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join("grpcguard.toml");
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Default TOML content for `grpcguard init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"[grpcguard]
severity_threshold = "warning"
max_diagnostics = 100

[rules.response_nil]
enabled = true
# exclude_packages = ["example.com/internal/legacy"]
# exclude_fields = ["Metadata"]
# min_confidence = 0.7
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert!(cfg.rules.response_nil.enabled);
        assert_eq!(cfg.grpcguard.severity_threshold, "warning");
        assert_eq!(cfg.grpcguard.max_diagnostics, 100);
        assert_eq!(cfg.rules.response_nil.min_confidence, 0.0);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[grpcguard]
severity_threshold = "error"
max_diagnostics = 10

[rules.response_nil]
enabled = true
exclude_packages = ["example.com/gen"]
exclude_fields = ["Metadata"]
min_confidence = 0.7
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.grpcguard.severity_threshold, "error");
        assert_eq!(cfg.grpcguard.max_diagnostics, 10);
        assert_eq!(cfg.rules.response_nil.exclude_packages, vec!["example.com/gen"]);
        assert_eq!(cfg.rules.response_nil.exclude_fields, vec!["Metadata"]);
        assert_eq!(cfg.rules.response_nil.min_confidence, 0.7);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[rules.response_nil]
enabled = false
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert!(!cfg.rules.response_nil.enabled);
        assert_eq!(cfg.grpcguard.severity_threshold, "warning");
    }

    #[test]
    fn test_load_config_no_file() {
        let cfg = load_config(Path::new("/nonexistent/path"));
        assert!(cfg.rules.response_nil.enabled);
    }

    #[test]
    fn test_find_config_file_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("grpcguard.toml"), DEFAULT_CONFIG_TOML).unwrap();
        let found = find_config_file(dir.path());
        assert_eq!(found.unwrap(), dir.path().join("grpcguard.toml"));
    }

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("grpcguard.toml"), DEFAULT_CONFIG_TOML).unwrap();
        let subdir = dir.path().join("sub");
        std::fs::create_dir(&subdir).unwrap();
        let found = find_config_file(&subdir);
        assert_eq!(found.unwrap(), dir.path().join("grpcguard.toml"));
    }

    #[test]
    fn test_default_config_toml_parses() {
        let cfg: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(cfg.grpcguard.severity_threshold, "warning");
        assert!(cfg.rules.response_nil.enabled);
    }
}

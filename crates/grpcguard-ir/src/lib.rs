//! grpcguard IR — intermediate representation for Go code analysis.
//!
//! The IR is built by a Go compiler frontend (the bridge) and deserialized in
//! Rust. This crate provides:
//! - High-level IR wrappers matching the bridge JSON output
//! - Type system helpers
//! - Callee resolution for inter-procedural summaries

pub mod call_graph;
pub mod ir;
pub mod types;

use std::path::Path;

/// Errors surfaced while loading bridge output.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid bridge JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a bridge JSON file and deserialize it into the owned IR.
pub fn load_ir_file(path: &Path) -> Result<ir::AnalysisInput, LoadError> {
    let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_ir_file_missing() {
        let err = load_ir_file(Path::new("/nonexistent/bridge.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_ir_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");
        std::fs::write(
            &path,
            r#"{"packages": [], "go_version": "1.22", "bridge_version": "0.2.0"}"#,
        )
        .unwrap();
        let input = load_ir_file(&path).unwrap();
        assert!(input.packages.is_empty());
        assert_eq!(input.go_version, "1.22");
    }

    #[test]
    fn test_load_ir_file_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_ir_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }
}

//! Compiler configuration.

use std::path::PathBuf;

/// Configuration for the dalgen compiler.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Directory containing model files and `attributes.json`.
    pub model_dir: PathBuf,

    /// Directory to write generated Go code.
    pub out_dir: PathBuf,

    /// Go package name of the generated files.
    pub package: String,

    /// Module path written to `go.mod`.
    pub module_path: String,

    /// SQL dialect (default: "postgres").
    pub dialect: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            out_dir: PathBuf::from("dal"),
            package: "dal".to_string(),
            module_path: "example.com/dal".to_string(),
            dialect: "postgres".to_string(),
        }
    }
}

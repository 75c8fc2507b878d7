//! # dalgen Compiler
//!
//! This crate compiles declarative model descriptions (attributes plus
//! find/update/add/add-or-replace/delete access methods with nested filter
//! trees) into dialect-specific parameterized SQL and a ready-to-build Go
//! data-access package.
//!
//! ## Architecture
//!
//! ```text
//! models/*.json + attributes.json
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Loader    │  JSON → Model, StaticRegistry
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Validate   │  Structure checks, attribute ids → columns
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │     SQL      │  Filter trees → SQL text + parameter plan
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  Statements → IR → Go source, schema.sql, go.mod
//! └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dal_compiler::{Compiler, CompilerConfig};
//!
//! let config = CompilerConfig {
//!     model_dir: "models".into(),
//!     out_dir: "internal/dal".into(),
//!     ..CompilerConfig::default()
//! };
//!
//! let result = Compiler::new(config).compile()?;
//! println!("{} models, {} methods", result.models, result.methods);
//! ```

pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod ir;
pub mod loader;
pub mod model;
pub mod naming;
pub mod sql;
pub mod validate;

pub use config::CompilerConfig;
pub use diagnostic::{CompileWarning, CompilerError};

use sql::{compile_method, dialect_for, Dialect, Statement};
use validate::ResolvedModel;

/// The main compiler struct that orchestrates the compilation pipeline.
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    /// Creates a new compiler with the given configuration.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles the model directory and writes the Go package.
    ///
    /// This runs the full pipeline:
    /// 1. Load models and the attribute registry
    /// 2. Validate and resolve attribute ids
    /// 3. Compile statements and synthesize Go units
    /// 4. Write output files
    ///
    /// Every file is generated before the first one is written.
    pub fn compile(&self) -> Result<CompileResult, CompilerError> {
        let dialect = dialect_for(&self.config.dialect)?;
        let resolved = self.load_and_validate()?;

        let generated = codegen::generate(&resolved, &self.config, dialect.as_ref())?;
        self.write_output(&generated)?;

        Ok(CompileResult {
            models: resolved.len(),
            methods: resolved.iter().map(|r| r.model.access.methods().count()).sum(),
            model_methods: method_counts(&resolved),
            files: generated.files.len(),
            warnings: generated.warnings,
        })
    }

    /// Validates the model directory without generating code.
    pub fn check(&self) -> Result<CompileResult, CompilerError> {
        let dialect = dialect_for(&self.config.dialect)?;
        let resolved = self.load_and_validate()?;
        let statements = compile_statements(&resolved, dialect.as_ref());

        Ok(CompileResult {
            models: resolved.len(),
            methods: statements.iter().map(|(_, s)| s.len()).sum(),
            model_methods: method_counts(&resolved),
            files: 0,
            warnings: statements
                .into_iter()
                .flat_map(|(_, s)| s.into_iter().flat_map(|stmt| stmt.warnings))
                .collect(),
        })
    }

    /// Compiles every access method to SQL, grouped by model name.
    pub fn statements(&self) -> Result<Vec<(String, Vec<Statement>)>, CompilerError> {
        let dialect = dialect_for(&self.config.dialect)?;
        let resolved = self.load_and_validate()?;
        Ok(compile_statements(&resolved, dialect.as_ref()))
    }

    fn load_and_validate(&self) -> Result<Vec<ResolvedModel>, CompilerError> {
        let set = loader::load_dir(&self.config.model_dir)?;
        tracing::info!(
            dir = %self.config.model_dir.display(),
            models = set.models.len(),
            attributes = set.registry.len(),
            "loaded model directory"
        );
        validate::validate_models(&set.models, &set.registry)
    }

    /// Writes generated code to the output directory.
    fn write_output(&self, generated: &codegen::GeneratedCode) -> Result<(), CompilerError> {
        std::fs::create_dir_all(&self.config.out_dir)
            .map_err(|e| CompilerError::io(&self.config.out_dir, e.to_string()))?;

        for (filename, content) in &generated.files {
            let path = self.config.out_dir.join(filename);
            std::fs::write(&path, content).map_err(|e| CompilerError::io(&path, e.to_string()))?;
            tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
        }

        Ok(())
    }
}

fn compile_statements(models: &[ResolvedModel], dialect: &dyn Dialect) -> Vec<(String, Vec<Statement>)> {
    models
        .iter()
        .map(|resolved| {
            let model = &resolved.model;
            let statements = model
                .access
                .methods()
                .map(|method| compile_method(model, method, dialect))
                .collect();
            (model.name.clone(), statements)
        })
        .collect()
}

fn method_counts(models: &[ResolvedModel]) -> Vec<(String, usize)> {
    models
        .iter()
        .map(|r| (r.model.name.clone(), r.model.access.methods().count()))
        .collect()
}

/// Result of a successful compilation.
#[derive(Debug)]
pub struct CompileResult {
    /// Number of models compiled.
    pub models: usize,
    /// Number of access methods across all models.
    pub methods: usize,
    /// Access method count per model, in load order.
    pub model_methods: Vec<(String, usize)>,
    /// Number of files written.
    pub files: usize,
    /// Non-fatal findings, e.g. dropped filters with unknown operators.
    pub warnings: Vec<CompileWarning>,
}

//! Loading model descriptions and the attribute registry from disk.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use walkdir::WalkDir;

use crate::diagnostic::CompilerError;
use crate::model::{Model, StaticRegistry};

/// File holding the attribute registry inside a model directory.
pub const REGISTRY_FILE: &str = "attributes.json";

/// Everything read from a model directory.
#[derive(Debug, Clone, Default)]
pub struct ModelSet {
    pub registry: StaticRegistry,
    pub models: Vec<Model>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CompilerError> {
    let source = std::fs::read_to_string(path).map_err(|e| CompilerError::io(path, e.to_string()))?;
    serde_json::from_str(&source).map_err(|e| CompilerError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Reads an attribute registry file.
pub fn load_registry(path: &Path) -> Result<StaticRegistry, CompilerError> {
    let mut registry: StaticRegistry = read_json(path)?;
    registry.reindex();
    Ok(registry)
}

/// Reads one model file.
pub fn load_model(path: &Path) -> Result<Model, CompilerError> {
    read_json(path)
}

/// Loads the registry and every `*.json` model file under `dir`.
///
/// Files are visited in path order so repeated runs see models in the same
/// order. A missing registry file yields an empty registry. An entry that
/// cannot be read fails the whole load.
pub fn load_dir(dir: &Path) -> Result<ModelSet, CompilerError> {
    if !dir.is_dir() {
        return Err(CompilerError::io(dir, "model directory does not exist"));
    }

    let mut set = ModelSet::default();
    let mut model_paths: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            CompilerError::io(path, e.to_string())
        })?;
        let path = entry.path();
        if !path.is_file() || path.extension().map(|ext| ext != "json").unwrap_or(true) {
            continue;
        }

        if path.file_name().map(|name| name == REGISTRY_FILE).unwrap_or(false) {
            set.registry = load_registry(path)?;
            tracing::debug!(path = %path.display(), attributes = set.registry.len(), "loaded attribute registry");
        } else {
            model_paths.push(path.to_path_buf());
        }
    }

    for path in model_paths {
        let model = load_model(&path)?;
        tracing::debug!(path = %path.display(), model = %model.name, "loaded model");
        set.models.push(model);
    }

    Ok(set)
}

//! Import paths and third-party dependencies collected from IR nodes.

use std::collections::{BTreeMap, BTreeSet};

use crate::naming::indent;

/// A third-party module the generated code depends on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dependency {
    pub module: String,
    pub version: String,
}

impl Dependency {
    pub fn new(module: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            version: version.into(),
        }
    }
}

/// An import path, optionally aliased and backed by a dependency.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Import {
    pub path: String,
    pub alias: Option<String>,
    pub dependency: Option<Dependency>,
}

impl Import {
    /// A standard-library import.
    pub fn std(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: None,
            dependency: None,
        }
    }

    /// An import provided by a third-party module.
    pub fn module(path: impl Into<String>, dependency: Dependency) -> Self {
        Self {
            path: path.into(),
            alias: None,
            dependency: Some(dependency),
        }
    }

    /// Imports the package under `alias`.
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Standard-library paths have no dot in their first segment.
    pub fn is_std(&self) -> bool {
        self.dependency.is_none()
            && !self
                .path
                .split('/')
                .next()
                .map(|first| first.contains('.'))
                .unwrap_or(false)
    }

    fn render_spec(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} \"{}\"", alias, self.path),
            None => format!("\"{}\"", self.path),
        }
    }
}

/// A deduplicated set of imports and the dependencies behind them.
///
/// Keyed by path: the first import registered for a path wins. Iteration
/// and rendering are lexicographic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    imports: BTreeMap<String, Import>,
    dependencies: BTreeSet<Dependency>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, import: &Import) {
        if let Some(dep) = &import.dependency {
            self.dependencies.insert(dep.clone());
        }
        self.imports
            .entry(import.path.clone())
            .or_insert_with(|| import.clone());
    }

    pub fn extend(&mut self, other: &ImportSet) {
        for import in other.imports.values() {
            self.insert(import);
        }
        self.dependencies.extend(other.dependencies.iter().cloned());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.imports.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Import paths in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.imports.keys().map(String::as_str)
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    /// Renders the import declaration: standard library first, then a blank
    /// line, then third-party paths. Empty when there is nothing to import.
    pub fn render(&self) -> String {
        let (std, third_party): (Vec<&Import>, Vec<&Import>) =
            self.imports.values().partition(|i| i.is_std());

        match (std.len(), third_party.len()) {
            (0, 0) => String::new(),
            (1, 0) => format!("import {}", std[0].render_spec()),
            (0, 1) => format!("import {}", third_party[0].render_spec()),
            _ => {
                let mut groups = Vec::new();
                if !std.is_empty() {
                    groups.push(std.iter().map(|i| i.render_spec()).collect::<Vec<_>>().join("\n"));
                }
                if !third_party.is_empty() {
                    groups.push(third_party.iter().map(|i| i.render_spec()).collect::<Vec<_>>().join("\n"));
                }
                format!("import (\n{}\n)", indent(&groups.join("\n\n"), 1))
            }
        }
    }
}

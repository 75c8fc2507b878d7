//! Access configuration: the find/update/add/add-or-replace/delete methods of a model.

use std::fmt;
use serde::{Deserialize, Serialize};

use super::FilterNode;

/// The kind of an access method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Find,
    Update,
    Add,
    AddOrReplace,
    Delete,
}

impl AccessKind {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::Find => "find",
            AccessKind::Update => "update",
            AccessKind::Add => "add",
            AccessKind::AddOrReplace => "add_or_replace",
            AccessKind::Delete => "delete",
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assigns a caller-supplied parameter to an attribute (SET or VALUES entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub attribute: String,
    pub parameter: String,
}

impl Assignment {
    pub fn new(attribute: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            parameter: parameter.into(),
        }
    }
}

/// A SELECT access method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindConfig {
    pub name: String,

    /// Output attributes. Empty selects every column.
    #[serde(default)]
    pub attributes: Vec<String>,

    #[serde(default)]
    pub filters: Vec<FilterNode>,
}

/// An UPDATE access method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    pub name: String,

    #[serde(default)]
    pub filters: Vec<FilterNode>,

    #[serde(default)]
    pub set: Vec<Assignment>,

    /// Attributes bumped by one on every update.
    #[serde(default)]
    pub increment: Vec<String>,

    /// Attributes set to the current time on every update.
    #[serde(default)]
    pub timestamp: Vec<String>,
}

/// An INSERT access method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddConfig {
    pub name: String,

    #[serde(default)]
    pub values: Vec<Assignment>,
}

/// An INSERT ... ON CONFLICT DO UPDATE access method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOrReplaceConfig {
    pub name: String,

    #[serde(default)]
    pub values: Vec<Assignment>,

    /// Conflict target. Empty means the first value attribute.
    #[serde(default)]
    pub conflict: Vec<String>,
}

impl AddOrReplaceConfig {
    /// The attributes that identify an existing row.
    pub fn conflict_target(&self) -> Vec<String> {
        if !self.conflict.is_empty() {
            return self.conflict.clone();
        }
        self.values
            .first()
            .map(|v| vec![v.attribute.clone()])
            .unwrap_or_default()
    }
}

/// A DELETE access method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfig {
    pub name: String,

    #[serde(default)]
    pub filters: Vec<FilterNode>,
}

/// Any access method, borrowed from a model.
#[derive(Debug, Clone, Copy)]
pub enum AccessMethod<'a> {
    Find(&'a FindConfig),
    Update(&'a UpdateConfig),
    Add(&'a AddConfig),
    AddOrReplace(&'a AddOrReplaceConfig),
    Delete(&'a DeleteConfig),
}

impl<'a> AccessMethod<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            AccessMethod::Find(c) => &c.name,
            AccessMethod::Update(c) => &c.name,
            AccessMethod::Add(c) => &c.name,
            AccessMethod::AddOrReplace(c) => &c.name,
            AccessMethod::Delete(c) => &c.name,
        }
    }

    pub fn kind(&self) -> AccessKind {
        match self {
            AccessMethod::Find(_) => AccessKind::Find,
            AccessMethod::Update(_) => AccessKind::Update,
            AccessMethod::Add(_) => AccessKind::Add,
            AccessMethod::AddOrReplace(_) => AccessKind::AddOrReplace,
            AccessMethod::Delete(_) => AccessKind::Delete,
        }
    }

    /// Caller parameter names in binding order, repeats included.
    pub fn parameters(&self) -> Vec<&'a str> {
        let assignments: &'a [Assignment] = match self {
            AccessMethod::Update(c) => &c.set,
            AccessMethod::Add(c) => &c.values,
            AccessMethod::AddOrReplace(c) => &c.values,
            AccessMethod::Find(_) | AccessMethod::Delete(_) => &[],
        };
        let mut names: Vec<&'a str> = assignments.iter().map(|a| a.parameter.as_str()).collect();
        for filter in self.filters() {
            filter.for_each_leaf(&mut |leaf| names.push(leaf.parameter.as_str()));
        }
        names
    }

    /// The filter tree of this method, empty for inserts.
    pub fn filters(&self) -> &'a [FilterNode] {
        match self {
            AccessMethod::Find(c) => &c.filters,
            AccessMethod::Update(c) => &c.filters,
            AccessMethod::Delete(c) => &c.filters,
            AccessMethod::Add(_) | AccessMethod::AddOrReplace(_) => &[],
        }
    }
}

/// All access methods configured for a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub find: Vec<FindConfig>,

    #[serde(default)]
    pub update: Vec<UpdateConfig>,

    #[serde(default)]
    pub add: Vec<AddConfig>,

    #[serde(default)]
    pub add_or_replace: Vec<AddOrReplaceConfig>,

    #[serde(default)]
    pub delete: Vec<DeleteConfig>,
}

impl AccessConfig {
    /// Iterates methods in generation order: find, update, add, add-or-replace, delete,
    /// each kind in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = AccessMethod<'_>> {
        self.find
            .iter()
            .map(AccessMethod::Find)
            .chain(self.update.iter().map(AccessMethod::Update))
            .chain(self.add.iter().map(AccessMethod::Add))
            .chain(self.add_or_replace.iter().map(AccessMethod::AddOrReplace))
            .chain(self.delete.iter().map(AccessMethod::Delete))
    }

    pub fn is_empty(&self) -> bool {
        self.methods().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_iterate_in_generation_order() {
        let config = AccessConfig {
            delete: vec![DeleteConfig { name: "Remove".into(), ..Default::default() }],
            find: vec![
                FindConfig { name: "FindA".into(), ..Default::default() },
                FindConfig { name: "FindB".into(), ..Default::default() },
            ],
            add: vec![AddConfig { name: "Create".into(), ..Default::default() }],
            ..Default::default()
        };

        let names: Vec<_> = config.methods().map(|m| (m.kind(), m.name())).collect();
        assert_eq!(
            names,
            vec![
                (AccessKind::Find, "FindA"),
                (AccessKind::Find, "FindB"),
                (AccessKind::Add, "Create"),
                (AccessKind::Delete, "Remove"),
            ]
        );
    }

    #[test]
    fn conflict_target_defaults_to_first_value() {
        let mut config = AddOrReplaceConfig {
            name: "Upsert".into(),
            values: vec![Assignment::new("sku", "p1"), Assignment::new("price", "p2")],
            conflict: vec![],
        };
        assert_eq!(config.conflict_target(), vec!["sku"]);

        config.conflict = vec!["price".into()];
        assert_eq!(config.conflict_target(), vec!["price"]);
    }
}

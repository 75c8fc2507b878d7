//! Attribute registry: resolves attribute ids to column names and storage types.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Validation id that makes a column `NOT NULL`.
pub const REQUIRED_VALIDATION: &str = "required";

/// Storage type of an attribute, independent of any SQL dialect.
///
/// Parsed case-insensitively and with common aliases (`string`, `integer`,
/// `double`, `boolean`); always serialized by its canonical id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StorageType {
    Text,
    Int,
    Bigint,
    Float,
    Bool,
    Timestamp,
    Uuid,
    Json,
}

impl FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "string" => Ok(StorageType::Text),
            "int" | "integer" => Ok(StorageType::Int),
            "bigint" => Ok(StorageType::Bigint),
            "float" | "double" => Ok(StorageType::Float),
            "bool" | "boolean" => Ok(StorageType::Bool),
            "timestamp" => Ok(StorageType::Timestamp),
            "uuid" => Ok(StorageType::Uuid),
            "json" => Ok(StorageType::Json),
            _ => Err(format!(
                "unknown storage type `{}`, expected one of text, int, bigint, float, bool, timestamp, uuid, json",
                s
            )),
        }
    }
}

impl TryFrom<String> for StorageType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StorageType> for String {
    fn from(ty: StorageType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StorageType {
    /// Canonical id.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Text => "text",
            StorageType::Int => "int",
            StorageType::Bigint => "bigint",
            StorageType::Float => "float",
            StorageType::Bool => "bool",
            StorageType::Timestamp => "timestamp",
            StorageType::Uuid => "uuid",
            StorageType::Json => "json",
        }
    }
}

/// A registered attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Identifier models use to reference the attribute.
    pub id: String,

    /// Column name.
    pub name: String,

    #[serde(rename = "type")]
    pub storage_type: StorageType,

    #[serde(default)]
    pub validations: Vec<String>,
}

impl Attribute {
    pub fn new(id: impl Into<String>, name: impl Into<String>, storage_type: StorageType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            storage_type,
            validations: Vec::new(),
        }
    }

    /// Adds a validation id.
    pub fn with_validation(mut self, validation: impl Into<String>) -> Self {
        self.validations.push(validation.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.validations.iter().any(|v| v == REQUIRED_VALIDATION)
    }
}

/// Read-only lookup service for attributes.
///
/// Injected into validation and synthesis; nothing in the compiler mutates it.
pub trait AttributeRegistry {
    fn lookup(&self, id: &str) -> Option<&Attribute>;
}

/// Registry backed by an in-memory map, usually loaded from `attributes.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticRegistry {
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    #[serde(skip)]
    by_id: HashMap<String, usize>,
}

impl StaticRegistry {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        let mut registry = Self {
            attributes,
            by_id: HashMap::new(),
        };
        registry.reindex();
        registry
    }

    /// Rebuilds the id index. Later duplicates shadow earlier ones.
    pub fn reindex(&mut self) {
        self.by_id = self
            .attributes
            .iter()
            .enumerate()
            .map(|(i, attr)| (attr.id.clone(), i))
            .collect();
    }

    /// Registers an attribute; it shadows any earlier one with the same id.
    pub fn insert(&mut self, attribute: Attribute) {
        self.by_id.insert(attribute.id.clone(), self.attributes.len());
        self.attributes.push(attribute);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl AttributeRegistry for StaticRegistry {
    fn lookup(&self, id: &str) -> Option<&Attribute> {
        self.by_id.get(id).map(|&i| &self.attributes[i])
    }
}

//! Input model descriptions.
//!
//! A model names a table, lists its attributes by registry id, and declares
//! the access methods the compiler turns into SQL and Go functions.

mod access;
mod filter;
mod registry;

pub use access::{
    AccessConfig, AccessKind, AccessMethod, AddConfig, AddOrReplaceConfig, Assignment,
    DeleteConfig, FindConfig, UpdateConfig,
};
pub use filter::{FilterGroup, FilterLeaf, FilterNode, LogicalOperator, Operator};
pub use registry::{Attribute, AttributeRegistry, StaticRegistry, StorageType, REQUIRED_VALIDATION};

use serde::{Deserialize, Serialize};

use crate::naming::to_snake_case;

/// A model description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model name (e.g., "Product", "OrderLine").
    pub name: String,

    /// Optional schema qualifier for the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Attribute ids, in column order.
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Explicit indexes, each a list of attribute ids.
    #[serde(default)]
    pub indexes: Vec<Vec<String>>,

    #[serde(default)]
    pub access: AccessConfig,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Unqualified table name.
    pub fn table_name(&self) -> String {
        to_snake_case(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_deserializes_with_defaults() {
        let json = r#"{
            "name": "OrderLine",
            "attributes": ["sku", "quantity"],
            "access": {
                "find": [{ "name": "FindBySku", "filters": [
                    { "attribute": "sku", "operator": "=", "parameter": "sku" }
                ]}]
            }
        }"#;

        let model: Model = serde_json::from_str(json).unwrap();
        assert_eq!(model.table_name(), "order_line");
        assert_eq!(model.namespace, None);
        assert_eq!(model.access.find.len(), 1);
        assert!(model.access.find[0].attributes.is_empty());
        assert!(model.indexes.is_empty());
    }
}

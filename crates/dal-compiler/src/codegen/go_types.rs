//! Go types for storage types and for the database/sql surface.

use crate::ir::{Dependency, Import, TypeRef};
use crate::model::{Attribute, StorageType};

/// Module providing the primary-key generator.
pub const UUID_MODULE: &str = "github.com/google/uuid";

/// Pinned version of [`UUID_MODULE`].
pub const UUID_VERSION: &str = "v1.6.0";

pub fn uuid_import() -> Import {
    Import::module(UUID_MODULE, Dependency::new(UUID_MODULE, UUID_VERSION))
}

/// Import needed to call a generator function such as `uuid.NewString`.
pub fn generator_import(function: &str) -> Option<Import> {
    match function.split_once('.') {
        Some(("uuid", _)) => Some(uuid_import()),
        _ => None,
    }
}

pub fn context() -> TypeRef {
    TypeRef::handle(Import::std("context"), "context.Context")
}

pub fn sql_db() -> TypeRef {
    TypeRef::external(Import::std("database/sql"), "sql.DB")
}

/// The prepared-statement map every access function receives.
pub fn statement_map() -> TypeRef {
    TypeRef::handle(Import::std("database/sql"), "map[string]*sql.Stmt")
}

pub fn time() -> TypeRef {
    TypeRef::external(Import::std("time"), "time.Time")
}

/// Go field type for an attribute column.
///
/// Optional scalars become pointers so NULL scans cleanly; timestamps are
/// pointers either way and JSON stays a raw byte slice.
pub fn go_type(attribute: &Attribute) -> TypeRef {
    let scalar = match attribute.storage_type {
        StorageType::Text | StorageType::Uuid => "string",
        StorageType::Int => "int32",
        StorageType::Bigint => "int64",
        StorageType::Float => "float64",
        StorageType::Bool => "bool",
        StorageType::Timestamp => return time(),
        StorageType::Json => {
            return TypeRef::handle(Import::std("encoding/json"), "json.RawMessage")
        }
    };

    if attribute.is_required() {
        TypeRef::builtin(scalar)
    } else {
        TypeRef::builtin(format!("*{}", scalar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::REQUIRED_VALIDATION;

    #[test]
    fn nullable_scalars_are_pointers() {
        let price = Attribute::new("p", "price", StorageType::Float);
        assert_eq!(go_type(&price).render(), "*float64");

        let sku = Attribute::new("s", "sku", StorageType::Text).with_validation(REQUIRED_VALIDATION);
        assert_eq!(go_type(&sku).render(), "string");
    }

    #[test]
    fn imported_types() {
        let seen = Attribute::new("t", "seen_at", StorageType::Timestamp);
        assert_eq!(go_type(&seen).render(), "*time.Time");

        let doc = Attribute::new("d", "doc", StorageType::Json);
        let ty = go_type(&doc);
        assert_eq!(ty.render(), "json.RawMessage");
        assert_eq!(ty.import().map(|i| i.path.as_str()), Some("encoding/json"));
    }

    #[test]
    fn generator_imports_uuid() {
        let import = generator_import("uuid.NewString").unwrap();
        assert_eq!(import.dependency.unwrap().version, UUID_VERSION);
        assert!(generator_import("nextID").is_none());
    }
}

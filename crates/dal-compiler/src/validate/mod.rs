//! Validation and attribute resolution of model descriptions.

mod resolve;
mod structure;

pub use resolve::{resolve_model, ResolvedModel};
pub use structure::{validate_model_names, validate_structure};

use std::collections::HashMap;

use crate::codegen::{declared_names, RESERVED_NAMES};
use crate::diagnostic::CompilerError;
use crate::model::{AttributeRegistry, Model};

/// Validates and resolves every model of a run.
///
/// Stops at the first error; nothing downstream runs on a partially valid set.
pub fn validate_models(
    models: &[Model],
    registry: &dyn AttributeRegistry,
) -> Result<Vec<ResolvedModel>, CompilerError> {
    validate_model_names(models)?;
    for model in models {
        validate_structure(model)?;
    }
    validate_package_names(models)?;

    models.iter().map(|model| resolve_model(model, registry)).collect()
}

/// All models share one Go package: method names must be unique across
/// models, and no generated declaration may reuse a name another one or the
/// generated code itself already takes.
fn validate_package_names(models: &[Model]) -> Result<(), CompilerError> {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    let mut declared: HashMap<String, String> = RESERVED_NAMES
        .iter()
        .map(|name| (name.to_string(), "the generated package".to_string()))
        .collect();

    for model in models {
        for method in model.access.methods() {
            if let Some(owner) = owners.insert(method.name(), &model.name) {
                if owner != model.name {
                    return Err(CompilerError::DuplicateMethod {
                        name: method.name().to_string(),
                    }
                    .in_model(&model.name));
                }
            }
        }

        for (name, role) in declared_names(model) {
            if let Some(first) = declared.get(&name) {
                return Err(CompilerError::IdentifierCollision {
                    first: first.clone(),
                    name,
                    second: role,
                }
                .in_model(&model.name));
            }
            declared.insert(name, role);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, DeleteConfig, FindConfig, StaticRegistry, StorageType};

    fn with_delete(model: &str, method: &str) -> Model {
        let mut m = Model::new(model);
        m.access.delete.push(DeleteConfig {
            name: method.into(),
            filters: vec![],
        });
        m
    }

    #[test]
    fn method_names_are_unique_across_models() {
        let registry = StaticRegistry::default();
        let err = validate_models(&[with_delete("A", "Purge"), with_delete("B", "Purge")], &registry)
            .unwrap_err();
        assert_eq!(err.to_string(), "In model 'B'");
        assert!(matches!(err.root_cause(), CompilerError::DuplicateMethod { name } if name == "Purge"));
    }

    fn collision(err: &CompilerError) -> (&str, &str, &str) {
        match err.root_cause() {
            CompilerError::IdentifierCollision { name, first, second } => {
                (name.as_str(), first.as_str(), second.as_str())
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn method_named_like_its_model_is_rejected() {
        let registry = StaticRegistry::default();
        let err = validate_models(&[with_delete("Product", "Product")], &registry).unwrap_err();
        assert_eq!(err.to_string(), "In model 'Product'");
        assert_eq!(
            collision(&err),
            ("Product", "the Product model struct", "access method Product.Product")
        );

        let err = validate_models(&[with_delete("Product", "PrepareProductStatements")], &registry)
            .unwrap_err();
        assert_eq!(
            collision(&err),
            (
                "PrepareProductStatements",
                "access method Product.PrepareProductStatements",
                "the prepare function of Product"
            )
        );
    }

    #[test]
    fn method_named_like_generated_struct_is_rejected() {
        let registry = StaticRegistry::default();
        let mut model = with_delete("Product", "Purge");
        model.access.find.push(FindConfig {
            name: "PurgeRequest".into(),
            ..Default::default()
        });

        let err = validate_models(&[model], &registry).unwrap_err();
        assert_eq!(
            collision(&err),
            ("PurgeRequest", "access method Product.PurgeRequest", "the request struct of Product.Purge")
        );

        let err = validate_models(&[with_delete("Product", "PurgeParams"), with_delete("Order", "Purge")], &registry)
            .unwrap_err();
        assert_eq!(err.to_string(), "In model 'Order'");
        assert_eq!(collision(&err).0, "PurgeParams");
    }

    #[test]
    fn names_the_generated_code_uses_are_reserved() {
        let registry = StaticRegistry::default();
        for method in ["rangeBound", "ErrStatementNotPrepared", "make"] {
            let err = validate_models(&[with_delete("Product", method)], &registry).unwrap_err();
            assert_eq!(collision(&err).1, "the generated package");
        }
    }

    #[test]
    fn valid_models_resolve_in_order() {
        let registry = StaticRegistry::new(vec![Attribute::new("n", "name", StorageType::Text)]);
        let mut a = with_delete("A", "PurgeA");
        a.attributes = vec!["n".into()];
        let resolved = validate_models(&[a, with_delete("B", "PurgeB")], &registry).unwrap();
        let names: Vec<_> = resolved.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(resolved[0].model.attributes, vec!["name"]);
    }
}

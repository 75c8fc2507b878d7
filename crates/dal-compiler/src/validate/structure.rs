//! Structure validation for models and their access methods.
//!
//! Runs on unresolved models: checks shape only, never touches the registry.

use std::collections::{HashMap, HashSet};

use crate::diagnostic::CompilerError;
use crate::model::{AccessMethod, FilterNode, LogicalOperator, Model};
use crate::naming::{is_go_identifier, to_go_exported};

/// Validates that model names are unique across a run.
pub fn validate_model_names(models: &[Model]) -> Result<(), CompilerError> {
    let mut seen = HashSet::new();
    for model in models {
        if !seen.insert(model.name.as_str()) {
            return Err(CompilerError::DuplicateModel {
                name: model.name.clone(),
            });
        }
    }
    Ok(())
}

/// Validates the access methods of one model.
pub fn validate_structure(model: &Model) -> Result<(), CompilerError> {
    if !is_go_identifier(&to_go_exported(&model.name)) {
        return Err(CompilerError::InvalidIdentifier {
            name: model.name.clone(),
            role: "a model".to_string(),
        }
        .in_model(&model.name));
    }

    let mut names = HashSet::new();

    for method in model.access.methods() {
        validate_method(method).map_err(|e| e.in_access_method(&model.name, method.name()))?;

        if !names.insert(method.name()) {
            return Err(CompilerError::DuplicateMethod {
                name: method.name().to_string(),
            }
            .in_model(&model.name));
        }
    }

    Ok(())
}

fn validate_method(method: AccessMethod<'_>) -> Result<(), CompilerError> {
    if method.name().trim().is_empty() {
        return Err(CompilerError::EmptyMethodName);
    }
    if !is_go_identifier(method.name()) {
        return Err(CompilerError::InvalidIdentifier {
            name: method.name().to_string(),
            role: "an access method".to_string(),
        });
    }
    validate_parameters(method)?;

    for filter in method.filters() {
        validate_filter(filter)?;
    }

    match method {
        AccessMethod::Update(config) => {
            if config.set.is_empty() && config.increment.is_empty() && config.timestamp.is_empty() {
                return Err(CompilerError::EmptySet);
            }
        }
        AccessMethod::Add(config) => {
            if config.values.is_empty() {
                return Err(CompilerError::EmptyValues);
            }
        }
        AccessMethod::AddOrReplace(config) => {
            if config.values.is_empty() {
                return Err(CompilerError::EmptyValues);
            }
        }
        AccessMethod::Find(_) | AccessMethod::Delete(_) => {}
    }

    Ok(())
}

/// Parameters become fields of one params struct, so distinct names must
/// stay distinct once exported.
fn validate_parameters(method: AccessMethod<'_>) -> Result<(), CompilerError> {
    let mut fields: HashMap<String, &str> = HashMap::new();
    for param in method.parameters() {
        let field = to_go_exported(param);
        if !is_go_identifier(&field) {
            return Err(CompilerError::InvalidIdentifier {
                name: param.to_string(),
                role: "a parameter".to_string(),
            });
        }
        match fields.insert(field.clone(), param) {
            Some(first) if first != param => {
                return Err(CompilerError::IdentifierCollision {
                    name: field,
                    first: format!("parameter '{}'", first),
                    second: format!("parameter '{}'", param),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// A NOT group must wrap exactly one child, at any depth.
fn validate_filter(filter: &FilterNode) -> Result<(), CompilerError> {
    if let FilterNode::Group(group) = filter {
        if group.operator == LogicalOperator::Not && group.filters.len() != 1 {
            return Err(CompilerError::NotGroupArity {
                children: group.filters.len(),
            });
        }
        for child in &group.filters {
            validate_filter(child)?;
        }
    }
    Ok(())
}

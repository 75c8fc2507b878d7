//! Attribute resolution: registry ids to column names.
//!
//! After resolution every attribute reference in the model (columns, indexes,
//! filters, SET/VALUES lists, conflict targets) holds a column name and the
//! SQL compiler can run without a registry.

use std::collections::HashMap;

use crate::diagnostic::CompilerError;
use crate::model::{
    AccessConfig, AddConfig, AddOrReplaceConfig, Assignment, Attribute, AttributeRegistry,
    DeleteConfig, FilterNode, FindConfig, Model, UpdateConfig,
};
use crate::naming::{is_go_identifier, to_go_exported};
use crate::sql::ddl::FIXED_COLUMNS;

/// A model whose attribute references are column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    /// The model, rewritten to column names.
    pub model: Model,

    /// Registry entries for the model's attributes, in column order.
    pub columns: Vec<Attribute>,
}

impl ResolvedModel {
    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn column(&self, name: &str) -> Option<&Attribute> {
        self.columns.iter().find(|c| c.name == name)
    }
}

struct Resolver<'r> {
    registry: &'r dyn AttributeRegistry,
}

impl Resolver<'_> {
    fn attribute(&self, id: &str) -> Result<&Attribute, CompilerError> {
        self.registry
            .lookup(id)
            .ok_or_else(|| CompilerError::UnknownAttribute {
                attribute: id.to_string(),
            })
    }

    /// Fixed columns resolve to themselves unless the registry defines the id.
    fn column(&self, id: &str) -> Result<String, CompilerError> {
        match self.registry.lookup(id) {
            Some(attribute) => Ok(attribute.name.clone()),
            None if FIXED_COLUMNS.contains(&id) => Ok(id.to_string()),
            None => Err(CompilerError::UnknownAttribute {
                attribute: id.to_string(),
            }),
        }
    }

    fn columns(&self, ids: &[String]) -> Result<Vec<String>, CompilerError> {
        ids.iter().map(|id| self.column(id)).collect()
    }

    fn filters(&self, filters: &[FilterNode]) -> Result<Vec<FilterNode>, CompilerError> {
        filters
            .iter()
            .map(|f| f.try_map_attributes(&mut |id: &str| self.column(id)))
            .collect()
    }

    fn assignments(&self, list: &[Assignment]) -> Result<Vec<Assignment>, CompilerError> {
        list.iter()
            .map(|a| Ok(Assignment::new(self.column(&a.attribute)?, a.parameter.clone())))
            .collect()
    }
}

/// Attribute columns sit next to the fixed columns in one table and one row
/// struct, so none may reuse a fixed column or an earlier field name.
fn validate_columns(columns: &[Attribute]) -> Result<(), CompilerError> {
    let mut fields: HashMap<String, &str> = FIXED_COLUMNS
        .iter()
        .map(|column| (to_go_exported(column), *column))
        .collect();

    for column in columns {
        let name = column.name.as_str();
        if FIXED_COLUMNS.contains(&name) {
            return Err(CompilerError::ReservedColumn {
                column: name.to_string(),
            });
        }

        let field = to_go_exported(name);
        if !is_go_identifier(&field) {
            return Err(CompilerError::InvalidIdentifier {
                name: name.to_string(),
                role: "a column".to_string(),
            });
        }
        if let Some(first) = fields.insert(field.clone(), name) {
            return Err(CompilerError::IdentifierCollision {
                name: field,
                first: format!("column '{}'", first),
                second: format!("column '{}'", name),
            });
        }
    }
    Ok(())
}

/// Resolves every attribute id in `model` against `registry`.
///
/// Find projections must name fixed columns or attributes the model declares,
/// since the generated row struct only has fields for those.
pub fn resolve_model(
    model: &Model,
    registry: &dyn AttributeRegistry,
) -> Result<ResolvedModel, CompilerError> {
    let resolver = Resolver { registry };

    let columns: Vec<Attribute> = model
        .attributes
        .iter()
        .map(|id| resolver.attribute(id).cloned())
        .collect::<Result<_, _>>()
        .map_err(|e| e.in_model(&model.name))?;
    validate_columns(&columns).map_err(|e| e.in_model(&model.name))?;

    let indexes = model
        .indexes
        .iter()
        .map(|index| resolver.columns(index))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.in_model(&model.name))?;

    let in_method = |name: &str| {
        let model = model.name.clone();
        let method = name.to_string();
        move |e: CompilerError| e.in_access_method(model, method)
    };

    let mut access = AccessConfig::default();

    for config in &model.access.find {
        let attributes = resolver.columns(&config.attributes).map_err(in_method(&config.name))?;
        if let Some(missing) = attributes
            .iter()
            .find(|a| !FIXED_COLUMNS.contains(&a.as_str()) && !columns.iter().any(|c| &c.name == *a))
        {
            return Err(CompilerError::AttributeNotInModel {
                attribute: missing.clone(),
            }
            .in_access_method(&model.name, &config.name));
        }
        access.find.push(FindConfig {
            name: config.name.clone(),
            attributes,
            filters: resolver.filters(&config.filters).map_err(in_method(&config.name))?,
        });
    }

    for config in &model.access.update {
        let resolve = || -> Result<UpdateConfig, CompilerError> {
            Ok(UpdateConfig {
                name: config.name.clone(),
                filters: resolver.filters(&config.filters)?,
                set: resolver.assignments(&config.set)?,
                increment: resolver.columns(&config.increment)?,
                timestamp: resolver.columns(&config.timestamp)?,
            })
        };
        access.update.push(resolve().map_err(in_method(&config.name))?);
    }

    for config in &model.access.add {
        access.add.push(AddConfig {
            name: config.name.clone(),
            values: resolver.assignments(&config.values).map_err(in_method(&config.name))?,
        });
    }

    for config in &model.access.add_or_replace {
        let resolve = || -> Result<AddOrReplaceConfig, CompilerError> {
            Ok(AddOrReplaceConfig {
                name: config.name.clone(),
                values: resolver.assignments(&config.values)?,
                conflict: resolver.columns(&config.conflict)?,
            })
        };
        access.add_or_replace.push(resolve().map_err(in_method(&config.name))?);
    }

    for config in &model.access.delete {
        access.delete.push(DeleteConfig {
            name: config.name.clone(),
            filters: resolver.filters(&config.filters).map_err(in_method(&config.name))?,
        });
    }

    Ok(ResolvedModel {
        model: Model {
            name: model.name.clone(),
            namespace: model.namespace.clone(),
            attributes: columns.iter().map(|c| c.name.clone()).collect(),
            indexes,
            access,
        },
        columns,
    })
}

//! Statement assembly for each access kind.
//!
//! Every function here expects attribute names already resolved to column
//! names (see [`crate::validate::resolve_model`]); they cannot fail.

use crate::diagnostic::CompileWarning;
use crate::model::{
    AccessKind, AccessMethod, AddConfig, AddOrReplaceConfig, DeleteConfig, FilterNode,
    FindConfig, Model, UpdateConfig,
};

use super::builder::{QueryBuilder, ID_COLUMN};
use super::dialect::Dialect;
use super::params::ParameterRef;

/// Tautology ANDed into every WHERE so an empty filter list stays valid.
const TAUTOLOGY: &str = "1=1";

/// A compiled statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Access method name; also the prepared-statement cache key.
    pub name: String,
    pub kind: AccessKind,
    pub sql: String,
    pub params: Vec<ParameterRef>,
    pub warnings: Vec<CompileWarning>,
}

impl Statement {
    fn from_builder(name: &str, kind: AccessKind, sql: String, builder: QueryBuilder<'_>) -> Self {
        let (params, warnings) = builder.finish();
        tracing::debug!(method = name, kind = %kind, %sql, params = params.len(), "compiled statement");
        Self {
            name: name.to_string(),
            kind,
            sql,
            params,
            warnings,
        }
    }
}

fn where_tail(builder: &mut QueryBuilder<'_>, filters: &[FilterNode]) -> String {
    let filter = builder.where_clause(filters);
    if filter.is_empty() {
        format!("WHERE {}", TAUTOLOGY)
    } else {
        format!("WHERE {} AND {}", TAUTOLOGY, filter)
    }
}

fn table_of(builder: &QueryBuilder<'_>, model: &Model) -> String {
    builder.table(model.namespace.as_deref(), &model.table_name())
}

/// `SELECT <columns | *> FROM <table> WHERE 1=1 [AND <filters>]`
pub fn compile_find(model: &Model, config: &FindConfig, dialect: &dyn Dialect) -> Statement {
    let mut builder = QueryBuilder::new(dialect);
    let table = table_of(&builder, model);

    let projection = if config.attributes.is_empty() {
        "*".to_string()
    } else {
        config
            .attributes
            .iter()
            .map(|a| builder.quote(a))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let tail = where_tail(&mut builder, &config.filters);
    let sql = format!("SELECT {} FROM {} {}", projection, table, tail);
    Statement::from_builder(&config.name, AccessKind::Find, sql, builder)
}

/// `UPDATE <table> SET <set> WHERE 1=1 [AND <filters>]`
///
/// SET placeholders come first, WHERE placeholders continue the numbering.
pub fn compile_update(model: &Model, config: &UpdateConfig, dialect: &dyn Dialect) -> Statement {
    let mut builder = QueryBuilder::new(dialect);
    let table = table_of(&builder, model);
    let set = builder.set_clause(&config.set, &config.increment, &config.timestamp);
    let tail = where_tail(&mut builder, &config.filters);

    let sql = format!("UPDATE {} SET {} {}", table, set, tail);
    Statement::from_builder(&config.name, AccessKind::Update, sql, builder)
}

/// `INSERT INTO <table> (<columns>) VALUES (<placeholders>) RETURNING id`
pub fn compile_add(model: &Model, config: &AddConfig, dialect: &dyn Dialect) -> Statement {
    let mut builder = QueryBuilder::new(dialect);
    let table = table_of(&builder, model);
    let values = builder.values_clause(&config.values);

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        values.columns.join(", "),
        values.placeholders.join(", "),
        builder.quote(ID_COLUMN),
    );
    Statement::from_builder(&config.name, AccessKind::Add, sql, builder)
}

/// `INSERT ... ON CONFLICT (<target>) DO UPDATE SET ... RETURNING id, <inserted flag> AS inserted`
///
/// The update branch re-binds every value parameter at fresh placeholders.
pub fn compile_add_or_replace(
    model: &Model,
    config: &AddOrReplaceConfig,
    dialect: &dyn Dialect,
) -> Statement {
    let mut builder = QueryBuilder::new(dialect);
    let table = table_of(&builder, model);
    let values = builder.values_clause(&config.values);

    let target = config
        .conflict_target()
        .iter()
        .map(|a| builder.quote(a))
        .collect::<Vec<_>>()
        .join(", ");

    let set = builder.set_clause(&config.values, &[], &[]);

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {} RETURNING {}, {} AS inserted",
        table,
        values.columns.join(", "),
        values.placeholders.join(", "),
        target,
        set,
        builder.quote(ID_COLUMN),
        dialect.inserted_flag(),
    );
    Statement::from_builder(&config.name, AccessKind::AddOrReplace, sql, builder)
}

/// `DELETE FROM <table> WHERE 1=1 [AND <filters>]`
pub fn compile_delete(model: &Model, config: &DeleteConfig, dialect: &dyn Dialect) -> Statement {
    let mut builder = QueryBuilder::new(dialect);
    let table = table_of(&builder, model);
    let tail = where_tail(&mut builder, &config.filters);

    let sql = format!("DELETE FROM {} {}", table, tail);
    Statement::from_builder(&config.name, AccessKind::Delete, sql, builder)
}

/// Compiles any access method.
pub fn compile_method(model: &Model, method: AccessMethod<'_>, dialect: &dyn Dialect) -> Statement {
    match method {
        AccessMethod::Find(c) => compile_find(model, c, dialect),
        AccessMethod::Update(c) => compile_update(model, c, dialect),
        AccessMethod::Add(c) => compile_add(model, c, dialect),
        AccessMethod::AddOrReplace(c) => compile_add_or_replace(model, c, dialect),
        AccessMethod::Delete(c) => compile_delete(model, c, dialect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, Operator};
    use crate::sql::{Postgres, Sqlite, ID_GENERATOR};

    fn product() -> Model {
        Model::new("Product")
    }

    #[test]
    fn find_without_filters_is_tautology_only() {
        let stmt = compile_find(
            &product(),
            &FindConfig { name: "All".into(), ..Default::default() },
            &Postgres,
        );
        assert_eq!(stmt.sql, "SELECT * FROM product WHERE 1=1");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn find_with_projection_and_filters() {
        let config = FindConfig {
            name: "FindAdults".into(),
            attributes: vec!["name".into(), "age".into()],
            filters: vec![
                FilterNode::leaf("age", Operator::Ge, "age"),
                FilterNode::leaf("status", Operator::In, "status"),
            ],
        };
        let stmt = compile_find(&Model::new("User"), &config, &Postgres);
        assert_eq!(
            stmt.sql,
            "SELECT name, age FROM \"user\" WHERE 1=1 AND (age >= $1 AND status = ANY($2))"
        );
        assert_eq!(stmt.kind, AccessKind::Find);
    }

    #[test]
    fn namespaced_table_is_qualified() {
        let mut model = product();
        model.namespace = Some("catalog".into());
        let stmt = compile_delete(
            &model,
            &DeleteConfig {
                name: "DeleteBySku".into(),
                filters: vec![FilterNode::leaf("sku", Operator::Eq, "sku")],
            },
            &Postgres,
        );
        assert_eq!(stmt.sql, "DELETE FROM catalog.product WHERE 1=1 AND sku = $1");
    }

    #[test]
    fn update_numbers_set_before_where() {
        let config = UpdateConfig {
            name: "Reprice".into(),
            filters: vec![FilterNode::leaf("sku", Operator::Eq, "sku")],
            set: vec![Assignment::new("price", "price")],
            increment: vec!["version".into()],
            timestamp: vec!["updated_at".into()],
        };
        let stmt = compile_update(&product(), &config, &Postgres);
        assert_eq!(
            stmt.sql,
            "UPDATE product SET price = $1, version = version + 1, updated_at = NOW() WHERE 1=1 AND sku = $2"
        );
        assert_eq!(stmt.params, vec![ParameterRef::named("price"), ParameterRef::named("sku")]);
    }

    #[test]
    fn add_returns_generated_id() {
        let config = AddConfig {
            name: "Create".into(),
            values: vec![Assignment::new("sku", "sku")],
        };
        let stmt = compile_add(&product(), &config, &Postgres);
        assert_eq!(stmt.sql, "INSERT INTO product (id, sku) VALUES ($1, $2) RETURNING id");
        assert_eq!(stmt.params[0], ParameterRef::generated(ID_GENERATOR));
    }

    #[test]
    fn add_or_replace_rebinds_values() {
        let config = AddOrReplaceConfig {
            name: "Upsert".into(),
            values: vec![Assignment::new("sku", "p1"), Assignment::new("price", "p2")],
            conflict: vec![],
        };
        let stmt = compile_add_or_replace(&product(), &config, &Postgres);

        assert_eq!(
            stmt.sql,
            "INSERT INTO product (id, sku, price) VALUES ($1, $2, $3) \
             ON CONFLICT (sku) DO UPDATE SET sku = $4, price = $5 \
             RETURNING id, (xmax = 0) AS inserted"
        );
        let bound: Vec<_> = stmt.params.iter().filter(|p| !p.is_generated()).collect();
        assert_eq!(bound.len(), 4);
        assert_eq!(
            stmt.params,
            vec![
                ParameterRef::generated(ID_GENERATOR),
                ParameterRef::named("p1"),
                ParameterRef::named("p2"),
                ParameterRef::named("p1"),
                ParameterRef::named("p2"),
            ]
        );
    }

    #[test]
    fn sqlite_statements_use_question_marks() {
        let config = UpdateConfig {
            name: "Touch".into(),
            filters: vec![],
            set: vec![],
            increment: vec![],
            timestamp: vec!["seen_at".into()],
        };
        let stmt = compile_update(&product(), &config, &Sqlite);
        assert_eq!(stmt.sql, "UPDATE product SET seen_at = CURRENT_TIMESTAMP WHERE 1=1");
    }

    #[test]
    fn compile_method_dispatches_on_kind() {
        let config = DeleteConfig { name: "Purge".into(), filters: vec![] };
        let stmt = compile_method(&product(), AccessMethod::Delete(&config), &Postgres);
        assert_eq!(stmt.kind, AccessKind::Delete);
        assert_eq!(stmt.sql, "DELETE FROM product WHERE 1=1");
    }
}

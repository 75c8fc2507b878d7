//! Schema generation: CREATE TABLE and CREATE INDEX statements.

use std::collections::BTreeSet;

use crate::model::StorageType;

use super::builder::ID_COLUMN;
use super::dialect::Dialect;

/// Optimistic-locking counter present on every table.
pub const VERSION_COLUMN: &str = "version";

/// Last-modification timestamp present on every table.
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// Columns every generated table starts with, in order.
pub const FIXED_COLUMNS: [&str; 3] = [ID_COLUMN, VERSION_COLUMN, UPDATED_AT_COLUMN];

/// Column definition for a generated table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,

    pub storage_type: StorageType,

    /// Whether the column is NOT NULL.
    pub required: bool,
}

/// Index definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    /// Columns in the index.
    pub columns: Vec<String>,

    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

impl IndexDef {
    pub fn on(columns: Vec<String>) -> Self {
        Self { columns, unique: false }
    }

    pub fn unique(columns: Vec<String>) -> Self {
        Self { columns, unique: true }
    }
}

/// Everything needed to emit the schema of one model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    pub namespace: Option<String>,
    pub name: String,

    /// Attribute columns, after the three fixed columns.
    pub columns: Vec<ColumnDef>,

    pub indexes: Vec<IndexDef>,
}

impl TableSchema {
    fn qualified(&self, dialect: &dyn Dialect) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", dialect.quote_identifier(ns), dialect.quote_identifier(&self.name)),
            None => dialect.quote_identifier(&self.name),
        }
    }
}

/// Generates the CREATE TABLE statement.
///
/// `id`, `version` and `updated_at` always come first, then attribute columns in order.
pub fn create_table(schema: &TableSchema, dialect: &dyn Dialect) -> String {
    let mut lines = vec![
        format!(
            "    {} {} PRIMARY KEY",
            dialect.quote_identifier(ID_COLUMN),
            dialect.storage_type(StorageType::Uuid)
        ),
        format!(
            "    {} {} NOT NULL DEFAULT 1",
            dialect.quote_identifier(VERSION_COLUMN),
            dialect.storage_type(StorageType::Bigint)
        ),
        format!(
            "    {} {} NOT NULL DEFAULT {}",
            dialect.quote_identifier(UPDATED_AT_COLUMN),
            dialect.storage_type(StorageType::Timestamp),
            dialect.now()
        ),
    ];

    for col in &schema.columns {
        let nullable = if col.required { " NOT NULL" } else { "" };
        lines.push(format!(
            "    {} {}{}",
            dialect.quote_identifier(&col.name),
            dialect.storage_type(col.storage_type),
            nullable
        ));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);\n",
        schema.qualified(dialect),
        lines.join(",\n")
    )
}

/// Generates deduplicated CREATE INDEX statements, ordered by their text.
pub fn create_indexes(schema: &TableSchema, dialect: &dyn Dialect) -> Vec<String> {
    let table = schema.qualified(dialect);
    let statements: BTreeSet<String> = schema
        .indexes
        .iter()
        .filter(|idx| !idx.columns.is_empty())
        .map(|idx| {
            let (keyword, suffix) = if idx.unique { ("UNIQUE INDEX", "key") } else { ("INDEX", "idx") };
            let index_name = format!("{}_{}_{}", schema.name, idx.columns.join("_"), suffix);
            let columns = idx
                .columns
                .iter()
                .map(|c| dialect.quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "CREATE {} IF NOT EXISTS {} ON {} ({});",
                keyword,
                dialect.quote_identifier(&index_name),
                table,
                columns
            )
        })
        .collect();
    statements.into_iter().collect()
}

/// Generates the full schema for one table.
pub fn generate_schema(schema: &TableSchema, dialect: &dyn Dialect) -> String {
    let mut sql = String::new();
    sql.push_str(&create_table(schema, dialect));

    let indexes = create_indexes(schema, dialect);
    if !indexes.is_empty() {
        sql.push('\n');
        for idx in indexes {
            sql.push_str(&idx);
            sql.push('\n');
        }
    }

    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{Postgres, Sqlite};
    use pretty_assertions::assert_eq;

    fn product_schema() -> TableSchema {
        TableSchema {
            namespace: None,
            name: "product".into(),
            columns: vec![
                ColumnDef { name: "sku".into(), storage_type: StorageType::Text, required: true },
                ColumnDef { name: "price".into(), storage_type: StorageType::Float, required: false },
            ],
            indexes: vec![
                IndexDef::on(vec!["sku".into()]),
                IndexDef::on(vec!["price".into()]),
                IndexDef::on(vec!["sku".into()]),
                IndexDef::unique(vec!["sku".into()]),
            ],
        }
    }

    #[test]
    fn create_table_has_fixed_columns_first() {
        assert_eq!(
            create_table(&product_schema(), &Postgres),
            "CREATE TABLE IF NOT EXISTS product (\n\
             \x20   id UUID PRIMARY KEY,\n\
             \x20   version BIGINT NOT NULL DEFAULT 1,\n\
             \x20   updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),\n\
             \x20   sku TEXT NOT NULL,\n\
             \x20   price DOUBLE PRECISION\n\
             );\n"
        );
    }

    #[test]
    fn indexes_are_deduplicated_and_sorted() {
        assert_eq!(
            create_indexes(&product_schema(), &Postgres),
            vec![
                "CREATE INDEX IF NOT EXISTS product_price_idx ON product (price);",
                "CREATE INDEX IF NOT EXISTS product_sku_idx ON product (sku);",
                "CREATE UNIQUE INDEX IF NOT EXISTS product_sku_key ON product (sku);",
            ]
        );
    }

    #[test]
    fn sqlite_types_and_namespace() {
        let mut schema = product_schema();
        schema.namespace = Some("main".into());
        schema.indexes.clear();

        let sql = generate_schema(&schema, &Sqlite);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS main.product (\n    id TEXT PRIMARY KEY,"));
        assert!(sql.contains("updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP"));
        assert!(sql.contains("price REAL\n"));
        assert!(!sql.contains("INDEX"));
    }
}

//! SQL dialects.
//!
//! A dialect is a stateless capability object. Placeholder numbering is not
//! kept here: every statement build owns its own counter in
//! [`QueryBuilder`](super::QueryBuilder), so one dialect value can be shared
//! freely across threads and statements.

use std::fmt;

use crate::diagnostic::CompilerError;
use crate::model::StorageType;

/// Words that must be quoted when used as identifiers.
const RESERVED_WORDS: &[&str] = &[
    "all", "and", "any", "as", "asc", "between", "by", "case", "check", "column",
    "constraint", "create", "default", "delete", "desc", "distinct", "else", "end",
    "exists", "false", "from", "group", "having", "in", "index", "insert", "into",
    "is", "join", "key", "like", "limit", "not", "null", "offset", "on", "or",
    "order", "primary", "references", "select", "set", "table", "then", "to",
    "true", "union", "unique", "update", "user", "using", "values", "when", "where",
    "with",
];

/// Quotes `ident` with double quotes unless it is a plain lowercase identifier
/// that is not a reserved word.
pub fn quote_if_needed(ident: &str) -> String {
    let plain = ident
        .chars()
        .next()
        .map(|c| c.is_ascii_lowercase() || c == '_')
        .unwrap_or(false)
        && ident
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if plain && !RESERVED_WORDS.contains(&ident) {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

/// A pluggable SQL flavor.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Returns the dialect name (e.g., "postgres").
    fn name(&self) -> &'static str;

    /// Quotes a single identifier (column, table, schema or index name).
    fn quote_identifier(&self, ident: &str) -> String {
        quote_if_needed(ident)
    }

    /// Renders the placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Index of the first placeholder of a statement.
    fn placeholder_origin(&self) -> usize {
        1
    }

    /// Column type for a storage type.
    fn storage_type(&self, storage: StorageType) -> &'static str;

    /// Expression for the current timestamp.
    fn now(&self) -> &'static str;

    /// Membership test of `attribute` in the array-valued `placeholder`.
    fn membership(&self, attribute: &str, placeholder: &str) -> String;

    /// Boolean expression, valid in an upsert's RETURNING list, that is true
    /// when the row was inserted rather than updated.
    fn inserted_flag(&self) -> &'static str;
}

/// PostgreSQL: `$n` placeholders, arrays bound with `= ANY($n)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn storage_type(&self, storage: StorageType) -> &'static str {
        match storage {
            StorageType::Text => "TEXT",
            StorageType::Int => "INTEGER",
            StorageType::Bigint => "BIGINT",
            StorageType::Float => "DOUBLE PRECISION",
            StorageType::Bool => "BOOLEAN",
            StorageType::Timestamp => "TIMESTAMPTZ",
            StorageType::Uuid => "UUID",
            StorageType::Json => "JSONB",
        }
    }

    fn now(&self) -> &'static str {
        "NOW()"
    }

    fn membership(&self, attribute: &str, placeholder: &str) -> String {
        format!("{} = ANY({})", attribute, placeholder)
    }

    fn inserted_flag(&self) -> &'static str {
        "(xmax = 0)"
    }
}

/// SQLite: `?` placeholders, arrays bound as JSON text and expanded with `json_each`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn storage_type(&self, storage: StorageType) -> &'static str {
        match storage {
            StorageType::Text | StorageType::Uuid | StorageType::Json => "TEXT",
            StorageType::Int | StorageType::Bigint | StorageType::Bool => "INTEGER",
            StorageType::Float => "REAL",
            StorageType::Timestamp => "TIMESTAMP",
        }
    }

    fn now(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }

    fn membership(&self, attribute: &str, placeholder: &str) -> String {
        format!("{} IN (SELECT value FROM json_each({}))", attribute, placeholder)
    }

    // The upsert's UPDATE branch leaves last_insert_rowid() untouched, so the
    // row ids only match for a fresh insert.
    fn inserted_flag(&self) -> &'static str {
        "(rowid = last_insert_rowid())"
    }
}

/// Creates a dialect by name.
pub fn dialect_for(name: &str) -> Result<Box<dyn Dialect>, CompilerError> {
    match name.to_lowercase().as_str() {
        "postgres" | "postgresql" | "pg" => Ok(Box::new(Postgres)),
        "sqlite" | "sqlite3" => Ok(Box::new(Sqlite)),
        _ => Err(CompilerError::UnsupportedDialect {
            dialect: name.to_string(),
        }),
    }
}

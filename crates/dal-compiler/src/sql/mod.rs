//! Filter/query compiler.
//!
//! Turns filter trees, SET lists and VALUES lists into dialect-specific,
//! parameterized SQL plus an ordered parameter plan. Compilation is pure and
//! infallible; the only state is the placeholder counter owned by each
//! [`QueryBuilder`].

mod builder;
pub mod ddl;
mod dialect;
mod params;
mod statement;

pub use builder::{compile_set, compile_values, compile_where, Clause, QueryBuilder, ValuesClause, ID_COLUMN};
pub use dialect::{dialect_for, quote_if_needed, Dialect, Postgres, Sqlite};
pub use params::{distinct_names, ParameterRef, ID_GENERATOR, WHOLE_VALUE};
pub use statement::{
    compile_add, compile_add_or_replace, compile_delete, compile_find, compile_method,
    compile_update, Statement,
};

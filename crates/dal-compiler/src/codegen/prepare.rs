//! Statement constants and the per-model prepare routine.

use crate::diagnostic::CompilerError;
use crate::ir::{Call, Element, ErrorHandler, FuncDecl, Node, TypeRef, ValueSpec};
use crate::naming::to_camel_case;
use crate::sql::Statement;

use super::go_types::{context, sql_db, statement_map};

/// Name of the package-level const holding a statement's SQL.
pub fn query_const_name(method: &str) -> String {
    format!("{}Query", to_camel_case(method))
}

/// Name of the ordered (method, SQL) list of a model.
pub fn statements_var_name(model: &str) -> String {
    format!("{}Statements", to_camel_case(model))
}

pub fn prepare_fn_name(model: &str) -> String {
    format!("Prepare{}Statements", model)
}

/// One const per statement, in method order.
pub fn query_consts(statements: &[Statement]) -> Vec<ValueSpec> {
    statements
        .iter()
        .map(|s| ValueSpec::new(query_const_name(&s.name), Node::raw_str(&s.sql)))
        .collect()
}

/// `var fooStatements = [][2]string{{"Method", methodQuery}, ...}`
pub fn statements_var(model: &str, statements: &[Statement]) -> ValueSpec {
    let entries = statements
        .iter()
        .map(|s| {
            Element::positional(Node::composite(
                None,
                vec![
                    Element::positional(Node::str(&s.name)),
                    Element::positional(Node::ident(query_const_name(&s.name))),
                ],
            ))
        })
        .collect();

    ValueSpec::new(
        statements_var_name(model),
        Node::composite_block(Some(TypeRef::builtin("[][2]string")), entries),
    )
}

/// Prepares every statement of a model; the first failure aborts.
pub fn prepare_function(model: &str) -> Result<FuncDecl, CompilerError> {
    let list = statements_var_name(model);

    let loop_body = vec![
        Call::method(Node::ident("db"), "PrepareContext")
            .arg(Node::ident("ctx"))
            .arg(Node::ident("entry[1]"))
            .builder()
            .define(["stmt", "err"])
            .on_error(ErrorHandler::err(vec![Node::nil()]))
            .build()?,
        Node::ident("stmt").builder().assign_to(["stmts[entry[0]]"]).build()?,
    ];

    let body = vec![
        Call::function("make")
            .arg(Node::ident(statement_map().name()))
            .arg(Call::function("len").arg(Node::ident(&list)).node())
            .builder()
            .define(["stmts"])
            .build()?,
        Node::range(None, Some("entry"), Node::ident(&list), loop_body),
        Node::ret(vec![Node::ident("stmts"), Node::nil()]),
    ];

    Ok(FuncDecl::new(prepare_fn_name(model))
        .doc(format!(
            "{} prepares every {} statement, keyed by access method name.",
            prepare_fn_name(model),
            model
        ))
        .param("ctx", context())
        .param("db", sql_db())
        .returns(statement_map())
        .returns(TypeRef::error())
        .body(body))
}

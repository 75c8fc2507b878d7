//! Access functions: one Go function per access method.

use crate::diagnostic::CompilerError;
use crate::ir::{Call, CleanupHandler, ErrorHandler, FuncDecl, Node, StructDecl, TypeRef, UnaryOp};
use crate::model::AccessKind;
use crate::naming::to_go_exported;
use crate::sql::Statement;

use super::go_types::{context, statement_map};
use super::params::request_struct_name;

/// Sentinel error in the shared helper file.
pub const ERR_NOT_PREPARED: &str = "ErrStatementNotPrepared";

/// Zero values returned alongside an error, one per non-error return slot.
fn zeros(kind: AccessKind) -> Vec<Node> {
    match kind {
        AccessKind::Find => vec![Node::nil()],
        AccessKind::Update | AccessKind::Delete => vec![Node::int(0)],
        AccessKind::Add => vec![Node::str("")],
        AccessKind::AddOrReplace => vec![Node::str(""), Node::bool(false)],
    }
}

fn on_err(kind: AccessKind) -> ErrorHandler {
    ErrorHandler::err(zeros(kind))
}

fn returns(kind: AccessKind, row_type: &str) -> Vec<TypeRef> {
    let mut types = match kind {
        AccessKind::Find => vec![TypeRef::builtin(format!("[]*{}", row_type))],
        AccessKind::Update | AccessKind::Delete => vec![TypeRef::builtin("int64")],
        AccessKind::Add => vec![TypeRef::builtin("string")],
        AccessKind::AddOrReplace => vec![TypeRef::builtin("string"), TypeRef::builtin("bool")],
    };
    types.push(TypeRef::error());
    types
}

/// `&item.Field` for every column a find scans.
fn scan_targets(columns: &[String]) -> Vec<Node> {
    columns
        .iter()
        .map(|c| Node::unary(UnaryOp::AddressOf, Node::ident(format!("item.{}", to_go_exported(c)))))
        .collect()
}

/// Synthesizes the access function for `statement`.
///
/// `row` is the model struct; `scan_columns` lists, in SELECT order, the
/// columns a find reads into it.
pub fn access_function(
    statement: &Statement,
    row: &StructDecl,
    scan_columns: &[String],
) -> Result<FuncDecl, CompilerError> {
    let kind = statement.kind;

    let mut body = vec![
        Call::method(Node::ident("req"), "Args")
            .builder()
            .define(["args", "err"])
            .on_error(on_err(kind))
            .build()?,
        Node::index(Node::ident("stmts"), Node::str(&statement.name))
            .builder()
            .define(["stmt", "ok"])
            .build()?,
        Node::if_then(
            Node::unary(UnaryOp::Not, Node::ident("ok")),
            vec![Node::ret(
                zeros(kind)
                    .into_iter()
                    .chain(std::iter::once(Node::ident(ERR_NOT_PREPARED)))
                    .collect(),
            )],
        ),
    ];

    body.extend(match kind {
        AccessKind::Find => query_rows(&row.name, scan_columns)?,
        AccessKind::Update | AccessKind::Delete => exec()?,
        AccessKind::Add => query_row(&["id"])?,
        AccessKind::AddOrReplace => query_row(&["id", "inserted"])?,
    });

    let func = FuncDecl::new(&statement.name)
        .doc(format!("{} runs the prepared {} statement.", statement.name, kind))
        .param("ctx", context())
        .param("stmts", statement_map())
        .param("req", TypeRef::builtin(format!("*{}", request_struct_name(&statement.name))));

    Ok(returns(kind, &row.name)
        .into_iter()
        .fold(func, FuncDecl::returns)
        .body(body))
}

fn query_call(method: &str) -> Call {
    Call::method(Node::ident("stmt"), method)
        .arg(Node::ident("ctx"))
        .arg(Node::ident("args"))
        .spread()
}

/// Iterates the result set into a slice of row structs.
fn query_rows(row_type: &str, columns: &[String]) -> Result<Vec<Node>, CompilerError> {
    let kind = AccessKind::Find;
    let loop_body = vec![
        Node::address_of(Node::composite(Some(TypeRef::builtin(row_type)), vec![]))
            .builder()
            .define(["item"])
            .build()?,
        Call::method(Node::ident("rows"), "Scan")
            .args(scan_targets(columns))
            .builder()
            .assign_to(["err"])
            .on_error(on_err(kind))
            .build()?,
        Call::function("append")
            .arg(Node::ident("items"))
            .arg(Node::ident("item"))
            .builder()
            .assign_to(["items"])
            .build()?,
    ];

    Ok(vec![
        query_call("QueryContext")
            .builder()
            .define(["rows", "err"])
            .on_error(on_err(kind))
            .cleanup(CleanupHandler::method("rows", "Close"))
            .build()?,
        Node::declare("items", TypeRef::builtin(format!("[]*{}", row_type))),
        Node::while_loop(Call::method(Node::ident("rows"), "Next").node(), loop_body),
        Call::method(Node::ident("rows"), "Err")
            .builder()
            .assign_to(["err"])
            .on_error(on_err(kind))
            .build()?,
        Node::ret(vec![Node::ident("items"), Node::nil()]),
    ])
}

/// Executes and reports the affected row count.
fn exec() -> Result<Vec<Node>, CompilerError> {
    Ok(vec![
        query_call("ExecContext")
            .builder()
            .define(["result", "err"])
            .on_error(ErrorHandler::err(vec![Node::int(0)]))
            .build()?,
        Node::ret(vec![Call::method(Node::ident("result"), "RowsAffected").node()]),
    ])
}

/// Scans a single returned row into local variables and returns them.
fn query_row(targets: &[&str]) -> Result<Vec<Node>, CompilerError> {
    let kind = if targets.len() > 1 { AccessKind::AddOrReplace } else { AccessKind::Add };

    let mut nodes: Vec<Node> = targets
        .iter()
        .map(|t| {
            let ty = if *t == "inserted" { "bool" } else { "string" };
            Node::declare(*t, TypeRef::builtin(ty))
        })
        .collect();

    nodes.push(
        Call::method(query_call("QueryRowContext").node(), "Scan")
            .args(targets.iter().map(|t| Node::address_of(Node::ident(*t))))
            .builder()
            .assign_to(["err"])
            .on_error(on_err(kind))
            .build()?,
    );

    nodes.push(Node::ret(
        targets
            .iter()
            .map(|t| Node::ident(*t))
            .chain(std::iter::once(Node::nil()))
            .collect(),
    ));
    Ok(nodes)
}

//! Parameter and request structs, and the `Args` method that turns a
//! request into positional bind values.

use crate::diagnostic::CompilerError;
use crate::ir::{Call, ErrorHandler, Field, FuncDecl, Node, StructDecl, TypeRef};
use crate::naming::to_go_exported;
use crate::sql::{distinct_names, ParameterRef, Statement, WHOLE_VALUE};

use super::go_types::generator_import;

/// Helper in the shared file that extracts one end of a range value.
pub const RANGE_BOUND_FN: &str = "rangeBound";

/// Name of the caller-facing parameter struct for a method.
pub fn params_struct_name(method: &str) -> String {
    format!("{}Params", method)
}

/// Name of the request struct for a method.
pub fn request_struct_name(method: &str) -> String {
    format!("{}Request", method)
}

/// One `any` field per distinct caller parameter, in first-appearance order.
pub fn params_struct(statement: &Statement) -> StructDecl {
    let name = params_struct_name(&statement.name);
    distinct_names(&statement.params).into_iter().fold(
        StructDecl::new(&name).doc(format!("{} holds the caller-supplied values of {}.", name, statement.name)),
        |decl, param| decl.field(Field::new(to_go_exported(&param), TypeRef::any())),
    )
}

/// The request struct and its `Args` method.
pub fn request_struct(statement: &Statement) -> Result<StructDecl, CompilerError> {
    let name = request_struct_name(&statement.name);
    Ok(StructDecl::new(&name)
        .doc(format!("{} is the input of {}.", name, statement.name))
        .field(Field::new("Params", TypeRef::builtin(params_struct_name(&statement.name))))
        .method(args_method(statement)?))
}

/// `func (r *XRequest) Args() ([]any, error)`: one append per placeholder.
fn args_method(statement: &Statement) -> Result<FuncDecl, CompilerError> {
    let mut body = vec![Call::function("make")
        .arg(Node::ident("[]any"))
        .arg(Node::int(0))
        .arg(Node::int(statement.params.len() as i64))
        .builder()
        .define(["args"])
        .build()?];

    for (position, param) in statement.params.iter().enumerate() {
        let value = match param {
            ParameterRef::Named { name, index } if *index == WHOLE_VALUE => {
                Node::ident(format!("r.Params.{}", to_go_exported(name)))
            }
            ParameterRef::Named { name, index } => {
                let bound = format!("bound{}", position + 1);
                body.push(
                    Call::function(RANGE_BOUND_FN)
                        .arg(Node::ident(format!("r.Params.{}", to_go_exported(name))))
                        .arg(Node::int(i64::from(*index)))
                        .builder()
                        .define([bound.as_str(), "err"])
                        .on_error(ErrorHandler::err(vec![Node::nil()]))
                        .build()?,
                );
                Node::ident(bound)
            }
            ParameterRef::Generated { function, args } => {
                let mut call = Call::function(function).args(args.iter().map(Node::ident));
                if let Some(import) = generator_import(function) {
                    call = call.import(import);
                }
                call.node()
            }
        };

        body.push(
            Call::function("append")
                .arg(Node::ident("args"))
                .arg(value)
                .builder()
                .assign_to(["args"])
                .build()?,
        );
    }

    body.push(Node::ret(vec![Node::ident("args"), Node::nil()]));

    Ok(FuncDecl::new("Args")
        .doc("Args returns the bind values in placeholder order.")
        .receiver("r", request_struct_name(&statement.name))
        .returns(TypeRef::builtin("[]any"))
        .returns(TypeRef::error())
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Render;
    use crate::model::AccessKind;
    use crate::sql::ID_GENERATOR;
    use pretty_assertions::assert_eq;

    fn statement(params: Vec<ParameterRef>) -> Statement {
        Statement {
            name: "FindInRange".into(),
            kind: AccessKind::Find,
            sql: String::new(),
            params,
            warnings: vec![],
        }
    }

    #[test]
    fn params_struct_has_distinct_fields() {
        let stmt = statement(vec![
            ParameterRef::named("owner_id"),
            ParameterRef::element("window", 0),
            ParameterRef::element("window", 1),
            ParameterRef::named("owner_id"),
        ]);
        let fields: Vec<_> = params_struct(&stmt).fields.into_iter().map(|f| f.name).collect();
        assert_eq!(fields, vec!["OwnerID", "Window"]);
    }

    #[test]
    fn args_reads_whole_values_ranges_and_generators() {
        let stmt = statement(vec![
            ParameterRef::generated(ID_GENERATOR),
            ParameterRef::named("sku"),
            ParameterRef::element("window", 0),
        ]);
        let decl = request_struct(&stmt).unwrap();

        assert_eq!(
            decl.render(),
            "// FindInRangeRequest is the input of FindInRange.\n\
             type FindInRangeRequest struct {\n\
             \tParams FindInRangeParams\n\
             }\n\n\
             // Args returns the bind values in placeholder order.\n\
             func (r *FindInRangeRequest) Args() ([]any, error) {\n\
             \targs := make([]any, 0, 3)\n\
             \targs = append(args, uuid.NewString())\n\
             \targs = append(args, r.Params.Sku)\n\
             \tbound3, err := rangeBound(r.Params.Window, 0)\n\
             \tif err != nil {\n\
             \t\treturn nil, err\n\
             \t}\n\
             \targs = append(args, bound3)\n\
             \treturn args, nil\n\
             }"
        );
        assert!(decl.imports().contains("github.com/google/uuid"));
    }
}

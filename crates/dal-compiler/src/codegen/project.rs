//! Project files around the per-model units: shared helpers, `go.mod` and
//! `schema.sql`.

use crate::diagnostic::CompilerError;
use crate::ir::{
    BinaryOp, Call, Dependency, FuncDecl, Import, Node, SourceFile, TypeRef,
    ValueSpec, GENERATED_MARKER,
};
use crate::model::{FilterLeaf, FilterNode};
use crate::sql::ddl::{generate_schema, ColumnDef, IndexDef, TableSchema};
use crate::sql::{Dialect, ID_COLUMN};
use crate::validate::ResolvedModel;

use super::access::ERR_NOT_PREPARED;
use super::params::RANGE_BOUND_FN;

/// Go language version written to `go.mod`.
pub const GO_VERSION: &str = "1.22";

/// Name of the shared helper file.
pub const HELPERS_FILE: &str = "dalgen.go";

pub const SCHEMA_FILE: &str = "schema.sql";

pub const GO_MOD_FILE: &str = "go.mod";

/// Builds the shared helper file every unit relies on.
pub fn helpers_file(package: &str) -> Result<SourceFile, CompilerError> {
    let mut file = SourceFile::new(package);

    file.var(
        ValueSpec::new(
            ERR_NOT_PREPARED,
            Call::function("errors.New")
                .arg(Node::str("dalgen: statement not prepared"))
                .import(Import::std("errors"))
                .node(),
        )
        .doc(format!(
            "{} is returned when an access function runs before its statement was prepared.",
            ERR_NOT_PREPARED
        )),
    );

    file.func(range_bound()?);
    Ok(file)
}

/// `rangeBound(value any, i int) (any, error)`: element `i` of a two-element
/// slice or array.
fn range_bound() -> Result<FuncDecl, CompilerError> {
    let errorf = |format: &str, arg: Node| {
        Node::ret(vec![
            Node::nil(),
            Call::function("fmt.Errorf")
                .arg(Node::str(format))
                .arg(arg)
                .import(Import::std("fmt"))
                .node(),
        ])
    };
    let kind = || Call::method(Node::ident("v"), "Kind").node();
    let len = || Call::method(Node::ident("v"), "Len").node();

    let body = vec![
        Call::function("reflect.ValueOf")
            .arg(Node::ident("value"))
            .import(Import::std("reflect"))
            .builder()
            .define(["v"])
            .build()?,
        Node::if_then(
            Node::binary(
                BinaryOp::And,
                Node::binary(BinaryOp::Ne, kind(), Node::ident("reflect.Slice")),
                Node::binary(BinaryOp::Ne, kind(), Node::ident("reflect.Array")),
            ),
            vec![errorf("dalgen: range parameter must be a slice or array, got %T", Node::ident("value"))],
        ),
        Node::if_then(
            Node::binary(BinaryOp::Ne, len(), Node::int(2)),
            vec![errorf("dalgen: range parameter must have 2 elements, got %d", len())],
        ),
        Node::ret(vec![
            Call::method(Call::method(Node::ident("v"), "Index").arg(Node::ident("i")).node(), "Interface")
                .node(),
            Node::nil(),
        ]),
    ];

    Ok(FuncDecl::new(RANGE_BOUND_FN)
        .doc(format!("{} returns element i of a two-element range value.", RANGE_BOUND_FN))
        .param("value", TypeRef::any())
        .param("i", TypeRef::builtin("int"))
        .returns(TypeRef::any())
        .returns(TypeRef::error())
        .body(body))
}

/// Renders `go.mod` for the generated package.
pub fn go_mod<'a>(module_path: &str, dependencies: impl IntoIterator<Item = &'a Dependency>) -> String {
    let deps: Vec<&Dependency> = dependencies.into_iter().collect();
    let mut out = format!("module {}\n\ngo {}\n", module_path, GO_VERSION);

    match deps.as_slice() {
        [] => {}
        [dep] => out.push_str(&format!("\nrequire {} {}\n", dep.module, dep.version)),
        _ => {
            out.push_str("\nrequire (\n");
            for dep in &deps {
                out.push_str(&format!("\t{} {}\n", dep.module, dep.version));
            }
            out.push_str(")\n");
        }
    }
    out
}

/// Table layout of a resolved model.
///
/// Indexes come from explicit declarations, from every filtered column and,
/// as unique indexes, from upsert conflict targets.
pub fn table_schema(resolved: &ResolvedModel) -> TableSchema {
    let model = &resolved.model;

    let mut indexes: Vec<IndexDef> = model.indexes.iter().cloned().map(IndexDef::on).collect();

    for method in model.access.methods() {
        indexes.extend(
            filtered_columns(method.filters())
                .into_iter()
                .filter(|column| column != ID_COLUMN)
                .map(|column| IndexDef::on(vec![column])),
        );
    }

    for config in &model.access.add_or_replace {
        indexes.push(IndexDef::unique(config.conflict_target()));
    }

    TableSchema {
        namespace: model.namespace.clone(),
        name: model.table_name(),
        columns: resolved
            .columns
            .iter()
            .map(|attr| ColumnDef {
                name: attr.name.clone(),
                storage_type: attr.storage_type,
                required: attr.is_required(),
            })
            .collect(),
        indexes,
    }
}

/// Renders `schema.sql` for every model, in order.
pub fn schema_sql(models: &[ResolvedModel], dialect: &dyn Dialect) -> String {
    let mut out = format!("-- {}\n", GENERATED_MARKER);
    for resolved in models {
        out.push('\n');
        out.push_str(&generate_schema(&table_schema(resolved), dialect));
    }
    out
}

/// Distinct columns compared by a filter list, in first-appearance order.
fn filtered_columns(filters: &[FilterNode]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for filter in filters {
        filter.for_each_leaf(&mut |leaf: &FilterLeaf| {
            if !columns.contains(&leaf.attribute) {
                columns.push(leaf.attribute.clone());
            }
        });
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Render;
    use crate::model::{
        AddOrReplaceConfig, Assignment, Attribute, FindConfig, Model, Operator, StorageType,
    };
    use crate::sql::Postgres;
    use pretty_assertions::assert_eq;

    #[test]
    fn helpers_file_renders_sentinel_and_range_helper() {
        let rendered = helpers_file("store").unwrap().render();
        assert_eq!(
            rendered,
            "// Code generated by dalgen. DO NOT EDIT.\n\n\
             package store\n\n\
             import (\n\t\"errors\"\n\t\"fmt\"\n\t\"reflect\"\n)\n\n\
             // ErrStatementNotPrepared is returned when an access function runs before its statement was prepared.\n\
             var ErrStatementNotPrepared = errors.New(\"dalgen: statement not prepared\")\n\n\
             // rangeBound returns element i of a two-element range value.\n\
             func rangeBound(value any, i int) (any, error) {\n\
             \tv := reflect.ValueOf(value)\n\
             \tif v.Kind() != reflect.Slice && v.Kind() != reflect.Array {\n\
             \t\treturn nil, fmt.Errorf(\"dalgen: range parameter must be a slice or array, got %T\", value)\n\
             \t}\n\
             \tif v.Len() != 2 {\n\
             \t\treturn nil, fmt.Errorf(\"dalgen: range parameter must have 2 elements, got %d\", v.Len())\n\
             \t}\n\
             \treturn v.Index(i).Interface(), nil\n\
             }\n"
        );
    }

    #[test]
    fn go_mod_lists_dependencies() {
        assert_eq!(go_mod("example.com/store", []), "module example.com/store\n\ngo 1.22\n");

        let uuid = Dependency::new("github.com/google/uuid", "v1.6.0");
        assert_eq!(
            go_mod("example.com/store", [&uuid]),
            "module example.com/store\n\ngo 1.22\n\nrequire github.com/google/uuid v1.6.0\n"
        );

        let other = Dependency::new("golang.org/x/text", "v0.14.0");
        assert_eq!(
            go_mod("m", [&uuid, &other]),
            "module m\n\ngo 1.22\n\nrequire (\n\tgithub.com/google/uuid v1.6.0\n\tgolang.org/x/text v0.14.0\n)\n"
        );
    }

    fn resolved() -> ResolvedModel {
        let mut model = Model::new("Product");
        model.attributes = vec!["sku".into(), "price".into()];
        model.indexes = vec![vec!["price".into()]];
        model.access.find.push(FindConfig {
            name: "Cheap".into(),
            attributes: vec![],
            filters: vec![
                FilterNode::leaf("price", Operator::Lt, "max"),
                FilterNode::leaf("id", Operator::Eq, "id"),
            ],
        });
        model.access.add_or_replace.push(AddOrReplaceConfig {
            name: "Save".into(),
            values: vec![Assignment::new("sku", "sku")],
            conflict: vec![],
        });
        ResolvedModel {
            model,
            columns: vec![
                Attribute::new("sku", "sku", StorageType::Text),
                Attribute::new("price", "price", StorageType::Float),
            ],
        }
    }

    #[test]
    fn schema_indexes_filters_and_conflict_targets() {
        let sql = schema_sql(&[resolved()], &Postgres);
        assert!(sql.starts_with("-- Code generated by dalgen. DO NOT EDIT.\n\nCREATE TABLE IF NOT EXISTS product (\n"));
        assert!(sql.ends_with(
            "CREATE INDEX IF NOT EXISTS product_price_idx ON product (price);\n\
             CREATE UNIQUE INDEX IF NOT EXISTS product_sku_key ON product (sku);\n"
        ));
        assert!(!sql.contains("product_id_idx"));
    }

    #[test]
    fn filtered_columns_are_distinct() {
        let filters = vec![FilterNode::or(vec![
            FilterNode::leaf("a", Operator::Eq, "a"),
            FilterNode::leaf("b", Operator::Eq, "b"),
            FilterNode::leaf("a", Operator::Gt, "a2"),
        ])];
        assert_eq!(filtered_columns(&filters), vec!["a", "b"]);
    }
}

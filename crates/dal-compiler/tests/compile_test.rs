use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use dal_compiler::sql::{ParameterRef, Statement, ID_GENERATOR};
use dal_compiler::{CompileWarning, Compiler, CompilerConfig, CompilerError};

const ATTRIBUTES: &str = r#"{
    "attributes": [
        { "id": "a-sku", "name": "sku", "type": "text", "validations": ["required"] },
        { "id": "a-price", "name": "price", "type": "float" },
        { "id": "a-age", "name": "age", "type": "int", "validations": ["required"] },
        { "id": "a-status", "name": "status", "type": "text" },
        { "id": "a-salary", "name": "salary", "type": "float" }
    ]
}"#;

const PRODUCT: &str = r#"{
    "name": "Product",
    "attributes": ["a-sku", "a-price"],
    "access": {
        "find": [
            { "name": "ListProducts" }
        ],
        "add_or_replace": [
            { "name": "SaveProduct", "values": [
                { "attribute": "a-sku", "parameter": "p1" },
                { "attribute": "a-price", "parameter": "p2" }
            ]}
        ]
    }
}"#;

const EMPLOYEE: &str = r#"{
    "name": "Employee",
    "attributes": ["a-age", "a-status", "a-salary"],
    "access": {
        "find": [
            { "name": "FindActiveAdults", "filters": [
                { "attribute": "a-age", "operator": ">=", "parameter": "age" },
                { "attribute": "a-status", "operator": "IN", "parameter": "status" }
            ]},
            { "name": "FindBySalary", "attributes": ["a-salary"], "filters": [
                { "attribute": "a-salary", "operator": "BETWEEN", "parameter": "salary_range" }
            ]},
            { "name": "FindNotRetired", "filters": [
                { "operator": "NOT", "filters": [
                    { "attribute": "a-status", "operator": "=", "parameter": "status" }
                ]}
            ]}
        ],
        "delete": [
            { "name": "DeleteEmployees" }
        ]
    }
}"#;

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn model_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "attributes.json", ATTRIBUTES);
    write(dir.path(), "product.json", PRODUCT);
    write(dir.path(), "employee.json", EMPLOYEE);
    dir
}

fn config(models: &Path, out: &Path) -> CompilerConfig {
    CompilerConfig {
        model_dir: models.to_path_buf(),
        out_dir: out.to_path_buf(),
        package: "store".into(),
        module_path: "example.com/store".into(),
        ..CompilerConfig::default()
    }
}

fn statement<'a>(statements: &'a [(String, Vec<Statement>)], name: &str) -> &'a Statement {
    statements
        .iter()
        .flat_map(|(_, methods)| methods)
        .find(|stmt| stmt.name == name)
        .unwrap_or_else(|| panic!("no statement named {name}"))
}

#[test]
fn compile_writes_go_package() {
    let models = model_dir();
    let out = TempDir::new().unwrap();
    let out_dir = out.path().join("store");

    let result = Compiler::new(config(models.path(), &out_dir)).compile().unwrap();

    assert_eq!(result.models, 2);
    assert_eq!(result.methods, 6);
    assert_eq!(
        result.model_methods,
        vec![("Employee".to_string(), 4), ("Product".to_string(), 2)]
    );
    assert_eq!(result.files, 5);
    assert!(result.warnings.is_empty());

    for file in ["employee.go", "product.go", "dalgen.go", "schema.sql", "go.mod"] {
        assert!(out_dir.join(file).is_file(), "missing {file}");
    }

    let product = std::fs::read_to_string(out_dir.join("product.go")).unwrap();
    assert!(product.starts_with("// Code generated by dalgen. DO NOT EDIT.\n\npackage store\n"));
    assert!(product.contains("\t\"github.com/google/uuid\"\n"));
    assert!(product.contains("type Product struct {\n"));
    assert!(product.contains("func SaveProduct(ctx context.Context, stmts map[string]*sql.Stmt, req *SaveProductRequest) (string, bool, error) {"));
    assert!(product.contains("func PrepareProductStatements(ctx context.Context, db *sql.DB) (map[string]*sql.Stmt, error) {"));

    let employee = std::fs::read_to_string(out_dir.join("employee.go")).unwrap();
    assert!(employee.contains("rangeBound(r.Params.SalaryRange, 0)"));
    assert!(employee.contains("func DeleteEmployees(ctx context.Context, stmts map[string]*sql.Stmt, req *DeleteEmployeesRequest) (int64, error) {"));

    let go_mod = std::fs::read_to_string(out_dir.join("go.mod")).unwrap();
    assert_eq!(
        go_mod,
        "module example.com/store\n\ngo 1.22\n\nrequire github.com/google/uuid v1.6.0\n"
    );

    let schema = std::fs::read_to_string(out_dir.join("schema.sql")).unwrap();
    assert!(schema.contains("CREATE TABLE IF NOT EXISTS employee (\n"));
    assert!(schema.contains("CREATE TABLE IF NOT EXISTS product (\n"));
    assert!(schema.contains("CREATE UNIQUE INDEX IF NOT EXISTS product_sku_key ON product (sku);\n"));
    assert!(schema.contains("CREATE INDEX IF NOT EXISTS employee_salary_idx ON employee (salary);\n"));
}

#[test]
fn filter_scenarios_compile_to_postgres() {
    let models = model_dir();
    let statements = Compiler::new(config(models.path(), models.path()))
        .statements()
        .unwrap();

    let adults = statement(&statements, "FindActiveAdults");
    assert_eq!(
        adults.sql,
        "SELECT * FROM employee WHERE 1=1 AND (age >= $1 AND status = ANY($2))"
    );
    assert_eq!(adults.params, vec![ParameterRef::named("age"), ParameterRef::named("status")]);

    let salary = statement(&statements, "FindBySalary");
    assert_eq!(
        salary.sql,
        "SELECT salary FROM employee WHERE 1=1 AND (salary BETWEEN $1 AND $2)"
    );
    assert_eq!(
        salary.params,
        vec![
            ParameterRef::element("salary_range", 0),
            ParameterRef::element("salary_range", 1),
        ]
    );

    let upsert = statement(&statements, "SaveProduct");
    assert_eq!(
        upsert.sql,
        "INSERT INTO product (id, sku, price) VALUES ($1, $2, $3) \
         ON CONFLICT (sku) DO UPDATE SET sku = $4, price = $5 \
         RETURNING id, (xmax = 0) AS inserted"
    );
    assert_eq!(
        upsert.params,
        vec![
            ParameterRef::generated(ID_GENERATOR),
            ParameterRef::named("p1"),
            ParameterRef::named("p2"),
            ParameterRef::named("p1"),
            ParameterRef::named("p2"),
        ]
    );

    assert_eq!(statement(&statements, "ListProducts").sql, "SELECT * FROM product WHERE 1=1");
    assert_eq!(
        statement(&statements, "FindNotRetired").sql,
        "SELECT * FROM employee WHERE 1=1 AND NOT(status = $1)"
    );
}

#[test]
fn sqlite_dialect_uses_question_marks() {
    let models = model_dir();
    let mut config = config(models.path(), models.path());
    config.dialect = "sqlite".into();

    let statements = Compiler::new(config).statements().unwrap();
    let salary = statement(&statements, "FindBySalary");
    assert_eq!(
        salary.sql,
        "SELECT salary FROM employee WHERE 1=1 AND (salary BETWEEN ? AND ?)"
    );
}

#[test]
fn not_group_with_two_children_is_rejected() {
    let models = TempDir::new().unwrap();
    write(models.path(), "attributes.json", ATTRIBUTES);
    write(
        models.path(),
        "employee.json",
        r#"{
            "name": "Employee",
            "attributes": ["a-age", "a-status"],
            "access": { "find": [{ "name": "FindOdd", "filters": [
                { "operator": "NOT", "filters": [
                    { "attribute": "a-age", "operator": "=", "parameter": "age" },
                    { "attribute": "a-status", "operator": "=", "parameter": "status" }
                ]}
            ]}]}
        }"#,
    );

    let err = Compiler::new(config(models.path(), models.path())).check().unwrap_err();
    assert!(matches!(err.root_cause(), CompilerError::NotGroupArity { children: 2 }));
}

#[test]
fn unknown_operator_is_dropped_with_warning() {
    let models = TempDir::new().unwrap();
    write(models.path(), "attributes.json", ATTRIBUTES);
    write(
        models.path(),
        "employee.json",
        r#"{
            "name": "Employee",
            "attributes": ["a-age", "a-status"],
            "access": { "find": [{ "name": "FindFuzzy", "filters": [
                { "attribute": "a-status", "operator": "~~*", "parameter": "pattern" },
                { "attribute": "a-age", "operator": "<", "parameter": "age" }
            ]}]}
        }"#,
    );

    let compiler = Compiler::new(config(models.path(), models.path()));
    let result = compiler.check().unwrap();
    assert_eq!(
        result.warnings,
        vec![CompileWarning::UnknownOperator {
            attribute: "status".into(),
            operator: "~~*".into(),
        }]
    );

    let statements = compiler.statements().unwrap();
    let fuzzy = statement(&statements, "FindFuzzy");
    assert_eq!(fuzzy.params, vec![ParameterRef::named("age")]);
    assert!(!fuzzy.sql.contains("status"));
}

#[test]
fn failed_run_writes_nothing() {
    let models = model_dir();
    write(
        models.path(),
        "zz_broken.json",
        r#"{ "name": "Broken", "attributes": ["a-missing"] }"#,
    );
    let out = TempDir::new().unwrap();
    let out_dir = out.path().join("store");

    let err = Compiler::new(config(models.path(), &out_dir)).compile().unwrap_err();

    assert!(matches!(
        err.root_cause(),
        CompilerError::UnknownAttribute { attribute } if attribute == "a-missing"
    ));
    assert!(!out_dir.exists());
}

#[test]
fn method_name_that_is_not_go_identifier_writes_nothing() {
    let models = model_dir();
    write(
        models.path(),
        "zz_widget.json",
        r#"{ "name": "Widget", "attributes": ["a-sku"],
             "access": { "find": [{ "name": "find by sku" }] } }"#,
    );
    let out = TempDir::new().unwrap();
    let out_dir = out.path().join("store");

    let err = Compiler::new(config(models.path(), &out_dir)).compile().unwrap_err();

    assert_eq!(err.to_string(), "In access method 'Widget.find by sku'");
    assert!(matches!(
        err.root_cause(),
        CompilerError::InvalidIdentifier { name, .. } if name == "find by sku"
    ));
    assert!(!out_dir.exists());
}

#[test]
fn method_named_after_another_model_is_rejected() {
    let models = model_dir();
    write(
        models.path(),
        "zz_widget.json",
        r#"{ "name": "Widget", "attributes": ["a-sku"],
             "access": { "delete": [{ "name": "Product" }] } }"#,
    );

    let err = Compiler::new(config(models.path(), models.path())).check().unwrap_err();
    assert_eq!(err.to_string(), "In model 'Widget'");
    assert!(matches!(
        err.root_cause(),
        CompilerError::IdentifierCollision { name, .. } if name == "Product"
    ));
}

#[test]
fn attribute_stored_in_fixed_column_is_rejected() {
    let models = TempDir::new().unwrap();
    write(
        models.path(),
        "attributes.json",
        r#"{ "attributes": [
            { "id": "a-sku", "name": "sku", "type": "text" },
            { "id": "a-ext", "name": "id", "type": "text" }
        ] }"#,
    );
    write(
        models.path(),
        "product.json",
        r#"{ "name": "Product", "attributes": ["a-sku", "a-ext"] }"#,
    );

    let err = Compiler::new(config(models.path(), models.path())).check().unwrap_err();
    assert!(matches!(
        err.root_cause(),
        CompilerError::ReservedColumn { column } if column == "id"
    ));
}

#[test]
fn unsupported_dialect_is_rejected_before_loading() {
    let out = TempDir::new().unwrap();
    let mut config = config(&out.path().join("absent"), out.path());
    config.dialect = "oracle".into();

    let err = Compiler::new(config).check().unwrap_err();
    assert!(matches!(err, CompilerError::UnsupportedDialect { .. }));
}

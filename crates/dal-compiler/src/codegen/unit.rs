//! Per-model compilation units.

use crate::diagnostic::{CompileWarning, CompilerError};
use crate::ir::{Field, FuncDecl, ImportSet, Render, SourceFile, StructDecl, TypeRef, ValueSpec};
use crate::model::AccessMethod;
use crate::naming::{to_go_exported, to_snake_case};
use crate::sql::ddl::{FIXED_COLUMNS, UPDATED_AT_COLUMN, VERSION_COLUMN};
use crate::sql::{compile_method, Dialect, Statement, ID_COLUMN};
use crate::validate::ResolvedModel;

use super::access::access_function;
use super::go_types::{go_type, time};
use super::params::{params_struct, request_struct};
use super::prepare::{prepare_function, query_consts, statements_var};

/// Everything generated for one model: declarations plus the compiled
/// statements they embed.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    /// Go name of the model struct.
    pub model: String,
    pub structs: Vec<StructDecl>,
    pub funcs: Vec<FuncDecl>,
    pub vars: Vec<ValueSpec>,
    pub consts: Vec<ValueSpec>,
    pub statements: Vec<Statement>,
}

impl CompilationUnit {
    /// Output file name, e.g. `order_line.go`.
    pub fn file_name(&self) -> String {
        format!("{}.go", to_snake_case(&self.model))
    }

    /// Warnings raised while compiling the unit's statements.
    pub fn warnings(&self) -> impl Iterator<Item = &CompileWarning> {
        self.statements.iter().flat_map(|s| s.warnings.iter())
    }

    /// Union of every import the unit's declarations need.
    pub fn imports(&self) -> ImportSet {
        self.to_source_file("unit").imports()
    }

    pub fn to_source_file(&self, package: &str) -> SourceFile {
        let mut file = SourceFile::new(package);
        file.vars = self.vars.clone();
        file.consts = self.consts.clone();
        file.structs = self.structs.clone();
        file.funcs = self.funcs.clone();
        file
    }
}

/// Columns in `SELECT *` order: fixed columns, then attributes.
pub fn all_columns(resolved: &ResolvedModel) -> Vec<String> {
    FIXED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(resolved.columns.iter().map(|a| a.name.clone()))
        .collect()
}

/// The row struct: fixed columns then one tagged field per attribute.
fn model_struct(resolved: &ResolvedModel, name: &str) -> StructDecl {
    let fixed = [
        Field::new("ID", TypeRef::builtin("string")).tagged(format!("db:\"{}\"", ID_COLUMN)),
        Field::new("Version", TypeRef::builtin("int64")).tagged(format!("db:\"{}\"", VERSION_COLUMN)),
        Field::new("UpdatedAt", time()).tagged(format!("db:\"{}\"", UPDATED_AT_COLUMN)),
    ];

    let decl = StructDecl::new(name).doc(format!(
        "{} is one row of the {} table.",
        name,
        resolved.model.table_name()
    ));

    fixed
        .into_iter()
        .chain(resolved.columns.iter().map(|attr| {
            Field::new(to_go_exported(&attr.name), go_type(attr)).tagged(format!("db:\"{}\"", attr.name))
        }))
        .fold(decl, StructDecl::field)
}

/// Synthesizes the compilation unit of one resolved model.
pub fn synthesize_model(
    resolved: &ResolvedModel,
    dialect: &dyn Dialect,
) -> Result<CompilationUnit, CompilerError> {
    let model = &resolved.model;
    let go_name = to_go_exported(&model.name);
    let row = model_struct(resolved, &go_name);

    let mut structs = vec![row.clone()];
    let mut funcs = Vec::new();
    let mut statements = Vec::new();

    for method in model.access.methods() {
        let statement = compile_method(model, method, dialect);
        let wrap = |e: CompilerError| e.in_access_method(&model.name, method.name());

        let scan_columns = match method {
            AccessMethod::Find(config) if !config.attributes.is_empty() => {
                config.attributes.clone()
            }
            _ => all_columns(resolved),
        };

        structs.push(params_struct(&statement));
        structs.push(request_struct(&statement).map_err(wrap)?);
        funcs.push(access_function(&statement, &row, &scan_columns).map_err(wrap)?);
        statements.push(statement);
    }

    let (vars, consts) = if statements.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        funcs.push(prepare_function(&go_name).map_err(|e| e.in_model(&model.name))?);
        (vec![statements_var(&go_name, &statements)], query_consts(&statements))
    };

    tracing::debug!(
        model = %model.name,
        methods = statements.len(),
        "synthesized compilation unit"
    );

    Ok(CompilationUnit {
        model: go_name,
        structs,
        funcs,
        vars,
        consts,
        statements,
    })
}

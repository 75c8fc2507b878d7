//! Go data-access code generation from resolved models.
//!
//! Each model becomes one compilation unit (row struct, parameter and
//! request structs, access functions, statement constants and a prepare
//! routine). The project layer adds the shared helper file, `go.mod` and
//! `schema.sql`.

mod access;
mod go_types;
mod params;
mod prepare;
pub mod project;
mod unit;

pub use unit::{synthesize_model, CompilationUnit};

use crate::config::CompilerConfig;
use crate::diagnostic::{CompileWarning, CompilerError};
use crate::ir::{ImportSet, Render};
use crate::model::Model;
use crate::naming::to_go_exported;
use crate::sql::Dialect;
use crate::validate::ResolvedModel;

/// Package-level names the generated code already uses: the builtins it
/// calls, the packages it imports and the shared helpers.
pub const RESERVED_NAMES: &[&str] = &[
    "any",
    "append",
    "error",
    "int64",
    "len",
    "make",
    "nil",
    "string",
    "context",
    "errors",
    "fmt",
    "json",
    "reflect",
    "sql",
    "time",
    "uuid",
    access::ERR_NOT_PREPARED,
    params::RANGE_BOUND_FN,
];

/// Every package-level Go name the unit of `model` declares, with a
/// description of the declaring construct.
pub fn declared_names(model: &Model) -> Vec<(String, String)> {
    let go_name = to_go_exported(&model.name);
    let mut names = vec![(go_name.clone(), format!("the {} model struct", model.name))];

    for method in model.access.methods() {
        let owner = format!("{}.{}", model.name, method.name());
        names.push((method.name().to_string(), format!("access method {}", owner)));
        names.push((params::params_struct_name(method.name()), format!("the params struct of {}", owner)));
        names.push((params::request_struct_name(method.name()), format!("the request struct of {}", owner)));
        names.push((prepare::query_const_name(method.name()), format!("the query constant of {}", owner)));
    }

    if !model.access.is_empty() {
        let owner = &model.name;
        names.push((prepare::prepare_fn_name(&go_name), format!("the prepare function of {}", owner)));
        names.push((prepare::statements_var_name(&go_name), format!("the statement list of {}", owner)));
    }

    names
}

/// Generated project files.
pub struct GeneratedCode {
    /// Map of filename to content.
    pub files: Vec<(String, String)>,

    /// Warnings collected from every compiled statement.
    pub warnings: Vec<CompileWarning>,
}

impl GeneratedCode {
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(file, _)| file == name)
            .map(|(_, content)| content.as_str())
    }
}

/// Generates every output file for a set of resolved models.
///
/// Nothing is written here; the caller persists `files` only when the whole
/// run succeeded.
pub fn generate(
    models: &[ResolvedModel],
    config: &CompilerConfig,
    dialect: &dyn Dialect,
) -> Result<GeneratedCode, CompilerError> {
    let mut files = Vec::new();
    let mut warnings = Vec::new();
    let mut imports = ImportSet::new();

    for resolved in models {
        let unit = synthesize_model(resolved, dialect)?;
        warnings.extend(unit.warnings().cloned());

        let source = unit.to_source_file(&config.package);
        imports.extend(&source.imports());
        files.push((unit.file_name(), source.render()));
    }

    let helpers = project::helpers_file(&config.package)?;
    files.push((project::HELPERS_FILE.to_string(), helpers.render()));

    files.push((project::SCHEMA_FILE.to_string(), project::schema_sql(models, dialect)));
    files.push((
        project::GO_MOD_FILE.to_string(),
        project::go_mod(&config.module_path, imports.dependencies()),
    ));

    tracing::info!(
        models = models.len(),
        files = files.len(),
        warnings = warnings.len(),
        dialect = dialect.name(),
        "generated data-access code"
    );

    Ok(GeneratedCode { files, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AddConfig, Assignment, Attribute, DeleteConfig, FilterNode, Model, Operator, StaticRegistry,
        StorageType,
    };
    use crate::sql::Postgres;
    use crate::validate::validate_models;

    fn models() -> Vec<ResolvedModel> {
        let registry = StaticRegistry::new(vec![
            Attribute::new("sku", "sku", StorageType::Text),
            Attribute::new("qty", "quantity", StorageType::Int),
        ]);

        let mut product = Model::new("Product");
        product.attributes = vec!["sku".into()];
        product.access.add.push(AddConfig {
            name: "CreateProduct".into(),
            values: vec![Assignment::new("sku", "sku")],
        });

        let mut line = Model::new("OrderLine");
        line.attributes = vec!["sku".into(), "qty".into()];
        line.access.delete.push(DeleteConfig {
            name: "DeleteLines".into(),
            filters: vec![FilterNode::leaf("sku", Operator::Eq, "sku")],
        });

        validate_models(&[product, line], &registry).unwrap()
    }

    #[test]
    fn layout_has_one_file_per_model_plus_project_files() {
        let config = CompilerConfig::default();
        let generated = generate(&models(), &config, &Postgres).unwrap();

        let names: Vec<_> = generated.files.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["product.go", "order_line.go", "dalgen.go", "schema.sql", "go.mod"]);
        assert!(generated.warnings.is_empty());
    }

    #[test]
    fn go_mod_requires_uuid_only_when_used() {
        let config = CompilerConfig::default();
        let generated = generate(&models(), &config, &Postgres).unwrap();
        let go_mod = generated.file("go.mod").unwrap();
        assert!(go_mod.contains("require github.com/google/uuid v1.6.0"));

        let without_inserts: Vec<_> = models().into_iter().skip(1).collect();
        let generated = generate(&without_inserts, &config, &Postgres).unwrap();
        assert!(!generated.file("go.mod").unwrap().contains("require"));
    }

    #[test]
    fn every_go_file_uses_the_configured_package() {
        let config = CompilerConfig {
            package: "inventory".into(),
            ..CompilerConfig::default()
        };
        let generated = generate(&models(), &config, &Postgres).unwrap();
        for (name, content) in &generated.files {
            if name.ends_with(".go") {
                assert!(content.contains("\npackage inventory\n"), "{}", name);
            }
        }
    }
}

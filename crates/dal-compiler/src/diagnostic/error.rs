//! Compiler error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur during compilation.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum CompilerError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to access file '{path}': {message}")]
    #[diagnostic(code(dalgen::io::access_failed))]
    IoError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Failed to parse '{path}': {message}")]
    #[diagnostic(
        code(dalgen::config::parse_failed),
        help("Model files are JSON objects with `name`, `attributes` and `access` keys")
    )]
    ConfigParse {
        path: PathBuf,
        message: String,
    },

    #[error("Unsupported dialect: {dialect}")]
    #[diagnostic(
        code(dalgen::config::unsupported_dialect),
        help("Supported dialects are `postgres` and `sqlite`")
    )]
    UnsupportedDialect {
        dialect: String,
    },

    #[error("Attribute '{attribute}' is not registered")]
    #[diagnostic(
        code(dalgen::config::unknown_attribute),
        help("Declare the attribute in attributes.json before referencing it from a model")
    )]
    UnknownAttribute {
        attribute: String,
    },

    #[error("Attribute '{attribute}' is selected but not declared on the model")]
    #[diagnostic(
        code(dalgen::config::attribute_not_in_model),
        help("Add the attribute to the model's `attributes` list")
    )]
    AttributeNotInModel {
        attribute: String,
    },

    #[error("Duplicate model name: {name}")]
    #[diagnostic(code(dalgen::config::duplicate_model))]
    DuplicateModel {
        name: String,
    },

    #[error("Duplicate access method name: {name}")]
    #[diagnostic(
        code(dalgen::config::duplicate_method),
        help("Access method names become Go function names and must be unique per model")
    )]
    DuplicateMethod {
        name: String,
    },

    #[error("'{name}' is not a valid Go identifier for {role}")]
    #[diagnostic(
        code(dalgen::config::invalid_identifier),
        help("Names must start with a letter or underscore, contain only letters, digits and underscores, and not be a Go keyword")
    )]
    InvalidIdentifier {
        name: String,
        role: String,
    },

    #[error("Generated Go name '{name}' is declared by both {first} and {second}")]
    #[diagnostic(
        code(dalgen::config::identifier_collision),
        help("Every model, access method and parameter shares a Go namespace; rename one of them")
    )]
    IdentifierCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("Attribute column '{column}' is reserved")]
    #[diagnostic(
        code(dalgen::config::reserved_column),
        help("Every table already has `id`, `version` and `updated_at` columns; rename the attribute's column")
    )]
    ReservedColumn {
        column: String,
    },

    #[error("Access method has an empty name")]
    #[diagnostic(code(dalgen::config::empty_method_name))]
    EmptyMethodName,

    #[error("Update has nothing to set")]
    #[diagnostic(
        code(dalgen::config::empty_set),
        help("Provide at least one `set`, `increment` or `timestamp` attribute")
    )]
    EmptySet,

    #[error("Insert has no values")]
    #[diagnostic(code(dalgen::config::empty_values))]
    EmptyValues,

    // =========================================================================
    // Construction Errors
    // =========================================================================
    #[error("Node both assigns to [{assign}] and defines [{define}]")]
    #[diagnostic(
        code(dalgen::ir::conflicting_capture),
        help("A node captures its result either into existing variables or into new bindings, not both")
    )]
    ConflictingCapture {
        assign: String,
        define: String,
    },

    #[error("Call to '{callee}' combines incompatible modes: {reason}")]
    #[diagnostic(code(dalgen::ir::conflicting_call_mode))]
    ConflictingCallMode {
        callee: String,
        reason: String,
    },

    #[error("NOT group must have exactly one child, found {children}")]
    #[diagnostic(
        code(dalgen::filter::not_group_arity),
        help("Wrap multiple conditions in an AND or OR group inside the NOT")
    )]
    NotGroupArity {
        children: usize,
    },

    // =========================================================================
    // Context
    // =========================================================================
    #[error("In model '{model}'")]
    #[diagnostic(code(dalgen::model))]
    InModel {
        model: String,
        #[source]
        source: Box<CompilerError>,
    },

    #[error("In access method '{model}.{method}'")]
    #[diagnostic(code(dalgen::access_method))]
    InAccessMethod {
        model: String,
        method: String,
        #[source]
        source: Box<CompilerError>,
    },
}

impl CompilerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wraps this error with the model it occurred in.
    pub fn in_model(self, model: impl Into<String>) -> Self {
        Self::InModel {
            model: model.into(),
            source: Box::new(self),
        }
    }

    /// Wraps this error with the access method it occurred in.
    pub fn in_access_method(self, model: impl Into<String>, method: impl Into<String>) -> Self {
        Self::InAccessMethod {
            model: model.into(),
            method: method.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping context wrappers.
    pub fn root_cause(&self) -> &CompilerError {
        match self {
            Self::InModel { source, .. } | Self::InAccessMethod { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

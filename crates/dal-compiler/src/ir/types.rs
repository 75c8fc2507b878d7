//! Type references used by fields, parameters, returns and declarations.

use super::imports::{Import, ImportSet};

/// A Go type as written in source.
///
/// One rule governs rendering everywhere: a type with an import source that
/// is not already marked as a reference renders as a pointer; built-in and
/// package-local types render by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    name: String,
    import: Option<Import>,
    reference: bool,
}

impl TypeRef {
    /// A built-in or package-local type, rendered by value.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import: None,
            reference: false,
        }
    }

    /// A type from another package, rendered as a pointer.
    pub fn external(import: Import, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import: Some(import),
            reference: false,
        }
    }

    /// A type from another package that already behaves as a reference
    /// (interfaces, maps, slices), rendered as written.
    pub fn handle(import: Import, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import: Some(import),
            reference: true,
        }
    }

    pub fn any() -> Self {
        Self::builtin("any")
    }

    pub fn error() -> Self {
        Self::builtin("error")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn import(&self) -> Option<&Import> {
        self.import.as_ref()
    }

    pub fn is_reference(&self) -> bool {
        self.reference || self.name.starts_with('*')
    }

    pub fn render(&self) -> String {
        if self.import.is_some() && !self.is_reference() {
            format!("*{}", self.name)
        } else {
            self.name.clone()
        }
    }

    pub fn collect_imports(&self, imports: &mut ImportSet) {
        if let Some(import) = &self.import {
            imports.insert(import);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imported_types_render_as_pointers() {
        let time = TypeRef::external(Import::std("time"), "time.Time");
        assert_eq!(time.render(), "*time.Time");

        let ctx = TypeRef::handle(Import::std("context"), "context.Context");
        assert_eq!(ctx.render(), "context.Context");

        let already = TypeRef::external(Import::std("database/sql"), "*sql.DB");
        assert_eq!(already.render(), "*sql.DB");
    }

    #[test]
    fn builtins_render_by_value() {
        assert_eq!(TypeRef::builtin("int64").render(), "int64");
        assert_eq!(TypeRef::builtin("[]*Product").render(), "[]*Product");
        assert_eq!(TypeRef::any().render(), "any");
    }
}

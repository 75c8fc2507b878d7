//! Parameter plans: which value binds to which placeholder.

use std::fmt;

/// Sub-index meaning "bind the whole value".
pub const WHOLE_VALUE: i32 = -1;

/// Generator used for server-side primary keys.
pub const ID_GENERATOR: &str = "uuid.NewString";

/// One positional bind value.
///
/// The position of a `ParameterRef` in a statement's parameter list equals the
/// 1-based index of its placeholder in the statement text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterRef {
    /// A caller-supplied parameter. `index` is [`WHOLE_VALUE`] or the element
    /// (0 or 1) of a two-element range value.
    Named { name: String, index: i32 },

    /// A value produced by calling `function(args...)` in the generated code.
    Generated { function: String, args: Vec<String> },
}

impl ParameterRef {
    pub fn named(name: impl Into<String>) -> Self {
        ParameterRef::Named {
            name: name.into(),
            index: WHOLE_VALUE,
        }
    }

    pub fn element(name: impl Into<String>, index: i32) -> Self {
        ParameterRef::Named {
            name: name.into(),
            index,
        }
    }

    pub fn generated(function: impl Into<String>) -> Self {
        ParameterRef::Generated {
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// The caller-facing name, `None` for generated values.
    pub fn name(&self) -> Option<&str> {
        match self {
            ParameterRef::Named { name, .. } => Some(name),
            ParameterRef::Generated { .. } => None,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, ParameterRef::Generated { .. })
    }
}

impl fmt::Display for ParameterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterRef::Named { name, index } if *index == WHOLE_VALUE => write!(f, ":{}", name),
            ParameterRef::Named { name, index } => write!(f, ":{}[{}]", name, index),
            ParameterRef::Generated { function, args } => write!(f, "{}({})", function, args.join(", ")),
        }
    }
}

/// Distinct caller-facing parameter names, in order of first appearance.
pub fn distinct_names(params: &[ParameterRef]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in params.iter().filter_map(ParameterRef::name) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_names_keep_first_appearance() {
        let params = vec![
            ParameterRef::generated(ID_GENERATOR),
            ParameterRef::named("sku"),
            ParameterRef::element("range", 0),
            ParameterRef::element("range", 1),
            ParameterRef::named("sku"),
        ];
        assert_eq!(distinct_names(&params), vec!["sku", "range"]);
    }

    #[test]
    fn display_forms() {
        assert_eq!(ParameterRef::named("age").to_string(), ":age");
        assert_eq!(ParameterRef::element("r", 1).to_string(), ":r[1]");
        assert_eq!(ParameterRef::generated(ID_GENERATOR).to_string(), "uuid.NewString()");
    }
}

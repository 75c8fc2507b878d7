//! Non-fatal findings reported while compiling statements.

use std::fmt;

/// A condition the compiler tolerates but reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// A filter leaf used an operator the compiler does not know.
    /// The leaf contributes no SQL text and no parameters.
    UnknownOperator {
        attribute: String,
        operator: String,
    },

    /// A filter group used a logical operator other than AND/OR/NOT.
    /// The whole group contributes no SQL text and no parameters.
    UnknownLogicalOperator {
        operator: String,
    },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::UnknownOperator { attribute, operator } => write!(
                f,
                "filter on '{}' uses unknown operator '{}' and was dropped",
                attribute, operator
            ),
            CompileWarning::UnknownLogicalOperator { operator } => write!(
                f,
                "filter group uses unknown logical operator '{}' and was dropped",
                operator
            ),
        }
    }
}

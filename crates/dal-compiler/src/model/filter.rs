//! Filter trees: nested boolean expressions over attribute comparisons.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Comparison operator of a filter leaf.
///
/// Unrecognized spellings are kept as [`Operator::Unknown`] instead of failing
/// deserialization; the query compiler drops such leaves with a warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Between,
    Like,
    NotLike,
    ILike,
    Is,
    IsNot,
    Unknown(String),
}

impl Operator {
    /// Parse an operator from its SQL-ish spelling. Never fails.
    pub fn parse(s: &str) -> Self {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match normalized.as_str() {
            "=" | "==" => Operator::Eq,
            "<>" | "!=" => Operator::Ne,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "IN" => Operator::In,
            "BETWEEN" => Operator::Between,
            "LIKE" => Operator::Like,
            "NOT LIKE" => Operator::NotLike,
            "ILIKE" => Operator::ILike,
            "IS" => Operator::Is,
            "IS NOT" => Operator::IsNot,
            _ => Operator::Unknown(s.to_string()),
        }
    }

    /// The SQL spelling of this operator.
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::In => "IN",
            Operator::Between => "BETWEEN",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::ILike => "ILIKE",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
            Operator::Unknown(s) => s,
        }
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::parse(&s)
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical operator of a filter group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicalOperator {
    And,
    Or,
    Not,
    Unknown(String),
}

impl LogicalOperator {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "AND" => LogicalOperator::And,
            "OR" => LogicalOperator::Or,
            "NOT" => LogicalOperator::Not,
            _ => LogicalOperator::Unknown(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Not => "NOT",
            LogicalOperator::Unknown(s) => s,
        }
    }
}

impl From<String> for LogicalOperator {
    fn from(s: String) -> Self {
        LogicalOperator::parse(&s)
    }
}

impl From<LogicalOperator> for String {
    fn from(op: LogicalOperator) -> Self {
        op.as_str().to_string()
    }
}

/// A single comparison against one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterLeaf {
    /// Attribute id before resolution, column name after.
    pub attribute: String,

    /// Optional SQL function applied to the attribute, e.g. `LOWER`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,

    pub operator: Operator,

    /// Name of the caller-supplied parameter bound to this comparison.
    pub parameter: String,
}

/// A logical combination of child filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub operator: LogicalOperator,
    pub filters: Vec<FilterNode>,
}

/// A node of a filter tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group(FilterGroup),
    Leaf(FilterLeaf),
}

impl FilterNode {
    /// Creates a leaf comparing `attribute` against `parameter`.
    pub fn leaf(attribute: impl Into<String>, operator: Operator, parameter: impl Into<String>) -> Self {
        FilterNode::Leaf(FilterLeaf {
            attribute: attribute.into(),
            transformation: None,
            operator,
            parameter: parameter.into(),
        })
    }

    /// Creates a leaf whose attribute is wrapped in `function`.
    pub fn transformed(
        function: impl Into<String>,
        attribute: impl Into<String>,
        operator: Operator,
        parameter: impl Into<String>,
    ) -> Self {
        FilterNode::Leaf(FilterLeaf {
            attribute: attribute.into(),
            transformation: Some(function.into()),
            operator,
            parameter: parameter.into(),
        })
    }

    pub fn and(filters: Vec<FilterNode>) -> Self {
        Self::group(LogicalOperator::And, filters)
    }

    pub fn or(filters: Vec<FilterNode>) -> Self {
        Self::group(LogicalOperator::Or, filters)
    }

    pub fn not(filter: FilterNode) -> Self {
        Self::group(LogicalOperator::Not, vec![filter])
    }

    pub fn group(operator: LogicalOperator, filters: Vec<FilterNode>) -> Self {
        FilterNode::Group(FilterGroup { operator, filters })
    }

    /// Visits every leaf depth-first, left to right.
    pub fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(&'a FilterLeaf)) {
        match self {
            FilterNode::Leaf(leaf) => f(leaf),
            FilterNode::Group(group) => {
                for child in &group.filters {
                    child.for_each_leaf(f);
                }
            }
        }
    }

    /// Returns a copy of this tree with every leaf attribute passed through `f`.
    pub fn try_map_attributes<E>(
        &self,
        f: &mut impl FnMut(&str) -> Result<String, E>,
    ) -> Result<FilterNode, E> {
        match self {
            FilterNode::Leaf(leaf) => Ok(FilterNode::Leaf(FilterLeaf {
                attribute: f(&leaf.attribute)?,
                ..leaf.clone()
            })),
            FilterNode::Group(group) => Ok(FilterNode::Group(FilterGroup {
                operator: group.operator.clone(),
                filters: group
                    .filters
                    .iter()
                    .map(|child| child.try_map_attributes(f))
                    .collect::<Result<_, _>>()?,
            })),
        }
    }
}

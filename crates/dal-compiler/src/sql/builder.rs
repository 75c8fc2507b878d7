//! Clause compilation with per-statement placeholder numbering.

use crate::diagnostic::CompileWarning;
use crate::model::{Assignment, FilterGroup, FilterLeaf, FilterNode, LogicalOperator, Operator};

use super::dialect::Dialect;
use super::params::{ParameterRef, ID_GENERATOR};

/// Primary key column of every generated table.
pub const ID_COLUMN: &str = "id";

/// A compiled clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause {
    pub text: String,
    pub params: Vec<ParameterRef>,
    pub warnings: Vec<CompileWarning>,
}

/// Compiled INSERT column and value lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValuesClause {
    pub columns: Vec<String>,
    pub placeholders: Vec<String>,
}

/// Builds the clauses of one statement.
///
/// Owns the placeholder counter: every clause compiled through the same
/// builder continues the numbering of the previous one, and a new statement
/// starts a new builder.
#[derive(Debug)]
pub struct QueryBuilder<'d> {
    dialect: &'d dyn Dialect,
    next: usize,
    params: Vec<ParameterRef>,
    warnings: Vec<CompileWarning>,
}

impl<'d> QueryBuilder<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            next: dialect.placeholder_origin(),
            params: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Records `param` and returns its placeholder.
    pub fn bind(&mut self, param: ParameterRef) -> String {
        let placeholder = self.dialect.placeholder(self.next);
        self.next += 1;
        self.params.push(param);
        placeholder
    }

    pub fn quote(&self, ident: &str) -> String {
        self.dialect.quote_identifier(ident)
    }

    /// Quoted, optionally schema-qualified table name.
    pub fn table(&self, namespace: Option<&str>, table: &str) -> String {
        match namespace {
            Some(ns) => format!("{}.{}", self.quote(ns), self.quote(table)),
            None => self.quote(table),
        }
    }

    /// Compiles a filter list. One node compiles alone, several form an implicit AND group.
    pub fn where_clause(&mut self, filters: &[FilterNode]) -> String {
        match filters {
            [] => String::new(),
            [single] => self.filter(single),
            many => self.group_of(&LogicalOperator::And, many),
        }
    }

    /// Compiles one filter node, depth-first, left to right.
    pub fn filter(&mut self, node: &FilterNode) -> String {
        match node {
            FilterNode::Leaf(leaf) => self.leaf(leaf),
            FilterNode::Group(group) => self.group(group),
        }
    }

    fn leaf(&mut self, leaf: &FilterLeaf) -> String {
        let quoted = self.quote(&leaf.attribute);
        let attribute = match &leaf.transformation {
            Some(function) => format!("{}({})", function, quoted),
            None => quoted,
        };

        match &leaf.operator {
            Operator::In => {
                let placeholder = self.bind(ParameterRef::named(&leaf.parameter));
                self.dialect.membership(&attribute, &placeholder)
            }
            Operator::Between => {
                let low = self.bind(ParameterRef::element(&leaf.parameter, 0));
                let high = self.bind(ParameterRef::element(&leaf.parameter, 1));
                format!("({} BETWEEN {} AND {})", attribute, low, high)
            }
            Operator::Unknown(op) => {
                tracing::warn!(
                    attribute = %leaf.attribute,
                    operator = %op,
                    "dropping filter with unknown operator"
                );
                self.warnings.push(CompileWarning::UnknownOperator {
                    attribute: leaf.attribute.clone(),
                    operator: op.clone(),
                });
                String::new()
            }
            op => {
                let placeholder = self.bind(ParameterRef::named(&leaf.parameter));
                format!("{} {} {}", attribute, op.as_str(), placeholder)
            }
        }
    }

    fn group(&mut self, group: &FilterGroup) -> String {
        self.group_of(&group.operator, &group.filters)
    }

    fn group_of(&mut self, operator: &LogicalOperator, filters: &[FilterNode]) -> String {
        let separator = match operator {
            LogicalOperator::And => " AND ",
            LogicalOperator::Or => " OR ",
            LogicalOperator::Not => " AND ",
            LogicalOperator::Unknown(op) => {
                tracing::warn!(operator = %op, "dropping filter group with unknown logical operator");
                self.warnings.push(CompileWarning::UnknownLogicalOperator {
                    operator: op.clone(),
                });
                return String::new();
            }
        };

        let parts: Vec<String> = filters
            .iter()
            .map(|child| self.filter(child))
            .filter(|text| !text.is_empty())
            .collect();

        if parts.is_empty() {
            return String::new();
        }

        let joined = parts.join(separator);
        match operator {
            LogicalOperator::Not => format!("NOT({})", joined),
            _ => format!("({})", joined),
        }
    }

    /// Compiles a SET list: explicit assignments, then increments, then timestamps.
    /// Increments and timestamps are literal and bind nothing.
    pub fn set_clause(
        &mut self,
        assignments: &[Assignment],
        increments: &[String],
        timestamps: &[String],
    ) -> String {
        let mut parts = Vec::with_capacity(assignments.len() + increments.len() + timestamps.len());

        for assignment in assignments {
            let column = self.quote(&assignment.attribute);
            let placeholder = self.bind(ParameterRef::named(&assignment.parameter));
            parts.push(format!("{} = {}", column, placeholder));
        }

        for attribute in increments {
            let column = self.quote(attribute);
            parts.push(format!("{} = {} + 1", column, column));
        }

        for attribute in timestamps {
            let column = self.quote(attribute);
            parts.push(format!("{} = {}", column, self.dialect.now()));
        }

        parts.join(", ")
    }

    /// Compiles INSERT columns and values. The generated primary key is always first.
    pub fn values_clause(&mut self, values: &[Assignment]) -> ValuesClause {
        let mut clause = ValuesClause::default();

        clause.columns.push(self.quote(ID_COLUMN));
        clause.placeholders.push(self.bind(ParameterRef::generated(ID_GENERATOR)));

        for value in values {
            clause.columns.push(self.quote(&value.attribute));
            clause.placeholders.push(self.bind(ParameterRef::named(&value.parameter)));
        }

        clause
    }

    /// Consumes the builder, returning the parameter plan and any warnings.
    pub fn finish(self) -> (Vec<ParameterRef>, Vec<CompileWarning>) {
        (self.params, self.warnings)
    }
}

/// Compiles a WHERE expression with a fresh placeholder counter.
pub fn compile_where(filters: &[FilterNode], dialect: &dyn Dialect) -> Clause {
    let mut builder = QueryBuilder::new(dialect);
    let text = builder.where_clause(filters);
    let (params, warnings) = builder.finish();
    Clause { text, params, warnings }
}

/// Compiles a SET list with a fresh placeholder counter.
pub fn compile_set(
    assignments: &[Assignment],
    increments: &[String],
    timestamps: &[String],
    dialect: &dyn Dialect,
) -> Clause {
    let mut builder = QueryBuilder::new(dialect);
    let text = builder.set_clause(assignments, increments, timestamps);
    let (params, warnings) = builder.finish();
    Clause { text, params, warnings }
}

/// Compiles INSERT columns and values with a fresh placeholder counter.
pub fn compile_values(values: &[Assignment], dialect: &dyn Dialect) -> (ValuesClause, Vec<ParameterRef>) {
    let mut builder = QueryBuilder::new(dialect);
    let clause = builder.values_clause(values);
    let (params, _) = builder.finish();
    (clause, params)
}

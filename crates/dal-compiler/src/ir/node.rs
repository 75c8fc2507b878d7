//! Code construct nodes: expressions, statements and control flow.
//!
//! A [`Node`] is exactly one [`NodeKind`] plus optional directives describing
//! how its result is captured, how a returned error is handled and what runs
//! at scope exit. Nodes with directives are created through [`NodeBuilder`],
//! which rejects contradictory combinations.

use crate::diagnostic::CompilerError;
use crate::naming::{go_quote, indent};

use super::call::{Call, CallMode};
use super::imports::ImportSet;
use super::types::TypeRef;
use super::Render;

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    /// Backquoted string, falling back to an interpreted one when the text
    /// itself contains a backquote.
    RawStr(String),
}

impl Literal {
    pub fn render(&self) -> String {
        match self {
            Literal::Nil => "nil".to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Int(i) => i.to_string(),
            Literal::Str(s) => go_quote(s),
            Literal::RawStr(s) if s.contains('`') => go_quote(s),
            Literal::RawStr(s) => format!("`{}`", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Add,
    Sub,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
        }
    }

    /// Go operator precedence; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 3,
            BinaryOp::And => 2,
            BinaryOp::Or => 1,
        }
    }
}

/// Unary operators bind tighter than every binary operator.
const UNARY_PRECEDENCE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `&x`
    AddressOf,
    /// `*x`
    Deref,
    /// `!x`
    Not,
    /// `-x`
    Neg,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::AddressOf => "&",
            UnaryOp::Deref => "*",
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

/// Header of a `for` loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopHeader {
    /// `for cond {`
    Condition(Box<Node>),
    /// `for init; cond; {`
    InitCondition(Box<Node>, Box<Node>),
    /// `for init; cond; step {`
    Full(Box<Node>, Box<Node>, Box<Node>),
}

/// One element of a composite literal, keyed (`Name: v`) or positional.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: Option<String>,
    pub value: Node,
}

impl Element {
    pub fn positional(value: Node) -> Self {
        Self { key: None, value }
    }

    pub fn keyed(key: impl Into<String>, value: Node) -> Self {
        Self {
            key: Some(key.into()),
            value,
        }
    }
}

/// The statement or expression a node represents.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Literal(Literal),
    Ident(String),
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Index {
        target: Box<Node>,
        key: Box<Node>,
    },
    /// `var name T` or `var name T = value`
    Declare {
        name: String,
        ty: TypeRef,
        value: Option<Box<Node>>,
    },
    If {
        condition: Box<Node>,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Loop {
        header: LoopHeader,
        body: Vec<Node>,
    },
    /// `for key, value := range collection {`
    Range {
        key: Option<String>,
        value: Option<String>,
        collection: Box<Node>,
        body: Vec<Node>,
    },
    Call(Call),
    /// `T{...}`; `ty` is omitted for elided inner literals.
    Composite {
        ty: Option<TypeRef>,
        elements: Vec<Element>,
        multiline: bool,
    },
    Return(Vec<Node>),
    Steps(Vec<Node>),
}

/// Where a node's result goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Capture {
    #[default]
    Discard,
    /// `a, b = <node>`
    Assign(Vec<String>),
    /// `a, b := <node>`
    Define(Vec<String>),
}

/// Early return taken when the error variable is non-nil.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorHandler {
    pub error_var: String,
    /// One value per return slot, the error itself last.
    pub returns: Vec<Node>,
}

impl ErrorHandler {
    /// `if <error_var> != nil { return <zeros...>, <error_var> }`
    pub fn returning(error_var: impl Into<String>, zeros: Vec<Node>) -> Self {
        let error_var = error_var.into();
        let mut returns = zeros;
        returns.push(Node::ident(&error_var));
        Self { error_var, returns }
    }

    /// Handler for the conventional `err` variable.
    pub fn err(zeros: Vec<Node>) -> Self {
        Self::returning("err", zeros)
    }

    fn render(&self) -> String {
        let ret = Node::ret(self.returns.clone());
        format!(
            "if {} != nil {{\n{}\n}}",
            self.error_var,
            indent(&ret.render(), 1)
        )
    }

    fn collect_imports(&self, imports: &mut ImportSet) {
        for node in &self.returns {
            node.collect_imports(imports);
        }
    }
}

/// A call guaranteed to run at scope exit.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupHandler {
    pub call: Call,
}

impl CleanupHandler {
    pub fn new(call: Call) -> Self {
        Self { call }
    }

    /// `defer <receiver>.<method>()`
    pub fn method(receiver: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(Call::method(Node::ident(receiver), method))
    }
}

/// One unit of generated code.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    capture: Capture,
    on_error: Option<ErrorHandler>,
    cleanup: Option<CleanupHandler>,
}

impl From<NodeKind> for Node {
    fn from(kind: NodeKind) -> Self {
        Self {
            kind,
            capture: Capture::Discard,
            on_error: None,
            cleanup: None,
        }
    }
}

impl From<Call> for Node {
    fn from(call: Call) -> Self {
        Node::from(NodeKind::Call(call))
    }
}

impl Node {
    pub fn nil() -> Self {
        NodeKind::Literal(Literal::Nil).into()
    }

    pub fn bool(b: bool) -> Self {
        NodeKind::Literal(Literal::Bool(b)).into()
    }

    pub fn int(i: i64) -> Self {
        NodeKind::Literal(Literal::Int(i)).into()
    }

    pub fn str(s: impl Into<String>) -> Self {
        NodeKind::Literal(Literal::Str(s.into())).into()
    }

    pub fn raw_str(s: impl Into<String>) -> Self {
        NodeKind::Literal(Literal::RawStr(s.into())).into()
    }

    pub fn ident(name: impl Into<String>) -> Self {
        NodeKind::Ident(name.into()).into()
    }

    pub fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Self {
        NodeKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
        .into()
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Self {
        NodeKind::Unary {
            op,
            operand: Box::new(operand),
        }
        .into()
    }

    pub fn address_of(operand: Node) -> Self {
        Self::unary(UnaryOp::AddressOf, operand)
    }

    pub fn index(target: Node, key: Node) -> Self {
        NodeKind::Index {
            target: Box::new(target),
            key: Box::new(key),
        }
        .into()
    }

    pub fn declare(name: impl Into<String>, ty: TypeRef) -> Self {
        NodeKind::Declare {
            name: name.into(),
            ty,
            value: None,
        }
        .into()
    }

    pub fn if_then(condition: Node, then: Vec<Node>) -> Self {
        Self::if_else(condition, then, Vec::new())
    }

    pub fn if_else(condition: Node, then: Vec<Node>, otherwise: Vec<Node>) -> Self {
        NodeKind::If {
            condition: Box::new(condition),
            then,
            otherwise,
        }
        .into()
    }

    pub fn while_loop(condition: Node, body: Vec<Node>) -> Self {
        NodeKind::Loop {
            header: LoopHeader::Condition(Box::new(condition)),
            body,
        }
        .into()
    }

    pub fn for_loop(header: LoopHeader, body: Vec<Node>) -> Self {
        NodeKind::Loop { header, body }.into()
    }

    pub fn range(
        key: Option<&str>,
        value: Option<&str>,
        collection: Node,
        body: Vec<Node>,
    ) -> Self {
        NodeKind::Range {
            key: key.map(str::to_string),
            value: value.map(str::to_string),
            collection: Box::new(collection),
            body,
        }
        .into()
    }

    pub fn composite(ty: Option<TypeRef>, elements: Vec<Element>) -> Self {
        NodeKind::Composite {
            ty,
            elements,
            multiline: false,
        }
        .into()
    }

    /// A composite literal with one element per line.
    pub fn composite_block(ty: Option<TypeRef>, elements: Vec<Element>) -> Self {
        NodeKind::Composite {
            ty,
            elements,
            multiline: true,
        }
        .into()
    }

    pub fn ret(values: Vec<Node>) -> Self {
        NodeKind::Return(values).into()
    }

    pub fn steps(nodes: Vec<Node>) -> Self {
        NodeKind::Steps(nodes).into()
    }

    /// Starts attaching directives to this node.
    pub fn builder(self) -> NodeBuilder {
        NodeBuilder::from(self)
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn capture(&self) -> &Capture {
        &self.capture
    }

    pub fn error_handler(&self) -> Option<&ErrorHandler> {
        self.on_error.as_ref()
    }

    pub fn cleanup_handler(&self) -> Option<&CleanupHandler> {
        self.cleanup.as_ref()
    }

    /// Renders the node in expression position, ignoring directives.
    pub fn render_expr(&self) -> String {
        match &self.kind {
            NodeKind::Literal(lit) => lit.render(),
            NodeKind::Ident(name) => name.clone(),
            NodeKind::Binary { op, lhs, rhs } => {
                // Left-associative: an equal-precedence right operand keeps its parentheses.
                format!(
                    "{} {} {}",
                    operand(lhs, op.precedence()),
                    op.as_str(),
                    operand(rhs, op.precedence() + 1)
                )
            }
            NodeKind::Unary { op, operand: inner } => {
                format!("{}{}", op.as_str(), operand(inner, UNARY_PRECEDENCE))
            }
            NodeKind::Index { target, key } => {
                format!("{}[{}]", target.render_expr(), key.render_expr())
            }
            NodeKind::Declare { name, ty, value } => match value {
                Some(value) => format!("var {} {} = {}", name, ty.render(), value.render_expr()),
                None => format!("var {} {}", name, ty.render()),
            },
            NodeKind::If {
                condition,
                then,
                otherwise,
            } => {
                let mut out = format!(
                    "if {} {{\n{}\n}}",
                    condition.render_expr(),
                    render_block(then)
                );
                if !otherwise.is_empty() {
                    out.push_str(&format!(" else {{\n{}\n}}", render_block(otherwise)));
                }
                out
            }
            NodeKind::Loop { header, body } => {
                let head = match header {
                    LoopHeader::Condition(cond) => format!("for {} {{", cond.render_expr()),
                    LoopHeader::InitCondition(init, cond) => {
                        format!("for {}; {}; {{", init.render_simple(), cond.render_expr())
                    }
                    LoopHeader::Full(init, cond, step) => format!(
                        "for {}; {}; {} {{",
                        init.render_simple(),
                        cond.render_expr(),
                        step.render_simple()
                    ),
                };
                format!("{}\n{}\n}}", head, render_block(body))
            }
            NodeKind::Range {
                key,
                value,
                collection,
                body,
            } => {
                let bindings = match (key, value) {
                    (Some(k), Some(v)) => format!("{}, {} := ", k, v),
                    (Some(k), None) => format!("{} := ", k),
                    (None, Some(v)) => format!("_, {} := ", v),
                    (None, None) => String::new(),
                };
                format!(
                    "for {}range {} {{\n{}\n}}",
                    bindings,
                    collection.render_expr(),
                    render_block(body)
                )
            }
            NodeKind::Call(call) => call.render(),
            NodeKind::Composite {
                ty,
                elements,
                multiline,
            } => {
                let name = ty.as_ref().map(|t| t.name().to_string()).unwrap_or_default();
                let rendered: Vec<String> = elements
                    .iter()
                    .map(|e| match &e.key {
                        Some(key) => format!("{}: {}", key, e.value.render_expr()),
                        None => e.value.render_expr(),
                    })
                    .collect();
                if rendered.is_empty() {
                    format!("{}{{}}", name)
                } else if *multiline {
                    let body = rendered
                        .iter()
                        .map(|r| format!("{},", r))
                        .collect::<Vec<_>>()
                        .join("\n");
                    format!("{}{{\n{}\n}}", name, indent(&body, 1))
                } else {
                    format!("{}{{{}}}", name, rendered.join(", "))
                }
            }
            NodeKind::Return(values) => {
                if values.is_empty() {
                    "return".to_string()
                } else {
                    format!(
                        "return {}",
                        values.iter().map(Node::render_expr).collect::<Vec<_>>().join(", ")
                    )
                }
            }
            NodeKind::Steps(nodes) => nodes
                .iter()
                .map(Node::render)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Capture plus expression: the form allowed in loop init/step clauses.
    fn render_simple(&self) -> String {
        format!("{}{}", render_capture(&self.capture), self.render_expr())
    }
}

/// Renders `node` as an operand, parenthesized when it binds looser than `min`.
fn operand(node: &Node, min: u8) -> String {
    match &node.kind {
        NodeKind::Binary { op, .. } if op.precedence() < min => format!("({})", node.render_expr()),
        _ => node.render_expr(),
    }
}

fn render_capture(capture: &Capture) -> String {
    match capture {
        Capture::Discard => String::new(),
        Capture::Assign(names) => format!("{} = ", names.join(", ")),
        Capture::Define(names) => format!("{} := ", names.join(", ")),
    }
}

/// Renders a sequence of nodes, indented one level.
pub(crate) fn render_block(nodes: &[Node]) -> String {
    let body = nodes.iter().map(Node::render).collect::<Vec<_>>().join("\n");
    indent(&body, 1)
}

impl Render for Node {
    fn render(&self) -> String {
        let mut out = render_capture(&self.capture);
        out.push_str(&self.render_expr());

        if let Some(handler) = &self.on_error {
            out.push('\n');
            out.push_str(&handler.render());
        }

        if let Some(cleanup) = &self.cleanup {
            out.push_str(&format!("\ndefer {}", cleanup.call.render()));
        }

        out
    }

    fn collect_imports(&self, imports: &mut ImportSet) {
        match &self.kind {
            NodeKind::Literal(_) | NodeKind::Ident(_) => {}
            NodeKind::Binary { lhs, rhs, .. } => {
                lhs.collect_imports(imports);
                rhs.collect_imports(imports);
            }
            NodeKind::Unary { operand, .. } => operand.collect_imports(imports),
            NodeKind::Index { target, key } => {
                target.collect_imports(imports);
                key.collect_imports(imports);
            }
            NodeKind::Declare { ty, value, .. } => {
                ty.collect_imports(imports);
                if let Some(value) = value {
                    value.collect_imports(imports);
                }
            }
            NodeKind::If {
                condition,
                then,
                otherwise,
            } => {
                condition.collect_imports(imports);
                for node in then.iter().chain(otherwise) {
                    node.collect_imports(imports);
                }
            }
            NodeKind::Loop { header, body } => {
                match header {
                    LoopHeader::Condition(cond) => cond.collect_imports(imports),
                    LoopHeader::InitCondition(init, cond) => {
                        init.collect_imports(imports);
                        cond.collect_imports(imports);
                    }
                    LoopHeader::Full(init, cond, step) => {
                        init.collect_imports(imports);
                        cond.collect_imports(imports);
                        step.collect_imports(imports);
                    }
                }
                for node in body {
                    node.collect_imports(imports);
                }
            }
            NodeKind::Range {
                collection, body, ..
            } => {
                collection.collect_imports(imports);
                for node in body {
                    node.collect_imports(imports);
                }
            }
            NodeKind::Call(call) => call.collect_imports(imports),
            NodeKind::Composite { ty, elements, .. } => {
                if let Some(ty) = ty {
                    ty.collect_imports(imports);
                }
                for element in elements {
                    element.value.collect_imports(imports);
                }
            }
            NodeKind::Return(nodes) | NodeKind::Steps(nodes) => {
                for node in nodes {
                    node.collect_imports(imports);
                }
            }
        }

        if let Some(handler) = &self.on_error {
            handler.collect_imports(imports);
        }
        if let Some(cleanup) = &self.cleanup {
            cleanup.call.collect_imports(imports);
        }
    }
}

/// Attaches directives to a node.
///
/// Every setter is optional; [`NodeBuilder::build`] validates the combination.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    kind: NodeKind,
    assign: Option<Vec<String>>,
    define: Option<Vec<String>>,
    on_error: Option<ErrorHandler>,
    cleanup: Option<CleanupHandler>,
}

impl From<Node> for NodeBuilder {
    fn from(node: Node) -> Self {
        let (assign, define) = match node.capture {
            Capture::Discard => (None, None),
            Capture::Assign(names) => (Some(names), None),
            Capture::Define(names) => (None, Some(names)),
        };
        Self {
            kind: node.kind,
            assign,
            define,
            on_error: node.on_error,
            cleanup: node.cleanup,
        }
    }
}

impl From<NodeKind> for NodeBuilder {
    fn from(kind: NodeKind) -> Self {
        NodeBuilder::from(Node::from(kind))
    }
}

impl NodeBuilder {
    /// Capture the result into existing variables.
    pub fn assign_to<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assign = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Capture the result into new bindings.
    pub fn define<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.define = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn on_error(mut self, handler: ErrorHandler) -> Self {
        self.on_error = Some(handler);
        self
    }

    pub fn cleanup(mut self, handler: CleanupHandler) -> Self {
        self.cleanup = Some(handler);
        self
    }

    /// Validates the directives and produces the node.
    pub fn build(self) -> Result<Node, CompilerError> {
        let capture = match (self.assign, self.define) {
            (Some(assign), Some(define)) => {
                return Err(CompilerError::ConflictingCapture {
                    assign: assign.join(", "),
                    define: define.join(", "),
                });
            }
            (Some(names), None) => Capture::Assign(names),
            (None, Some(names)) => Capture::Define(names),
            (None, None) => Capture::Discard,
        };

        if let NodeKind::Call(call) = &self.kind {
            if call.mode() != CallMode::Immediate {
                let keyword = call.mode().keyword();
                let reason = if capture != Capture::Discard {
                    Some(format!("a {} call has no result to capture", keyword))
                } else if self.on_error.is_some() {
                    Some(format!("a {} call has no error to handle", keyword))
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(CompilerError::ConflictingCallMode {
                        callee: call.callee_name(),
                        reason,
                    });
                }
            }
        }

        Ok(Node {
            kind: self.kind,
            capture,
            on_error: self.on_error,
            cleanup: self.cleanup,
        })
    }
}

//! Function and method calls.

use super::imports::{Import, ImportSet};
use super::node::{Node, NodeBuilder, NodeKind};
use super::Render;

/// How a call is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallMode {
    #[default]
    Immediate,
    /// `go f()`
    Concurrent,
    /// `defer f()`
    Deferred,
}

impl CallMode {
    pub fn keyword(&self) -> &'static str {
        match self {
            CallMode::Immediate => "",
            CallMode::Concurrent => "go",
            CallMode::Deferred => "defer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Callee {
    Function(String),
    Method { receiver: Box<Node>, name: String },
}

/// A call to a function or a method on a receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    callee: Callee,
    args: Vec<Node>,
    spread: bool,
    mode: CallMode,
    import: Option<Import>,
}

impl Call {
    /// A call to a (possibly package-qualified) function.
    pub fn function(name: impl Into<String>) -> Self {
        Self::with_callee(Callee::Function(name.into()))
    }

    /// A call to a method on `receiver`.
    pub fn method(receiver: Node, name: impl Into<String>) -> Self {
        Self::with_callee(Callee::Method {
            receiver: Box::new(receiver),
            name: name.into(),
        })
    }

    fn with_callee(callee: Callee) -> Self {
        Self {
            callee,
            args: Vec::new(),
            spread: false,
            mode: CallMode::Immediate,
            import: None,
        }
    }

    pub fn arg(mut self, arg: Node) -> Self {
        self.args.push(arg);
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = Node>) -> Self {
        self.args.extend(args);
        self
    }

    /// Expands the last argument as variadic (`xs...`).
    pub fn spread(mut self) -> Self {
        self.spread = true;
        self
    }

    /// Package the callee lives in.
    pub fn import(mut self, import: Import) -> Self {
        self.import = Some(import);
        self
    }

    /// Run the call in a new goroutine.
    pub fn go(mut self) -> Self {
        self.mode = CallMode::Concurrent;
        self
    }

    /// Run the call at scope exit.
    pub fn deferred(mut self) -> Self {
        self.mode = CallMode::Deferred;
        self
    }

    pub fn mode(&self) -> CallMode {
        self.mode
    }

    /// Name used in diagnostics.
    pub fn callee_name(&self) -> String {
        match &self.callee {
            Callee::Function(name) => name.clone(),
            Callee::Method { receiver, name } => format!("{}.{}", receiver.render_expr(), name),
        }
    }

    /// Wraps the call in a node without directives.
    pub fn node(self) -> Node {
        Node::from(NodeKind::Call(self))
    }

    /// Wraps the call in a builder for attaching directives.
    pub fn builder(self) -> NodeBuilder {
        NodeBuilder::from(NodeKind::Call(self))
    }
}

impl Render for Call {
    fn render(&self) -> String {
        let mut args: Vec<String> = self.args.iter().map(Node::render_expr).collect();
        if self.spread {
            if let Some(last) = args.last_mut() {
                last.push_str("...");
            }
        }

        let call = format!("{}({})", self.callee_name(), args.join(", "));
        match self.mode {
            CallMode::Immediate => call,
            mode => format!("{} {}", mode.keyword(), call),
        }
    }

    fn collect_imports(&self, imports: &mut ImportSet) {
        if let Some(import) = &self.import {
            imports.insert(import);
        }
        if let Callee::Method { receiver, .. } = &self.callee {
            receiver.collect_imports(imports);
        }
        for arg in &self.args {
            arg.collect_imports(imports);
        }
    }
}

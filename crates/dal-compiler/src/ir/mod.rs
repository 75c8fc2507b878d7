//! Code construct IR.
//!
//! A small tree of Go constructs (nodes, calls, declarations, files) that
//! the synthesizer builds and then renders to source text. Rendering is
//! deterministic: the same tree always yields the same bytes, and every
//! import a construct needs is collected from the tree itself.

mod call;
mod decl;
mod file;
mod imports;
mod node;
mod types;

pub use call::{Call, CallMode};
pub use decl::{receiver_var, Field, FuncDecl, Param, StructDecl, ValueSpec};
pub use file::{SourceFile, GENERATED_MARKER};
pub use imports::{Dependency, Import, ImportSet};
pub use node::{
    BinaryOp, Capture, CleanupHandler, Element, ErrorHandler, Literal, LoopHeader, Node, NodeBuilder,
    NodeKind, UnaryOp,
};
pub use types::TypeRef;

/// Anything that renders to Go source and knows which imports it needs.
pub trait Render {
    fn render(&self) -> String;

    fn collect_imports(&self, imports: &mut ImportSet);

    fn imports(&self) -> ImportSet {
        let mut imports = ImportSet::new();
        self.collect_imports(&mut imports);
        imports
    }
}

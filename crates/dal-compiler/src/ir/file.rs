//! A complete generated source file.

use super::decl::{collect_value_imports, render_value_group, FuncDecl, StructDecl, ValueSpec};
use super::imports::{Import, ImportSet};
use super::node::Node;
use super::Render;

/// Marker line recognized by tooling as "do not edit".
pub const GENERATED_MARKER: &str = "Code generated by dalgen. DO NOT EDIT.";

/// One output file.
///
/// Sections always render in the same order: header comment, package clause,
/// imports, vars, consts, each struct followed by its methods, free
/// functions, then `init`. Sections are separated by one blank line.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub package: String,
    pub header: Vec<String>,
    /// Imports required even when no node references them.
    pub extra_imports: Vec<Import>,
    pub vars: Vec<ValueSpec>,
    pub consts: Vec<ValueSpec>,
    pub structs: Vec<StructDecl>,
    pub funcs: Vec<FuncDecl>,
    pub init: Vec<Node>,
}

impl SourceFile {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            header: vec![GENERATED_MARKER.to_string()],
            extra_imports: Vec::new(),
            vars: Vec::new(),
            consts: Vec::new(),
            structs: Vec::new(),
            funcs: Vec::new(),
            init: Vec::new(),
        }
    }

    pub fn var(&mut self, spec: ValueSpec) -> &mut Self {
        self.vars.push(spec);
        self
    }

    pub fn constant(&mut self, spec: ValueSpec) -> &mut Self {
        self.consts.push(spec);
        self
    }

    pub fn add_struct(&mut self, decl: StructDecl) -> &mut Self {
        self.structs.push(decl);
        self
    }

    pub fn func(&mut self, decl: FuncDecl) -> &mut Self {
        self.funcs.push(decl);
        self
    }

    pub fn import(&mut self, import: Import) -> &mut Self {
        self.extra_imports.push(import);
        self
    }
}

impl Render for SourceFile {
    fn render(&self) -> String {
        let mut sections = Vec::new();

        if !self.header.is_empty() {
            sections.push(
                self.header
                    .iter()
                    .map(|line| format!("// {}", line))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        sections.push(format!("package {}", self.package));

        let imports = self.imports().render();
        if !imports.is_empty() {
            sections.push(imports);
        }

        for (keyword, specs) in [("var", &self.vars), ("const", &self.consts)] {
            let group = render_value_group(keyword, specs);
            if !group.is_empty() {
                sections.push(group);
            }
        }

        sections.extend(self.structs.iter().map(|decl| decl.render()));
        sections.extend(self.funcs.iter().map(|decl| decl.render()));

        if !self.init.is_empty() {
            sections.push(FuncDecl::new("init").body(self.init.clone()).render());
        }

        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }

    fn collect_imports(&self, imports: &mut ImportSet) {
        for import in &self.extra_imports {
            imports.insert(import);
        }
        collect_value_imports(&self.vars, imports);
        collect_value_imports(&self.consts, imports);
        for decl in &self.structs {
            decl.collect_imports(imports);
        }
        for decl in &self.funcs {
            decl.collect_imports(imports);
        }
        for node in &self.init {
            node.collect_imports(imports);
        }
    }
}

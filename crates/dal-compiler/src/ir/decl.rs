//! Top-level declarations: structs, functions, methods, vars and consts.

use super::imports::{Import, ImportSet};
use super::node::{render_block, Node};
use super::types::TypeRef;
use super::Render;

fn render_doc(doc: &[String]) -> String {
    doc.iter().map(|line| format!("// {}\n", line)).collect()
}

/// A function parameter or named return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self { name: name.into(), ty }
    }

    fn render(&self) -> String {
        format!("{} {}", self.name, self.ty.render())
    }
}

/// A struct field with an optional struct tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub tag: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
        }
    }

    /// Attaches a raw tag, e.g. `db:"sku"`.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// A method or free function.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub doc: Vec<String>,
    /// Receiver variable and the struct name; always rendered as a pointer.
    pub receiver: Option<(String, String)>,
    pub params: Vec<Param>,
    pub returns: Vec<TypeRef>,
    pub body: Vec<Node>,
    /// Imports needed beyond what the signature and body reference.
    pub imports: Vec<Import>,
}

impl FuncDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: Vec::new(),
            receiver: None,
            params: Vec::new(),
            returns: Vec::new(),
            body: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    pub fn receiver(mut self, var: impl Into<String>, struct_name: impl Into<String>) -> Self {
        self.receiver = Some((var.into(), struct_name.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.returns.push(ty);
        self
    }

    pub fn body(mut self, body: Vec<Node>) -> Self {
        self.body = body;
        self
    }

    pub fn import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    fn signature(&self) -> String {
        let receiver = match &self.receiver {
            Some((var, ty)) => format!("({} *{}) ", var, ty.trim_start_matches('*')),
            None => String::new(),
        };
        let params = self.params.iter().map(Param::render).collect::<Vec<_>>().join(", ");
        let returns = match self.returns.len() {
            0 => String::new(),
            1 => format!(" {}", self.returns[0].render()),
            _ => format!(
                " ({})",
                self.returns.iter().map(TypeRef::render).collect::<Vec<_>>().join(", ")
            ),
        };
        format!("func {}{}({}){}", receiver, self.name, params, returns)
    }
}

impl Render for FuncDecl {
    fn render(&self) -> String {
        let mut out = render_doc(&self.doc);
        out.push_str(&self.signature());
        if self.body.is_empty() {
            out.push_str(" {\n}");
        } else {
            out.push_str(&format!(" {{\n{}\n}}", render_block(&self.body)));
        }
        out
    }

    fn collect_imports(&self, imports: &mut ImportSet) {
        for param in &self.params {
            param.ty.collect_imports(imports);
        }
        for ty in &self.returns {
            ty.collect_imports(imports);
        }
        for node in &self.body {
            node.collect_imports(imports);
        }
        for import in &self.imports {
            imports.insert(import);
        }
    }
}

/// A struct type with its attached methods.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub doc: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<FuncDecl>,
    /// Imports needed beyond what the fields and methods reference.
    pub imports: Vec<Import>,
}

impl StructDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    /// Attaches a method; the receiver type is forced to this struct.
    pub fn method(mut self, method: FuncDecl) -> Self {
        let var = method
            .receiver
            .as_ref()
            .map(|(var, _)| var.clone())
            .unwrap_or_else(|| receiver_var(&self.name));
        self.methods.push(method.receiver(var, self.name.clone()));
        self
    }

    /// Field lines aligned the way gofmt aligns them.
    fn render_fields(&self) -> String {
        let name_width = self.fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
        let types: Vec<String> = self.fields.iter().map(|f| f.ty.render()).collect();
        let type_width = self
            .fields
            .iter()
            .zip(&types)
            .filter(|(f, _)| f.tag.is_some())
            .map(|(_, t)| t.len())
            .max()
            .unwrap_or(0);

        self.fields
            .iter()
            .zip(&types)
            .map(|(field, ty)| match &field.tag {
                Some(tag) => format!(
                    "\t{:nw$} {:tw$} `{}`",
                    field.name,
                    ty,
                    tag,
                    nw = name_width,
                    tw = type_width
                ),
                None => format!("\t{:nw$} {}", field.name, ty, nw = name_width),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Conventional receiver variable: the lowercased first letter.
pub fn receiver_var(struct_name: &str) -> String {
    struct_name
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase().to_string())
        .unwrap_or_else(|| "r".to_string())
}

impl Render for StructDecl {
    fn render(&self) -> String {
        let mut out = render_doc(&self.doc);
        if self.fields.is_empty() {
            out.push_str(&format!("type {} struct{{}}", self.name));
        } else {
            out.push_str(&format!("type {} struct {{\n{}\n}}", self.name, self.render_fields()));
        }
        for method in &self.methods {
            out.push_str("\n\n");
            out.push_str(&method.render());
        }
        out
    }

    fn collect_imports(&self, imports: &mut ImportSet) {
        for field in &self.fields {
            field.ty.collect_imports(imports);
        }
        for method in &self.methods {
            method.collect_imports(imports);
        }
        for import in &self.imports {
            imports.insert(import);
        }
    }
}

/// One name bound in a `var` or `const` group.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub name: String,
    pub doc: Vec<String>,
    pub ty: Option<TypeRef>,
    pub value: Node,
}

impl ValueSpec {
    pub fn new(name: impl Into<String>, value: Node) -> Self {
        Self {
            name: name.into(),
            doc: Vec::new(),
            ty: None,
            value,
        }
    }

    pub fn typed(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    fn render_binding(&self) -> String {
        match &self.ty {
            Some(ty) => format!("{} {} = {}", self.name, ty.render(), self.value.render_expr()),
            None => format!("{} = {}", self.name, self.value.render_expr()),
        }
    }

    fn render(&self) -> String {
        format!("{}{}", render_doc(&self.doc), self.render_binding())
    }

    fn collect_imports(&self, imports: &mut ImportSet) {
        if let Some(ty) = &self.ty {
            ty.collect_imports(imports);
        }
        self.value.collect_imports(imports);
    }
}

/// Renders a `var` or `const` declaration; a single spec stays on one line.
pub(crate) fn render_value_group(keyword: &str, specs: &[ValueSpec]) -> String {
    match specs {
        [] => String::new(),
        [single] => format!("{}{} {}", render_doc(&single.doc), keyword, single.render_binding()),
        _ => {
            let body = specs.iter().map(ValueSpec::render).collect::<Vec<_>>().join("\n");
            format!("{} (\n{}\n)", keyword, crate::naming::indent(&body, 1))
        }
    }
}

pub(crate) fn collect_value_imports(specs: &[ValueSpec], imports: &mut ImportSet) {
    for spec in specs {
        spec.collect_imports(imports);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Dependency, SourceFile};
    use pretty_assertions::assert_eq;

    #[test]
    fn struct_fields_align_with_tags() {
        let decl = StructDecl::new("Product")
            .doc("Product is one row of the product table.")
            .field(Field::new("ID", TypeRef::builtin("string")).tagged("db:\"id\""))
            .field(Field::new("UpdatedAt", TypeRef::external(Import::std("time"), "time.Time")).tagged("db:\"updated_at\""))
            .field(Field::new("Sku", TypeRef::any()).tagged("db:\"sku\""));

        assert_eq!(
            decl.render(),
            "// Product is one row of the product table.\n\
             type Product struct {\n\
             \tID        string     `db:\"id\"`\n\
             \tUpdatedAt *time.Time `db:\"updated_at\"`\n\
             \tSku       any        `db:\"sku\"`\n\
             }"
        );
        assert!(decl.imports().contains("time"));
    }

    #[test]
    fn methods_follow_their_struct_with_pointer_receivers() {
        let method = FuncDecl::new("Args")
            .returns(TypeRef::builtin("[]any"))
            .returns(TypeRef::error())
            .body(vec![Node::ret(vec![Node::nil(), Node::nil()])]);
        let decl = StructDecl::new("FindRequest").method(method);

        assert_eq!(
            decl.render(),
            "type FindRequest struct{}\n\n\
             func (f *FindRequest) Args() ([]any, error) {\n\
             \treturn nil, nil\n\
             }"
        );
    }

    #[test]
    fn receiver_type_is_never_doubly_pointed() {
        let method = FuncDecl::new("Reset").receiver("c", "*Cursor");
        assert_eq!(method.render(), "func (c *Cursor) Reset() {\n}");
    }

    #[test]
    fn declaration_imports_render_once() {
        let json = Import::std("encoding/json");
        let decoder = FuncDecl::new("Decode")
            .import(json.clone())
            .param("raw", TypeRef::external(json.clone(), "json.RawMessage"));
        let payload = StructDecl::new("Payload")
            .import(json)
            .import(Import::module(
                "github.com/shopspring/decimal",
                Dependency::new("github.com/shopspring/decimal", "v1.4.0"),
            ));

        let mut file = SourceFile::new("store");
        file.add_struct(payload).func(decoder);
        let imports = file.imports();

        assert!(imports.contains("encoding/json"));
        assert_eq!(imports.dependencies().count(), 1);
        assert_eq!(file.render().matches("\"encoding/json\"").count(), 1);
    }

    #[test]
    fn value_groups() {
        let one = [ValueSpec::new("findQuery", Node::raw_str("SELECT * FROM t"))];
        assert_eq!(render_value_group("const", &one), "const findQuery = `SELECT * FROM t`");

        let two = [
            ValueSpec::new("a", Node::int(1)),
            ValueSpec::new("b", Node::int(2)).typed(TypeRef::builtin("int64")),
        ];
        assert_eq!(render_value_group("var", &two), "var (\n\ta = 1\n\tb int64 = 2\n)");
        assert_eq!(render_value_group("var", &[]), "");
    }
}

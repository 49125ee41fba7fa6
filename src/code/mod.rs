//! A small TypeScript emission engine.
//!
//! Generators never concatenate whole files. They describe declarations
//! ([`InterfaceSpec`], [`ClassSpec`], [`FunctionSpec`]) and statements
//! ([`CodeBlock`]) and reference other declarations through [`Symbol`]s and
//! [`TypeName`]s. Rendering a [`FileSpec`] collects every referenced symbol
//! into the import header and reports which file-local helpers were used.

pub mod writer;

use std::collections::{BTreeMap, BTreeSet};

use writer::CodeWriter;

// Imported identifiers are written as placeholders and resolved when the
// whole unit is known, so colliding names can be aliased.
const MARK_START: char = '\u{E000}';
const MARK_SPLIT: char = '\u{E001}';
const MARK_END: char = '\u{E002}';

/// Where a symbol comes from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    /// Declared in the same unit; nothing to import.
    Local,
    /// A utility declared in the same unit on demand (e.g. `longToNumber`).
    Helper,
    /// `import { Name } from 'module'`.
    Named(Module),
    /// `import * as Name from 'module'`.
    Namespace(Module),
}

/// An importable module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Module {
    /// An npm package, imported by its bare name.
    Package(String),
    /// Another generated unit, identified by its path without extension
    /// (`google/protobuf/timestamp`). Imported relative to the importing unit.
    Generated(String),
}

/// A named value or type together with its origin.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    pub name: String,
    pub origin: Origin,
}

impl Symbol {
    pub fn local(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            origin: Origin::Local,
        }
    }

    pub fn helper(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            origin: Origin::Helper,
        }
    }

    pub fn named(name: impl Into<String>, package: &str) -> Self {
        Symbol {
            name: name.into(),
            origin: Origin::Named(Module::Package(package.to_string())),
        }
    }

    pub fn namespace(name: impl Into<String>, package: &str) -> Self {
        Symbol {
            name: name.into(),
            origin: Origin::Namespace(Module::Package(package.to_string())),
        }
    }

    pub fn generated(name: impl Into<String>, module: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            origin: Origin::Named(Module::Generated(module.into())),
        }
    }
}

/// A TypeScript type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    /// A built-in or type variable: `number`, `Date`, `Context`.
    Simple(String),
    Symbol(Symbol),
    Union(Vec<TypeName>),
    Array(Box<TypeName>),
    /// `{ [key: K]: V }`
    Index {
        key: Box<TypeName>,
        value: Box<TypeName>,
    },
    /// `Base<P1, P2>`
    Generic {
        base: Box<TypeName>,
        params: Vec<TypeName>,
    },
}

impl TypeName {
    pub fn simple(name: impl Into<String>) -> Self {
        TypeName::Simple(name.into())
    }

    pub fn number() -> Self {
        TypeName::simple("number")
    }

    pub fn string() -> Self {
        TypeName::simple("string")
    }

    pub fn boolean() -> Self {
        TypeName::simple("boolean")
    }

    pub fn undefined() -> Self {
        TypeName::simple("undefined")
    }

    pub fn optional(self) -> Self {
        TypeName::Union(vec![self, TypeName::undefined()])
    }

    pub fn array(self) -> Self {
        TypeName::Array(Box::new(self))
    }

    pub fn generic(self, params: Vec<TypeName>) -> Self {
        TypeName::Generic {
            base: Box::new(self),
            params,
        }
    }

    pub fn promise(inner: TypeName) -> Self {
        TypeName::simple("Promise").generic(vec![inner])
    }

    /// Render the expression, recording every symbol it mentions.
    pub fn render(&self, refs: &mut References) -> String {
        match self {
            TypeName::Simple(name) => name.clone(),
            TypeName::Symbol(symbol) => refs.symbol(symbol),
            TypeName::Union(members) => members
                .iter()
                .map(|m| m.render(refs))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeName::Array(inner) => match inner.as_ref() {
                TypeName::Union(_) => format!("({})[]", inner.render(refs)),
                _ => format!("{}[]", inner.render(refs)),
            },
            TypeName::Index { key, value } => {
                format!("{{ [key: {}]: {} }}", key.render(refs), value.render(refs))
            }
            TypeName::Generic { base, params } => {
                let params = params
                    .iter()
                    .map(|p| p.render(refs))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}<{}>", base.render(refs), params)
            }
        }
    }
}

impl From<Symbol> for TypeName {
    fn from(symbol: Symbol) -> Self {
        TypeName::Symbol(symbol)
    }
}

/// Symbols referenced by a piece of code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    pub imports: BTreeSet<Symbol>,
    pub helpers: BTreeSet<String>,
}

impl References {
    /// Record `symbol` and return the text to write in its place. Imported
    /// symbols get a placeholder that rendering turns into the final identifier.
    pub fn symbol(&mut self, symbol: &Symbol) -> String {
        match &symbol.origin {
            Origin::Local => {}
            Origin::Helper => {
                self.helpers.insert(symbol.name.clone());
            }
            Origin::Named(_) | Origin::Namespace(_) => {
                self.imports.insert(symbol.clone());
                return placeholder(symbol);
            }
        }
        symbol.name.clone()
    }

    pub fn merge(&mut self, other: &References) {
        self.imports.extend(other.imports.iter().cloned());
        self.helpers.extend(other.helpers.iter().cloned());
    }
}

fn placeholder(symbol: &Symbol) -> String {
    let (kind, module) = match &symbol.origin {
        Origin::Named(module) => ('n', module),
        Origin::Namespace(module) => ('s', module),
        Origin::Local | Origin::Helper => return symbol.name.clone(),
    };
    let (scope, path) = match module {
        Module::Package(path) => ('p', path),
        Module::Generated(path) => ('g', path),
    };
    format!(
        "{}{}{}{}{}{}{}",
        MARK_START, kind, scope, path, MARK_SPLIT, symbol.name, MARK_END
    )
}

fn parse_placeholder(marker: &str) -> Option<Symbol> {
    let mut chars = marker.chars();
    let kind = chars.next()?;
    let scope = chars.next()?;
    let (path, name) = chars.as_str().split_once(MARK_SPLIT)?;
    let module = match scope {
        'p' => Module::Package(path.to_string()),
        'g' => Module::Generated(path.to_string()),
        _ => return None,
    };
    let origin = match kind {
        'n' => Origin::Named(module),
        's' => Origin::Namespace(module),
        _ => return None,
    };
    Some(Symbol {
        name: name.to_string(),
        origin,
    })
}

/// Replace placeholders in `text` with the identifiers chosen in `names`,
/// falling back to each symbol's own name.
fn resolve(text: &str, names: &BTreeMap<Symbol, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(MARK_START) {
        out.push_str(&rest[..start]);
        let after = &rest[start + MARK_START.len_utf8()..];
        let Some(end) = after.find(MARK_END) else {
            out.push_str(&rest[start..]);
            return out;
        };
        if let Some(symbol) = parse_placeholder(&after[..end]) {
            match names.get(&symbol) {
                Some(name) => out.push_str(name),
                None => out.push_str(&symbol.name),
            }
        }
        rest = &after[end + MARK_END.len_utf8()..];
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Text(String),
    Doc(String),
    Blank,
    Indent,
    Dedent,
}

/// A sequence of statements with structured indentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlock {
    lines: Vec<Line>,
    refs: References,
}

impl CodeBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a symbol reference and return its identifier.
    pub fn sym(&mut self, symbol: &Symbol) -> String {
        self.refs.symbol(symbol)
    }

    /// Record a type reference and return its rendering.
    pub fn ty(&mut self, ty: &TypeName) -> String {
        ty.render(&mut self.refs)
    }

    /// A raw line, written as-is.
    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line::Text(text.into()));
        self
    }

    /// A statement; a trailing `;` is added.
    pub fn statement(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.lines.push(Line::Text(format!("{};", text.as_ref())));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(Line::Blank);
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.lines.push(Line::Indent);
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.lines.push(Line::Dedent);
        self
    }

    /// `header {` followed by an indented body.
    pub fn begin_control_flow(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.line(format!("{} {{", header.as_ref())).indent()
    }

    /// `} header {`, e.g. `} else {`.
    pub fn next_control_flow(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.dedent()
            .line(format!("}} {} {{", header.as_ref()))
            .indent()
    }

    pub fn end_control_flow(&mut self) -> &mut Self {
        self.dedent().line("}")
    }

    /// Open an arrow function body. `header` ends with the arrow, e.g.
    /// `items.forEach((e) =>`.
    pub fn begin_lambda(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.line(format!("{} {{", header.as_ref())).indent()
    }

    /// Close an arrow function: `}` followed by `suffix`, e.g. `});`.
    pub fn end_lambda(&mut self, suffix: impl AsRef<str>) -> &mut Self {
        self.dedent().line(format!("}}{}", suffix.as_ref()))
    }

    /// Append another block, including its references.
    pub fn add_code(&mut self, other: &CodeBlock) -> &mut Self {
        self.lines.extend(other.lines.iter().cloned());
        self.refs.merge(&other.refs);
        self
    }

    /// Append a JSDoc comment if `doc` is present.
    pub fn doc(&mut self, doc: Option<&str>) -> &mut Self {
        if let Some(doc) = doc {
            self.lines.push(Line::Doc(doc.to_string()));
        }
        self
    }

    pub fn references(&self) -> &References {
        &self.refs
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn write_to(&self, w: &mut CodeWriter<'_>, names: &BTreeMap<Symbol, String>) {
        for line in &self.lines {
            match line {
                Line::Text(text) => w.line(&resolve(text, names)),
                Line::Doc(text) => w.jsdoc(text),
                Line::Blank => w.blank(),
                Line::Indent => w.indent(),
                Line::Dedent => w.dedent(),
            }
        }
    }

    /// Lines joined without resolving placeholders, for embedding in
    /// another block.
    fn raw_text(&self) -> String {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Line::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render with two-space indentation. Imports keep their own names.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut CodeWriter::new(&mut out), &BTreeMap::new());
        out
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeName,
    pub default: Option<CodeBlock>,
}

/// How a function is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionStyle {
    /// `function name(...) { }` at module level.
    Function { exported: bool },
    /// `name(...) { }` inside a class body.
    Method,
    /// `name(...) { },` inside an object literal.
    HashEntry,
    /// `name(...): T;` inside an interface.
    Signature,
}

/// A function, method, or constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    pub doc: Option<String>,
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub returns: Option<TypeName>,
    pub body: CodeBlock,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        FunctionSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn constructor() -> Self {
        Self::new("constructor")
    }

    pub fn doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }

    pub fn type_param(mut self, param: impl Into<String>) -> Self {
        self.type_params.push(param.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty: ty.into(),
            default: None,
        });
        self
    }

    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        ty: impl Into<TypeName>,
        default: CodeBlock,
    ) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty: ty.into(),
            default: Some(default),
        });
        self
    }

    pub fn returns(mut self, ty: impl Into<TypeName>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    pub fn body(mut self, body: CodeBlock) -> Self {
        self.body = body;
        self
    }

    /// Lower this function into `out` using the given declaration style.
    pub fn emit(&self, style: FunctionStyle, out: &mut CodeBlock) {
        out.doc(self.doc.as_deref());

        let params = self
            .params
            .iter()
            .map(|p| {
                let ty = out.ty(&p.ty);
                match &p.default {
                    Some(default) => {
                        out.refs.merge(&default.refs);
                        format!("{}: {} = {}", p.name, ty, default.raw_text())
                    }
                    None => format!("{}: {}", p.name, ty),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let type_params = if self.type_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.type_params.join(", "))
        };
        let returns = match &self.returns {
            Some(ty) => format!(": {}", out.ty(ty)),
            None => String::new(),
        };
        let signature = format!("{}{}({}){}", self.name, type_params, params, returns);

        match style {
            FunctionStyle::Signature => {
                out.statement(signature);
            }
            FunctionStyle::Function { exported } => {
                let export = if exported { "export " } else { "" };
                out.begin_control_flow(format!("{}function {}", export, signature));
                out.add_code(&self.body);
                out.end_control_flow();
            }
            FunctionStyle::Method => {
                out.begin_control_flow(signature);
                out.add_code(&self.body);
                out.end_control_flow();
            }
            FunctionStyle::HashEntry => {
                out.begin_control_flow(signature);
                out.add_code(&self.body);
                out.dedent().line("},");
            }
        }
    }
}

/// A property of an interface or class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: String,
    pub ty: TypeName,
    pub doc: Option<String>,
    pub optional: bool,
    /// Modifiers such as `private readonly`, written before the name.
    pub modifiers: Vec<&'static str>,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        PropertySpec {
            name: name.into(),
            ty: ty.into(),
            doc: None,
            optional: false,
            modifiers: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn modifier(mut self, modifier: &'static str) -> Self {
        self.modifiers.push(modifier);
        self
    }

    fn emit(&self, out: &mut CodeBlock) {
        out.doc(self.doc.as_deref());
        let ty = out.ty(&self.ty);
        let mut decl = String::new();
        for modifier in &self.modifiers {
            decl.push_str(modifier);
            decl.push(' ');
        }
        decl.push_str(&self.name);
        if self.optional {
            decl.push('?');
        }
        out.statement(format!("{}: {}", decl, ty));
    }
}

/// `interface Name<T> { ... }`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceSpec {
    pub name: String,
    pub doc: Option<String>,
    pub exported: bool,
    pub type_params: Vec<String>,
    pub properties: Vec<PropertySpec>,
    pub methods: Vec<FunctionSpec>,
}

impl InterfaceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        InterfaceSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    pub fn doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }

    pub fn type_param(mut self, param: impl Into<String>) -> Self {
        self.type_params.push(param.into());
        self
    }

    pub fn property(mut self, property: PropertySpec) -> Self {
        self.properties.push(property);
        self
    }

    pub fn method(mut self, method: FunctionSpec) -> Self {
        self.methods.push(method);
        self
    }

    pub fn emit(&self, out: &mut CodeBlock) {
        out.doc(self.doc.as_deref());
        let export = if self.exported { "export " } else { "" };
        out.begin_control_flow(format!(
            "{}interface {}{}",
            export,
            self.name,
            type_params(&self.type_params)
        ));
        for property in &self.properties {
            property.emit(out);
        }
        for method in &self.methods {
            method.emit(FunctionStyle::Signature, out);
        }
        out.end_control_flow();
    }
}

/// `class Name<T> implements I { ... }`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSpec {
    pub name: String,
    pub doc: Option<String>,
    pub exported: bool,
    pub type_params: Vec<String>,
    pub implements: Vec<TypeName>,
    pub properties: Vec<PropertySpec>,
    pub constructor: Option<FunctionSpec>,
    pub methods: Vec<FunctionSpec>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        ClassSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    pub fn type_param(mut self, param: impl Into<String>) -> Self {
        self.type_params.push(param.into());
        self
    }

    pub fn implements(mut self, ty: impl Into<TypeName>) -> Self {
        self.implements.push(ty.into());
        self
    }

    pub fn property(mut self, property: PropertySpec) -> Self {
        self.properties.push(property);
        self
    }

    pub fn constructor(mut self, constructor: FunctionSpec) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn method(mut self, method: FunctionSpec) -> Self {
        self.methods.push(method);
        self
    }

    pub fn emit(&self, out: &mut CodeBlock) {
        out.doc(self.doc.as_deref());
        let export = if self.exported { "export " } else { "" };
        let implements = if self.implements.is_empty() {
            String::new()
        } else {
            let names = self
                .implements
                .iter()
                .map(|t| out.ty(t))
                .collect::<Vec<_>>()
                .join(", ");
            format!(" implements {}", names)
        };
        out.begin_control_flow(format!(
            "{}class {}{}{}",
            export,
            self.name,
            type_params(&self.type_params),
            implements
        ));

        let mut first = true;
        for property in &self.properties {
            property.emit(out);
            first = false;
        }
        for function in self.constructor.iter().chain(self.methods.iter()) {
            if !first {
                out.blank();
            }
            function.emit(FunctionStyle::Method, out);
            first = false;
        }
        out.end_control_flow();
    }
}

fn type_params(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Interface(InterfaceSpec),
    Class(ClassSpec),
    Function { spec: FunctionSpec, exported: bool },
    Code(CodeBlock),
}

impl Item {
    /// The identifier this item declares, when it has a single one.
    fn declared_name(&self) -> Option<&str> {
        match self {
            Item::Interface(spec) => Some(&spec.name),
            Item::Class(spec) => Some(&spec.name),
            Item::Function { spec, .. } => Some(&spec.name),
            Item::Code(_) => None,
        }
    }

    fn lower(&self) -> CodeBlock {
        let mut out = CodeBlock::new();
        match self {
            Item::Interface(spec) => spec.emit(&mut out),
            Item::Class(spec) => spec.emit(&mut out),
            Item::Function { spec, exported } => spec.emit(
                FunctionStyle::Function {
                    exported: *exported,
                },
                &mut out,
            ),
            Item::Code(code) => {
                out.add_code(code);
            }
        }
        out
    }
}

/// One generated TypeScript unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSpec {
    /// Module path without extension, e.g. `google/protobuf/timestamp`.
    pub module: String,
    pub header: Option<String>,
    pub items: Vec<Item>,
    /// Identifiers declared by `Code` items, such as enum and codec consts.
    /// Imports that collide with them are aliased.
    pub declared: BTreeSet<String>,
}

impl FileSpec {
    pub fn new(module: impl Into<String>) -> Self {
        FileSpec {
            module: module.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }

    /// Every symbol referenced by the items added so far.
    pub fn references(&self) -> References {
        let mut refs = References::default();
        for item in &self.items {
            refs.merge(&item.lower().refs);
        }
        refs
    }

    /// Render the unit: header comment, imports, then each item separated by a
    /// blank line.
    pub fn render(&self) -> String {
        let lowered: Vec<CodeBlock> = self.items.iter().map(Item::lower).collect();
        let mut refs = References::default();
        for block in &lowered {
            refs.merge(&block.refs);
        }
        let names = self.import_names(&refs);

        let mut out = String::new();
        let mut w = CodeWriter::new(&mut out);
        self.write_header(&mut w, &refs, &names);
        for (i, block) in lowered.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            block.write_to(&mut w, &names);
        }
        out
    }

    fn is_import(&self, symbol: &Symbol) -> bool {
        match &symbol.origin {
            Origin::Named(Module::Generated(path)) => *path != self.module,
            Origin::Named(_) | Origin::Namespace(_) => true,
            Origin::Local | Origin::Helper => false,
        }
    }

    /// The local identifier of every imported symbol. A name already taken by
    /// a declaration in this unit or by an earlier import gets a numeric
    /// suffix (`Foo1`, `Foo2`, ...).
    fn import_names(&self, refs: &References) -> BTreeMap<Symbol, String> {
        let mut taken: BTreeSet<String> = self.declared.clone();
        taken.extend(self.items.iter().filter_map(|i| i.declared_name().map(String::from)));
        taken.extend(refs.helpers.iter().cloned());
        taken.extend(
            refs.imports
                .iter()
                .filter(|s| !self.is_import(s))
                .map(|s| s.name.clone()),
        );

        let mut names = BTreeMap::new();
        for symbol in refs.imports.iter().filter(|s| self.is_import(s)) {
            let mut name = symbol.name.clone();
            let mut suffix = 1;
            while taken.contains(&name) {
                name = format!("{}{}", symbol.name, suffix);
                suffix += 1;
            }
            taken.insert(name.clone());
            names.insert(symbol.clone(), name);
        }
        names
    }

    fn write_header(
        &self,
        w: &mut CodeWriter<'_>,
        refs: &References,
        names: &BTreeMap<Symbol, String>,
    ) {
        if let Some(header) = &self.header {
            w.line_comment(header);
        }

        // Package imports come before imports of other generated units.
        // (relative, specifier) -> (namespace imports, named imports)
        type Imports = (BTreeSet<String>, BTreeSet<String>);
        let mut by_module: BTreeMap<(bool, String), Imports> = BTreeMap::new();
        for symbol in refs.imports.iter().filter(|s| self.is_import(s)) {
            let local = names.get(symbol).unwrap_or(&symbol.name);
            let (module, namespace) = match &symbol.origin {
                Origin::Named(m) => (m, false),
                Origin::Namespace(m) => (m, true),
                Origin::Local | Origin::Helper => continue,
            };
            let key = match module {
                Module::Package(name) => (false, name.clone()),
                Module::Generated(path) => (true, relative_module(&self.module, path)),
            };
            let entry = by_module.entry(key).or_default();
            if namespace {
                entry.0.insert(local.clone());
            } else if *local == symbol.name {
                entry.1.insert(local.clone());
            } else {
                entry.1.insert(format!("{} as {}", symbol.name, local));
            }
        }

        for ((_, specifier), (namespaces, named)) in &by_module {
            for name in namespaces {
                w.line(&format!("import * as {} from '{}';", name, specifier));
            }
            if !named.is_empty() {
                let named = named.iter().cloned().collect::<Vec<_>>().join(", ");
                w.line(&format!("import {{ {} }} from '{}';", named, specifier));
            }
        }

        if self.header.is_some() || !by_module.is_empty() {
            w.blank();
        }
    }
}

/// Relative import specifier from unit `from` to unit `to` (both paths without
/// extension, `/`-separated).
pub fn relative_module(from: &str, to: &str) -> String {
    let from_dir: Vec<&str> = {
        let mut parts: Vec<&str> = from.split('/').collect();
        parts.pop();
        parts
    };
    let to_parts: Vec<&str> = to.split('/').collect();
    let (to_dir, to_file) = to_parts.split_at(to_parts.len() - 1);

    let common = from_dir
        .iter()
        .zip(to_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = Vec::new();
    let ups = from_dir.len() - common;
    for _ in 0..ups {
        segments.push("..");
    }
    segments.extend_from_slice(&to_dir[common..]);
    segments.extend_from_slice(to_file);

    let joined = segments.join("/");
    if ups == 0 {
        format!("./{}", joined)
    } else {
        joined
    }
}

//! Syntax of the parts of a Go file that describe types.

/// A parsed source file: package clause, imports and type declarations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct File {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub types: Vec<TypeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit name: an alias, `_` or `.`.
    pub name: Option<String>,
    pub path: String,
}

/// `type Name[TypeParams] Type` or `type Name = Type`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub type_params: Vec<Field>,
    pub alias: bool,
    pub ty: Expr,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Qualified { package: String, name: String },
    /// A generic type with type arguments, `List[int]`.
    Instance { base: Box<Expr>, args: Vec<Expr> },
    Pointer(Box<Expr>),
    Slice(Box<Expr>),
    /// `[N]T`; the length is kept as source text.
    Array { len: String, elem: Box<Expr> },
    Map { key: Box<Expr>, value: Box<Expr> },
    Chan { dir: ChanDir, elem: Box<Expr> },
    Func(FuncType),
    Struct(Vec<Field>),
    Interface(Vec<InterfaceElem>),
    /// A constraint union `~int | string`; a single `~T` is a one-term union.
    Union(Vec<Term>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A struct field or a type parameter group.
///
/// `names` is empty for embedded struct fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: Expr,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: Expr,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceElem {
    Method { name: String, sig: FuncType },
    Embed(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub tilde: bool,
    pub ty: Expr,
}

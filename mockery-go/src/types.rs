//! Resolved Go types.
//!
//! Identifiers are bound to their declaring package, so a type can be
//! printed in any file once a qualifier is chosen for each package.

use std::collections::HashMap;

pub use crate::ast::ChanDir;

/// Import path and declared name of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageRef {
    pub path: String,
    pub name: String,
}

impl PackageRef {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// A predeclared basic type such as `int` or `string`, or
    /// `unsafe.Pointer`.
    Basic(String),
    Named(Named),
    TypeParam(String),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array { len: String, elem: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Chan { dir: ChanDir, elem: Box<Type> },
    Signature(Signature),
    Struct(Vec<StructField>),
    Interface(InterfaceType),
    Union(Vec<Term>),
}

/// A declared type, optionally instantiated with type arguments.
///
/// Universe types (`error`, `any`, `comparable`) have no package.
#[derive(Debug, Clone, PartialEq)]
pub struct Named {
    pub package: Option<PackageRef>,
    pub name: String,
    pub args: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub ty: Type,
}

/// A function signature. When `variadic` is set the last parameter's type
/// is a slice of the variadic element type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Var>,
    pub results: Vec<Var>,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    /// `None` for embedded fields.
    pub name: Option<String>,
    pub ty: Type,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterfaceType {
    pub methods: Vec<Method>,
    pub embeds: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub sig: Signature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub tilde: bool,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub constraint: Type,
}

pub const UNSAFE_POINTER: &str = "unsafe.Pointer";

const BASIC_TYPES: &[&str] = &[
    "bool",
    "byte",
    "complex64",
    "complex128",
    "float32",
    "float64",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "rune",
    "string",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
];

/// Whether `name` is a predeclared basic type.
pub fn is_basic(name: &str) -> bool {
    BASIC_TYPES.contains(&name)
}

/// Predeclared non-basic type names.
pub fn is_universe(name: &str) -> bool {
    matches!(name, "error" | "any" | "comparable")
}

impl Type {
    pub fn named(package: Option<PackageRef>, name: impl Into<String>) -> Self {
        Type::Named(Named {
            package,
            name: name.into(),
            args: Vec::new(),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Named(Named { package: None, name, .. }) if name == "error")
    }

    /// Replace type parameters by the types in `args`.
    pub fn substitute(&self, args: &HashMap<String, Type>) -> Type {
        if args.is_empty() {
            return self.clone();
        }
        let sub = |t: &Type| Box::new(t.substitute(args));
        match self {
            Type::TypeParam(name) => args.get(name).cloned().unwrap_or_else(|| self.clone()),
            Type::Basic(_) => self.clone(),
            Type::Named(named) => Type::Named(Named {
                package: named.package.clone(),
                name: named.name.clone(),
                args: named.args.iter().map(|a| a.substitute(args)).collect(),
            }),
            Type::Pointer(elem) => Type::Pointer(sub(elem)),
            Type::Slice(elem) => Type::Slice(sub(elem)),
            Type::Array { len, elem } => Type::Array {
                len: len.clone(),
                elem: sub(elem),
            },
            Type::Map { key, value } => Type::Map {
                key: sub(key),
                value: sub(value),
            },
            Type::Chan { dir, elem } => Type::Chan {
                dir: *dir,
                elem: sub(elem),
            },
            Type::Signature(sig) => Type::Signature(sig.substitute(args)),
            Type::Struct(fields) => Type::Struct(
                fields
                    .iter()
                    .map(|f| StructField {
                        name: f.name.clone(),
                        ty: f.ty.substitute(args),
                        tag: f.tag.clone(),
                    })
                    .collect(),
            ),
            Type::Interface(iface) => Type::Interface(InterfaceType {
                methods: iface
                    .methods
                    .iter()
                    .map(|m| Method {
                        name: m.name.clone(),
                        sig: m.sig.substitute(args),
                    })
                    .collect(),
                embeds: iface.embeds.iter().map(|e| e.substitute(args)).collect(),
            }),
            Type::Union(terms) => Type::Union(
                terms
                    .iter()
                    .map(|t| Term {
                        tilde: t.tilde,
                        ty: t.ty.substitute(args),
                    })
                    .collect(),
            ),
        }
    }

    /// Visit this type and every type nested in it, parents first.
    pub fn walk<'t>(&'t self, visit: &mut impl FnMut(&'t Type)) {
        visit(self);
        match self {
            Type::Basic(_) | Type::TypeParam(_) => {}
            Type::Named(named) => named.args.iter().for_each(|a| a.walk(visit)),
            Type::Pointer(elem) | Type::Slice(elem) => elem.walk(visit),
            Type::Array { elem, .. } | Type::Chan { elem, .. } => elem.walk(visit),
            Type::Map { key, value } => {
                key.walk(visit);
                value.walk(visit);
            }
            Type::Signature(sig) => sig.walk(visit),
            Type::Struct(fields) => fields.iter().for_each(|f| f.ty.walk(visit)),
            Type::Interface(iface) => {
                iface.methods.iter().for_each(|m| m.sig.walk(visit));
                iface.embeds.iter().for_each(|e| e.walk(visit));
            }
            Type::Union(terms) => terms.iter().for_each(|t| t.ty.walk(visit)),
        }
    }
}

impl Signature {
    pub fn substitute(&self, args: &HashMap<String, Type>) -> Signature {
        let vars = |vars: &[Var]| {
            vars.iter()
                .map(|v| Var {
                    name: v.name.clone(),
                    ty: v.ty.substitute(args),
                })
                .collect()
        };
        Signature {
            params: vars(&self.params),
            results: vars(&self.results),
            variadic: self.variadic,
        }
    }

    pub fn walk<'t>(&'t self, visit: &mut impl FnMut(&'t Type)) {
        self.params
            .iter()
            .chain(self.results.iter())
            .for_each(|v| v.ty.walk(visit));
    }
}

/// Bind type parameter names to arguments, pairing them in order.
pub fn bindings(params: &[TypeParam], args: &[Type]) -> HashMap<String, Type> {
    params
        .iter()
        .zip(args.iter())
        .map(|(p, a)| (p.name.clone(), a.clone()))
        .collect()
}

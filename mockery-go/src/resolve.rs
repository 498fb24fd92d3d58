//! Name resolution from syntax to [`Type`]s.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use crate::{
    ast::{self, Expr, FuncType, InterfaceElem},
    loader::PackageLoader,
    package::TypeDecl,
    types::{
        InterfaceType, Method, Named, PackageRef, Signature, StructField, Term, Type, TypeParam,
        UNSAFE_POINTER, Var, is_basic, is_universe,
    },
};

/// Identifiers visible in one source file.
pub(crate) struct FileScope<'a> {
    package: &'a PackageRef,
    local: &'a HashSet<String>,
    imports: HashMap<String, PackageRef>,
    dot_imports: Vec<PackageRef>,
    type_params: HashSet<String>,
    loader: &'a dyn PackageLoader,
    errors: Vec<String>,
}

impl<'a> FileScope<'a> {
    pub(crate) fn new(
        file: &ast::File,
        package: &'a PackageRef,
        local: &'a HashSet<String>,
        loader: &'a dyn PackageLoader,
    ) -> Self {
        let mut imports = HashMap::new();
        let mut dot_imports = Vec::new();
        for spec in &file.imports {
            let name = loader.package_name(&spec.path);
            let package = PackageRef::new(spec.path.clone(), name.clone());
            match spec.name.as_deref() {
                Some("_") => {}
                Some(".") => dot_imports.push(package),
                Some(alias) => {
                    imports.insert(alias.to_string(), package);
                }
                None => {
                    imports.insert(name, package);
                }
            }
        }

        Self {
            package,
            local,
            imports,
            dot_imports,
            type_params: HashSet::new(),
            loader,
            errors: Vec::new(),
        }
    }

    pub(crate) fn into_errors(self) -> Vec<String> {
        self.errors
    }

    pub(crate) fn decl(&mut self, spec: &ast::TypeSpec, file: &Path) -> TypeDecl {
        self.type_params = spec
            .type_params
            .iter()
            .flat_map(|group| group.names.iter().cloned())
            .collect();

        let mut type_params = Vec::new();
        for group in &spec.type_params {
            let constraint = self.ty(&group.ty);
            for name in &group.names {
                type_params.push(TypeParam {
                    name: name.clone(),
                    constraint: constraint.clone(),
                });
            }
        }
        let ty = self.ty(&spec.ty);
        self.type_params.clear();

        TypeDecl {
            name: spec.name.clone(),
            file: file.to_path_buf(),
            generated: false,
            type_params,
            alias: spec.alias,
            ty,
        }
    }

    fn ty(&mut self, expr: &Expr) -> Type {
        let boxed = |scope: &mut Self, e: &Expr| Box::new(scope.ty(e));
        match expr {
            Expr::Ident(name) => self.ident(name),
            Expr::Qualified { package, name } => self.qualified(package, name),
            Expr::Instance { base, args } => {
                let args: Vec<Type> = args.iter().map(|a| self.ty(a)).collect();
                match self.ty(base) {
                    Type::Named(named) => Type::Named(Named { args, ..named }),
                    other => {
                        self.errors
                            .push(format!("{other:?} is not a generic type"));
                        other
                    }
                }
            }
            Expr::Pointer(elem) => Type::Pointer(boxed(self, elem)),
            Expr::Slice(elem) => Type::Slice(boxed(self, elem)),
            Expr::Array { len, elem } => Type::Array {
                len: len.clone(),
                elem: boxed(self, elem),
            },
            Expr::Map { key, value } => Type::Map {
                key: boxed(self, key),
                value: boxed(self, value),
            },
            Expr::Chan { dir, elem } => Type::Chan {
                dir: *dir,
                elem: boxed(self, elem),
            },
            Expr::Func(func) => Type::Signature(self.signature(func)),
            Expr::Struct(fields) => Type::Struct(
                fields
                    .iter()
                    .flat_map(|field| {
                        let ty = self.ty(&field.ty);
                        let names: Vec<Option<String>> = if field.names.is_empty() {
                            vec![None]
                        } else {
                            field.names.iter().cloned().map(Some).collect()
                        };
                        names
                            .into_iter()
                            .map(|name| StructField {
                                name,
                                ty: ty.clone(),
                                tag: field.tag.clone(),
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect(),
            ),
            Expr::Interface(elems) => {
                let mut iface = InterfaceType::default();
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { name, sig } => iface.methods.push(Method {
                            name: name.clone(),
                            sig: self.signature(sig),
                        }),
                        InterfaceElem::Embed(expr) => iface.embeds.push(self.ty(expr)),
                    }
                }
                Type::Interface(iface)
            }
            Expr::Union(terms) => Type::Union(
                terms
                    .iter()
                    .map(|t| Term {
                        tilde: t.tilde,
                        ty: self.ty(&t.ty),
                    })
                    .collect(),
            ),
        }
    }

    fn signature(&mut self, func: &FuncType) -> Signature {
        let vars = |scope: &mut Self, params: &[ast::Param]| -> Vec<Var> {
            params
                .iter()
                .map(|p| {
                    let ty = scope.ty(&p.ty);
                    Var {
                        name: p.name.clone().unwrap_or_default(),
                        ty: if p.variadic {
                            Type::Slice(Box::new(ty))
                        } else {
                            ty
                        },
                    }
                })
                .collect()
        };
        Signature {
            params: vars(self, &func.params),
            results: vars(self, &func.results),
            variadic: func.params.last().is_some_and(|p| p.variadic),
        }
    }

    fn ident(&self, name: &str) -> Type {
        if self.type_params.contains(name) {
            return Type::TypeParam(name.to_string());
        }
        if self.local.contains(name) {
            return Type::named(Some(self.package.clone()), name);
        }
        if is_basic(name) {
            return Type::Basic(name.to_string());
        }
        if is_universe(name) {
            return Type::named(None, name);
        }
        let loader = self.loader;
        if let Some(package) = self.dot_imports.iter().find(|p| {
            loader
                .load(&p.path)
                .is_ok_and(|pkg| pkg.lookup(name).is_some())
        }) {
            return Type::named(Some(package.clone()), name);
        }
        // Declared in a file excluded by build constraints.
        Type::named(Some(self.package.clone()), name)
    }

    fn qualified(&mut self, qualifier: &str, name: &str) -> Type {
        match self.imports.get(qualifier) {
            Some(package) if package.path == "unsafe" && name == "Pointer" => {
                Type::Basic(UNSAFE_POINTER.to_string())
            }
            Some(package) => Type::named(Some(package.clone()), name),
            None => {
                self.errors.push(format!("undefined: {qualifier}"));
                Type::named(Some(PackageRef::new(qualifier, qualifier)), name)
            }
        }
    }
}

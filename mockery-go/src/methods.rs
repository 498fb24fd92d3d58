//! Interface discovery and method-set computation.

use std::{collections::BTreeMap, path::PathBuf};

use mockery_core::{Error, Result};
use tracing::{debug, trace};

use crate::{
    loader::PackageLoader,
    package::Package,
    types::{InterfaceType, Method, Named, Signature, Type, TypeParam, Var, bindings},
};

/// Embedding chains longer than this are treated as cycles.
const MAX_DEPTH: usize = 32;

/// A mockable interface declared in a package.
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub name: String,
    pub file: PathBuf,
    pub type_params: Vec<TypeParam>,
    /// Full method set, embedded interfaces included, sorted by name.
    pub methods: Vec<Method>,
}

/// The named interfaces of `package`, in declaration order.
///
/// A declaration qualifies when its right-hand side is an interface literal
/// or an instantiated generic type whose underlying type is an interface.
/// Aliases never qualify. Declarations from generated files are skipped
/// unless `include_auto_generated` is set.
pub fn interfaces(
    package: &Package,
    loader: &dyn PackageLoader,
    include_auto_generated: bool,
) -> Result<Vec<Interface>> {
    let mut found = Vec::new();
    for decl in &package.decls {
        if decl.alias {
            continue;
        }
        if decl.generated && !include_auto_generated {
            trace!(interface = %decl.name, "skipping declaration in generated file");
            continue;
        }

        let iface = match &decl.ty {
            Type::Interface(iface) => iface.clone(),
            Type::Named(named) if !named.args.is_empty() => {
                match underlying_interface(named, package, loader, 0)? {
                    Some(iface) => iface,
                    None => continue,
                }
            }
            _ => continue,
        };

        let methods = method_set(&iface, package, loader)?;
        found.push(Interface {
            name: decl.name.clone(),
            file: decl.file.clone(),
            type_params: decl.type_params.clone(),
            methods,
        });
    }
    debug!(package = %package.path, count = found.len(), "discovered interfaces");
    Ok(found)
}

/// Methods of `iface` and of everything it embeds, sorted by name.
pub fn method_set(
    iface: &InterfaceType,
    home: &Package,
    loader: &dyn PackageLoader,
) -> Result<Vec<Method>> {
    let mut methods = BTreeMap::new();
    collect(iface, home, loader, &mut methods, 0)?;
    Ok(methods.into_values().collect())
}

fn collect(
    iface: &InterfaceType,
    home: &Package,
    loader: &dyn PackageLoader,
    methods: &mut BTreeMap<String, Method>,
    depth: usize,
) -> Result<()> {
    for method in &iface.methods {
        methods
            .entry(method.name.clone())
            .or_insert_with(|| method.clone());
    }
    for embed in &iface.embeds {
        // Unions and other type-set terms contribute no methods.
        let Type::Named(named) = embed else {
            continue;
        };
        if let Some(embedded) = underlying_interface(named, home, loader, depth + 1)? {
            collect(&embedded, home, loader, methods, depth + 1)?;
        }
    }
    Ok(())
}

/// The interface underlying a named type, with type arguments substituted.
///
/// `None` when the type is not an interface.
fn underlying_interface(
    named: &Named,
    home: &Package,
    loader: &dyn PackageLoader,
    depth: usize,
) -> Result<Option<InterfaceType>> {
    if depth > MAX_DEPTH {
        return Err(Error::package_load(
            &home.path,
            format!("interface {} embeds itself", named.name),
        ));
    }

    let Some(package) = &named.package else {
        return Ok(match named.name.as_str() {
            "error" => Some(error_interface()),
            "any" | "comparable" => Some(InterfaceType::default()),
            _ => None,
        });
    };

    let loaded;
    let owner = if package.path == home.path {
        home
    } else {
        loaded = loader.load(&package.path)?;
        &*loaded
    };
    let Some(decl) = owner.lookup(&named.name) else {
        return Err(Error::package_load(
            &package.path,
            format!("undefined: {}", named.name),
        ));
    };

    let ty = decl.ty.substitute(&bindings(&decl.type_params, &named.args));
    match ty {
        Type::Interface(iface) => Ok(Some(iface)),
        Type::Named(inner) => underlying_interface(&inner, owner, loader, depth + 1),
        _ => Ok(None),
    }
}

/// `interface { Error() string }`
fn error_interface() -> InterfaceType {
    InterfaceType {
        methods: vec![Method {
            name: "Error".to_string(),
            sig: Signature {
                params: Vec::new(),
                results: vec![Var {
                    name: String::new(),
                    ty: Type::Basic("string".to_string()),
                }],
                variadic: false,
            },
        }],
        embeds: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, rc::Rc};

    use super::*;
    use crate::testing::MapLoader;

    fn load(loader: &MapLoader, path: &str) -> Rc<Package> {
        loader.load(path).unwrap()
    }

    fn names(methods: &[Method]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_discovers_interfaces_in_declaration_order() {
        let mut loader = MapLoader::default();
        loader.insert(
            "example.com/app",
            r#"package app

type Zeta interface{ Z() }

type config struct{}

type Alpha interface{ A() }

type Alias = Alpha

type Func func()
"#,
        );
        let pkg = load(&loader, "example.com/app");
        let found = interfaces(&pkg, &loader, false).unwrap();
        let found: Vec<&str> = found.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(found, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_embedded_methods_are_flattened_and_sorted() {
        let mut loader = MapLoader::default();
        loader.insert(
            "example.com/io",
            "package io\n\ntype Reader interface{ Read(p []byte) (n int, err error) }\n",
        );
        loader.insert(
            "example.com/app",
            r#"package app

import "example.com/io"

type Closer interface{ Close() error }

type ReadCloser interface {
    io.Reader
    Closer
    error
    Name() string
}
"#,
        );
        let pkg = load(&loader, "example.com/app");
        let found = interfaces(&pkg, &loader, false).unwrap();
        let rc = found.iter().find(|i| i.name == "ReadCloser").unwrap();
        assert_eq!(names(&rc.methods), vec!["Close", "Error", "Name", "Read"]);
    }

    #[test]
    fn test_generic_embedding_substitutes_arguments() {
        let mut loader = MapLoader::default();
        loader.insert(
            "example.com/app",
            r#"package app

type Getter[T any] interface{ Get() T }

type IntGetter Getter[int]

type Store[K comparable, V any] interface {
    Getter[V]
    Put(K, V)
}
"#,
        );
        let pkg = load(&loader, "example.com/app");
        let found = interfaces(&pkg, &loader, false).unwrap();
        assert_eq!(found.len(), 3);

        let int_getter = &found[1];
        assert_eq!(int_getter.name, "IntGetter");
        assert!(int_getter.type_params.is_empty());
        assert_eq!(
            int_getter.methods[0].sig.results[0].ty,
            Type::Basic("int".into())
        );

        let store = &found[2];
        assert_eq!(names(&store.methods), vec!["Get", "Put"]);
        assert_eq!(
            store.methods[0].sig.results[0].ty,
            Type::TypeParam("V".into())
        );
    }

    #[test]
    fn test_generated_declarations_need_opt_in() {
        let mut loader = MapLoader::default();
        loader.insert(
            "example.com/gen",
            "// Code generated by protoc. DO NOT EDIT.\n\npackage gen\n\ntype Client interface{ Call() }\n",
        );
        let pkg = load(&loader, "example.com/gen");
        assert!(interfaces(&pkg, &loader, false).unwrap().is_empty());
        assert_eq!(interfaces(&pkg, &loader, true).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_embedded_package_fails() {
        let loader = MapLoader::default();
        let src = "package app\n\nimport \"example.com/gone\"\n\ntype A interface{ gone.B }\n";
        let pkg = Package::build(
            "example.com/app",
            Path::new("app"),
            &[(PathBuf::from("a.go"), src.to_string())],
            &loader,
        )
        .unwrap();
        let err = interfaces(&pkg, &loader, false).unwrap_err();
        assert!(err.to_string().contains("example.com/gone"));
    }

    #[test]
    fn test_self_embedding_is_reported() {
        let mut loader = MapLoader::default();
        loader.insert(
            "example.com/app",
            "package app\n\ntype A interface{ B }\n\ntype B interface{ A }\n",
        );
        let pkg = load(&loader, "example.com/app");
        let err = interfaces(&pkg, &loader, false).unwrap_err();
        assert!(err.to_string().contains("embeds itself"));
    }
}

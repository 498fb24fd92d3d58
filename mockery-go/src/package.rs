use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use mockery_core::{Error, Result};
use tracing::debug;

use crate::{
    constraint::is_generated,
    loader::PackageLoader,
    parser::parse_file,
    resolve::FileScope,
    types::{PackageRef, Type, TypeParam},
};

/// A loaded Go package: its buildable files and resolved type declarations.
#[derive(Debug, Clone)]
pub struct Package {
    pub path: String,
    pub name: String,
    pub dir: PathBuf,
    pub files: Vec<SourceFile>,
    pub decls: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Carries a `Code generated ... DO NOT EDIT.` header.
    pub generated: bool,
}

/// A package-level `type` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub file: PathBuf,
    pub generated: bool,
    pub type_params: Vec<TypeParam>,
    pub alias: bool,
    pub ty: Type,
}

impl Package {
    /// Parse and resolve the given sources as one package.
    ///
    /// Syntax and resolution errors of all files are collected into a single
    /// [`Error::PackageLoad`]. Zero sources is a valid, empty package.
    pub fn build(
        path: &str,
        dir: &Path,
        sources: &[(PathBuf, String)],
        loader: &dyn PackageLoader,
    ) -> Result<Package> {
        let mut errors = Vec::new();
        let mut parsed = Vec::new();
        for (file, src) in sources {
            match parse_file(src) {
                Ok(ast) => parsed.push((file, src, ast)),
                Err(e) => {
                    let (line, col) = e.line_col(src);
                    errors.push(format!("{}:{line}:{col}: {}", file.display(), e.message));
                }
            }
        }

        let name = match parsed.first() {
            Some((_, _, ast)) => ast.package.clone(),
            None => loader.package_name(path),
        };
        for (file, _, ast) in &parsed {
            if ast.package != name {
                errors.push(format!(
                    "{}: found package {} (expected {name})",
                    file.display(),
                    ast.package
                ));
            }
        }
        if !errors.is_empty() {
            return Err(Error::package_load(path, errors.join("\n")));
        }

        let package = PackageRef::new(path, name.clone());
        let local: HashSet<String> = parsed
            .iter()
            .flat_map(|(_, _, ast)| ast.types.iter().map(|t| t.name.clone()))
            .collect();

        let mut files = Vec::new();
        let mut decls = Vec::new();
        for (file, src, ast) in &parsed {
            let generated = is_generated(src);
            let mut scope = FileScope::new(ast, &package, &local, loader);
            for spec in &ast.types {
                let mut decl = scope.decl(spec, file);
                decl.generated = generated;
                decls.push(decl);
            }
            errors.extend(
                scope
                    .into_errors()
                    .into_iter()
                    .map(|e| format!("{}: {e}", file.display())),
            );
            files.push(SourceFile {
                path: (*file).clone(),
                generated,
            });
        }
        if !errors.is_empty() {
            return Err(Error::package_load(path, errors.join("\n")));
        }

        debug!(package = path, files = files.len(), types = decls.len(), "built package");
        Ok(Package {
            path: path.to_string(),
            name,
            dir: dir.to_path_buf(),
            files,
            decls,
        })
    }

    pub fn package_ref(&self) -> PackageRef {
        PackageRef::new(self.path.clone(), self.name.clone())
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeDecl> {
        self.decls.iter().find(|d| d.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MapLoader;

    fn build(sources: &[(&str, &str)]) -> Result<Package> {
        let sources: Vec<(PathBuf, String)> = sources
            .iter()
            .map(|(f, s)| (PathBuf::from(f), s.to_string()))
            .collect();
        Package::build(
            "example.com/svc",
            Path::new("svc"),
            &sources,
            &MapLoader::default(),
        )
    }

    #[test]
    fn test_builds_declarations_from_all_files() {
        let pkg = build(&[
            ("a.go", "package svc\n\ntype A interface{ B() B }\n"),
            ("b.go", "package svc\n\ntype B struct{}\n"),
        ])
        .unwrap();

        assert_eq!(pkg.name, "svc");
        assert_eq!(pkg.files.len(), 2);
        let a = pkg.lookup("A").unwrap();
        assert_eq!(a.file, PathBuf::from("a.go"));
        let Type::Interface(iface) = &a.ty else {
            panic!("expected interface, got {:?}", a.ty);
        };
        assert_eq!(
            iface.methods[0].sig.results[0].ty,
            Type::named(Some(PackageRef::new("example.com/svc", "svc")), "B")
        );
    }

    #[test]
    fn test_parse_errors_are_aggregated() {
        let err = build(&[
            ("a.go", "package svc\n\ntype A interface{\n"),
            ("b.go", "package svc\n\ntype = 1\n"),
        ])
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("example.com/svc"), "{message}");
        assert!(message.contains("a.go:"), "{message}");
        assert!(message.contains("b.go:3:6"), "{message}");
    }

    #[test]
    fn test_mixed_package_names_fail() {
        let err = build(&[
            ("a.go", "package svc\n"),
            ("b.go", "package other\n"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("found package other"));
    }

    #[test]
    fn test_empty_package() {
        let pkg = build(&[]).unwrap();
        assert!(pkg.is_empty());
        assert_eq!(pkg.name, "svc");
    }

    #[test]
    fn test_generated_files_are_marked() {
        let pkg = build(&[(
            "zz_gen.go",
            "// Code generated by tool. DO NOT EDIT.\n\npackage svc\n\ntype G interface{}\n",
        )])
        .unwrap();
        assert!(pkg.files[0].generated);
        assert!(pkg.lookup("G").unwrap().generated);
    }
}

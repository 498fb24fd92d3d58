//! Per-file import tracking with collision-free qualifiers.

use std::collections::HashMap;

use indexmap::IndexMap;
use mockery_go::PackageRef;
use serde::Serialize;
use tracing::trace;

/// An imported package and the qualifier the generated file uses for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Import {
    pub path: String,
    /// Declared package name.
    pub name: String,
    /// Set when `name` was already taken by another import.
    pub alias: Option<String>,
    pub qualifier: String,
    pub import_statement: String,
}

impl Import {
    fn new(package: &PackageRef, alias: Option<String>) -> Self {
        let qualifier = alias.clone().unwrap_or_else(|| package.name.clone());
        let import_statement = match &alias {
            Some(alias) => format!("{alias} \"{}\"", package.path),
            None => format!("\"{}\"", package.path),
        };
        Self {
            path: package.path.clone(),
            name: package.name.clone(),
            alias,
            qualifier,
            import_statement,
        }
    }
}

/// Imports of one output file.
///
/// With [`ImportRegistry::in_package`] the source package itself is never
/// imported and its types print unqualified.
#[derive(Debug, Clone, Default)]
pub struct ImportRegistry {
    hidden: Option<String>,
    imports: IndexMap<String, Import>,
    /// Qualifier to import path.
    qualifiers: HashMap<String, String>,
}

impl ImportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry for a file generated inside `package`.
    pub fn in_package(package: &PackageRef) -> Self {
        Self {
            hidden: Some(package.path.clone()),
            ..Self::default()
        }
    }

    pub fn is_in_package(&self) -> bool {
        self.hidden.is_some()
    }

    /// Register `package`, returning its entry.
    ///
    /// Returns `None` for the source package of an in-package file. A path
    /// already registered returns the existing entry.
    pub fn add(&mut self, package: &PackageRef) -> Option<&Import> {
        if self.hidden.as_deref() == Some(package.path.as_str()) {
            return None;
        }
        if !self.imports.contains_key(&package.path) {
            let alias = self.free_alias(&package.name);
            let import = Import::new(package, alias);
            trace!(path = %import.path, qualifier = %import.qualifier, "registered import");
            self.qualifiers
                .insert(import.qualifier.clone(), import.path.clone());
            self.imports.insert(package.path.clone(), import);
        }
        self.imports.get(&package.path)
    }

    /// `name0`, `name1`, ... when `name` is taken; `None` when it is free.
    fn free_alias(&self, name: &str) -> Option<String> {
        if !self.qualifiers.contains_key(name) {
            return None;
        }
        (0..)
            .map(|n| format!("{name}{n}"))
            .find(|alias| !self.qualifiers.contains_key(alias))
    }

    pub fn get(&self, path: &str) -> Option<&Import> {
        self.imports.get(path)
    }

    /// Whether `name` is the qualifier of a registered import.
    pub fn is_qualifier(&self, name: &str) -> bool {
        self.qualifiers.contains_key(name)
    }

    /// Prefix for a type from `package`: `""` for the hidden source package,
    /// otherwise `qualifier.`.
    pub fn prefix(&self, package: &PackageRef) -> String {
        if self.hidden.as_deref() == Some(package.path.as_str()) {
            return String::new();
        }
        let qualifier = self
            .imports
            .get(&package.path)
            .map_or(package.name.as_str(), |import| import.qualifier.as_str());
        format!("{qualifier}.")
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// All imports sorted by path.
    pub fn sorted(&self) -> Vec<Import> {
        let mut imports: Vec<Import> = self.imports.values().cloned().collect();
        imports.sort_by(|a, b| a.path.cmp(&b.path));
        imports
    }
}

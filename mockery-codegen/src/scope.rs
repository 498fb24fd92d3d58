//! Variable name allocation within one generated method.

use std::collections::HashSet;

use indexmap::IndexMap;
use mockery_core::{Result, first_upper};
use mockery_go::{PackageRef, Type, Var};
use tracing::trace;

use crate::{
    imports::ImportRegistry,
    naming::{is_reserved, type_hint},
    replace::TypeReplacer,
    typestr::required_imports,
};

/// A parameter, result or local of a generated method.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// The name the allocation started from.
    pub hint: String,
    /// Allocated name, unique within the scope.
    pub name: String,
    /// Type after `replace-type` redirection.
    pub ty: Type,
    /// Packages the type needs, by import path.
    pub imports: IndexMap<String, PackageRef>,
    pub variadic: bool,
}

/// Names visible inside one generated method.
///
/// Names are allocated as parameters arrive, before every import of the
/// file is known. [`MethodScope::resolve_collisions`] renames variables that
/// later imports came to shadow.
#[derive(Debug, Clone, Default)]
pub struct MethodScope {
    reserved: HashSet<String>,
    taken: HashSet<String>,
    vars: Vec<Variable>,
    /// Label to (hint, name) for template locals.
    locals: IndexMap<String, (String, String)>,
}

impl MethodScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` unavailable, e.g. the mock type or a type parameter.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.reserved.insert(name.into());
    }

    fn is_free(&self, name: &str, registry: &ImportRegistry) -> bool {
        !is_reserved(name)
            && !registry.is_qualifier(name)
            && !self.reserved.contains(name)
            && !self.taken.contains(name)
    }

    /// Parameters and results also become struct fields after `firstUpper`,
    /// so `a` and `A` must not both be allocated.
    fn is_free_var(&self, name: &str, registry: &ImportRegistry) -> bool {
        let field = first_upper(name);
        self.is_free(name, registry) && !self.vars.iter().any(|v| first_upper(&v.name) == field)
    }

    /// `hint` itself when free, otherwise `hint1`, `hint2`, ...
    fn unique(&self, hint: &str, registry: &ImportRegistry, var: bool) -> String {
        let free = |name: &str| {
            if var {
                self.is_free_var(name, registry)
            } else {
                self.is_free(name, registry)
            }
        };
        if free(hint) {
            return hint.to_string();
        }
        (1..)
            .map(|n| format!("{hint}{n}"))
            .find(|name| free(name))
            .unwrap_or_else(|| hint.to_string())
    }

    /// Allocate a variable for a parameter or result.
    ///
    /// Replacement types are applied first, then their imports are added to
    /// `registry`. The name is the declared one unless it is blank or `_`,
    /// in which case it is derived from the type. `suffix` is appended to
    /// the hint before uniqueness is enforced.
    pub fn add_var(
        &mut self,
        var: &Var,
        variadic: bool,
        suffix: &str,
        replacer: &TypeReplacer<'_>,
        registry: &mut ImportRegistry,
    ) -> Result<&Variable> {
        let ty = replacer.replace(&var.ty)?;

        let mut imports = IndexMap::new();
        for package in required_imports(&ty) {
            registry.add(&package);
            imports.insert(package.path.clone(), package);
        }

        let base = if var.name.is_empty() || var.name == "_" {
            type_hint(&ty)
        } else {
            var.name.clone()
        };
        let hint = format!("{base}{suffix}");
        let name = self.unique(&hint, registry, true);
        self.taken.insert(name.clone());

        self.vars.push(Variable {
            hint,
            name,
            ty,
            imports,
            variadic,
        });
        Ok(&self.vars[self.vars.len() - 1])
    }

    /// Allocate a template local such as the receiver, stored under `label`.
    pub fn allocate(&mut self, label: &str, hint: &str, registry: &ImportRegistry) -> String {
        let name = self.unique(hint, registry, false);
        self.taken.insert(name.clone());
        self.locals
            .insert(label.to_string(), (hint.to_string(), name.clone()));
        name
    }

    /// Rename variables and locals whose names became import qualifiers
    /// after they were allocated.
    pub fn resolve_collisions(&mut self, registry: &ImportRegistry) {
        for i in 0..self.vars.len() {
            let (hint, old) = (self.vars[i].hint.clone(), self.vars[i].name.clone());
            if let Some(name) = self.rename(&hint, &old, registry, true) {
                self.vars[i].name = name;
            }
        }
        for i in 0..self.locals.len() {
            let (hint, old) = self.locals[i].clone();
            if let Some(name) = self.rename(&hint, &old, registry, false) {
                self.locals[i].1 = name;
            }
        }
    }

    fn rename(
        &mut self,
        hint: &str,
        old: &str,
        registry: &ImportRegistry,
        var: bool,
    ) -> Option<String> {
        if !registry.is_qualifier(old) {
            return None;
        }
        self.taken.remove(old);
        let name = self.unique(hint, registry, var);
        trace!(from = %old, to = %name, "renamed variable shadowing an import");
        self.taken.insert(name.clone());
        Some(name)
    }

    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    /// Allocated locals by label.
    pub fn locals(&self) -> IndexMap<String, String> {
        self.locals
            .iter()
            .map(|(label, (_, name))| (label.clone(), name.clone()))
            .collect()
    }
}

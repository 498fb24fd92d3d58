//! Test utilities for mock generation.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::{collections::BTreeMap, path::PathBuf, rc::Rc};

use mockery_core::{Error, Result};
use mockery_go::{Package, PackageLoader, guess_package_name, parser::parse_package_name};

/// A [`PackageLoader`] over in-memory sources, one file per package.
///
/// Each package lives in a directory named after its import path, and its
/// single file is `<import path>/<package name>.go`.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    sources: BTreeMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the source of the package at `import_path`.
    pub fn add(&mut self, import_path: &str, src: &str) -> &mut Self {
        self.sources
            .insert(import_path.to_string(), src.to_string());
        self
    }
}

impl PackageLoader for MemoryLoader {
    fn load(&self, import_path: &str) -> Result<Rc<Package>> {
        let src = self
            .sources
            .get(import_path)
            .ok_or_else(|| Error::package_load(import_path, "cannot find package directory"))?;
        let name = self.package_name(import_path);
        let dir = PathBuf::from(import_path);
        let file = dir.join(format!("{name}.go"));
        Package::build(import_path, &dir, &[(file, src.clone())], self).map(Rc::new)
    }

    fn list_subpackages(&self, import_path: &str) -> Result<Vec<String>> {
        let prefix = format!("{import_path}/");
        Ok(self
            .sources
            .keys()
            .filter(|path| path.starts_with(&prefix))
            .cloned()
            .collect())
    }

    fn package_name(&self, import_path: &str) -> String {
        self.sources
            .get(import_path)
            .and_then(|src| parse_package_name(src))
            .unwrap_or_else(|| guess_package_name(import_path))
    }
}

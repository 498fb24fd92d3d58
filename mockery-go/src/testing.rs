use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    rc::Rc,
};

use mockery_core::{Error, Result};

use crate::{
    loader::{PackageLoader, guess_package_name},
    package::Package,
    parser::parse_package_name,
};

/// In-memory loader: one source file per import path.
#[derive(Default)]
pub(crate) struct MapLoader {
    sources: BTreeMap<String, String>,
}

impl MapLoader {
    pub(crate) fn insert(&mut self, path: &str, src: &str) {
        self.sources.insert(path.to_string(), src.to_string());
    }
}

impl PackageLoader for MapLoader {
    fn load(&self, import_path: &str) -> Result<Rc<Package>> {
        let src = self
            .sources
            .get(import_path)
            .ok_or_else(|| Error::package_load(import_path, "not found"))?;
        let file = PathBuf::from(format!("{import_path}/file.go"));
        Package::build(import_path, Path::new(import_path), &[(file, src.clone())], self)
            .map(Rc::new)
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

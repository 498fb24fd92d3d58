//! Grouping of mocks by output file.

use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use indexmap::IndexMap;
use mockery_config::Config;
use mockery_core::{Error, Result};
use mockery_go::{Interface, Package};

/// One mock to generate: an interface and the variant config it is
/// generated with.
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    pub package: Rc<Package>,
    pub interface: Interface,
    /// Fully merged and template-resolved variant config.
    pub config: Config,
}

impl InterfaceDescriptor {
    pub fn new(package: Rc<Package>, interface: Interface, config: Config) -> Self {
        Self {
            package,
            interface,
            config,
        }
    }

    /// `dir` joined with `filename`.
    pub fn output_path(&self) -> PathBuf {
        Path::new(self.config.dir()).join(self.config.filename())
    }
}

/// Every mock written to one file.
///
/// All descriptors share the source package, `pkgname` and template.
#[derive(Debug, Clone)]
pub struct OutputBucket {
    pub path: PathBuf,
    pub src_package: Rc<Package>,
    pub pkgname: String,
    pub template: String,
    pub interfaces: Vec<InterfaceDescriptor>,
}

impl OutputBucket {
    fn new(descriptor: InterfaceDescriptor) -> Self {
        Self {
            path: descriptor.output_path(),
            src_package: Rc::clone(&descriptor.package),
            pkgname: descriptor.config.pkgname().to_string(),
            template: descriptor.config.template().to_string(),
            interfaces: vec![descriptor],
        }
    }

    /// Append a descriptor, rejecting one that disagrees with the bucket.
    pub fn push(&mut self, descriptor: InterfaceDescriptor) -> Result<()> {
        let checks = [
            (
                "output path",
                self.path.to_string_lossy().into_owned(),
                descriptor.output_path().to_string_lossy().into_owned(),
            ),
            (
                "pkgname",
                self.pkgname.clone(),
                descriptor.config.pkgname().to_string(),
            ),
            (
                "source package",
                self.src_package.path.clone(),
                descriptor.package.path.clone(),
            ),
            (
                "template",
                self.template.clone(),
                descriptor.config.template().to_string(),
            ),
        ];
        for (field, expected, found) in checks {
            if expected != found {
                return Err(Error::OutputUniformityViolation {
                    path: self.path.clone(),
                    field: field.to_string(),
                    expected,
                    found,
                });
            }
        }
        self.interfaces.push(descriptor);
        Ok(())
    }

    /// Directory the file is written to.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }
}

/// Output buckets keyed by file path, in first-seen order.
#[derive(Debug, Default)]
pub struct Grouping {
    buckets: IndexMap<PathBuf, OutputBucket>,
}

impl Grouping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, descriptor: InterfaceDescriptor) -> Result<()> {
        let path = descriptor.output_path();
        match self.buckets.get_mut(&path) {
            Some(bucket) => bucket.push(descriptor),
            None => {
                self.buckets.insert(path, OutputBucket::new(descriptor));
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn buckets(&self) -> impl Iterator<Item = &OutputBucket> {
        self.buckets.values()
    }

    pub fn into_buckets(self) -> Vec<OutputBucket> {
        self.buckets.into_values().collect()
    }
}

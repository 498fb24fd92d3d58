//! The root → package → interface → variant config tree and its merge order.

use indexmap::IndexMap;
use mockery_core::{Error, Result};
use serde::Serialize;
use tracing::debug;

use crate::{config::Config, recursive};

/// The decoded config file: global options plus per-package sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RootConfig {
    #[serde(flatten)]
    pub config: Config,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub packages: IndexMap<String, PackageConfig>,
}

/// A `packages[<import path>]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageConfig {
    #[serde(skip_serializing_if = "is_unset")]
    pub config: Config,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub interfaces: IndexMap<String, InterfaceConfig>,
}

/// A `packages[..].interfaces[<name>]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceConfig {
    #[serde(skip_serializing_if = "is_unset")]
    pub config: Config,
    /// Mock variants; each one produces a generated type.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<Config>,
}

fn is_unset(config: &Config) -> bool {
    *config == Config::default()
}

impl RootConfig {
    /// Run every merge pass in order and expand recursive packages.
    ///
    /// `list_subpackages` returns the import paths found below a package; it
    /// is only consulted for packages whose merged config has
    /// `recursive: true`.
    pub fn resolve<F>(mut self, list_subpackages: F) -> Result<ResolvedRoot>
    where
        F: FnMut(&str) -> Result<Vec<String>>,
    {
        let raw: IndexMap<String, Config> = self
            .packages
            .iter()
            .map(|(path, package)| (path.clone(), package.config.clone()))
            .collect();

        for (path, package) in self.packages.iter_mut() {
            package.config.merge_from(&self.config);
            debug!(package = %path, "merged root config into package");
        }

        recursive::expand(&mut self.packages, &raw, list_subpackages)?;

        for package in self.packages.values_mut() {
            for interface in package.interfaces.values_mut() {
                interface.config.merge_from(&package.config);

                if interface.configs.is_empty() {
                    interface.configs.push(interface.config.clone());
                } else {
                    for variant in interface.configs.iter_mut() {
                        variant.merge_from(&interface.config);
                    }
                }
            }
        }

        Ok(ResolvedRoot { root: self })
    }
}

/// A config tree on which every merge pass has run.
///
/// Only [`RootConfig::resolve`] produces this type, so code that consumes
/// variants cannot observe a partially merged tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoot {
    root: RootConfig,
}

impl ResolvedRoot {
    pub fn config(&self) -> &Config {
        &self.root.config
    }

    /// Packages in declaration order, followed by expanded sub-packages.
    pub fn packages(&self) -> impl Iterator<Item = (&str, &PackageConfig)> {
        self.root
            .packages
            .iter()
            .map(|(path, package)| (path.as_str(), package))
    }

    pub fn package(&self, path: &str) -> Result<&PackageConfig> {
        self.root
            .packages
            .get(path)
            .ok_or_else(|| Error::PackageNotInConfig {
                package: path.to_string(),
            })
    }

    /// The mock variants for an interface.
    ///
    /// An interface that is not listed in its package (selected through
    /// `all` or a regex) gets a single variant equal to the package config.
    pub fn variants(&self, package: &str, interface: &str) -> Result<Vec<Config>> {
        let package = self.package(package)?;
        Ok(match package.interfaces.get(interface) {
            Some(iface) => iface.configs.clone(),
            None => vec![package.config.clone()],
        })
    }

    pub fn as_root(&self) -> &RootConfig {
        &self.root
    }
}

//! Sub-package expansion for packages configured with `recursive: true`.

use indexmap::IndexMap;
use mockery_core::{Error, Result};
use regex::Regex;
use tracing::debug;

use crate::{config::Config, tree::PackageConfig};

/// Expand recursive packages in place.
///
/// `raw` holds each declared package's config as written, before the root
/// was merged into it. A declared package below a recursive one is rebuilt
/// from its raw config filled from that parent, so the parent's values take
/// precedence over the root's. Discovered packages that are not declared
/// and not excluded are inserted with a copy of the parent's config.
pub(crate) fn expand<F>(
    packages: &mut IndexMap<String, PackageConfig>,
    raw: &IndexMap<String, Config>,
    mut list_subpackages: F,
) -> Result<()>
where
    F: FnMut(&str) -> Result<Vec<String>>,
{
    let mut declared: Vec<String> = packages.keys().cloned().collect();

    // shallow first so a parent is final before its children inherit from it
    declared.sort_by_key(|path| depth(path));
    for path in &declared {
        let Some(parent) = nearest_recursive_ancestor(packages, path) else {
            continue;
        };
        let parent_config = packages[&parent].config.clone();
        let mut config = raw.get(path).cloned().unwrap_or_default();
        config.merge_from(&parent_config);
        debug!(package = %path, parent = %parent, "declared sub-package inherits from recursive parent");
        if let Some(package) = packages.get_mut(path) {
            package.config = config;
        }
    }

    // deep first so the closest recursive parent claims a discovered package
    declared.reverse();
    for parent in &declared {
        let parent_config = packages[parent].config.clone();
        if !parent_config.recursive() {
            continue;
        }

        let excludes = compile_excludes(&parent_config)?;
        for sub in list_subpackages(parent)? {
            if sub == *parent || packages.contains_key(&sub) {
                continue;
            }
            if let Some(pattern) = excludes.iter().find(|re| re.is_match(&sub)) {
                debug!(package = %sub, pattern = %pattern.as_str(), "excluded sub-package");
                continue;
            }
            debug!(package = %sub, parent = %parent, "adding sub-package");
            let mut config = Config::default();
            config.merge_from(&parent_config);
            packages.insert(
                sub,
                PackageConfig {
                    config,
                    interfaces: IndexMap::new(),
                },
            );
        }
    }

    Ok(())
}

fn depth(path: &str) -> usize {
    path.split('/').count()
}

fn is_subpackage(path: &str, parent: &str) -> bool {
    path.strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('/'))
}

fn nearest_recursive_ancestor(
    packages: &IndexMap<String, PackageConfig>,
    path: &str,
) -> Option<String> {
    packages
        .iter()
        .filter(|(candidate, package)| {
            is_subpackage(path, candidate) && package.config.recursive()
        })
        .max_by_key(|(candidate, _)| candidate.len())
        .map(|(candidate, _)| candidate.clone())
}

fn compile_excludes(config: &Config) -> Result<Vec<Regex>> {
    config
        .exclude_subpkg_regex
        .iter()
        .flatten()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| Error::IncludeExcludeRegex {
                field: "exclude-subpkg-regex".to_string(),
                pattern: pattern.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use mockery_core::ErrorKind;

    use super::*;
    use crate::tree::RootConfig;

    fn package(config: Config) -> PackageConfig {
        PackageConfig {
            config,
            interfaces: IndexMap::new(),
        }
    }

    fn lister(tree: &'static [&'static str]) -> impl FnMut(&str) -> Result<Vec<String>> {
        move |parent: &str| {
            Ok(tree
                .iter()
                .filter(|p| is_subpackage(p, parent) || **p == parent)
                .map(|p| p.to_string())
                .collect())
        }
    }

    #[test]
    fn test_recursive_expansion_with_exclusion() {
        let mut root = RootConfig {
            config: Config {
                filename: Some("mocks_test.go".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        root.packages.insert(
            "A".into(),
            package(Config {
                recursive: Some(true),
                dir: Some("mocks".into()),
                exclude_subpkg_regex: Some(vec!["y$".into()]),
                ..Default::default()
            }),
        );

        let resolved = root.resolve(lister(&["A", "A/x", "A/y"])).unwrap();
        let paths: Vec<&str> = resolved.packages().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["A", "A/x"]);

        let sub = &resolved.package("A/x").unwrap().config;
        assert_eq!(sub.dir.as_deref(), Some("mocks"));
        assert_eq!(sub.filename.as_deref(), Some("mocks_test.go"));
        assert_eq!(sub.recursive, Some(true));
    }

    #[test]
    fn test_declared_subpackage_keeps_overrides() {
        let mut root = RootConfig {
            config: Config {
                dir: Some("root-dir".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        root.packages.insert(
            "A".into(),
            package(Config {
                recursive: Some(true),
                dir: Some("parent-dir".into()),
                pkgname: Some("parentpkg".into()),
                ..Default::default()
            }),
        );
        root.packages.insert(
            "A/x".into(),
            package(Config {
                pkgname: Some("xpkg".into()),
                ..Default::default()
            }),
        );

        let resolved = root.resolve(lister(&["A", "A/x"])).unwrap();
        let sub = &resolved.package("A/x").unwrap().config;
        assert_eq!(sub.pkgname.as_deref(), Some("xpkg"));
        assert_eq!(sub.dir.as_deref(), Some("parent-dir"));
    }

    #[test]
    fn test_closest_recursive_parent_wins() {
        let mut root = RootConfig::default();
        root.packages.insert(
            "A".into(),
            package(Config {
                recursive: Some(true),
                dir: Some("outer".into()),
                ..Default::default()
            }),
        );
        root.packages.insert(
            "A/x".into(),
            package(Config {
                dir: Some("inner".into()),
                ..Default::default()
            }),
        );

        let resolved = root
            .resolve(lister(&["A", "A/x", "A/x/deep", "A/z"]))
            .unwrap();
        assert_eq!(
            resolved.package("A/x/deep").unwrap().config.dir.as_deref(),
            Some("inner")
        );
        assert_eq!(
            resolved.package("A/z").unwrap().config.dir.as_deref(),
            Some("outer")
        );
    }

    #[test]
    fn test_excluded_test_packages() {
        let mut root = RootConfig::default();
        root.packages.insert(
            "github.com/acme/svc".into(),
            package(Config {
                recursive: Some(true),
                exclude_subpkg_regex: Some(vec!["_test$".into()]),
                ..Default::default()
            }),
        );
        root.packages
            .insert("github.com/acme/other".into(), package(Config::default()));

        let resolved = root
            .resolve(lister(&[
                "github.com/acme/svc",
                "github.com/acme/svc/api",
                "github.com/acme/svc/api_test",
                "github.com/acme/svc/store",
            ]))
            .unwrap();

        let mut paths: Vec<&str> = resolved.packages().map(|(p, _)| p).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                "github.com/acme/other",
                "github.com/acme/svc",
                "github.com/acme/svc/api",
                "github.com/acme/svc/store",
            ]
        );
    }

    #[test]
    fn test_bad_exclude_regex() {
        let mut root = RootConfig::default();
        root.packages.insert(
            "A".into(),
            package(Config {
                recursive: Some(true),
                exclude_subpkg_regex: Some(vec!["(".into()]),
                ..Default::default()
            }),
        );

        let err = root.resolve(lister(&["A"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncludeExcludeRegex);
    }
}

//! Package loading.
//!
//! [`PackageLoader`] is the seam between mock generation and the Go source
//! tree. [`GoLoader`] resolves import paths on the filesystem the way the Go
//! toolchain lays packages out: the main module, its `vendor/` directory,
//! local `replace` directives, the module cache and `$GOROOT/src`.

use std::{
    cell::{OnceCell, RefCell},
    collections::HashMap,
    path::{Path, PathBuf},
    process::Command,
    rc::Rc,
};

use mockery_core::{Error, Result};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::{
    constraint::BuildContext,
    gomod::{GoMod, Replacement, escape_path, within},
    package::Package,
    parser::parse_package_name,
};

/// Loads Go packages by import path.
pub trait PackageLoader {
    /// Load and resolve the package at `import_path`.
    fn load(&self, import_path: &str) -> Result<Rc<Package>>;

    /// Import paths of the packages below `import_path`, sorted.
    fn list_subpackages(&self, import_path: &str) -> Result<Vec<String>>;

    /// Declared name of the package at `import_path`, guessed from the path
    /// when its sources are not available.
    fn package_name(&self, import_path: &str) -> String {
        guess_package_name(import_path)
    }
}

/// Package name implied by an import path: `gopkg.in/yaml.v3` is `yaml`,
/// `github.com/x/go-redis/v9` is `redis`.
pub fn guess_package_name(import_path: &str) -> String {
    let mut elems = import_path.rsplit('/');
    let mut last = elems.next().unwrap_or(import_path);
    if is_major_version(last) {
        last = elems.next().unwrap_or(last);
    }
    let last = match last.split_once(".v") {
        Some((name, major)) if major.chars().all(|c| c.is_ascii_digit()) => name,
        _ => last,
    };
    let last = last.strip_prefix("go-").unwrap_or(last);
    last.replace(['-', '.'], "_")
}

fn is_major_version(elem: &str) -> bool {
    elem.strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Filesystem-backed loader rooted at a Go module.
pub struct GoLoader {
    module_dir: PathBuf,
    go_mod: GoMod,
    build: BuildContext,
    goroot: OnceCell<Option<PathBuf>>,
    gomodcache: OnceCell<Option<PathBuf>>,
    packages: RefCell<HashMap<String, Rc<Package>>>,
    names: RefCell<HashMap<String, String>>,
}

impl GoLoader {
    /// Create a loader for the module containing `start`.
    ///
    /// Without a `go.mod` above `start`, only standard library and module
    /// cache paths resolve.
    pub fn new(start: &Path, build_tags: &[String]) -> Result<Self> {
        let start = std::path::absolute(start).map_err(|e| Error::io(start, e))?;
        let (module_dir, go_mod) = match find_go_mod(&start) {
            Some(path) => {
                let src = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
                let dir = path.parent().map_or_else(|| start.clone(), Path::to_path_buf);
                (dir, GoMod::parse(&src))
            }
            None => (start.clone(), GoMod::default()),
        };
        debug!(module = %go_mod.module, dir = %module_dir.display(), "found go module");

        Ok(Self {
            module_dir,
            go_mod,
            build: BuildContext::host(build_tags),
            goroot: OnceCell::new(),
            gomodcache: OnceCell::new(),
            packages: RefCell::new(HashMap::new()),
            names: RefCell::new(HashMap::new()),
        })
    }

    /// Replace the host build context, e.g. to pin `GOOS`.
    pub fn with_build_context(mut self, build: BuildContext) -> Self {
        self.build = build;
        self
    }

    /// Use an explicit `$GOROOT` instead of asking the environment.
    pub fn with_goroot(self, goroot: impl Into<PathBuf>) -> Self {
        let _ = self.goroot.set(Some(goroot.into()));
        self
    }

    /// Use an explicit module cache directory.
    pub fn with_gomodcache(self, dir: impl Into<PathBuf>) -> Self {
        let _ = self.gomodcache.set(Some(dir.into()));
        self
    }

    pub fn module_path(&self) -> &str {
        &self.go_mod.module
    }

    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    fn goroot(&self) -> Option<&Path> {
        self.goroot
            .get_or_init(|| go_env("GOROOT"))
            .as_deref()
    }

    fn gomodcache(&self) -> Option<&Path> {
        self.gomodcache
            .get_or_init(|| go_env("GOMODCACHE"))
            .as_deref()
    }

    /// Directory holding the sources of `import_path`.
    pub fn resolve_dir(&self, import_path: &str) -> Option<PathBuf> {
        let module = &self.go_mod.module;
        if !module.is_empty() && within(import_path, module) {
            let rest = import_path[module.len()..].trim_start_matches('/');
            return Some(self.module_dir.join(rest));
        }

        let vendored = self.module_dir.join("vendor").join(import_path);
        if vendored.is_dir() {
            return Some(vendored);
        }

        if let Some((from, replacement)) = self
            .go_mod
            .replaces
            .iter()
            .filter(|(from, _)| within(import_path, from))
            .max_by_key(|(from, _)| from.len())
        {
            let rest = import_path[from.len()..].trim_start_matches('/');
            match replacement {
                Replacement::Dir(dir) => return Some(self.module_dir.join(dir).join(rest)),
                Replacement::Module { path, version } => {
                    let dir = self.module_cache_dir(path, version)?;
                    return Some(dir.join(rest));
                }
            }
        }

        if let Some((module, version)) = self.go_mod.providing_module(import_path) {
            let rest = import_path[module.len()..].trim_start_matches('/');
            let dir = self.module_cache_dir(module, version)?;
            return Some(dir.join(rest));
        }

        let std_dir = self.goroot()?.join("src").join(import_path);
        std_dir.is_dir().then_some(std_dir)
    }

    fn module_cache_dir(&self, module: &str, version: &str) -> Option<PathBuf> {
        let dir = format!("{}@{}", escape_path(module), escape_path(version));
        Some(self.gomodcache()?.join(dir))
    }

    /// Buildable, non-test `.go` files of a directory, sorted by name.
    fn sources(&self, dir: &Path) -> Result<Vec<(PathBuf, String)>> {
        let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_go_source(path))
            .collect();
        paths.sort();

        let mut sources = Vec::new();
        for path in paths {
            let src = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            if self.build.matches_file(file_name, &src) {
                sources.push((path, src));
            } else {
                trace!(file = %path.display(), "excluded by build constraints");
            }
        }
        Ok(sources)
    }

    fn has_sources(&self, dir: &Path) -> bool {
        self.sources(dir).is_ok_and(|sources| !sources.is_empty())
    }
}

impl PackageLoader for GoLoader {
    fn load(&self, import_path: &str) -> Result<Rc<Package>> {
        if let Some(package) = self.packages.borrow().get(import_path) {
            return Ok(Rc::clone(package));
        }

        let dir = self
            .resolve_dir(import_path)
            .filter(|dir| dir.is_dir())
            .ok_or_else(|| Error::package_load(import_path, "cannot find package directory"))?;
        let sources = self.sources(&dir)?;
        let package = Rc::new(Package::build(import_path, &dir, &sources, self)?);
        debug!(
            package = import_path,
            dir = %dir.display(),
            files = package.files.len(),
            "loaded package"
        );

        self.packages
            .borrow_mut()
            .insert(import_path.to_string(), Rc::clone(&package));
        Ok(package)
    }

    fn list_subpackages(&self, import_path: &str) -> Result<Vec<String>> {
        let Some(root) = self.resolve_dir(import_path).filter(|dir| dir.is_dir()) else {
            return Err(Error::package_load(import_path, "cannot find package directory"));
        };

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || (entry.file_type().is_dir() && !skip_dir(entry.path()))
            });

        let mut packages = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                Error::package_load(import_path, format!("walking {}: {e}", root.display()))
            })?;
            if !self.has_sources(entry.path()) {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let rel: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            packages.push(format!("{import_path}/{}", rel.join("/")));
        }
        debug!(package = import_path, found = packages.len(), "listed sub-packages");
        Ok(packages)
    }

    fn package_name(&self, import_path: &str) -> String {
        if let Some(name) = self.names.borrow().get(import_path) {
            return name.clone();
        }
        if let Some(package) = self.packages.borrow().get(import_path) {
            return package.name.clone();
        }

        let name = self
            .resolve_dir(import_path)
            .and_then(|dir| self.sources(&dir).ok())
            .and_then(|sources| {
                sources
                    .iter()
                    .find_map(|(_, src)| parse_package_name(src))
            })
            .unwrap_or_else(|| guess_package_name(import_path));
        self.names
            .borrow_mut()
            .insert(import_path.to_string(), name.clone());
        name
    }
}

fn find_go_mod(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("go.mod"))
        .find(|path| path.is_file())
}

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go")
        && !name.ends_with("_test.go")
        && !name.starts_with('.')
        && !name.starts_with('_')
}

/// Directories the go tool never treats as part of the package tree.
fn skip_dir(dir: &Path) -> bool {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    name == "testdata"
        || name == "vendor"
        || name.starts_with('.')
        || name.starts_with('_')
        || dir.join("go.mod").is_file()
}

fn go_env(key: &str) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(key).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(value));
    }
    let output = Command::new("go").args(["env", key]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8(output.stdout).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

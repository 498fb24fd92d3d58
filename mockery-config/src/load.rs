//! Config sources and their layering.
//!
//! Precedence, low to high: built-in defaults, `MOCKERY_*` environment
//! variables, the YAML config file, then flag overrides supplied by the
//! caller. Layers are merged as YAML values before the typed decode, so the
//! decoded [`RootConfig`] already carries every default.

use std::path::{Path, PathBuf};

use mockery_core::{Error, Result};
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::{
    config::CONFIG_KEYS,
    decode::{self, Source},
    tree::RootConfig,
};

/// Prefix of environment variables that override root options.
pub const ENV_PREFIX: &str = "MOCKERY_";

/// Environment variable naming an alternative config file.
pub const ENV_CONFIG: &str = "MOCKERY_CONFIG";

/// File names searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAMES: &[&str] = &[".mockery.yaml", ".mockery.yml"];

const DEFAULTS: &str = r#"
all: false
dir: "{{.InterfaceDir}}"
filename: "mocks_test.go"
force-file-write: true
formatter: goimports
include-auto-generated: false
log-level: info
pkgname: "{{.SrcPackageName}}"
recursive: false
require-template-schema-exists: true
structname: "{{.Mock}}{{.InterfaceName}}"
template: testify
template-schema: "{{.Template}}.schema.json"
"#;

/// Inputs to [`load`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config path, e.g. from `--config`.
    pub config_path: Option<PathBuf>,
    /// Directory the ancestor search starts from; also the base for
    /// relative paths.
    pub start_dir: PathBuf,
    /// Environment variables to consider.
    pub env: Vec<(String, String)>,
    /// Highest-precedence root options, e.g. from command-line flags.
    pub overrides: Mapping,
    /// Fall back to defaults when no config file exists.
    pub allow_missing: bool,
}

impl LoadOptions {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
            ..Default::default()
        }
    }

    /// Read the `MOCKERY_*` variables of the current process.
    pub fn with_process_env(mut self) -> Self {
        self.env = std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();
        self
    }

    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Set a root option at flag precedence.
    pub fn with_override(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.overrides
            .insert(Value::String(key.to_string()), value.into());
        self
    }

    pub fn allow_missing(mut self, allow: bool) -> Self {
        self.allow_missing = allow;
        self
    }
}

/// A loaded, decoded, not yet resolved config.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub root: RootConfig,
    /// The config file that was read, if any.
    pub path: Option<PathBuf>,
}

/// Built-in defaults as a YAML mapping.
pub fn defaults() -> Mapping {
    match serde_yaml::from_str(DEFAULTS) {
        Ok(Value::Mapping(mapping)) => mapping,
        _ => Mapping::new(),
    }
}

/// Find `.mockery.yaml` or `.mockery.yml` in `start` or any ancestor.
pub fn discover(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// Pick the config file: explicit path, then `MOCKERY_CONFIG`, then the
/// ancestor search.
pub fn locate(options: &LoadOptions) -> Result<Option<PathBuf>> {
    let explicit = options.config_path.clone().or_else(|| {
        options
            .env
            .iter()
            .find(|(key, value)| key == ENV_CONFIG && !value.is_empty())
            .map(|(_, value)| PathBuf::from(value))
    });

    if let Some(path) = explicit {
        let path = absolutize(&options.start_dir, &path);
        if !path.is_file() {
            return Err(Error::io(
                &path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "config file does not exist"),
            ));
        }
        return Ok(Some(path));
    }

    match discover(&options.start_dir) {
        Some(path) => Ok(Some(path)),
        None if options.allow_missing => Ok(None),
        None => Err(Error::ConfigNotFound {
            start: options.start_dir.clone(),
        }),
    }
}

/// Load and decode the config tree from every source.
pub fn load(options: &LoadOptions) -> Result<LoadedConfig> {
    let path = locate(options)?;

    let mut merged = Value::Mapping(defaults());
    overlay(&mut merged, Value::Mapping(env_layer(&options.env)));

    let text = match &path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?,
        None => String::new(),
    };
    let name = path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());
    let source = Source::new(&text, &name);

    let file = decode::parse_document(source)?;
    decode::check_keys(&file, source)?;
    overlay(&mut merged, file);
    overlay(&mut merged, Value::Mapping(options.overrides.clone()));

    if let (Some(path), Value::Mapping(mapping)) = (&path, &mut merged) {
        debug!(path = %path.display(), "loaded config file");
        mapping.insert(
            Value::String("config-file".to_string()),
            Value::String(path.display().to_string()),
        );
    }

    let root = decode::decode_root(&merged, source)?;
    Ok(LoadedConfig { root, path })
}

/// Root options taken from `MOCKERY_<KEY>` variables.
///
/// `MOCKERY_FORCE_FILE_WRITE` sets `force-file-write`; a `.` in the key
/// nests, so `MOCKERY_TEMPLATE_DATA.UNROLL_VARIADIC` sets
/// `template-data.unroll-variadic`. Values are read as YAML scalars or
/// lists, anything else stays a string. Variables that do not name a root
/// option are dropped.
pub fn env_layer(vars: &[(String, String)]) -> Mapping {
    let mut layer = Value::Mapping(Mapping::new());
    for (key, raw) in vars {
        if key == ENV_CONFIG {
            continue;
        }
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let name = name.to_lowercase().replace('_', "-");
        let path: Vec<&str> = name.split('.').collect();
        if !CONFIG_KEYS.contains(&path[0]) {
            warn!(variable = %key, "ignoring environment variable for unknown config key");
            continue;
        }

        let mut nested = env_value(raw);
        for segment in path.iter().rev() {
            let mut mapping = Mapping::new();
            mapping.insert(Value::String(segment.to_string()), nested);
            nested = Value::Mapping(mapping);
        }
        overlay(&mut layer, nested);
    }

    match layer {
        Value::Mapping(mapping) => mapping,
        _ => Mapping::new(),
    }
}

fn env_value(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Sequence(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

/// Merge `top` over `base`: mappings merge by key, anything else replaces.
pub fn overlay(base: &mut Value, top: Value) {
    match (base, top) {
        (Value::Mapping(base), Value::Mapping(top)) => {
            for (key, value) in top {
                match base.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, top) => *base = top,
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use mockery_core::ErrorKind;
    use tempfile::TempDir;

    use super::*;
    use crate::config::Formatter;

    fn write_config(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_applied() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), ".mockery.yaml", "packages:\n  example.com/a:\n");

        let loaded = load(&LoadOptions::new(tmp.path())).unwrap();
        let config = &loaded.root.config;
        assert_eq!(config.filename.as_deref(), Some("mocks_test.go"));
        assert_eq!(config.structname.as_deref(), Some("{{.Mock}}{{.InterfaceName}}"));
        assert_eq!(config.formatter, Some(Formatter::Goimports));
        assert_eq!(config.force_file_write, Some(true));
        assert_eq!(config.all, Some(false));
        assert!(loaded.root.packages.contains_key("example.com/a"));
    }

    #[test]
    fn test_discovery_walks_ancestors() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        let expected = write_config(tmp.path(), ".mockery.yml", "all: true\n");

        assert_eq!(discover(&nested), Some(expected.clone()));

        let loaded = load(&LoadOptions::new(&nested)).unwrap();
        assert_eq!(loaded.path, Some(expected.clone()));
        assert_eq!(loaded.root.config.all, Some(true));
        assert_eq!(
            loaded.root.config.config_file.as_deref(),
            Some(expected.display().to_string().as_str())
        );
    }

    #[test]
    fn test_yaml_preferred_over_yml() {
        let tmp = TempDir::new().unwrap();
        let yaml = write_config(tmp.path(), ".mockery.yaml", "");
        write_config(tmp.path(), ".mockery.yml", "");
        assert_eq!(discover(tmp.path()), Some(yaml));
    }

    #[test]
    fn test_missing_config() {
        let tmp = TempDir::new().unwrap();
        let err = load(&LoadOptions::new(tmp.path())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigNotFound);

        let loaded = load(&LoadOptions::new(tmp.path()).allow_missing(true)).unwrap();
        assert_eq!(loaded.path, None);
        assert_eq!(loaded.root.config.template.as_deref(), Some("testify"));
    }

    #[test]
    fn test_env_config_path() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "custom.yaml", "recursive: true\n");
        let other = TempDir::new().unwrap();

        let options = LoadOptions::new(other.path())
            .with_env([(ENV_CONFIG, path.display().to_string())]);
        let loaded = load(&options).unwrap();
        assert_eq!(loaded.path, Some(path));
        assert_eq!(loaded.root.config.recursive, Some(true));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let tmp = TempDir::new().unwrap();
        let options = LoadOptions::new(tmp.path()).with_config_path("nope.yaml");
        let err = load(&options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileIo);
    }

    #[test]
    fn test_precedence() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            ".mockery.yaml",
            "filename: from_file.go\ndir: file-dir\n",
        );

        let options = LoadOptions::new(tmp.path())
            .with_env([
                ("MOCKERY_FILENAME", "from_env.go"),
                ("MOCKERY_PKGNAME", "envpkg"),
                ("MOCKERY_ALL", "true"),
            ])
            .with_override("dir", "flag-dir");
        let config = load(&options).unwrap().root.config;

        assert_eq!(config.filename.as_deref(), Some("from_file.go"));
        assert_eq!(config.pkgname.as_deref(), Some("envpkg"));
        assert_eq!(config.all, Some(true));
        assert_eq!(config.dir.as_deref(), Some("flag-dir"));
    }

    #[test]
    fn test_env_layer_keys() {
        let vars = vec![
            ("MOCKERY_FORCE_FILE_WRITE".to_string(), "false".to_string()),
            ("MOCKERY_TEMPLATE_DATA.UNROLL_VARIADIC".to_string(), "true".to_string()),
            ("MOCKERY_NOT_A_KEY".to_string(), "1".to_string()),
            ("MOCKERY_CONFIG".to_string(), "x.yaml".to_string()),
            ("MOCKERY_STRUCTNAME".to_string(), "{{.InterfaceName}}Fake".to_string()),
        ];
        let layer = env_layer(&vars);

        assert_eq!(layer.get("force-file-write"), Some(&Value::Bool(false)));
        assert_eq!(
            layer
                .get("template-data")
                .and_then(|d| d.get("unroll-variadic")),
            Some(&Value::Bool(true))
        );
        assert_eq!(
            layer.get("structname"),
            Some(&Value::String("{{.InterfaceName}}Fake".to_string()))
        );
        assert_eq!(layer.len(), 3);
    }

    #[test]
    fn test_template_data_merges_across_layers() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            ".mockery.yaml",
            "template-data:\n  boilerplate-file: header.txt\n",
        );
        let options = LoadOptions::new(tmp.path())
            .with_env([("MOCKERY_TEMPLATE_DATA.WITH_EXPECT", "true")]);
        let config = load(&options).unwrap().root.config;

        assert_eq!(config.template_data_str("boilerplate-file"), Some("header.txt"));
        assert_eq!(
            config
                .template_data
                .as_ref()
                .and_then(|d| d.get("with-expect")),
            Some(&serde_json::Value::Bool(true))
        );
    }

    #[test]
    fn test_strict_keys_in_file() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            ".mockery.yaml",
            "packages:\n  foo:\n    config:\n      whatever: 1\n",
        );
        let err = load(&LoadOptions::new(tmp.path())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigDecode);
        let message = err.to_string();
        assert!(message.contains("packages[foo].config"), "{message}");
        assert!(message.contains("whatever"), "{message}");
    }
}

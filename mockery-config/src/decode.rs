//! Strict decoding of config documents.
//!
//! Unknown keys are rejected at every level of the tree with a message that
//! names the position, e.g. `packages[github.com/foo/bar].config has invalid
//! keys: unknown`. Type errors carry the same kind of path.

use indexmap::IndexMap;
use miette::SourceSpan;
use mockery_core::{Error, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::{
    config::{CONFIG_KEYS, Config},
    tree::{InterfaceConfig, PackageConfig, RootConfig},
};

const PACKAGE_KEYS: &[&str] = &["config", "interfaces"];
const INTERFACE_KEYS: &[&str] = &["config", "configs"];

/// The document being decoded, kept for error excerpts.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    pub text: &'a str,
    pub name: &'a str,
}

impl<'a> Source<'a> {
    pub fn new(text: &'a str, name: &'a str) -> Self {
        Self { text, name }
    }

    fn error(&self, message: impl Into<String>, span: Option<SourceSpan>) -> Error {
        Error::decode(message, self.text, self.name, span)
    }

    /// Span of the first `key:` in the document, used to point at a
    /// problem when the YAML parser gave no location.
    fn span_of_key(&self, key: &str) -> Option<SourceSpan> {
        let pattern = format!(r#"(?m)^[ \t]*(?:-[ \t]+)?["']?{}["']?[ \t]*:"#, regex::escape(key));
        let re = Regex::new(&pattern).ok()?;
        let m = re.find(self.text)?;
        let offset = m.as_str().find(key).map_or(m.start(), |i| m.start() + i);
        Some(SourceSpan::new(offset.into(), key.len()))
    }
}

/// Parse YAML text into a value. An empty document yields an empty mapping.
pub fn parse_document(source: Source<'_>) -> Result<Value> {
    if source.text.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    let value: Value = serde_yaml::from_str(source.text).map_err(|e| {
        let span = e
            .location()
            .map(|loc| SourceSpan::new(loc.index().into(), 1));
        source.error(format!("invalid YAML: {}", e), span)
    })?;
    match value {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(value),
        _ => Err(source.error("config must be a mapping", Some(SourceSpan::new(0.into(), 0)))),
    }
}

/// Reject unknown keys anywhere in the document.
pub fn check_keys(value: &Value, source: Source<'_>) -> Result<()> {
    let root = as_mapping(value, "config", source)?;
    let mut allowed: Vec<&str> = CONFIG_KEYS.to_vec();
    allowed.push("packages");
    check_mapping(root, &allowed, "config", source)?;

    let Some(packages) = root.get("packages") else {
        return Ok(());
    };
    let Some(packages) = optional_mapping(packages, "packages", source)? else {
        return Ok(());
    };

    for (key, package) in packages {
        let package_path = format!("packages[{}]", key_str(key));
        let Some(package) = optional_mapping(package, &package_path, source)? else {
            continue;
        };
        check_mapping(package, PACKAGE_KEYS, &package_path, source)?;
        check_config(package.get("config"), &format!("{package_path}.config"), source)?;

        let Some(interfaces) = package.get("interfaces") else {
            continue;
        };
        let interfaces_path = format!("{package_path}.interfaces");
        let Some(interfaces) = optional_mapping(interfaces, &interfaces_path, source)? else {
            continue;
        };
        for (name, interface) in interfaces {
            let interface_path = format!("{package_path}.interfaces[{}]", key_str(name));
            let Some(interface) = optional_mapping(interface, &interface_path, source)? else {
                continue;
            };
            check_mapping(interface, INTERFACE_KEYS, &interface_path, source)?;
            check_config(interface.get("config"), &format!("{interface_path}.config"), source)?;

            match interface.get("configs") {
                None | Some(Value::Null) => {}
                Some(Value::Sequence(variants)) => {
                    for (i, variant) in variants.iter().enumerate() {
                        check_config(Some(variant), &format!("{interface_path}.configs[{i}]"), source)?;
                    }
                }
                Some(_) => {
                    return Err(source.error(
                        format!("{interface_path}.configs must be a list"),
                        source.span_of_key("configs"),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Decode a (checked) document into the typed tree.
pub fn decode_root(value: &Value, source: Source<'_>) -> Result<RootConfig> {
    let root = as_mapping(value, "config", source)?;

    let mut globals = root.clone();
    let packages_value = globals.remove("packages");
    let config: Config = typed(Value::Mapping(globals), "config", source)?;

    let mut packages = IndexMap::new();
    let entries = match &packages_value {
        Some(value) => optional_mapping(value, "packages", source)?,
        None => None,
    };
    for (key, package) in entries.into_iter().flatten() {
        let path = key_str(key);
        let package_path = format!("packages[{path}]");
        packages.insert(path, decode_package(package, &package_path, source)?);
    }

    Ok(RootConfig { config, packages })
}

fn decode_package(value: &Value, at: &str, source: Source<'_>) -> Result<PackageConfig> {
    let Some(package) = optional_mapping(value, at, source)? else {
        return Ok(PackageConfig::default());
    };

    let config = decode_config(package.get("config"), &format!("{at}.config"), source)?;
    let mut interfaces = IndexMap::new();
    let interfaces_path = format!("{at}.interfaces");
    let entries = match package.get("interfaces") {
        Some(value) => optional_mapping(value, &interfaces_path, source)?,
        None => None,
    };
    for (key, interface) in entries.into_iter().flatten() {
        let name = key_str(key);
        let interface_path = format!("{at}.interfaces[{name}]");
        interfaces.insert(name, decode_interface(interface, &interface_path, source)?);
    }

    Ok(PackageConfig { config, interfaces })
}

fn decode_interface(value: &Value, at: &str, source: Source<'_>) -> Result<InterfaceConfig> {
    let Some(interface) = optional_mapping(value, at, source)? else {
        return Ok(InterfaceConfig::default());
    };

    let config = decode_config(interface.get("config"), &format!("{at}.config"), source)?;
    let configs = match interface.get("configs") {
        Some(Value::Sequence(variants)) => variants
            .iter()
            .enumerate()
            .map(|(i, v)| decode_config(Some(v), &format!("{at}.configs[{i}]"), source))
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };

    Ok(InterfaceConfig { config, configs })
}

fn decode_config(value: Option<&Value>, at: &str, source: Source<'_>) -> Result<Config> {
    match value {
        None | Some(Value::Null) => Ok(Config::default()),
        Some(value) => typed(value.clone(), at, source),
    }
}

fn check_config(value: Option<&Value>, at: &str, source: Source<'_>) -> Result<()> {
    match value {
        None | Some(Value::Null) => Ok(()),
        Some(value) => {
            let mapping = as_mapping(value, at, source)?;
            check_mapping(mapping, CONFIG_KEYS, at, source)
        }
    }
}

fn check_mapping(mapping: &Mapping, allowed: &[&str], at: &str, source: Source<'_>) -> Result<()> {
    let invalid: Vec<String> = mapping
        .keys()
        .map(key_str)
        .filter(|key| !allowed.contains(&key.as_str()))
        .collect();
    if invalid.is_empty() {
        return Ok(());
    }

    let span = source.span_of_key(&invalid[0]);
    Err(source.error(
        format!("{at} has invalid keys: {}", invalid.join(", ")),
        span,
    ))
}

fn typed<T: DeserializeOwned>(value: Value, at: &str, source: Source<'_>) -> Result<T> {
    serde_yaml::from_value(value).map_err(|e| {
        let message = e.to_string();
        let span = field_in_message(&message).and_then(|field| source.span_of_key(field));
        source.error(format!("{at}: {message}"), span)
    })
}

/// The first backquoted field name in a serde error message.
fn field_in_message(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(&message[start..start + len])
}

fn as_mapping<'v>(value: &'v Value, at: &str, source: Source<'_>) -> Result<&'v Mapping> {
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(source.error(format!("{at} must be a mapping"), None)),
    }
}

fn optional_mapping<'v>(
    value: &'v Value,
    at: &str,
    source: Source<'_>,
) -> Result<Option<&'v Mapping>> {
    match value {
        Value::Null => Ok(None),
        Value::Mapping(mapping) => Ok(Some(mapping)),
        _ => Err(source.error(format!("{at} must be a mapping"), None)),
    }
}

fn key_str(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "~".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

//! The option record shared by every level of the config tree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User data passed to templates (`template-data`).
pub type TemplateData = Map<String, Value>;

/// `replace-type`: source package path -> type name -> replacement.
pub type ReplaceTypes = IndexMap<String, IndexMap<String, ReplaceType>>;

/// Keys accepted in a config mapping, used by strict decoding.
pub const CONFIG_KEYS: &[&str] = &[
    "all",
    "build-tags",
    "config-file",
    "dir",
    "exclude-interface-regex",
    "exclude-subpkg-regex",
    "filename",
    "force-file-write",
    "formatter",
    "include-auto-generated",
    "include-interface-regex",
    "log-level",
    "pkgname",
    "recursive",
    "replace-type",
    "require-template-schema-exists",
    "structname",
    "template",
    "template-data",
    "template-schema",
];

/// Post-template formatter applied to generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formatter {
    Gofmt,
    Goimports,
    Noop,
}

impl std::fmt::Display for Formatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formatter::Gofmt => write!(f, "gofmt"),
            Formatter::Goimports => write!(f, "goimports"),
            Formatter::Noop => write!(f, "noop"),
        }
    }
}

/// Replacement target for a `replace-type` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReplaceType {
    pub target_package_path: String,
    pub target_type_name: String,
}

/// Every tunable of the generator.
///
/// Each field is optional so that "unset" can be told apart from an explicit
/// zero value; a parent only fills fields the child left unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_interface_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_subpkg_regex: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_file_write: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<Formatter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_auto_generated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_interface_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkgname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_type: Option<ReplaceTypes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_template_schema_exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_data: Option<TemplateData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_schema: Option<String>,
}

impl Config {
    /// Fill every unset field from `parent`.
    ///
    /// Set fields shadow the parent, including explicit zero values. Maps
    /// (`replace-type`, `template-data`) merge by key with the child winning;
    /// lists are replaced wholesale.
    pub fn merge_from(&mut self, parent: &Config) {
        macro_rules! inherit {
            ($($field:ident),* $(,)?) => {
                $(
                    if self.$field.is_none() {
                        self.$field = parent.$field.clone();
                    }
                )*
            };
        }

        inherit!(
            all,
            build_tags,
            config_file,
            dir,
            exclude_interface_regex,
            exclude_subpkg_regex,
            filename,
            force_file_write,
            formatter,
            include_auto_generated,
            include_interface_regex,
            log_level,
            pkgname,
            recursive,
            require_template_schema_exists,
            structname,
            template,
            template_schema,
        );

        match (&mut self.replace_type, &parent.replace_type) {
            (Some(child), Some(parent)) => merge_replace_types(child, parent),
            (None, Some(parent)) => self.replace_type = Some(parent.clone()),
            _ => {}
        }

        match (&mut self.template_data, &parent.template_data) {
            (Some(child), Some(parent)) => merge_template_data(child, parent),
            (None, Some(parent)) => self.template_data = Some(parent.clone()),
            _ => {}
        }
    }

    pub fn all(&self) -> bool {
        self.all.unwrap_or(false)
    }

    pub fn recursive(&self) -> bool {
        self.recursive.unwrap_or(false)
    }

    pub fn force_file_write(&self) -> bool {
        self.force_file_write.unwrap_or(true)
    }

    pub fn include_auto_generated(&self) -> bool {
        self.include_auto_generated.unwrap_or(false)
    }

    pub fn require_template_schema_exists(&self) -> bool {
        self.require_template_schema_exists.unwrap_or(true)
    }

    pub fn formatter(&self) -> Formatter {
        self.formatter.unwrap_or(Formatter::Goimports)
    }

    pub fn dir(&self) -> &str {
        self.dir.as_deref().unwrap_or_default()
    }

    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or_default()
    }

    pub fn pkgname(&self) -> &str {
        self.pkgname.as_deref().unwrap_or_default()
    }

    pub fn structname(&self) -> &str {
        self.structname.as_deref().unwrap_or_default()
    }

    pub fn template(&self) -> &str {
        self.template.as_deref().unwrap_or_default()
    }

    /// Build tags as a list, accepting comma or whitespace separators.
    pub fn build_tags(&self) -> Vec<String> {
        self.build_tags
            .as_deref()
            .unwrap_or_default()
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Look up a string entry of `template-data`.
    pub fn template_data_str(&self, key: &str) -> Option<&str> {
        self.template_data.as_ref()?.get(key)?.as_str()
    }
}

fn merge_replace_types(child: &mut ReplaceTypes, parent: &ReplaceTypes) {
    for (package, parent_types) in parent {
        let child_types = child.entry(package.clone()).or_default();
        for (name, replacement) in parent_types {
            child_types
                .entry(name.clone())
                .or_insert_with(|| replacement.clone());
        }
    }
}

/// Recursively merge `parent` into `child`; the child wins on leaf conflicts.
fn merge_template_data(child: &mut TemplateData, parent: &TemplateData) {
    for (key, parent_value) in parent {
        match child.get_mut(key) {
            None => {
                child.insert(key.clone(), parent_value.clone());
            }
            Some(Value::Object(child_map)) => {
                if let Value::Object(parent_map) = parent_value {
                    merge_template_data(child_map, parent_map);
                }
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(value: Value) -> TemplateData {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_unset_fields_inherit() {
        let parent = Config {
            dir: Some("mocks".into()),
            all: Some(true),
            ..Default::default()
        };
        let mut child = Config::default();
        child.merge_from(&parent);

        assert_eq!(child.dir.as_deref(), Some("mocks"));
        assert_eq!(child.all, Some(true));
    }

    #[test]
    fn test_set_fields_shadow_parent() {
        let parent = Config {
            dir: Some("mocks".into()),
            ..Default::default()
        };
        let mut child = Config {
            dir: Some("elsewhere".into()),
            ..Default::default()
        };
        child.merge_from(&parent);

        assert_eq!(child.dir.as_deref(), Some("elsewhere"));
    }

    #[test]
    fn test_explicit_zero_is_not_overwritten() {
        let parent = Config {
            all: Some(true),
            dir: Some("mocks".into()),
            exclude_subpkg_regex: Some(vec!["x".into()]),
            ..Default::default()
        };
        let mut child = Config {
            all: Some(false),
            dir: Some(String::new()),
            exclude_subpkg_regex: Some(Vec::new()),
            ..Default::default()
        };
        child.merge_from(&parent);

        assert_eq!(child.all, Some(false));
        assert_eq!(child.dir.as_deref(), Some(""));
        assert_eq!(child.exclude_subpkg_regex, Some(Vec::new()));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let parent = Config {
            filename: Some("mocks_test.go".into()),
            template_data: Some(data(json!({"a": {"b": 1}}))),
            ..Default::default()
        };
        let mut once = Config {
            template_data: Some(data(json!({"a": {"c": 2}}))),
            ..Default::default()
        };
        once.merge_from(&parent);
        let mut twice = once.clone();
        twice.merge_from(&parent);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_lists_replace_wholesale() {
        let parent = Config {
            exclude_subpkg_regex: Some(vec!["a".into(), "b".into()]),
            ..Default::default()
        };
        let mut child = Config {
            exclude_subpkg_regex: Some(vec!["c".into()]),
            ..Default::default()
        };
        child.merge_from(&parent);

        assert_eq!(child.exclude_subpkg_regex, Some(vec!["c".to_string()]));
    }

    #[test]
    fn test_template_data_merges_recursively() {
        let parent = Config {
            template_data: Some(data(json!({
                "boilerplate-file": "header.txt",
                "nested": {"keep": true, "conflict": "parent"},
                "leaf": {"map": 1},
            }))),
            ..Default::default()
        };
        let mut child = Config {
            template_data: Some(data(json!({
                "nested": {"conflict": "child"},
                "leaf": "scalar",
            }))),
            ..Default::default()
        };
        child.merge_from(&parent);

        assert_eq!(
            Value::Object(child.template_data.unwrap()),
            json!({
                "boilerplate-file": "header.txt",
                "nested": {"keep": true, "conflict": "child"},
                "leaf": "scalar",
            })
        );
    }

    #[test]
    fn test_replace_type_merges_by_key() {
        let target = |p: &str, t: &str| ReplaceType {
            target_package_path: p.into(),
            target_type_name: t.into(),
        };
        let mut parent_types = ReplaceTypes::new();
        parent_types
            .entry("github.com/x".into())
            .or_default()
            .insert("T".into(), target("github.com/y", "U"));
        parent_types
            .entry("github.com/x".into())
            .or_default()
            .insert("S".into(), target("github.com/y", "S"));

        let mut child_types = ReplaceTypes::new();
        child_types
            .entry("github.com/x".into())
            .or_default()
            .insert("T".into(), target("github.com/z", "V"));

        let parent = Config {
            replace_type: Some(parent_types),
            ..Default::default()
        };
        let mut child = Config {
            replace_type: Some(child_types),
            ..Default::default()
        };
        child.merge_from(&parent);

        let merged = &child.replace_type.unwrap()["github.com/x"];
        assert_eq!(merged["T"], target("github.com/z", "V"));
        assert_eq!(merged["S"], target("github.com/y", "S"));
    }

    #[test]
    fn test_build_tags_split() {
        let config = Config {
            build_tags: Some("integration, linux e2e".into()),
            ..Default::default()
        };
        assert_eq!(config.build_tags(), vec!["integration", "linux", "e2e"]);
    }

    #[test]
    fn test_unset_getters_match_loader_defaults() {
        let defaults: Config =
            serde_yaml::from_value(serde_yaml::Value::Mapping(crate::defaults())).unwrap();
        let unset = Config::default();

        assert_eq!(unset.all(), defaults.all());
        assert_eq!(unset.recursive(), defaults.recursive());
        assert_eq!(unset.force_file_write(), defaults.force_file_write());
        assert_eq!(unset.include_auto_generated(), defaults.include_auto_generated());
        assert_eq!(
            unset.require_template_schema_exists(),
            defaults.require_template_schema_exists()
        );
        assert_eq!(unset.formatter(), defaults.formatter());
        assert_eq!(defaults.formatter(), Formatter::Goimports);
    }
}

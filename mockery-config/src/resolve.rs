//! Fixed-point expansion of templated config fields.

use std::path::{Component, Path, PathBuf};

use minijinja::Environment;
use mockery_core::{Error, Result, is_exported, template};
use serde::Serialize;
use tracing::trace;

use crate::config::Config;

/// Upper bound on resolver passes before a cycle is assumed.
pub const MAX_ITERATIONS: usize = 20;

/// Variables available to templated config fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InterfaceVars {
    pub config_dir: String,
    pub interface_dir: String,
    pub interface_dir_relative: String,
    pub interface_file: String,
    pub interface_name: String,
    pub mock: String,
    pub src_package_name: String,
    pub src_package_path: String,
}

impl InterfaceVars {
    /// Variables for an interface declared in `file`.
    ///
    /// `InterfaceDir` is the parent of `file` as given; `InterfaceDirRelative`
    /// is that directory relative to `cwd`, or `.` when no relative form
    /// exists.
    pub fn new(interface_name: &str, file: &Path, cwd: &Path) -> Self {
        let interface_dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
        let relative = if interface_dir.is_absolute() {
            relative_to(&interface_dir, cwd)
        } else {
            Some(interface_dir.clone())
        };
        let interface_dir_relative = match relative {
            Some(path) if !path.as_os_str().is_empty() => path.to_string_lossy().into_owned(),
            _ => ".".to_string(),
        };

        Self {
            interface_dir: interface_dir.to_string_lossy().into_owned(),
            interface_dir_relative,
            interface_file: file.to_string_lossy().into_owned(),
            interface_name: interface_name.to_string(),
            mock: mock_prefix(interface_name).to_string(),
            ..Default::default()
        }
    }

    pub fn with_package(mut self, name: &str, path: &str) -> Self {
        self.src_package_name = name.to_string();
        self.src_package_path = path.to_string();
        self
    }

    /// Set `ConfigDir` from the loaded config file path, if any.
    pub fn with_config_file(mut self, config_file: Option<&str>) -> Self {
        self.config_dir = config_file
            .and_then(|f| Path::new(f).parent())
            .map(|d| d.to_string_lossy().into_owned())
            .unwrap_or_default();
        self
    }
}

/// `Mock` for exported interfaces, `mock` otherwise.
pub fn mock_prefix(interface_name: &str) -> &'static str {
    if is_exported(interface_name) {
        "Mock"
    } else {
        "mock"
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Context<'a> {
    #[serde(flatten)]
    vars: &'a InterfaceVars,
    template: &'a str,
    dir: &'a str,
    filename: &'a str,
    pkg_name: &'a str,
    struct_name: &'a str,
    template_schema: &'a str,
}

impl<'a> Context<'a> {
    fn new(vars: &'a InterfaceVars, config: &'a Config) -> Self {
        Self {
            vars,
            template: config.template(),
            dir: config.dir(),
            filename: config.filename(),
            pkg_name: config.pkgname(),
            struct_name: config.structname(),
            template_schema: config.template_schema.as_deref().unwrap_or_default(),
        }
    }
}

/// Templated fields in the order they are expanded within a pass.
const TARGETS: [&str; 5] = ["structname", "pkgname", "dir", "filename", "template-schema"];

fn target<'c>(config: &'c mut Config, name: &str) -> &'c mut Option<String> {
    match name {
        "structname" => &mut config.structname,
        "pkgname" => &mut config.pkgname,
        "dir" => &mut config.dir,
        "filename" => &mut config.filename,
        _ => &mut config.template_schema,
    }
}

/// Expand `dir`, `filename`, `pkgname`, `structname` and `template-schema`
/// until none of them changes.
///
/// Fields may reference each other; each field is rendered against the
/// latest values of the others. A chain that still changes after
/// [`MAX_ITERATIONS`] passes is reported as a cycle.
pub fn resolve_templates(
    config: &mut Config,
    vars: &InterfaceVars,
    env: &Environment<'static>,
) -> Result<()> {
    for iteration in 0..MAX_ITERATIONS {
        let mut changed = None;
        for name in TARGETS {
            let Some(value) = target(config, name).clone() else {
                continue;
            };
            if !value.contains("{{") && !value.contains("{%") {
                continue;
            }
            let rendered = template::render_str(env, name, &value, Context::new(vars, config))?;
            if rendered != value {
                trace!(field = name, iteration, from = %value, to = %rendered, "expanded");
                *target(config, name) = Some(rendered);
                changed = Some(name);
            }
        }

        let Some(field) = changed else {
            return Ok(());
        };
        if iteration + 1 == MAX_ITERATIONS {
            return Err(Error::InfiniteLoopInTemplateVariables {
                field: field.to_string(),
                iterations: MAX_ITERATIONS,
            });
        }
    }
    Ok(())
}

/// `path` relative to `base`, both absolute, using `..` where needed.
fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    if !base.is_absolute() {
        return None;
    }
    let path: Vec<Component<'_>> = path.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();
    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in &path[common..] {
        out.push(component.as_os_str());
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use mockery_core::ErrorKind;

    use super::*;

    fn env() -> Environment<'static> {
        template::environment()
    }

    #[test]
    fn test_defaults_round_trip() {
        let mut config = Config {
            structname: Some("Mock{{.InterfaceName}}".into()),
            filename: Some("mocks_test.go".into()),
            dir: Some("{{.InterfaceDir}}".into()),
            ..Default::default()
        };
        let vars = InterfaceVars::new("Foo", Path::new("a/b/Foo.src"), Path::new("/work"));

        resolve_templates(&mut config, &vars, &env()).unwrap();
        assert_eq!(config.dir.as_deref(), Some("a/b"));
        assert_eq!(config.filename.as_deref(), Some("mocks_test.go"));
        assert_eq!(config.structname.as_deref(), Some("MockFoo"));
    }

    #[test]
    fn test_mock_variable_follows_export() {
        let lower = InterfaceVars::new("foo", Path::new("x/foo.go"), Path::new("/"));
        let upper = InterfaceVars::new("Foo", Path::new("x/foo.go"), Path::new("/"));
        assert_eq!(lower.mock, "mock");
        assert_eq!(upper.mock, "Mock");

        let mut config = Config {
            structname: Some("{{.Mock}}{{.InterfaceName}}".into()),
            ..Default::default()
        };
        resolve_templates(&mut config, &lower, &env()).unwrap();
        assert_eq!(config.structname.as_deref(), Some("mockfoo"));
    }

    #[test]
    fn test_cross_references_converge() {
        let mut config = Config {
            structname: Some("{{.Mock}}{{.InterfaceName}}".into()),
            filename: Some("{{.StructName | snakecase}}_test.go".into()),
            pkgname: Some("{{.SrcPackageName}}mocks".into()),
            template: Some("matryer".into()),
            template_schema: Some("{{.Template}}.schema.json".into()),
            ..Default::default()
        };
        let vars = InterfaceVars::new("HTTPClient", Path::new("/w/net/client.go"), Path::new("/w"))
            .with_package("net", "example.com/net");

        resolve_templates(&mut config, &vars, &env()).unwrap();
        assert_eq!(config.structname.as_deref(), Some("MockHTTPClient"));
        assert_eq!(config.filename.as_deref(), Some("mock_http_client_test.go"));
        assert_eq!(config.pkgname.as_deref(), Some("netmocks"));
        assert_eq!(config.template_schema.as_deref(), Some("matryer.schema.json"));
    }

    #[test]
    fn test_cycle_is_detected() {
        let mut config = Config {
            dir: Some("{{.ConfigDir}}/{{.StructName}}".into()),
            structname: Some("{{.Dir}}".into()),
            ..Default::default()
        };
        let vars = InterfaceVars::new("Foo", Path::new("a/Foo.go"), Path::new("/"))
            .with_config_file(Some("/cfg/.mockery.yaml"));

        let err = resolve_templates(&mut config, &vars, &env()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InfiniteLoopInTemplateVariables);
    }

    #[test]
    fn test_undefined_variable_is_render_error() {
        let mut config = Config {
            dir: Some("{{.Nope}}".into()),
            ..Default::default()
        };
        let vars = InterfaceVars::default();
        let err = resolve_templates(&mut config, &vars, &env()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
    }

    #[test]
    fn test_interface_dir_relative() {
        let vars = InterfaceVars::new("Foo", Path::new("/w/pkg/sub/foo.go"), Path::new("/w"));
        assert_eq!(vars.interface_dir, "/w/pkg/sub");
        assert_eq!(vars.interface_dir_relative, "pkg/sub");

        let vars = InterfaceVars::new("Foo", Path::new("/w/foo.go"), Path::new("/w"));
        assert_eq!(vars.interface_dir_relative, ".");

        let vars = InterfaceVars::new("Foo", Path::new("/other/foo.go"), Path::new("/w"));
        assert_eq!(vars.interface_dir_relative, "../other");
    }

    #[test]
    fn test_config_dir() {
        let vars = InterfaceVars::default().with_config_file(Some("/repo/.mockery.yaml"));
        assert_eq!(vars.config_dir, "/repo");
    }
}

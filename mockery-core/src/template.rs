//! Template environment shared by config templates and mock templates.
//!
//! Templates are rendered with minijinja. Go-template style references such
//! as `{{.InterfaceName}}` are accepted: a leading `.` in front of a name
//! inside an expression or statement block is dropped before compiling.
//!
//! Every helper is registered both as a filter and as a function, so
//! `{{ InterfaceName | firstLower }}` and `{{ firstLower(InterfaceName) }}`
//! render the same.

use std::{borrow::Cow, path::Path, sync::LazyLock};

use minijinja::{Environment, UndefinedBehavior};
use regex::Regex;
use serde::Serialize;

use crate::{Error, Result, utils};

static BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}").expect("valid block regex"));

static LEADING_DOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[\s(|,\[{!=+\-])\.([A-Za-z_])").expect("valid leading dot regex")
});

/// Rewrite Go-template style `.Name` references to plain `Name`.
pub fn normalize(source: &str) -> Cow<'_, str> {
    if !source.contains('.') {
        return Cow::Borrowed(source);
    }
    BLOCK.replace_all(source, |caps: &regex::Captures<'_>| {
        LEADING_DOT.replace_all(&caps[0], "${1}${2}").into_owned()
    })
}

/// Build the template environment with the shared function set.
pub fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);

    macro_rules! helpers {
        ($($name:literal => $func:expr),* $(,)?) => {
            $(
                env.add_filter($name, $func);
                env.add_function($name, $func);
            )*
        };
    }

    helpers! {
        "upper" => upper,
        "lower" => lower,
        "snakecase" => snakecase,
        "camelcase" => camelcase,
        "kebabcase" => kebabcase,
        "firstUpper" => first_upper,
        "firstLower" => first_lower,
        "exported" => first_upper,
        "deCapitalize" => de_capitalize,
        "title" => title,
        "trimPrefix" => trim_prefix,
        "trimSuffix" => trim_suffix,
        "replaceAll" => replace_all,
        "contains" => contains,
        "hasPrefix" => has_prefix,
        "hasSuffix" => has_suffix,
        "base" => base,
        "dir" => dir,
        "clean" => clean,
        "getenv" => getenv,
        "readFile" => read_file,
    }

    // these shadow minijinja builtins as filters, so only the call form is added
    env.add_function("trim", trim);
    env.add_function("replace", replace);
    env.add_function("split", split);
    env.add_function("join", join);

    env
}

/// Render a template string against a serializable context.
pub fn render_str<S: Serialize>(
    env: &Environment<'_>,
    name: &str,
    source: &str,
    ctx: S,
) -> Result<String> {
    let source = normalize(source);
    env.render_named_str(name, &source, ctx)
        .map_err(|e| Error::render(name, describe(&e)))
}

/// Compile a template without rendering it, surfacing syntax errors early.
pub fn check_syntax(env: &Environment<'static>, name: &str, source: &str) -> Result<()> {
    let mut scratch = env.clone();
    scratch
        .add_template_owned(name.to_string(), normalize(source).into_owned())
        .map_err(|e| Error::render(name, describe(&e)))
}

fn describe(err: &minijinja::Error) -> String {
    match err.detail() {
        Some(detail) => format!("{} ({})", err, detail),
        None => err.to_string(),
    }
}

fn upper(s: String) -> String {
    s.to_uppercase()
}

fn lower(s: String) -> String {
    s.to_lowercase()
}

fn snakecase(s: String) -> String {
    utils::to_snake_case(&s)
}

fn camelcase(s: String) -> String {
    utils::to_camel_case(&s)
}

fn kebabcase(s: String) -> String {
    utils::to_kebab_case(&s)
}

fn first_upper(s: String) -> String {
    utils::first_upper(&s)
}

fn first_lower(s: String) -> String {
    utils::first_lower(&s)
}

fn de_capitalize(s: String) -> String {
    utils::de_capitalize(&s)
}

/// Upper-case the first letter of every word, leaving the rest untouched.
fn title(s: String) -> String {
    let mut out = String::with_capacity(s.len());
    let mut boundary = true;
    for c in s.chars() {
        if boundary {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        boundary = !(c.is_alphanumeric() || c == '_');
    }
    out
}

/// Replace the first `n` occurrences, or all of them when `n` is absent or
/// negative.
fn replace(s: String, from: String, to: String, n: Option<i64>) -> String {
    match n.and_then(|n| usize::try_from(n).ok()) {
        Some(n) => s.replacen(&from, &to, n),
        None => s.replace(&from, &to),
    }
}

fn trim(s: String) -> String {
    s.trim().to_string()
}

fn trim_prefix(s: String, prefix: String) -> String {
    s.strip_prefix(prefix.as_str()).unwrap_or(&s).to_string()
}

fn trim_suffix(s: String, suffix: String) -> String {
    s.strip_suffix(suffix.as_str()).unwrap_or(&s).to_string()
}

fn replace_all(s: String, from: String, to: String) -> String {
    s.replace(&from, &to)
}

fn contains(s: String, needle: String) -> bool {
    s.contains(&needle)
}

fn has_prefix(s: String, prefix: String) -> bool {
    s.starts_with(&prefix)
}

fn has_suffix(s: String, suffix: String) -> bool {
    s.ends_with(&suffix)
}

fn split(s: String, sep: String) -> Vec<String> {
    s.split(sep.as_str()).map(str::to_string).collect()
}

fn join(items: Vec<String>, sep: String) -> String {
    items.join(&sep)
}

fn base(path: String) -> String {
    Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".to_string())
}

fn dir(path: String) -> String {
    match Path::new(&path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    }
}

fn clean(path: String) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let absolute = path.starts_with('/');
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." if parts.last().is_some_and(|p| *p != "..") => {
                parts.pop();
            }
            ".." if absolute => {}
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

fn getenv(name: String) -> String {
    std::env::var(name).unwrap_or_default()
}

fn read_file(path: String) -> std::result::Result<String, minijinja::Error> {
    std::fs::read_to_string(&path).map_err(|e| {
        minijinja::Error::new(
            minijinja::ErrorKind::InvalidOperation,
            format!("failed to read '{}': {}", path, e),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ErrorKind;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_go_style_references() {
        assert_eq!(normalize("{{.InterfaceName}}"), "{{InterfaceName}}");
        assert_eq!(
            normalize("{{ .Mock }}{{ .InterfaceName | firstLower }}"),
            "{{ Mock }}{{ InterfaceName | firstLower }}"
        );
        assert_eq!(normalize("{{- .Dir -}}/x.go"), "{{- Dir -}}/x.go");
    }

    #[test]
    fn test_normalize_leaves_text_and_attributes_alone() {
        assert_eq!(normalize("mocks_test.go"), "mocks_test.go");
        assert_eq!(normalize("{{ mock.MockName }}"), "{{ mock.MockName }}");
        assert_eq!(normalize("{{ 1.5 }}"), "{{ 1.5 }}");
    }

    #[test]
    fn test_render_helpers() {
        let env = environment();
        let ctx = vars(&[("InterfaceName", "HTTPClient")]);

        let out = render_str(
            &env,
            "t",
            "{{ .InterfaceName | snakecase }} {{ firstLower(.InterfaceName) }} {{ .InterfaceName | deCapitalize }}",
            &ctx,
        )
        .unwrap();
        assert_eq!(out, "http_client hTTPClient httpClient");
    }

    #[test]
    fn test_title_and_replace_call_forms() {
        let env = environment();
        let ctx = vars(&[("InterfaceName", "http client")]);

        let out = render_str(
            &env,
            "t",
            r#"{{ title(.InterfaceName) }}|{{ .InterfaceName | title }}|{{ replace("foo", "o", "a") }}|{{ replace("foo", "o", "a", 1) }}"#,
            &ctx,
        )
        .unwrap();
        assert_eq!(out, "Http Client|Http Client|faa|fao");
        assert_eq!(title("hTTP_client-id".into()), "HTTP_client-Id");
    }

    #[test]
    fn test_render_undefined_is_error() {
        let env = environment();
        let err = render_str(&env, "t", "{{ .Missing }}", vars(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
    }

    #[test]
    fn test_check_syntax_reports_render_error() {
        let env = environment();
        let err = check_syntax(&env, "broken.tmpl", "{% for x in %}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
        assert!(err.to_string().contains("broken.tmpl"));
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(base("a/b/c.go".into()), "c.go");
        assert_eq!(dir("a/b/c.go".into()), "a/b");
        assert_eq!(dir("c.go".into()), ".");
        assert_eq!(clean("a/./b/../c".into()), "a/c");
        assert_eq!(clean("/a/../../b".into()), "/b");
        assert_eq!(clean("".into()), ".");
    }
}

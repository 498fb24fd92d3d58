//! Minimal `go.mod` reader: module path, requirements and replacements.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoMod {
    pub module: String,
    /// Required module path to version.
    pub requires: IndexMap<String, String>,
    pub replaces: IndexMap<String, Replacement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// `=> ../local/dir`
    Dir(String),
    /// `=> other/module v1.2.3`
    Module { path: String, version: String },
}

impl GoMod {
    pub fn parse(src: &str) -> GoMod {
        let mut module = GoMod::default();
        let mut block: Option<&str> = None;

        for line in src.lines() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }
            if let Some(verb) = block {
                if line == ")" {
                    block = None;
                } else {
                    module.directive(verb, line);
                }
                continue;
            }

            let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            if rest == "(" {
                block = Some(verb);
            } else {
                module.directive(verb, rest);
            }
        }
        module
    }

    fn directive(&mut self, verb: &str, args: &str) {
        match verb {
            "module" => self.module = unquote(args).to_string(),
            "require" => {
                let mut fields = args.split_whitespace();
                if let (Some(path), Some(version)) = (fields.next(), fields.next()) {
                    self.requires
                        .insert(unquote(path).to_string(), version.to_string());
                }
            }
            "replace" => {
                let Some((from, to)) = args.split_once("=>") else {
                    return;
                };
                let Some(from) = from.split_whitespace().next() else {
                    return;
                };
                let to: Vec<&str> = to.split_whitespace().collect();
                let replacement = match to.as_slice() {
                    [path, version] => Replacement::Module {
                        path: unquote(path).to_string(),
                        version: version.to_string(),
                    },
                    [dir] => Replacement::Dir(unquote(dir).to_string()),
                    _ => return,
                };
                self.replaces.insert(unquote(from).to_string(), replacement);
            }
            _ => {}
        }
    }

    /// The required module providing `import_path`, by longest prefix.
    pub fn providing_module(&self, import_path: &str) -> Option<(&str, &str)> {
        self.requires
            .iter()
            .filter(|(module, _)| within(import_path, module))
            .max_by_key(|(module, _)| module.len())
            .map(|(module, version)| (module.as_str(), version.as_str()))
    }
}

/// Whether `path` is `module` or below it.
pub fn within(path: &str, module: &str) -> bool {
    path == module
        || path
            .strip_prefix(module)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Module cache encoding: upper-case letters become `!` and lower case.
pub fn escape_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

fn strip_comment(line: &str) -> &str {
    line.split_once("//").map_or(line, |(code, _)| code)
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_go_mod() {
        let src = r#"module github.com/acme/shop

go 1.22

require github.com/stretchr/testify v1.9.0

require (
    github.com/Azure/azure-sdk-for-go v68.0.0+incompatible
    golang.org/x/sync v0.7.0 // indirect
)

replace github.com/acme/lib => ../lib
replace (
    example.com/old v1.0.0 => example.com/new v1.1.0
)
"#;
        let module = GoMod::parse(src);
        assert_eq!(module.module, "github.com/acme/shop");
        assert_eq!(module.requires.len(), 3);
        assert_eq!(module.requires["golang.org/x/sync"], "v0.7.0");
        assert_eq!(
            module.replaces["github.com/acme/lib"],
            Replacement::Dir("../lib".into())
        );
        assert_eq!(
            module.replaces["example.com/old"],
            Replacement::Module {
                path: "example.com/new".into(),
                version: "v1.1.0".into()
            }
        );
    }

    #[test]
    fn test_providing_module_prefers_longest() {
        let module = GoMod::parse(
            "module a\n\nrequire (\n    cloud.google.com/go v0.1.0\n    cloud.google.com/go/storage v1.2.0\n)\n",
        );
        assert_eq!(
            module.providing_module("cloud.google.com/go/storage/internal"),
            Some(("cloud.google.com/go/storage", "v1.2.0"))
        );
        assert_eq!(
            module.providing_module("cloud.google.com/go/pubsub"),
            Some(("cloud.google.com/go", "v0.1.0"))
        );
        assert_eq!(module.providing_module("cloud.google.com/gopher"), None);
    }

    #[test]
    fn test_escape_path() {
        assert_eq!(
            escape_path("github.com/Azure/azure-sdk-for-go"),
            "github.com/!azure/azure-sdk-for-go"
        );
    }
}

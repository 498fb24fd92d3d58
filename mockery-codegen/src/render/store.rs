//! Template and schema sources: built-in, `file://` and `http(s)://`.

use std::{cell::RefCell, collections::HashMap, path::Path, rc::Rc, time::Duration};

use mockery_core::{Error, Result};
use serde_json::Value;
use tracing::debug;

/// A template compiled into the binary.
#[derive(Debug)]
pub struct BuiltinTemplate {
    pub name: &'static str,
    pub source: &'static str,
    pub schema: &'static str,
    /// Packages the template body refers to, as (path, name).
    pub imports: &'static [(&'static str, &'static str)],
    /// The template refers to the source package through `SrcPkgQualifier`.
    pub uses_source_package: bool,
}

pub const BUILTIN_TEMPLATES: &[BuiltinTemplate] = &[
    BuiltinTemplate {
        name: "testify",
        source: include_str!("../../templates/testify.tmpl"),
        schema: include_str!("../../templates/testify.schema.json"),
        imports: &[("github.com/stretchr/testify/mock", "mock")],
        uses_source_package: false,
    },
    BuiltinTemplate {
        name: "matryer",
        source: include_str!("../../templates/matryer.tmpl"),
        schema: include_str!("../../templates/matryer.schema.json"),
        imports: &[("sync", "sync")],
        uses_source_package: true,
    },
];

pub fn builtin(name: &str) -> Option<&'static BuiltinTemplate> {
    BUILTIN_TEMPLATES.iter().find(|t| t.name == name)
}

/// Downloads remote templates and schemas.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// [`Fetcher`] backed by a blocking `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("mockery/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| fetch_error("http client", e))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "downloading");
        self.client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| fetch_error(url, e))
    }
}

fn fetch_error(location: &str, message: impl ToString) -> Error {
    Error::TemplateFetch {
        location: location.to_string(),
        message: message.to_string(),
    }
}

/// A template ready to render.
#[derive(Debug, Clone)]
pub struct Template {
    /// Name used in error messages.
    pub name: String,
    pub source: Rc<str>,
    pub builtin: Option<&'static BuiltinTemplate>,
}

impl Template {
    pub fn imports(&self) -> &'static [(&'static str, &'static str)] {
        self.builtin.map_or(&[], |b| b.imports)
    }

    pub fn uses_source_package(&self) -> bool {
        self.builtin.is_some_and(|b| b.uses_source_package)
    }
}

/// Resolves template locations, caching what it reads for the run.
pub struct TemplateStore {
    fetcher: Box<dyn Fetcher>,
    cache: RefCell<HashMap<String, Rc<str>>>,
}

impl TemplateStore {
    pub fn new(fetcher: impl Fetcher + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Look up `location`: a built-in name, `file://` path or URL.
    pub fn template(&self, location: &str) -> Result<Template> {
        if let Some(builtin) = builtin(location) {
            return Ok(Template {
                name: builtin.name.to_string(),
                source: Rc::from(builtin.source),
                builtin: Some(builtin),
            });
        }
        if !is_file_url(location) && !is_http_url(location) {
            return Err(fetch_error(
                location,
                "not a built-in template, file:// path or http(s):// URL",
            ));
        }
        Ok(Template {
            name: location.to_string(),
            source: self.read(location)?,
            builtin: None,
        })
    }

    /// Load and parse the JSON schema at `location`.
    ///
    /// `<builtin>.schema.json` names the schema of a built-in template. Any
    /// other location without a scheme is a filesystem path.
    pub fn schema(&self, location: &str) -> Result<Value> {
        let text = match BUILTIN_TEMPLATES
            .iter()
            .find(|t| location.strip_suffix(".schema.json") == Some(t.name))
        {
            Some(builtin) => Rc::from(builtin.schema),
            None => self.read(location)?,
        };
        serde_json::from_str(&text).map_err(|e| fetch_error(location, format!("invalid JSON: {e}")))
    }

    fn read(&self, location: &str) -> Result<Rc<str>> {
        if let Some(text) = self.cache.borrow().get(location) {
            return Ok(Rc::clone(text));
        }

        let text: Rc<str> = if is_http_url(location) {
            self.fetcher.fetch(location)?.into()
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            std::fs::read_to_string(Path::new(path))
                .map_err(|e| fetch_error(location, e))?
                .into()
        };
        self.cache
            .borrow_mut()
            .insert(location.to_string(), Rc::clone(&text));
        Ok(text)
    }
}

fn is_file_url(location: &str) -> bool {
    location.starts_with("file://")
}

fn is_http_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use mockery_core::ErrorKind;
    use tempfile::TempDir;

    use super::*;

    struct CountingFetcher {
        calls: Rc<Cell<usize>>,
    }

    impl Fetcher for CountingFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            if url.ends_with("missing.tmpl") {
                return Err(fetch_error(url, "404 Not Found"));
            }
            Ok(format!("// from {url}\n"))
        }
    }

    fn store() -> (TemplateStore, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let store = TemplateStore::new(CountingFetcher {
            calls: Rc::clone(&calls),
        });
        (store, calls)
    }

    #[test]
    fn test_builtin_templates_and_schemas() {
        let (store, _) = store();
        let testify = store.template("testify").unwrap();
        assert_eq!(testify.name, "testify");
        assert_eq!(
            testify.imports(),
            &[("github.com/stretchr/testify/mock", "mock")]
        );
        assert!(!testify.uses_source_package());
        assert!(store.template("matryer").unwrap().uses_source_package());

        let schema = store.schema("testify.schema.json").unwrap();
        assert_eq!(schema["type"], "object");
        assert!(store.schema("matryer.schema.json").is_ok());
    }

    #[test]
    fn test_remote_templates_are_fetched_once() {
        let (store, calls) = store();
        let url = "https://example.com/custom.tmpl";
        let first = store.template(url).unwrap();
        let second = store.template(url).unwrap();
        assert_eq!(&*first.source, "// from https://example.com/custom.tmpl\n");
        assert_eq!(first.source, second.source);
        assert!(first.builtin.is_none());
        assert_eq!(calls.get(), 1);

        let err = store
            .template("https://example.com/missing.tmpl")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateFetch);
    }

    #[test]
    fn test_file_templates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.tmpl");
        std::fs::write(&path, "package {{ PkgName }}\n").unwrap();

        let (store, calls) = store();
        let location = format!("file://{}", path.display());
        let template = store.template(&location).unwrap();
        assert_eq!(&*template.source, "package {{ PkgName }}\n");
        assert_eq!(calls.get(), 0);

        let missing = format!("file://{}", temp.path().join("nope.tmpl").display());
        assert_eq!(
            store.template(&missing).unwrap_err().kind(),
            ErrorKind::TemplateFetch
        );
    }

    #[test]
    fn test_unknown_template_name() {
        let (store, _) = store();
        let err = store.template("gomock").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateFetch);
        assert!(err.to_string().contains("gomock"));
    }
}

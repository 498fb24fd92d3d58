use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for mockery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable identity of an [`Error`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ConfigNotFound,
    ConfigDecode,
    InfiniteLoopInTemplateVariables,
    PackageLoad,
    PackageNotInConfig,
    IncludeExcludeRegex,
    OutputUniformityViolation,
    TypeReplacementMissing,
    TemplateSchemaValidation,
    TemplateFetch,
    Render,
    Format,
    OutputExists,
    FileIo,
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("no .mockery.yaml or .mockery.yml found in '{start}' or any parent directory")]
    #[diagnostic(
        code(mockery::config_not_found),
        help("run 'mockery init <module>' to create a config file")
    )]
    ConfigNotFound { start: PathBuf },

    #[error("{message}")]
    #[diagnostic(code(mockery::config_decode))]
    ConfigDecode {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error(
        "template variables of {field} did not converge after {iterations} iterations, they probably reference each other"
    )]
    #[diagnostic(code(mockery::template_variable_cycle))]
    InfiniteLoopInTemplateVariables { field: String, iterations: usize },

    #[error("failed to load package '{package}': {message}")]
    #[diagnostic(code(mockery::package_load))]
    PackageLoad { package: String, message: String },

    #[error("package '{package}' is not present in the config")]
    #[diagnostic(code(mockery::package_not_in_config))]
    PackageNotInConfig { package: String },

    #[error("invalid {field} '{pattern}': {message}")]
    #[diagnostic(code(mockery::regex))]
    IncludeExcludeRegex {
        field: String,
        pattern: String,
        message: String,
    },

    #[error("mocks for '{path}' disagree on {field}: '{expected}' vs '{found}'")]
    #[diagnostic(
        code(mockery::output_uniformity),
        help("every mock written to the same file must share pkgname, source package and template")
    )]
    OutputUniformityViolation {
        path: PathBuf,
        field: String,
        expected: String,
        found: String,
    },

    #[error("type '{type_name}' not found in replacement package '{package}'")]
    #[diagnostic(code(mockery::replace_type))]
    TypeReplacementMissing { package: String, type_name: String },

    #[error("template-data does not match schema '{schema}': {message}")]
    #[diagnostic(code(mockery::template_schema))]
    TemplateSchemaValidation { schema: String, message: String },

    #[error("failed to fetch '{location}': {message}")]
    #[diagnostic(code(mockery::template_fetch))]
    TemplateFetch { location: String, message: String },

    #[error("failed to render template '{template}': {message}")]
    #[diagnostic(code(mockery::render))]
    Render { template: String, message: String },

    #[error("failed to format '{path}' with {formatter}: {message}")]
    #[diagnostic(code(mockery::format))]
    Format {
        path: PathBuf,
        formatter: String,
        message: String,
    },

    #[error("output file '{path}' already exists")]
    #[diagnostic(
        code(mockery::output_exists),
        help("set 'force-file-write: true' to overwrite existing files")
    )]
    OutputExists { path: PathBuf },

    #[error("failed to access '{path}'")]
    #[diagnostic(code(mockery::io))]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigNotFound { .. } => ErrorKind::ConfigNotFound,
            Error::ConfigDecode { .. } => ErrorKind::ConfigDecode,
            Error::InfiniteLoopInTemplateVariables { .. } => {
                ErrorKind::InfiniteLoopInTemplateVariables
            }
            Error::PackageLoad { .. } => ErrorKind::PackageLoad,
            Error::PackageNotInConfig { .. } => ErrorKind::PackageNotInConfig,
            Error::IncludeExcludeRegex { .. } => ErrorKind::IncludeExcludeRegex,
            Error::OutputUniformityViolation { .. } => ErrorKind::OutputUniformityViolation,
            Error::TypeReplacementMissing { .. } => ErrorKind::TypeReplacementMissing,
            Error::TemplateSchemaValidation { .. } => ErrorKind::TemplateSchemaValidation,
            Error::TemplateFetch { .. } => ErrorKind::TemplateFetch,
            Error::Render { .. } => ErrorKind::Render,
            Error::Format { .. } => ErrorKind::Format,
            Error::OutputExists { .. } => ErrorKind::OutputExists,
            Error::FileIo { .. } => ErrorKind::FileIo,
        }
    }

    /// Create a decode error for a config document.
    pub fn decode(
        message: impl Into<String>,
        src: &str,
        filename: &str,
        span: Option<SourceSpan>,
    ) -> Self {
        Error::ConfigDecode {
            src: NamedSource::new(filename, src.to_string()),
            span,
            message: message.into(),
        }
    }

    /// Create a package load error.
    pub fn package_load(package: impl Into<String>, message: impl Into<String>) -> Self {
        Error::PackageLoad {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Create a render error.
    pub fn render(template: impl Into<String>, message: impl ToString) -> Self {
        Error::Render {
            template: template.into(),
            message: message.to_string(),
        }
    }

    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileIo {
            path: path.into(),
            source,
        }
    }
}

/// Find the kind of the first mockery [`Error`] in a report's cause chain.
///
/// Context added with `wrap_err` does not hide the original kind.
pub fn error_kind(report: &eyre::Report) -> Option<ErrorKind> {
    report
        .chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map(Error::kind)
}

#[cfg(test)]
mod tests {
    use eyre::WrapErr;

    use super::*;

    #[test]
    fn test_kind_survives_wrapping() {
        let result: eyre::Result<()> = Err(Error::OutputExists {
            path: PathBuf::from("mocks_test.go"),
        })
        .wrap_err("writing bucket")
        .wrap_err("generating package github.com/foo/bar");

        let report = result.unwrap_err();
        assert_eq!(error_kind(&report), Some(ErrorKind::OutputExists));
    }

    #[test]
    fn test_kind_missing_for_foreign_errors() {
        let report = eyre::eyre!("something else");
        assert_eq!(error_kind(&report), None);
    }

    #[test]
    fn test_decode_message() {
        let err = Error::decode("config has invalid keys: foo", "foo: 1\n", ".mockery.yaml", None);
        assert_eq!(err.kind(), ErrorKind::ConfigDecode);
        assert_eq!(err.to_string(), "config has invalid keys: foo");
    }
}

//! Post-processing of rendered Go source.

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use mockery_config::Formatter;
use mockery_core::{Error, Result};
use tracing::{error, warn};

/// Formats rendered source before it is written.
pub trait SourceFormatter {
    fn name(&self) -> &'static str;

    /// Format `source`, destined for `path`.
    fn format(&self, path: &Path, source: &str) -> Result<String>;
}

/// Leaves the source untouched.
pub struct Noop;

impl SourceFormatter for Noop {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn format(&self, _path: &Path, source: &str) -> Result<String> {
        Ok(source.to_string())
    }
}

/// Pipes the source through an external Go formatter.
pub struct External {
    name: &'static str,
    binary: PathBuf,
    /// Pass `-srcdir <dir of path>`.
    srcdir: bool,
}

impl SourceFormatter for External {
    fn name(&self) -> &'static str {
        self.name
    }

    fn format(&self, path: &Path, source: &str) -> Result<String> {
        let mut command = Command::new(&self.binary);
        if self.srcdir {
            if let Some(dir) = path.parent() {
                command.arg("-srcdir").arg(dir);
            }
        }
        let fail = |message: String| {
            dump(path, source);
            Error::Format {
                path: path.to_path_buf(),
                formatter: self.name.to_string(),
                message,
            }
        };

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| fail(e.to_string()))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| fail(e.to_string()))?;
        }
        let output = child.wait_with_output().map_err(|e| fail(e.to_string()))?;
        if !output.status.success() {
            return Err(fail(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        String::from_utf8(output.stdout).map_err(|e| fail(e.to_string()))
    }
}

/// The formatter for a config value.
///
/// `goimports` falls back to `gofmt` when it is not on `PATH`.
pub fn formatter_for(kind: Formatter) -> Result<Box<dyn SourceFormatter>> {
    match kind {
        Formatter::Noop => Ok(Box::new(Noop)),
        Formatter::Gofmt => gofmt(),
        Formatter::Goimports => match which::which("goimports") {
            Ok(binary) => Ok(Box::new(External {
                name: "goimports",
                binary,
                srcdir: true,
            })),
            Err(_) => {
                warn!("goimports not found in PATH, falling back to gofmt");
                gofmt()
            }
        },
    }
}

fn gofmt() -> Result<Box<dyn SourceFormatter>> {
    let binary = which::which("gofmt").map_err(|e| Error::Format {
        path: PathBuf::new(),
        formatter: "gofmt".to_string(),
        message: e.to_string(),
    })?;
    Ok(Box::new(External {
        name: "gofmt",
        binary,
        srcdir: false,
    }))
}

/// Log the unformatted source with line numbers.
fn dump(path: &Path, source: &str) {
    error!(
        path = %path.display(),
        "unformatted source:\n{}",
        numbered(source)
    );
}

fn numbered(source: &str) -> String {
    source
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{:>4}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use mockery_core::ErrorKind;

    use super::*;

    #[test]
    fn test_noop_returns_source() {
        let formatter = formatter_for(Formatter::Noop).unwrap();
        assert_eq!(formatter.name(), "noop");
        assert_eq!(
            formatter.format(Path::new("x.go"), "package x\n").unwrap(),
            "package x\n"
        );
    }

    #[test]
    fn test_numbered_lines() {
        assert_eq!(numbered("package x\n\nfunc"), "   1: package x\n   2: \n   3: func");
    }

    #[test]
    fn test_failing_formatter_is_format_error() {
        let formatter = External {
            name: "gofmt",
            binary: PathBuf::from("/nonexistent/gofmt"),
            srcdir: false,
        };
        let err = formatter
            .format(Path::new("mocks_test.go"), "package x\n")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("mocks_test.go"));
    }
}

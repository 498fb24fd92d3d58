//! Decides which interfaces of a package get mocks.

use mockery_core::{Error, Result};
use regex::Regex;

use crate::tree::PackageConfig;

/// Outcome of [`should_generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub generate: bool,
    /// Options that were set but had no effect on this decision.
    pub warnings: Vec<String>,
}

impl Decision {
    fn generate() -> Self {
        Self {
            generate: true,
            warnings: Vec::new(),
        }
    }

    fn skip() -> Self {
        Self {
            generate: false,
            warnings: Vec::new(),
        }
    }

    fn warn(mut self, message: impl Into<String>) -> Self {
        self.warnings.push(message.into());
        self
    }
}

/// Decide whether `interface` of `package` should be generated.
///
/// `all` wins over everything, then an explicit listing, then
/// `include-interface-regex` narrowed by `exclude-interface-regex`.
pub fn should_generate(package: &PackageConfig, interface: &str) -> Result<Decision> {
    let config = &package.config;
    let include = config.include_interface_regex.as_deref();
    let exclude = config.exclude_interface_regex.as_deref();

    if config.all() {
        let mut decision = Decision::generate();
        if include.is_some() {
            decision = decision.warn("include-interface-regex is set along with all: true, ignoring it");
        }
        if exclude.is_some() {
            decision = decision.warn("exclude-interface-regex is set along with all: true, ignoring it");
        }
        return Ok(decision);
    }

    if package.interfaces.contains_key(interface) {
        return Ok(Decision::generate());
    }

    let Some(include) = include else {
        let decision = Decision::skip();
        return Ok(match exclude {
            Some(_) => decision.warn(
                "exclude-interface-regex is set without include-interface-regex, ignoring it",
            ),
            None => decision,
        });
    };

    if !matches("include-interface-regex", include, interface)? {
        return Ok(Decision::skip());
    }

    match exclude {
        Some(exclude) if matches("exclude-interface-regex", exclude, interface)? => {
            Ok(Decision::skip())
        }
        _ => Ok(Decision::generate()),
    }
}

fn matches(field: &str, pattern: &str, name: &str) -> Result<bool> {
    let re = Regex::new(pattern).map_err(|e| Error::IncludeExcludeRegex {
        field: field.to_string(),
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    Ok(re.is_match(name))
}

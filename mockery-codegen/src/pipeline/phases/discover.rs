//! Discover phase - loads packages and selects the interfaces to mock.

use std::{path::Path, rc::Rc};

use eyre::{Result, WrapErr};
use minijinja::Environment;
use mockery_config::{InterfaceVars, resolve_templates, should_generate};
use mockery_core::template;
use mockery_go::interfaces;
use tracing::{debug, warn};

use crate::{
    grouping::InterfaceDescriptor,
    pipeline::{Diagnostic, GenerationContext, Phase},
};

/// Produces one [`InterfaceDescriptor`] per selected interface and variant,
/// with templated config fields resolved.
pub struct DiscoverPhase {
    env: Environment<'static>,
}

impl DiscoverPhase {
    pub fn new() -> Self {
        Self {
            env: template::environment(),
        }
    }
}

impl Default for DiscoverPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for DiscoverPhase {
    fn name(&self) -> &'static str {
        "discover"
    }

    fn description(&self) -> &'static str {
        "Load packages and select interfaces"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()> {
        let resolved = ctx
            .resolved
            .take()
            .ok_or_else(|| eyre::eyre!("discover requires a resolved config"))?;

        for (path, package_config) in resolved.packages() {
            ctx.check_cancelled()?;

            let package = ctx
                .loader
                .load(path)
                .wrap_err_with(|| format!("loading package {path}"))?;
            if package.is_empty() {
                debug!(package = path, "package has no source files, skipping");
                continue;
            }

            let include_generated = package_config.config.include_auto_generated();
            let found = interfaces(&package, ctx.loader, include_generated)
                .wrap_err_with(|| format!("discovering interfaces in {path}"))?;

            for interface in found {
                let location = format!("{path}.{}", interface.name);
                let decision = should_generate(package_config, &interface.name)?;
                for message in decision.warnings {
                    warn!(interface = %location, "{message}");
                    ctx.add_diagnostic(Diagnostic::warning(self.name(), message).at(&location));
                }
                if !decision.generate {
                    debug!(interface = %location, "not selected");
                    continue;
                }

                for mut variant in resolved.variants(path, &interface.name)? {
                    let vars = InterfaceVars::new(&interface.name, &interface.file, &ctx.cwd)
                        .with_package(&package.name, &package.path)
                        .with_config_file(variant.config_file.as_deref());
                    resolve_templates(&mut variant, &vars, &self.env)
                        .wrap_err_with(|| format!("resolving config templates for {location}"))?;

                    if Path::new(variant.dir()).is_relative() {
                        let absolute = ctx.cwd.join(variant.dir());
                        variant.dir = Some(absolute.to_string_lossy().into_owned());
                    }

                    debug!(
                        interface = %location,
                        structname = variant.structname(),
                        dir = variant.dir(),
                        "selected"
                    );
                    ctx.descriptors.push(InterfaceDescriptor::new(
                        Rc::clone(&package),
                        interface.clone(),
                        variant,
                    ));
                }
            }
        }

        ctx.resolved = Some(resolved);
        Ok(())
    }
}

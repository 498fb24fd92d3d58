//! Resolve phase - merges the config tree.

use eyre::{Result, WrapErr};
use tracing::debug;

use crate::pipeline::{GenerationContext, Phase};

pub struct ResolvePhase;

impl Phase for ResolvePhase {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn description(&self) -> &'static str {
        "Merge config levels and expand recursive packages"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()> {
        let root = ctx
            .root
            .take()
            .ok_or_else(|| eyre::eyre!("config already resolved"))?;
        let loader = ctx.loader;
        let resolved = root
            .resolve(|path| loader.list_subpackages(path))
            .wrap_err("resolving config")?;
        debug!(packages = resolved.packages().count(), "resolved config");
        ctx.resolved = Some(resolved);
        Ok(())
    }
}

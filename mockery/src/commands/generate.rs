use eyre::{Context, Result};
use mockery_codegen::{GenerationContext, HttpFetcher, Pipeline, TemplateStore};
use mockery_core::WriteResult;
use mockery_go::GoLoader;
use tracing::{info, warn};

use super::GlobalArgs;

/// The default command: generate every configured mock.
pub struct GenerateCommand;

impl GenerateCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let cwd = std::env::current_dir().wrap_err("Failed to get current directory")?;
        let loaded = global.load(&cwd);

        let build_tags = loaded.root.config.build_tags();
        let loader = GoLoader::new(&cwd, &build_tags).wrap_err("Failed to locate the Go module")?;
        let store = TemplateStore::new(HttpFetcher::new()?);

        let ctx = GenerationContext::new(loaded.root, &loader, &store, &cwd);
        let ctx = Pipeline::new().run(ctx).wrap_err("Generation failed")?;

        let created = ctx
            .written
            .iter()
            .filter(|(_, result)| *result == WriteResult::Created)
            .count();
        info!(
            files = ctx.written.len(),
            created,
            replaced = ctx.written.len() - created,
            "generation complete"
        );
        if ctx.has_warnings() {
            warn!(count = ctx.warnings().count(), "finished with warnings");
        }
        Ok(())
    }
}

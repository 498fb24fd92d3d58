//! Render phase - renders and formats every output file.

use eyre::{Result, WrapErr};
use mockery_core::{GeneratedFile, Overwrite};

use crate::{
    format::formatter_for,
    pipeline::{GenerationContext, Phase, RenderedFile},
    render::Renderer,
};

pub struct RenderPhase;

impl Phase for RenderPhase {
    fn name(&self) -> &'static str {
        "render"
    }

    fn description(&self) -> &'static str {
        "Render templates and format the output"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()> {
        let renderer = Renderer::new(ctx.store, ctx.loader);
        let mut rendered = Vec::with_capacity(ctx.buckets.len());

        for bucket in &ctx.buckets {
            ctx.check_cancelled()?;
            let path = bucket.path.display();
            let config = &bucket.interfaces[0].config;

            let source = renderer
                .render(bucket)
                .wrap_err_with(|| format!("rendering {path}"))?;
            let formatted = formatter_for(config.formatter())
                .and_then(|formatter| formatter.format(&bucket.path, &source))
                .wrap_err_with(|| format!("formatting {path}"))?;

            rendered.push(RenderedFile {
                file: GeneratedFile::new(&bucket.path, formatted),
                overwrite: Overwrite::from_force(config.force_file_write()),
            });
        }

        ctx.rendered = rendered;
        Ok(())
    }
}

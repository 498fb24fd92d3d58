//! Write phase - writes rendered files to disk.

use eyre::{Result, WrapErr};
use mockery_core::{Error, Overwrite};
use tracing::info;

use crate::pipeline::{GenerationContext, Phase};

/// Writes every rendered file.
///
/// Files that may not be replaced are checked up front, so an
/// `OutputExists` leaves the tree untouched. Other I/O failures can still
/// stop the phase after earlier files were written.
pub struct WritePhase;

impl Phase for WritePhase {
    fn name(&self) -> &'static str {
        "write"
    }

    fn description(&self) -> &'static str {
        "Write generated files"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()> {
        for rendered in &ctx.rendered {
            let path = rendered.file.path();
            if rendered.overwrite == Overwrite::Never && path.exists() {
                return Err(Error::OutputExists {
                    path: path.to_path_buf(),
                })
                .wrap_err_with(|| format!("writing {}", path.display()));
            }
        }

        let mut written = Vec::with_capacity(ctx.rendered.len());
        for rendered in &ctx.rendered {
            ctx.check_cancelled()?;
            let path = rendered.file.path();
            let result = rendered
                .file
                .write(rendered.overwrite)
                .wrap_err_with(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), ?result, "wrote mock file");
            written.push((path.to_path_buf(), result));
        }
        ctx.written = written;
        Ok(())
    }
}

//! Group phase - buckets mocks by output file.

use eyre::Result;
use tracing::debug;

use crate::{
    grouping::Grouping,
    pipeline::{GenerationContext, Phase},
};

pub struct GroupPhase;

impl Phase for GroupPhase {
    fn name(&self) -> &'static str {
        "group"
    }

    fn description(&self) -> &'static str {
        "Group mocks by output file"
    }

    fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()> {
        let mut grouping = Grouping::new();
        for descriptor in ctx.descriptors.drain(..) {
            grouping.add(descriptor)?;
        }
        debug!(files = grouping.len(), "grouped mocks");
        ctx.buckets = grouping.into_buckets();
        Ok(())
    }
}

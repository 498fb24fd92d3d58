//! Pipeline phase trait.

use eyre::Result;

use super::GenerationContext;

/// A step of the generation pipeline.
///
/// Phases run in order and communicate through the [`GenerationContext`].
/// Fatal problems are returned as errors; anything else is recorded as a
/// diagnostic.
pub trait Phase {
    /// The name of this phase, used in logs and diagnostics.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn run(&self, ctx: &mut GenerationContext<'_>) -> Result<()>;
}

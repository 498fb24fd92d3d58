//! Pipeline orchestrator.

use eyre::Result;
use tracing::debug;

use super::{
    CancelToken, GenerationContext, Phase,
    phases::{DiscoverPhase, GroupPhase, RenderPhase, ResolvePhase, WritePhase},
};

/// Runs phases in order over a [`GenerationContext`].
///
/// ```ignore
/// let ctx = GenerationContext::new(root, &loader, &store, cwd);
/// let ctx = Pipeline::new().run(ctx)?;
/// for (path, result) in &ctx.written {
///     println!("{result:?} {}", path.display());
/// }
/// ```
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
    cancel: CancelToken,
}

impl Pipeline {
    /// resolve → discover → group → render → write.
    pub fn new() -> Self {
        Self::empty()
            .phase(ResolvePhase)
            .phase(DiscoverPhase::new())
            .phase(GroupPhase)
            .phase(RenderPhase)
            .phase(WritePhase)
    }

    /// A pipeline without phases.
    pub fn empty() -> Self {
        Self {
            phases: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Use `token` to cancel this pipeline from elsewhere.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn phase_names(&self) -> Vec<&'static str> {
        self.phases.iter().map(|p| p.name()).collect()
    }

    pub fn run<'a>(&self, mut ctx: GenerationContext<'a>) -> Result<GenerationContext<'a>> {
        ctx.cancel = self.cancel.clone();
        for phase in &self.phases {
            ctx.check_cancelled()?;
            debug!(phase = phase.name(), "{}", phase.description());
            phase.run(&mut ctx)?;
        }
        Ok(ctx)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use mockery_config::RootConfig;

    use super::*;
    use crate::{
        render::{Fetcher, TemplateStore},
        testing::MemoryLoader,
    };

    struct NoFetch;

    impl Fetcher for NoFetch {
        fn fetch(&self, _url: &str) -> mockery_core::Result<String> {
            Ok(String::new())
        }
    }

    struct Counting(Rc<Cell<usize>>);

    impl Phase for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn description(&self) -> &'static str {
            "count runs"
        }

        fn run(&self, _ctx: &mut GenerationContext<'_>) -> Result<()> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_default_phase_order() {
        assert_eq!(
            Pipeline::new().phase_names(),
            vec!["resolve", "discover", "group", "render", "write"]
        );
    }

    #[test]
    fn test_runs_custom_phases() {
        let loader = MemoryLoader::default();
        let store = TemplateStore::new(NoFetch);
        let count = Rc::new(Cell::new(0));
        let pipeline = Pipeline::empty()
            .phase(Counting(Rc::clone(&count)))
            .phase(Counting(Rc::clone(&count)));

        let ctx = GenerationContext::new(RootConfig::default(), &loader, &store, ".");
        pipeline.run(ctx).unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_cancelled_pipeline_stops() {
        let loader = MemoryLoader::default();
        let store = TemplateStore::new(NoFetch);
        let count = Rc::new(Cell::new(0));
        let token = CancelToken::new();
        let pipeline = Pipeline::empty()
            .phase(Counting(Rc::clone(&count)))
            .with_cancel(token.clone());

        token.cancel();
        let ctx = GenerationContext::new(RootConfig::default(), &loader, &store, ".");
        let err = pipeline.run(ctx).err().unwrap();
        assert!(err.to_string().contains("cancelled"));
        assert_eq!(count.get(), 0);
    }
}

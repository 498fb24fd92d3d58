//! State carried through the generation phases.

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use mockery_config::{ResolvedRoot, RootConfig};
use mockery_core::{GeneratedFile, Overwrite, WriteResult};
use mockery_go::PackageLoader;

use super::diagnostic::Diagnostic;
use crate::{
    grouping::{InterfaceDescriptor, OutputBucket},
    render::TemplateStore,
};

/// Stops a running pipeline at the next package or output file.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A rendered and formatted file waiting to be written.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub file: GeneratedFile,
    pub overwrite: Overwrite,
}

/// Everything the phases read and produce.
pub struct GenerationContext<'a> {
    pub loader: &'a dyn PackageLoader,
    pub store: &'a TemplateStore,
    /// Base for relative output directories and `InterfaceDirRelative`.
    pub cwd: PathBuf,
    /// The decoded config, consumed by the resolve phase.
    pub root: Option<RootConfig>,
    pub resolved: Option<ResolvedRoot>,
    pub descriptors: Vec<InterfaceDescriptor>,
    pub buckets: Vec<OutputBucket>,
    pub rendered: Vec<RenderedFile>,
    pub written: Vec<(PathBuf, WriteResult)>,
    pub diagnostics: Vec<Diagnostic>,
    pub(crate) cancel: CancelToken,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        root: RootConfig,
        loader: &'a dyn PackageLoader,
        store: &'a TemplateStore,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            loader,
            store,
            cwd: cwd.into(),
            root: Some(root),
            resolved: None,
            descriptors: Vec::new(),
            buckets: Vec::new(),
            rendered: Vec::new(),
            written: Vec::new(),
            diagnostics: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_warning())
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Fail if cancellation was requested.
    pub fn check_cancelled(&self) -> eyre::Result<()> {
        if self.cancel.is_cancelled() {
            eyre::bail!("generation cancelled");
        }
        Ok(())
    }
}

//! The generation pipeline.
//!
//! A [`Pipeline`] runs phases over a [`GenerationContext`]:
//!
//! - resolve: merge the config tree and expand recursive packages
//! - discover: load packages, select interfaces, resolve config templates
//! - group: bucket mocks by output file, enforcing per-file uniformity
//! - render: build template contexts, render and format
//! - write: write files, refusing to overwrite unless `force-file-write`
//!
//! Cancellation is checked between phases, per package and per output file.

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod runner;

pub use context::{CancelToken, GenerationContext, RenderedFile};
pub use diagnostic::{Diagnostic, Severity};
pub use phase::Phase;
pub use runner::Pipeline;

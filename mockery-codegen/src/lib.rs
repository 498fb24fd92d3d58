//! Mock generation for mockery.
//!
//! This crate turns discovered Go interfaces into generated mock files:
//!
//! - [`ImportRegistry`] tracks the imports of one output file and gives
//!   every package a collision-free qualifier
//! - [`MethodScope`] allocates parameter, result and local names for one
//!   generated method
//! - [`TypeReplacer`] applies `replace-type` redirections
//! - [`Grouping`] buckets mocks by output file
//! - [`Renderer`] assembles the template context and renders it
//! - [`Pipeline`] drives everything from a decoded config to written files

mod format;
mod grouping;
mod imports;
mod naming;
pub mod pipeline;
pub mod render;
mod replace;
mod scope;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod typestr;

pub use format::{External, Noop, SourceFormatter, formatter_for};
pub use grouping::{Grouping, InterfaceDescriptor, OutputBucket};
pub use imports::{Import, ImportRegistry};
pub use naming::{is_keyword, is_reserved, type_hint};
pub use pipeline::{CancelToken, Diagnostic, GenerationContext, Pipeline, Severity};
pub use render::{HttpFetcher, Renderer, TemplateStore};
pub use replace::TypeReplacer;
pub use scope::{MethodScope, Variable};
pub use typestr::{required_imports, type_string};

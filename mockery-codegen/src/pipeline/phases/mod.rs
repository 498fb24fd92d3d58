//! Built-in pipeline phases.
//!
//! - [`ResolvePhase`] merges the config tree and expands recursive packages
//! - [`DiscoverPhase`] loads packages and selects the interfaces to mock
//! - [`GroupPhase`] groups mocks by output file
//! - [`RenderPhase`] renders and formats each output file
//! - [`WritePhase`] writes the files, honoring `force-file-write`

mod discover;
mod group;
mod render;
mod resolve;
mod write;

pub use discover::DiscoverPhase;
pub use group::GroupPhase;
pub use render::RenderPhase;
pub use resolve::ResolvePhase;
pub use write::WritePhase;

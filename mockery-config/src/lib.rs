//! Layered configuration for mockery.
//!
//! A `.mockery.yaml` document is decoded strictly into a [`RootConfig`]
//! holding global options, per-package sections, per-interface sections and
//! mock variants. [`RootConfig::resolve`] then merges each level into the
//! next and expands recursive packages, producing a [`ResolvedRoot`].
//!
//! ```yaml
//! all: false
//! template: testify
//! packages:
//!   github.com/acme/store:
//!     config:
//!       recursive: true
//!       exclude-subpkg-regex: ["internal$"]
//!     interfaces:
//!       Repository:
//!         configs:
//!           - structname: RepositoryMock
//!           - structname: FakeRepository
//!             template: matryer
//! ```

mod config;
mod decode;
mod load;
mod recursive;
mod resolve;
mod select;
mod tree;

pub use config::{CONFIG_KEYS, Config, Formatter, ReplaceType, ReplaceTypes, TemplateData};
pub use decode::{Source, check_keys, decode_root, parse_document};
pub use load::{
    CONFIG_FILE_NAMES, ENV_CONFIG, ENV_PREFIX, LoadOptions, LoadedConfig, defaults, discover,
    env_layer, load, locate, overlay,
};
pub use resolve::{InterfaceVars, MAX_ITERATIONS, mock_prefix, resolve_templates};
pub use select::{Decision, should_generate};
pub use tree::{InterfaceConfig, PackageConfig, ResolvedRoot, RootConfig};

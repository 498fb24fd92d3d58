//! Core utilities and types for the mockery mock generator.
//!
//! This crate provides the error kinds, the template function set and the
//! file writer shared by the config, loader and codegen crates.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod file;
pub mod template;
mod utils;

// Errors
pub use error::{Error, ErrorKind, Result, error_kind};
// File operations
pub use file::{GeneratedFile, Overwrite, WriteResult};
// String utilities
pub use utils::{
    de_capitalize, first_lower, first_upper, is_exported, to_camel_case, to_kebab_case,
    to_pascal_case, to_snake_case,
};

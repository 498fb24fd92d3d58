//! Go package loading for the mockery mock generator.
//!
//! The crate reads Go sources without the Go toolchain: a [logos] lexer and
//! a declaration parser produce syntax, which is resolved into [`Type`]s
//! bound to their declaring packages. [`GoLoader`] finds packages on disk
//! through `go.mod`, `vendor/`, the module cache and `$GOROOT`.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use mockery_go::{GoLoader, PackageLoader, interfaces};
//!
//! let loader = GoLoader::new(Path::new("."), &[]).unwrap();
//! let package = loader.load("github.com/acme/shop/store").unwrap();
//! for iface in interfaces(&package, &loader, false).unwrap() {
//!     println!("{} has {} methods", iface.name, iface.methods.len());
//! }
//! ```

pub mod ast;
mod constraint;
mod gomod;
pub mod lexer;
mod loader;
mod methods;
mod package;
pub mod parser;
mod resolve;
#[cfg(test)]
mod testing;
pub mod types;

pub use constraint::{BuildContext, is_generated};
pub use gomod::{GoMod, Replacement};
pub use loader::{GoLoader, PackageLoader, guess_package_name};
pub use methods::{Interface, interfaces, method_set};
pub use package::{Package, SourceFile, TypeDecl};
pub use types::{
    ChanDir, InterfaceType, Method, Named, PackageRef, Signature, StructField, Term, Type,
    TypeParam, UNSAFE_POINTER, Var,
};

//! Sapling Lambda packaging
//!
//! Zips the project's `lambda/` source directory into the archive uploaded
//! by `sapling update`.

pub mod error;
pub mod package;

pub use error::{BuildError, BuildResult};
pub use package::PackageBuilder;

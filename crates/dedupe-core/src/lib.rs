#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod dedupe;
pub mod error;
pub mod paths;

pub use config::Config;
pub use dedupe::{
    classify, dedupe, remove_planned, resolve, Classification, CompatibilityMode, DedupeOptions,
    DedupeReport, DeletionPlan, DependencyRegistry, DoomedCopy, FsInstallTree, InstallTree,
    Manifest, RegistryEntry, RemovalFailure, RemovalReport, ResolveOptions, ResolveState,
    DEDUPE_SCHEMA_VERSION,
};
pub use error::Error;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

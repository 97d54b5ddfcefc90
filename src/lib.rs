// src/lib.rs

//! depsolve: package dependency resolution
//!
//! Computes the ordered install and uninstall actions needed to add, update
//! or remove a package and its transitive dependencies in one or more
//! targets.
//!
//! # Architecture
//!
//! - Versions: semantic versions with interval ranges (`[1.0, 2.0)`)
//! - Sources: metadata and installed state come from caller-provided traits
//! - Walk: one version per package id, cycles rejected, constraints merged
//! - Sequencing: dependencies before dependents, stable for a given input
//!
//! ```no_run
//! use std::sync::Arc;
//! use depsolve::{
//!     DependencyBehavior, InstalledPackages, LocalFeed, PackageIdentity, Resolver,
//!     ResolverContext, TargetRef,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> depsolve::Result<()> {
//! let feed = LocalFeed::load(std::path::Path::new("feed.json"))?;
//! let resolver = Resolver::new(Arc::new(feed), Arc::new(InstalledPackages::new()));
//! let actions = resolver
//!     .resolve_actions(
//!         &PackageIdentity::parse("Logging", "2.1")?,
//!         &ResolverContext::install(DependencyBehavior::Lowest),
//!         &[TargetRef::new("app")],
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! for action in actions {
//!     println!("{action}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
pub mod package;
pub mod resolver;
pub mod source;
pub mod version;

pub use config::{DEFAULT_CONFIG_PATH, ResolverConfig, load_config, parse_config};
pub use error::{Error, Result};
pub use package::{
    Dependency, DependencyGroup, FrameworkCompatibility, FrameworkName, NearestFramework,
    PackageIdentity, PackageMetadata,
};
pub use resolver::{
    ActionType, DependencyBehavior, Operation, PackageAction, ResolvedGraph, Resolver,
    ResolverContext,
};
pub use source::{InstalledPackages, InstalledStateOracle, LocalFeed, MetadataSource, TargetRef};
pub use version::{SemanticVersion, VersionRange};

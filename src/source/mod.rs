// src/source/mod.rs

//! Collaborators the resolver consumes
//!
//! - [`MetadataSource`]: every known version of a package id (async, may do I/O)
//! - [`InstalledStateOracle`]: what is already installed in a target
//!
//! Retrying transient fetch failures is the source's job; the resolver
//! propagates the first error it sees.

mod installed;
mod local;

pub use installed::InstalledPackages;
pub use local::LocalFeed;

use crate::error::Result;
use crate::package::{FrameworkName, PackageIdentity, PackageMetadata};
use crate::version::SemanticVersion;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A project or environment that packages are installed into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub name: String,
    /// Framework used to pick dependency groups for this target
    #[serde(default)]
    pub framework: Option<FrameworkName>,
}

impl TargetRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            framework: None,
        }
    }

    pub fn with_framework(mut self, framework: FrameworkName) -> Self {
        self.framework = Some(framework);
        self
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Trait for looking up package metadata
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// All known versions of a package id, in any order
    ///
    /// An unknown id yields an empty list, not an error.
    async fn get_versions(&self, package_id: &str) -> Result<Vec<PackageMetadata>>;

    /// Human-readable name for this source (for logging)
    fn name(&self) -> &str;
}

/// Answers questions about installed packages in a target
pub trait InstalledStateOracle: Send + Sync {
    /// The installed version of `package_id` in `target`, if any
    fn installed_version(&self, package_id: &str, target: &TargetRef) -> Option<SemanticVersion>;

    /// Every package installed in `target`
    ///
    /// Used by uninstall to find packages outside the removal set that still
    /// depend on something being removed. The default reports nothing.
    fn installed_packages(&self, _target: &TargetRef) -> Vec<PackageIdentity> {
        Vec::new()
    }
}

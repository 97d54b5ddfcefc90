// src/package/framework.rs

//! Target framework matching for dependency groups
//!
//! A package version may declare one dependency group per framework. The
//! walker only ever sees one flattened dependency list per version, picked
//! by a [`FrameworkCompatibility`] implementation.

use super::{Dependency, PackageMetadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// A target framework moniker such as `net8.0` or `netstandard2.0`
///
/// Compared case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameworkName(String);

impl FrameworkName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for FrameworkName {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl Eq for FrameworkName {}

impl Hash for FrameworkName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_lowercase().hash(state);
    }
}

impl fmt::Display for FrameworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Picks the dependency list that applies to a target framework
pub trait FrameworkCompatibility: Send + Sync {
    fn select_dependency_group(
        &self,
        metadata: &PackageMetadata,
        framework: Option<&FrameworkName>,
    ) -> Vec<Dependency>;
}

/// Default framework matching
///
/// Order of preference:
/// 1. The group declared for exactly the target framework
/// 2. The framework-agnostic group
/// 3. With no target framework and a single group, that group
///
/// Anything else yields no dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestFramework;

impl FrameworkCompatibility for NearestFramework {
    fn select_dependency_group(
        &self,
        metadata: &PackageMetadata,
        framework: Option<&FrameworkName>,
    ) -> Vec<Dependency> {
        let groups = &metadata.dependency_groups;

        if let Some(framework) = framework {
            if let Some(group) = groups
                .iter()
                .find(|g| g.target_framework.as_ref() == Some(framework))
            {
                return group.dependencies.clone();
            }
        }

        if let Some(group) = groups.iter().find(|g| g.target_framework.is_none()) {
            return group.dependencies.clone();
        }

        if framework.is_none() && groups.len() == 1 {
            return groups[0].dependencies.clone();
        }

        if !groups.is_empty() {
            debug!(
                "No dependency group of {} applies to framework {}",
                metadata.identity,
                framework.map(|f| f.as_str()).unwrap_or("<none>")
            );
        }
        Vec::new()
    }
}

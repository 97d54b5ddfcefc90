// src/package/mod.rs

//! Package identity and metadata value types
//!
//! These are the strongly typed shapes a metadata source hands to the
//! resolver. Package ids compare case-insensitively everywhere.

pub mod framework;

pub use framework::{FrameworkCompatibility, FrameworkName, NearestFramework};

use crate::version::{SemanticVersion, VersionRange};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Normalize a package id for case-insensitive lookups
pub(crate) fn normalize_id(id: &str) -> String {
    id.to_lowercase()
}

/// One release of a package: id plus exact version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageIdentity {
    pub id: String,
    pub version: SemanticVersion,
}

impl PackageIdentity {
    pub fn new(id: impl Into<String>, version: SemanticVersion) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }

    /// Parse both parts from strings, e.g. `("Newtonsoft.Json", "13.0.1")`
    pub fn parse(id: &str, version: &str) -> crate::Result<Self> {
        Ok(Self::new(id, SemanticVersion::parse(version)?))
    }

    /// Whether this identity has the given id, ignoring case
    pub fn has_id(&self, id: &str) -> bool {
        normalize_id(&self.id) == normalize_id(id)
    }
}

impl PartialEq for PackageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.has_id(&other.id) && self.version == other.version
    }
}

impl Eq for PackageIdentity {}

impl Hash for PackageIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        normalize_id(&self.id).hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version.to_normalized_string())
    }
}

/// A dependency on another package, optionally constrained to a range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub package_id: String,
    /// `None` accepts any version
    #[serde(default)]
    pub version_range: Option<VersionRange>,
}

impl Dependency {
    pub fn new(package_id: impl Into<String>, version_range: Option<VersionRange>) -> Self {
        Self {
            package_id: package_id.into(),
            version_range,
        }
    }

    /// The effective range, treating a missing range as unbounded
    pub fn range(&self) -> VersionRange {
        self.version_range.clone().unwrap_or_default()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version_range {
            Some(range) => write!(f, "{} {}", self.package_id, range),
            None => write!(f, "{}", self.package_id),
        }
    }
}

/// Dependencies declared for one target framework
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGroup {
    /// `None` applies to any framework
    #[serde(default)]
    pub target_framework: Option<FrameworkName>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl DependencyGroup {
    pub fn new(target_framework: Option<FrameworkName>, dependencies: Vec<Dependency>) -> Self {
        Self {
            target_framework,
            dependencies,
        }
    }
}

/// Everything the resolver needs to know about one package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub identity: PackageIdentity,
    #[serde(default)]
    pub dependency_groups: Vec<DependencyGroup>,
}

impl PackageMetadata {
    /// Metadata with no dependencies
    pub fn new(identity: PackageIdentity) -> Self {
        Self {
            identity,
            dependency_groups: Vec::new(),
        }
    }

    /// Metadata with a single framework-agnostic dependency group
    pub fn with_dependencies(identity: PackageIdentity, dependencies: Vec<Dependency>) -> Self {
        Self {
            identity,
            dependency_groups: vec![DependencyGroup::new(None, dependencies)],
        }
    }
}

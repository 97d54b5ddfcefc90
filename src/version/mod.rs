// src/version/mod.rs

//! Version handling and constraint satisfaction for package dependencies
//!
//! Versions follow semantic versioning (`major.minor.patch[-pre][+build]`).
//! Parsing is lenient about missing components, so feed data written as
//! `1.0` or `2` still parses, and the text as written is kept for display.

mod range;

pub use range::VersionRange;

use crate::error::{Error, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A semantic version with the original text it was parsed from
///
/// Equality, ordering and hashing follow semver precedence: build metadata
/// is ignored, and `1.0` equals `1.0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticVersion {
    inner: Version,
    original: String,
}

impl SemanticVersion {
    /// Create a release version from its numeric components
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        let inner = Version::new(major, minor, patch);
        let original = inner.to_string();
        Self { inner, original }
    }

    /// Parse a version string
    ///
    /// Examples:
    /// - "1.2.3" → 1.2.3
    /// - "1.2" → 1.2.0
    /// - "2" → 2.0.0
    /// - "1.0-beta.1" → 1.0.0-beta.1
    /// - "1.0.0+sha.5114f85" → 1.0.0 with build metadata
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        // Split the numeric core from any pre-release or build suffix
        let core_end = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
        let (core, suffix) = trimmed.split_at(core_end);

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        let mut padded = parts.join(".");
        for _ in parts.len()..3 {
            padded.push_str(".0");
        }
        padded.push_str(suffix);

        let inner = Version::parse(&padded).map_err(|_| Error::InvalidVersion(s.to_string()))?;

        Ok(Self {
            inner,
            original: trimmed.to_string(),
        })
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    /// Whether this version carries a pre-release label
    pub fn is_prerelease(&self) -> bool {
        !self.inner.pre.is_empty()
    }

    /// Pre-release label without the leading `-`, if any
    pub fn release_label(&self) -> Option<&str> {
        if self.inner.pre.is_empty() {
            None
        } else {
            Some(self.inner.pre.as_str())
        }
    }

    /// Build metadata without the leading `+`, if any
    pub fn metadata(&self) -> Option<&str> {
        if self.inner.build.is_empty() {
            None
        } else {
            Some(self.inner.build.as_str())
        }
    }

    /// Canonical `major.minor.patch[-pre]` form, without build metadata
    pub fn to_normalized_string(&self) -> String {
        let mut s = format!(
            "{}.{}.{}",
            self.inner.major, self.inner.minor, self.inner.patch
        );
        if let Some(label) = self.release_label() {
            s.push('-');
            s.push_str(label);
        }
        s
    }

    /// The version text as it was written
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Compare two versions by semver precedence
    pub fn compare(&self, other: &SemanticVersion) -> Ordering {
        (self.inner.major, self.inner.minor, self.inner.patch)
            .cmp(&(other.inner.major, other.inner.minor, other.inner.patch))
            // An empty pre-release sorts above any label
            .then_with(|| self.inner.pre.cmp(&other.inner.pre))
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for SemanticVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.major.hash(state);
        self.inner.minor.hash(state);
        self.inner.patch.hash(state);
        self.inner.pre.as_str().hash(state);
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl FromStr for SemanticVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SemanticVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SemanticVersion> for String {
    fn from(value: SemanticVersion) -> Self {
        value.original
    }
}

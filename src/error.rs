// src/error.rs

//! Error types for dependency resolution
//!
//! Every failure aborts the whole resolve call: a partially resolved graph
//! has no meaning, so there is no partial result to hand back.

use crate::package::PackageIdentity;
use crate::version::VersionRange;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while resolving package actions
#[derive(Error, Debug)]
pub enum Error {
    /// A package transitively depends on itself
    #[error("Circular dependency detected '{}'", format_cycle(.path, .package, .range))]
    CircularDependency {
        /// Packages being expanded when the back-edge was found, root first
        path: Vec<PackageIdentity>,
        /// Id the back-edge points to
        package: String,
        /// Range declared on the back-edge
        range: VersionRange,
    },

    /// No known version satisfies the merged constraint for a package
    #[error(
        "Unable to resolve dependency '{package}' with range {range}{}",
        format_required_by(.required_by)
    )]
    UnsatisfiableDependency {
        package: String,
        range: VersionRange,
        required_by: Vec<String>,
    },

    /// The metadata source knows nothing about a referenced package
    #[error("No metadata available for package '{package}'")]
    MissingMetadata { package: String },

    /// The caller cancelled the resolve
    #[error("Resolution cancelled")]
    Cancelled,

    #[error("Package '{package}' is not installed in target '{target}'")]
    PackageNotInstalled { package: String, target: String },

    #[error("Unable to uninstall '{package}' because '{}' depends on it", .dependents.join("', '"))]
    PackageHasDependents {
        package: String,
        dependents: Vec<String>,
    },

    #[error("Invalid version '{0}'")]
    InvalidVersion(String),

    #[error("Invalid version range '{0}'")]
    InvalidVersionRange(String),

    /// Failure reported by a metadata source implementation
    #[error("Metadata source error: {0}")]
    Source(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse config: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error is a caller-requested cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Render a cycle as `A 1.0.0 => B 1.0.0 => A [1.5]`
fn format_cycle(path: &[PackageIdentity], package: &str, range: &VersionRange) -> String {
    let mut chain: Vec<String> = path.iter().map(|p| p.to_string()).collect();
    if range.is_unbounded() {
        chain.push(package.to_string());
    } else {
        chain.push(format!("{} {}", package, range));
    }
    chain.join(" => ")
}

fn format_required_by(required_by: &[String]) -> String {
    if required_by.is_empty() {
        String::new()
    } else {
        format!(" (required by: {})", required_by.join(", "))
    }
}

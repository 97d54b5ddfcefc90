// src/config.rs

//! Resolver configuration file
//!
//! ```toml
//! [resolver]
//! dependency_behavior = "highest-patch"
//! allow_prerelease = false
//!
//! [fetch]
//! prefetch = true
//! max_concurrent = 8
//! ```
//!
//! Every field is optional; a missing file section means defaults.

use crate::error::Result;
use crate::resolver::{DependencyBehavior, Operation, ResolverContext};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default location of the resolver config file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/depsolve/resolver.toml";

/// Top-level resolver configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub resolver: ResolverSettings,

    #[serde(default)]
    pub fetch: FetchSettings,
}

/// Defaults for resolve calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    #[serde(default)]
    pub dependency_behavior: DependencyBehavior,

    #[serde(default)]
    pub allow_prerelease: bool,

    /// Uninstall also removes dependencies nothing else needs
    #[serde(default)]
    pub remove_dependencies: bool,

    /// Uninstall even when other installed packages depend on the package
    #[serde(default)]
    pub force_remove: bool,
}

/// Metadata fetch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Fetch sibling dependencies concurrently
    #[serde(default = "default_prefetch")]
    pub prefetch: bool,

    /// Upper bound on concurrent fetches when prefetching
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            prefetch: default_prefetch(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

fn default_prefetch() -> bool {
    true
}

fn default_max_concurrent() -> usize {
    8
}

impl ResolverConfig {
    /// Per-call context for `operation` seeded from these settings
    pub fn context(&self, operation: Operation) -> ResolverContext {
        ResolverContext::new(operation, self.resolver.dependency_behavior)
            .with_prerelease(self.resolver.allow_prerelease)
            .with_remove_dependencies(self.resolver.remove_dependencies)
            .with_force_remove(self.resolver.force_remove)
    }
}

/// Parse a config from a TOML string
pub fn parse_config(content: &str) -> Result<ResolverConfig> {
    Ok(toml::from_str(content)?)
}

/// Load the config from `path`, or from [`DEFAULT_CONFIG_PATH`]
///
/// A missing file yields the defaults; an unreadable or malformed one is an error.
pub fn load_config(path: Option<&Path>) -> Result<ResolverConfig> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    if !path.exists() {
        debug!("No resolver config at {}, using defaults", path.display());
        return Ok(ResolverConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    debug!("Loaded resolver config from {}", path.display());
    Ok(config)
}

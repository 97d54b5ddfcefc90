// src/source/local.rs

//! In-memory metadata source
//!
//! Backs tests and embedders that already hold their package index in
//! memory. Can be loaded from a JSON array of [`PackageMetadata`].

use super::MetadataSource;
use crate::error::Result;
use crate::package::{PackageMetadata, normalize_id};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// A metadata feed held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct LocalFeed {
    /// Normalized package id -> every known version
    packages: HashMap<String, Vec<PackageMetadata>>,
}

impl LocalFeed {
    /// Create an empty feed
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one package version, replacing an existing entry with the same identity
    pub fn add(&mut self, metadata: PackageMetadata) {
        let versions = self
            .packages
            .entry(normalize_id(&metadata.identity.id))
            .or_default();
        versions.retain(|m| m.identity != metadata.identity);
        versions.push(metadata);
    }

    /// Builder-style [`LocalFeed::add`]
    pub fn with(mut self, metadata: PackageMetadata) -> Self {
        self.add(metadata);
        self
    }

    /// Parse a feed from a JSON array of package metadata
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<PackageMetadata> = serde_json::from_str(json)?;
        let mut feed = Self::new();
        for entry in entries {
            feed.add(entry);
        }
        Ok(feed)
    }

    /// Load a feed from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let feed = Self::from_json(&content)?;
        info!(
            "Loaded {} package versions from {}",
            feed.version_count(),
            path.display()
        );
        Ok(feed)
    }

    /// Number of distinct package ids
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Number of package versions across all ids
    pub fn version_count(&self) -> usize {
        self.packages.values().map(|v| v.len()).sum()
    }
}

impl FromIterator<PackageMetadata> for LocalFeed {
    fn from_iter<I: IntoIterator<Item = PackageMetadata>>(iter: I) -> Self {
        let mut feed = Self::new();
        for metadata in iter {
            feed.add(metadata);
        }
        feed
    }
}

#[async_trait]
impl MetadataSource for LocalFeed {
    async fn get_versions(&self, package_id: &str) -> Result<Vec<PackageMetadata>> {
        let versions = self
            .packages
            .get(&normalize_id(package_id))
            .cloned()
            .unwrap_or_default();
        debug!("{} versions of {} in local feed", versions.len(), package_id);
        Ok(versions)
    }

    fn name(&self) -> &str {
        "local"
    }
}

// src/source/installed.rs

//! In-memory installed state

use super::{InstalledStateOracle, TargetRef};
use crate::error::Result;
use crate::package::PackageIdentity;
use crate::version::SemanticVersion;
use std::collections::HashMap;
use std::path::Path;

/// Installed packages per target name
///
/// JSON form: `{ "app": [ { "id": "A", "version": "1.0" } ] }`
#[derive(Debug, Clone, Default)]
pub struct InstalledPackages {
    targets: HashMap<String, Vec<PackageIdentity>>,
}

impl InstalledPackages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identity` as installed in `target`, replacing any other version of it
    pub fn install(&mut self, target: &str, identity: PackageIdentity) {
        let packages = self.targets.entry(target.to_string()).or_default();
        packages.retain(|p| !p.has_id(&identity.id));
        packages.push(identity);
    }

    /// Builder-style [`InstalledPackages::install`]
    pub fn with(mut self, target: &str, identity: PackageIdentity) -> Self {
        self.install(target, identity);
        self
    }

    /// Forget `package_id` in `target`
    pub fn remove(&mut self, target: &str, package_id: &str) {
        if let Some(packages) = self.targets.get_mut(target) {
            packages.retain(|p| !p.has_id(package_id));
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let targets: HashMap<String, Vec<PackageIdentity>> = serde_json::from_str(json)?;
        Ok(Self { targets })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl InstalledStateOracle for InstalledPackages {
    fn installed_version(&self, package_id: &str, target: &TargetRef) -> Option<SemanticVersion> {
        self.targets
            .get(&target.name)?
            .iter()
            .find(|p| p.has_id(package_id))
            .map(|p| p.version.clone())
    }

    fn installed_packages(&self, target: &TargetRef) -> Vec<PackageIdentity> {
        self.targets.get(&target.name).cloned().unwrap_or_default()
    }
}

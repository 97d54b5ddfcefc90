// src/resolver/context.rs

//! Per-call resolver settings

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The operation requested on the root package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Install,
    Uninstall,
    Update,
}

/// Policy choosing one version among several that satisfy a constraint
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyBehavior {
    /// Resolve the requested package only; dependencies are not walked
    Ignore,
    /// Lowest satisfying version
    #[default]
    Lowest,
    /// Highest patch within the lowest major.minor
    HighestPatch,
    /// Highest minor.patch within the lowest major
    HighestMinor,
    /// Highest satisfying version
    Highest,
}

/// Settings for one resolve call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverContext {
    pub operation: Operation,
    pub dependency_behavior: DependencyBehavior,
    pub allow_prerelease: bool,
    /// Uninstall: also remove dependencies nothing else needs
    pub remove_dependencies: bool,
    /// Uninstall: remove the package even if other installed packages depend on it
    pub force_remove: bool,
}

impl ResolverContext {
    pub fn new(operation: Operation, dependency_behavior: DependencyBehavior) -> Self {
        Self {
            operation,
            dependency_behavior,
            allow_prerelease: false,
            remove_dependencies: false,
            force_remove: false,
        }
    }

    pub fn install(dependency_behavior: DependencyBehavior) -> Self {
        Self::new(Operation::Install, dependency_behavior)
    }

    pub fn update(dependency_behavior: DependencyBehavior) -> Self {
        Self::new(Operation::Update, dependency_behavior)
    }

    pub fn uninstall() -> Self {
        Self::new(Operation::Uninstall, DependencyBehavior::default())
    }

    pub fn with_prerelease(mut self, allow: bool) -> Self {
        self.allow_prerelease = allow;
        self
    }

    pub fn with_remove_dependencies(mut self, remove: bool) -> Self {
        self.remove_dependencies = remove;
        self
    }

    pub fn with_force_remove(mut self, force: bool) -> Self {
        self.force_remove = force;
        self
    }
}

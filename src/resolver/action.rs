// src/resolver/action.rs

//! Actions produced by a resolve

use crate::package::PackageIdentity;
use crate::source::TargetRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Install,
    Uninstall,
}

/// One step of a plan: install or uninstall one identity in one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageAction {
    pub action_type: ActionType,
    pub package_identity: PackageIdentity,
    pub target: TargetRef,
}

impl PackageAction {
    pub fn install(package_identity: PackageIdentity, target: TargetRef) -> Self {
        Self {
            action_type: ActionType::Install,
            package_identity,
            target,
        }
    }

    pub fn uninstall(package_identity: PackageIdentity, target: TargetRef) -> Self {
        Self {
            action_type: ActionType::Uninstall,
            package_identity,
            target,
        }
    }

    pub fn is_install(&self) -> bool {
        self.action_type == ActionType::Install
    }
}

impl fmt::Display for PackageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.action_type, self.package_identity, self.target
        )
    }
}

// src/resolver/sequencer.rs

//! Turning a resolved graph into an ordered action list
//!
//! Installs run dependencies before dependents; uninstalls run in the
//! opposite direction. Among nodes that become ready at the same time the
//! one discovered first goes first, so the order is stable for a given graph.

use super::action::PackageAction;
use super::walker::{NodeId, ResolvedGraph};
use crate::error::{Error, Result};
use crate::package::PackageIdentity;
use crate::source::TargetRef;
use crate::version::VersionRange;
use std::collections::BTreeSet;
use tracing::debug;

/// Orders the nodes of a [`ResolvedGraph`]
pub struct ActionSequencer<'g> {
    graph: &'g ResolvedGraph,
}

impl<'g> ActionSequencer<'g> {
    pub fn new(graph: &'g ResolvedGraph) -> Self {
        Self { graph }
    }

    /// Every node, dependencies before dependents
    pub fn install_order(&self) -> Result<Vec<NodeId>> {
        let nodes = self.graph.nodes();

        // Count of children not yet placed
        let mut pending: Vec<usize> = nodes.iter().map(|n| n.children.len()).collect();
        let mut ready: BTreeSet<NodeId> = pending
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| id)
            .collect();

        let mut order = Vec::with_capacity(nodes.len());
        while let Some(id) = ready.pop_first() {
            order.push(id);
            for &dependent in &nodes[id].dependents {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != nodes.len() {
            let stuck: Vec<PackageIdentity> = (0..nodes.len())
                .filter(|id| pending[*id] > 0)
                .map(|id| nodes[id].identity.clone())
                .collect();
            let package = stuck.first().map(|p| p.id.clone()).unwrap_or_default();
            return Err(Error::CircularDependency {
                path: stuck,
                package,
                range: VersionRange::all(),
            });
        }

        Ok(order)
    }

    /// Actions that bring `target` to the resolved graph
    ///
    /// Packages installed at a different version are uninstalled first,
    /// dependents before dependencies, then every package not already
    /// installed at its resolved version is installed in dependency order.
    pub fn install_actions(&self, target: &TargetRef) -> Result<Vec<PackageAction>> {
        let order = self.install_order()?;
        let nodes = self.graph.nodes();

        let removals = order.iter().rev().filter_map(|&id| {
            let node = &nodes[id];
            match &node.installed {
                Some(version) if *version != node.identity.version => Some(PackageAction::uninstall(
                    PackageIdentity::new(node.identity.id.clone(), version.clone()),
                    target.clone(),
                )),
                _ => None,
            }
        });

        let installs = order.iter().filter_map(|&id| {
            let node = &nodes[id];
            if node.is_installed() {
                debug!("{} already installed in {}", node.identity, target);
                None
            } else {
                Some(PackageAction::install(node.identity.clone(), target.clone()))
            }
        });

        Ok(removals.chain(installs).collect())
    }

    /// Uninstall actions for `removal`, dependents before dependencies
    pub fn uninstall_actions(
        &self,
        removal: &BTreeSet<NodeId>,
        target: &TargetRef,
    ) -> Result<Vec<PackageAction>> {
        let order = self.install_order()?;
        let nodes = self.graph.nodes();

        Ok(order
            .into_iter()
            .rev()
            .filter(|id| removal.contains(id))
            .map(|id| PackageAction::uninstall(nodes[id].identity.clone(), target.clone()))
            .collect())
    }
}

// src/resolver/engine.rs

//! Resolver entry point
//!
//! Walks the dependency graph of a requested package once per target and
//! turns each resolved graph into install or uninstall actions.

use super::action::PackageAction;
use super::context::{DependencyBehavior, Operation, ResolverContext};
use super::selector::VersionSelector;
use super::sequencer::ActionSequencer;
use super::walker::{GraphWalker, NodeId, ResolvedGraph, WalkMode};
use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::package::{FrameworkCompatibility, NearestFramework, PackageIdentity, normalize_id};
use crate::source::{InstalledStateOracle, MetadataSource, TargetRef};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Computes package actions from metadata and installed state
///
/// Holds no state between calls; every call builds and discards its own
/// graph and metadata cache.
pub struct Resolver {
    source: Arc<dyn MetadataSource>,
    installed: Arc<dyn InstalledStateOracle>,
    frameworks: Arc<dyn FrameworkCompatibility>,
    max_concurrent_fetches: usize,
}

impl Resolver {
    pub fn new(source: Arc<dyn MetadataSource>, installed: Arc<dyn InstalledStateOracle>) -> Self {
        Self {
            source,
            installed,
            frameworks: Arc::new(NearestFramework),
            max_concurrent_fetches: 1,
        }
    }

    /// Replace the default [`NearestFramework`] group selection
    pub fn with_framework_compatibility(mut self, frameworks: Arc<dyn FrameworkCompatibility>) -> Self {
        self.frameworks = frameworks;
        self
    }

    /// Fetch up to `max_concurrent_fetches` sibling dependencies at once
    ///
    /// 1 fetches strictly one id at a time.
    pub fn with_prefetch(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches.max(1);
        self
    }

    /// Apply the `[fetch]` settings of a loaded config
    pub fn with_config(self, config: &ResolverConfig) -> Self {
        if config.fetch.prefetch {
            self.with_prefetch(config.fetch.max_concurrent)
        } else {
            self.with_prefetch(1)
        }
    }

    /// Resolve the actions `context.operation` on `root` needs in each target
    ///
    /// Targets are resolved independently and their action lists are
    /// concatenated in the order given. Any error aborts the whole call.
    pub async fn resolve_actions(
        &self,
        root: &PackageIdentity,
        context: &ResolverContext,
        targets: &[TargetRef],
        cancel: &CancellationToken,
    ) -> Result<Vec<PackageAction>> {
        info!(
            "Resolving {} of {} for {} target(s) ({})",
            context.operation,
            root,
            targets.len(),
            context.dependency_behavior
        );

        let mut actions = Vec::new();
        for target in targets {
            let target_actions = match context.operation {
                Operation::Install => self.install(root, context, target, cancel).await?,
                Operation::Update => self.update(root, context, target, cancel).await?,
                Operation::Uninstall => self.uninstall(root, context, target, cancel).await?,
            };
            debug!("{} action(s) for target {}", target_actions.len(), target);
            actions.extend(target_actions);
        }

        info!("Resolved {} action(s) for {}", actions.len(), root);
        Ok(actions)
    }

    /// Resolve the id → version graph for `root` in one target without sequencing it
    pub async fn resolve_graph(
        &self,
        root: &PackageIdentity,
        context: &ResolverContext,
        target: &TargetRef,
        cancel: &CancellationToken,
    ) -> Result<ResolvedGraph> {
        let selector = VersionSelector::new(context.dependency_behavior, context.allow_prerelease);
        self.walker(target, cancel, selector).walk(root).await
    }

    fn walker<'a>(
        &'a self,
        target: &'a TargetRef,
        cancel: &'a CancellationToken,
        selector: VersionSelector,
    ) -> GraphWalker<'a> {
        GraphWalker::new(
            self.source.as_ref(),
            self.installed.as_ref(),
            self.frameworks.as_ref(),
            target,
            cancel,
            selector,
        )
        .with_prefetch(self.max_concurrent_fetches)
    }

    async fn install(
        &self,
        root: &PackageIdentity,
        context: &ResolverContext,
        target: &TargetRef,
        cancel: &CancellationToken,
    ) -> Result<Vec<PackageAction>> {
        let graph = self.resolve_graph(root, context, target, cancel).await?;
        ActionSequencer::new(&graph).install_actions(target)
    }

    async fn update(
        &self,
        root: &PackageIdentity,
        context: &ResolverContext,
        target: &TargetRef,
        cancel: &CancellationToken,
    ) -> Result<Vec<PackageAction>> {
        let Some(current) = self.installed.installed_version(&root.id, target) else {
            return Err(Error::PackageNotInstalled {
                package: root.id.clone(),
                target: target.to_string(),
            });
        };
        if current == root.version {
            debug!("{} is already at {} in {}", root.id, current, target);
        } else {
            info!("Updating {} from {} to {} in {}", root.id, current, root.version, target);
        }
        self.install(root, context, target, cancel).await
    }

    async fn uninstall(
        &self,
        root: &PackageIdentity,
        context: &ResolverContext,
        target: &TargetRef,
        cancel: &CancellationToken,
    ) -> Result<Vec<PackageAction>> {
        if self.installed.installed_version(&root.id, target).as_ref() != Some(&root.version) {
            return Err(Error::PackageNotInstalled {
                package: root.to_string(),
                target: target.to_string(),
            });
        }

        // Ignore stops the walk at the root when dependencies stay
        let behavior = if context.remove_dependencies {
            DependencyBehavior::Lowest
        } else {
            DependencyBehavior::Ignore
        };
        let mut walker = self
            .walker(target, cancel, VersionSelector::new(behavior, true))
            .with_mode(WalkMode::Installed);
        let graph = walker.walk(root).await?;

        let in_graph: HashSet<String> = graph
            .nodes()
            .iter()
            .map(|n| normalize_id(&n.identity.id))
            .collect();
        let root_key = normalize_id(&root.id);

        let mut dependents = Vec::new();
        let mut kept: BTreeSet<NodeId> = BTreeSet::new();
        for package in self.installed.installed_packages(target) {
            if in_graph.contains(&normalize_id(&package.id)) {
                continue;
            }
            for dependency in walker.dependencies_of(&package).await? {
                let key = normalize_id(&dependency.package_id);
                if key == root_key {
                    dependents.push(package.to_string());
                } else if let Some(id) = graph.node_id(&key) {
                    kept.insert(id);
                }
            }
        }

        if !dependents.is_empty() {
            if context.force_remove {
                warn!(
                    "Removing {} although {} depend on it",
                    root,
                    dependents.join(", ")
                );
            } else {
                return Err(Error::PackageHasDependents {
                    package: root.to_string(),
                    dependents,
                });
            }
        }

        // Anything a kept package needs is kept too
        let mut queue: Vec<NodeId> = kept.iter().copied().collect();
        while let Some(id) = queue.pop() {
            for &child in &graph.node(id).children {
                if child != 0 && kept.insert(child) {
                    queue.push(child);
                }
            }
        }
        for &id in &kept {
            debug!("Keeping {} (still required in {})", graph.node(id).identity, target);
        }

        let removal: BTreeSet<NodeId> = (0..graph.len()).filter(|id| !kept.contains(id)).collect();
        ActionSequencer::new(&graph).uninstall_actions(&removal, target)
    }
}

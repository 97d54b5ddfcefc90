// src/resolver/walker.rs

//! Dependency graph walk
//!
//! Descends from the requested package through its dependencies, choosing
//! one version per package id. Nodes live in an arena indexed by discovery
//! order and the descent uses an explicit frame stack, so deep graphs do
//! not grow the call stack.
//!
//! When a later path tightens the constraint on an already expanded package
//! so its chosen version no longer fits, the walk restarts with the tighter
//! range pinned for that id. Pins only ever narrow a candidate set, so
//! restarts terminate.

use super::constraint::MergedConstraint;
use super::context::DependencyBehavior;
use super::selector::VersionSelector;
use crate::error::{Error, Result};
use crate::package::{
    Dependency, FrameworkCompatibility, PackageIdentity, PackageMetadata, normalize_id,
};
use crate::source::{InstalledStateOracle, MetadataSource, TargetRef};
use crate::version::{SemanticVersion, VersionRange};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Index of a node in a [`ResolvedGraph`], equal to its discovery order
pub type NodeId = usize;

/// How the walker picks a version for each package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Choose versions with the version selector
    Resolve,
    /// Follow installed packages only, at their installed versions
    Installed,
}

/// A package id with its chosen version
#[derive(Debug, Clone)]
pub struct ResolvedNode {
    pub identity: PackageIdentity,
    pub merged_constraint: MergedConstraint,
    /// Nodes that reference this one
    pub dependents: BTreeSet<NodeId>,
    /// Referenced nodes in declaration order, without duplicates
    pub children: Vec<NodeId>,
    /// Version installed in the target before this resolve
    pub installed: Option<SemanticVersion>,
}

impl ResolvedNode {
    pub fn new(identity: PackageIdentity, merged_constraint: MergedConstraint) -> Self {
        Self {
            identity,
            merged_constraint,
            dependents: BTreeSet::new(),
            children: Vec::new(),
            installed: None,
        }
    }

    /// Whether the target already has exactly the chosen version
    pub fn is_installed(&self) -> bool {
        self.installed.as_ref() == Some(&self.identity.version)
    }
}

/// The deduplicated id → version graph produced by one walk
///
/// Node 0 is the requested package.
#[derive(Debug, Clone, Default)]
pub struct ResolvedGraph {
    nodes: Vec<ResolvedNode>,
    index: HashMap<String, NodeId>,
}

impl ResolvedGraph {
    /// Build a graph from nodes in discovery order
    pub fn from_nodes(nodes: Vec<ResolvedNode>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (normalize_id(&n.identity.id), i))
            .collect();
        Self { nodes, index }
    }

    pub fn root(&self) -> Option<&ResolvedNode> {
        self.nodes.first()
    }

    pub fn nodes(&self) -> &[ResolvedNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &ResolvedNode {
        &self.nodes[id]
    }

    pub fn node_id(&self, package_id: &str) -> Option<NodeId> {
        self.index.get(&normalize_id(package_id)).copied()
    }

    /// Look up a node by package id, ignoring case
    pub fn get(&self, package_id: &str) -> Option<&ResolvedNode> {
        self.node_id(package_id).map(|i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A package whose dependencies are being processed
struct Frame {
    node: NodeId,
    /// Normalized id of `node`
    key: String,
    dependencies: Vec<Dependency>,
    next: usize,
}

/// The frames on the current path, plus their ids for O(1) cycle checks
#[derive(Default)]
struct PathStack {
    frames: Vec<Frame>,
    on_path: HashSet<String>,
}

impl PathStack {
    fn push(&mut self, frame: Frame) {
        self.on_path.insert(frame.key.clone());
        self.frames.push(frame);
    }

    fn pop(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.on_path.remove(&frame.key);
        }
    }

    fn last_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    fn contains(&self, key: &str) -> bool {
        self.on_path.contains(key)
    }

    /// Identities on the path, root first
    fn path(&self, nodes: &[ResolvedNode]) -> Vec<PackageIdentity> {
        self.frames
            .iter()
            .map(|f| nodes[f.node].identity.clone())
            .collect()
    }
}

enum WalkOutcome {
    Complete(ResolvedGraph),
    Restart { key: String, range: VersionRange },
}

/// Walks the dependency graph for one target
///
/// Owns the per-call metadata cache, which survives restarts.
pub struct GraphWalker<'a> {
    source: &'a dyn MetadataSource,
    installed: &'a dyn InstalledStateOracle,
    frameworks: &'a dyn FrameworkCompatibility,
    target: &'a TargetRef,
    cancel: &'a CancellationToken,
    selector: VersionSelector,
    mode: WalkMode,
    /// Values above 1 enable prefetching sibling dependencies
    max_concurrent_fetches: usize,
    cache: HashMap<String, Arc<Vec<PackageMetadata>>>,
    /// Prefetch failures, surfaced when the walk reaches the id
    failed: HashMap<String, Error>,
    pins: HashMap<String, VersionRange>,
}

impl<'a> GraphWalker<'a> {
    pub fn new(
        source: &'a dyn MetadataSource,
        installed: &'a dyn InstalledStateOracle,
        frameworks: &'a dyn FrameworkCompatibility,
        target: &'a TargetRef,
        cancel: &'a CancellationToken,
        selector: VersionSelector,
    ) -> Self {
        Self {
            source,
            installed,
            frameworks,
            target,
            cancel,
            selector,
            mode: WalkMode::Resolve,
            max_concurrent_fetches: 1,
            cache: HashMap::new(),
            failed: HashMap::new(),
            pins: HashMap::new(),
        }
    }

    pub fn with_mode(mut self, mode: WalkMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_prefetch(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches.max(1);
        self
    }

    /// Resolve the graph rooted at `root`
    pub async fn walk(&mut self, root: &PackageIdentity) -> Result<ResolvedGraph> {
        let mut restarts = 0usize;
        loop {
            match self.walk_once(root).await? {
                WalkOutcome::Complete(graph) => {
                    info!(
                        "Resolved {} packages for {} in target {} ({} restarts)",
                        graph.len(),
                        root,
                        self.target,
                        restarts
                    );
                    return Ok(graph);
                }
                WalkOutcome::Restart { key, range } => {
                    restarts += 1;
                    debug!("Restarting walk with {} pinned to {}", key, range);
                    self.pins.insert(key, range);
                }
            }
        }
    }

    /// Dependencies `identity` declares for this walker's target
    ///
    /// Unknown identities have none.
    pub async fn dependencies_of(&mut self, identity: &PackageIdentity) -> Result<Vec<Dependency>> {
        let candidates = self.versions(&identity.id).await?;
        Ok(candidates
            .iter()
            .find(|m| m.identity == *identity)
            .map(|m| {
                self.frameworks
                    .select_dependency_group(m, self.target.framework.as_ref())
            })
            .unwrap_or_default())
    }

    async fn walk_once(&mut self, root: &PackageIdentity) -> Result<WalkOutcome> {
        let mut nodes: Vec<ResolvedNode> = Vec::new();
        let mut index: HashMap<String, NodeId> = HashMap::new();
        let mut stack = PathStack::default();

        if self.mode == WalkMode::Resolve {
            let candidates = self.versions(&root.id).await?;
            if !candidates.iter().any(|m| m.identity.version == root.version) {
                return Err(Error::MissingMetadata {
                    package: root.to_string(),
                });
            }
        }

        let constraint = MergedConstraint::new("requested", VersionRange::exact(root.version.clone()));
        let (root_node, dependencies) = self.expand(&root.id, constraint).await?;
        let root_key = normalize_id(&root.id);
        index.insert(root_key.clone(), 0);
        nodes.push(root_node);
        self.push_frame(&mut stack, 0, root_key, dependencies).await?;

        loop {
            self.check_cancelled()?;

            let Some(frame) = stack.last_mut() else {
                break;
            };
            let Some(dependency) = frame.dependencies.get(frame.next).cloned() else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let parent = frame.node;

            let key = normalize_id(&dependency.package_id);
            let range = dependency.range();

            if stack.contains(&key) {
                return Err(Error::CircularDependency {
                    path: stack.path(&nodes),
                    package: dependency.package_id.clone(),
                    range,
                });
            }

            let requirer = nodes[parent].identity.to_string();

            if let Some(&existing) = index.get(&key) {
                link(&mut nodes, parent, existing);
                if self.mode == WalkMode::Installed {
                    continue;
                }

                let node = &mut nodes[existing];
                node.merged_constraint.merge(requirer, &range);
                if node.merged_constraint.range().satisfies(&node.identity.version) {
                    continue;
                }

                let constraint = node.merged_constraint.clone();
                let current = node.identity.clone();
                let candidates = self.versions(&dependency.package_id).await?;
                let installed = self
                    .installed
                    .installed_version(&dependency.package_id, self.target);
                let chosen = self.selector.select(
                    &dependency.package_id,
                    &constraint,
                    &candidates,
                    installed.as_ref(),
                )?;
                debug!(
                    "{} does not satisfy {} required by {}; {} fits",
                    current,
                    constraint.range(),
                    nodes[parent].identity,
                    chosen.identity
                );
                return Ok(WalkOutcome::Restart {
                    key,
                    range: constraint.range().clone(),
                });
            }

            if self.mode == WalkMode::Installed
                && self
                    .installed
                    .installed_version(&dependency.package_id, self.target)
                    .is_none()
            {
                debug!(
                    "Skipping {} (not installed in {})",
                    dependency.package_id, self.target
                );
                continue;
            }

            let mut constraint = MergedConstraint::new(requirer, range);
            if let Some(pin) = self.pins.get(&key) {
                constraint.merge("pinned by earlier pass", pin);
            }

            let (node, dependencies) = self.expand(&dependency.package_id, constraint).await?;
            let id = nodes.len();
            nodes.push(node);
            index.insert(key.clone(), id);
            link(&mut nodes, parent, id);
            self.push_frame(&mut stack, id, key, dependencies).await?;
        }

        Ok(WalkOutcome::Complete(ResolvedGraph { nodes, index }))
    }

    /// Choose a version for `package_id` and load its dependencies
    async fn expand(
        &mut self,
        package_id: &str,
        constraint: MergedConstraint,
    ) -> Result<(ResolvedNode, Vec<Dependency>)> {
        self.check_cancelled()?;

        let installed = self.installed.installed_version(package_id, self.target);
        let candidates = self.versions(package_id).await?;

        let metadata = match self.mode {
            WalkMode::Resolve => {
                if candidates.is_empty() {
                    return Err(Error::MissingMetadata {
                        package: package_id.to_string(),
                    });
                }
                self.selector
                    .select(package_id, &constraint, &candidates, installed.as_ref())?
                    .clone()
            }
            WalkMode::Installed => {
                let version = installed.clone().ok_or_else(|| Error::PackageNotInstalled {
                    package: package_id.to_string(),
                    target: self.target.to_string(),
                })?;
                match candidates.iter().find(|m| m.identity.version == version) {
                    Some(metadata) => metadata.clone(),
                    None => {
                        warn!(
                            "No metadata for installed {} {}; treating it as having no dependencies",
                            package_id, version
                        );
                        PackageMetadata::new(PackageIdentity::new(package_id, version))
                    }
                }
            }
        };

        let dependencies = self
            .frameworks
            .select_dependency_group(&metadata, self.target.framework.as_ref());
        debug!(
            "Selected {} for {} ({} dependencies)",
            metadata.identity,
            constraint.range(),
            dependencies.len()
        );

        let mut node = ResolvedNode::new(metadata.identity, constraint);
        node.installed = installed;
        Ok((node, dependencies))
    }

    async fn push_frame(
        &mut self,
        stack: &mut PathStack,
        node: NodeId,
        key: String,
        dependencies: Vec<Dependency>,
    ) -> Result<()> {
        if self.selector.behavior() == DependencyBehavior::Ignore || dependencies.is_empty() {
            return Ok(());
        }
        if self.mode == WalkMode::Resolve && self.max_concurrent_fetches > 1 {
            self.prefetch(&dependencies).await?;
        }
        stack.push(Frame {
            node,
            key,
            dependencies,
            next: 0,
        });
        Ok(())
    }

    /// All versions of `package_id`, fetched once per walker
    async fn versions(&mut self, package_id: &str) -> Result<Arc<Vec<PackageMetadata>>> {
        let key = normalize_id(package_id);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(Arc::clone(cached));
        }
        if let Some(err) = self.failed.remove(&key) {
            return Err(err);
        }

        self.check_cancelled()?;
        let source = self.source;
        let cancel = self.cancel;
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = source.get_versions(package_id) => result?,
        };
        debug!(
            "Fetched {} versions of {} from {}",
            fetched.len(),
            package_id,
            source.name()
        );

        let fetched = Arc::new(fetched);
        self.cache.insert(key, Arc::clone(&fetched));
        Ok(fetched)
    }

    /// Fetch sibling dependencies concurrently
    ///
    /// Only the fetches run in parallel; results land in the cache and the
    /// walk consumes them in declaration order. A failed fetch is held back
    /// until the walk reaches that id, so the first error reported does not
    /// depend on which fetch finished first.
    async fn prefetch(&mut self, dependencies: &[Dependency]) -> Result<()> {
        let mut pending: Vec<String> = Vec::new();
        for dependency in dependencies {
            let key = normalize_id(&dependency.package_id);
            if !self.cache.contains_key(&key)
                && !self.failed.contains_key(&key)
                && !pending.iter().any(|p| normalize_id(p) == key)
            {
                pending.push(dependency.package_id.clone());
            }
        }
        if pending.len() < 2 {
            return Ok(());
        }

        let source = self.source;
        let cancel = self.cancel;
        let limit = self.max_concurrent_fetches;
        debug!("Prefetching {} packages from {}", pending.len(), source.name());

        let fetches = stream::iter(pending)
            .map(|package_id| async move {
                let result = source.get_versions(&package_id).await;
                (package_id, result)
            })
            .buffer_unordered(limit)
            .collect::<Vec<_>>();

        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            results = fetches => results,
        };

        for (package_id, result) in results {
            let key = normalize_id(&package_id);
            match result {
                Ok(versions) => {
                    self.cache.insert(key, Arc::new(versions));
                }
                Err(err) => {
                    debug!("Prefetch of {} failed: {}", package_id, err);
                    self.failed.insert(key, err);
                }
            }
        }
        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Record a parent → child edge once
fn link(nodes: &mut [ResolvedNode], parent: NodeId, child: NodeId) {
    if !nodes[parent].children.contains(&child) {
        nodes[parent].children.push(child);
    }
    nodes[child].dependents.insert(parent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::NearestFramework;
    use crate::source::{InstalledPackages, LocalFeed};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn id(name: &str, version: &str) -> PackageIdentity {
        PackageIdentity::parse(name, version).unwrap()
    }

    fn pkg(name: &str, version: &str, deps: &[(&str, &str)]) -> PackageMetadata {
        PackageMetadata::with_dependencies(
            id(name, version),
            deps.iter()
                .map(|(d, r)| {
                    let range = if r.is_empty() {
                        None
                    } else {
                        Some(VersionRange::parse(r).unwrap())
                    };
                    Dependency::new(*d, range)
                })
                .collect(),
        )
    }

    /// Counts fetches per id
    struct CountingSource {
        feed: LocalFeed,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataSource for CountingSource {
        async fn get_versions(&self, package_id: &str) -> Result<Vec<PackageMetadata>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.feed.get_versions(package_id).await
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct FailingSource;

    #[async_trait]
    impl MetadataSource for FailingSource {
        async fn get_versions(&self, package_id: &str) -> Result<Vec<PackageMetadata>> {
            Err(Error::Source(format!("feed unreachable for {package_id}")))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    async fn walk_with(
        source: &dyn MetadataSource,
        installed: &InstalledPackages,
        behavior: DependencyBehavior,
        prefetch: usize,
        root: PackageIdentity,
    ) -> Result<ResolvedGraph> {
        let target = TargetRef::new("app");
        let cancel = CancellationToken::new();
        let mut walker = GraphWalker::new(
            source,
            installed,
            &NearestFramework,
            &target,
            &cancel,
            VersionSelector::new(behavior, false),
        )
        .with_prefetch(prefetch);
        walker.walk(&root).await
    }

    fn diamond() -> LocalFeed {
        [
            pkg("A", "1.0", &[("B", "1.0"), ("C", "1.0")]),
            pkg("B", "1.0", &[("D", "1.0")]),
            pkg("C", "1.0", &[("D", "1.0")]),
            pkg("D", "1.0", &[]),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_diamond_resolves_shared_node_once() {
        let feed = diamond();
        let graph = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "1.0"))
            .await
            .unwrap();

        assert_eq!(graph.len(), 4);
        let d = graph.get("d").unwrap();
        assert_eq!(d.dependents.len(), 2);
        assert_eq!(d.merged_constraint.contributions().len(), 2);

        let order: Vec<&str> = graph.nodes().iter().map(|n| n.identity.id.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "D", "C"]);
    }

    #[tokio::test]
    async fn test_tightened_constraint_restarts_walk() {
        let feed: LocalFeed = [
            pkg("A", "1.0", &[("B", "1.0"), ("C", "1.0")]),
            pkg("B", "1.0", &[("D", "1.0")]),
            pkg("C", "1.0", &[("D", "2.0")]),
            pkg("D", "1.0", &[("E", "[1.0]")]),
            pkg("D", "2.0", &[]),
            pkg("E", "1.0", &[]),
        ]
        .into_iter()
        .collect();

        let graph = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "1.0"))
            .await
            .unwrap();

        assert_eq!(
            graph.get("D").unwrap().identity.version,
            SemanticVersion::parse("2.0").unwrap()
        );
        // E was only needed by the discarded D 1.0
        assert!(graph.get("E").is_none());
    }

    #[tokio::test]
    async fn test_tightened_constraint_can_downgrade() {
        let feed: LocalFeed = [
            pkg("A", "1.0", &[("B", "1.0"), ("C", "1.0")]),
            pkg("B", "1.0", &[("D", "1.0")]),
            pkg("C", "1.0", &[("D", "(, 1.5]")]),
            pkg("D", "1.0", &[]),
            pkg("D", "2.0", &[("E", "1.0")]),
            pkg("E", "1.0", &[]),
        ]
        .into_iter()
        .collect();

        let graph = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Highest, 1, id("A", "1.0"))
            .await
            .unwrap();

        let d = graph.get("D").unwrap();
        assert_eq!(d.identity.version, SemanticVersion::parse("1.0").unwrap());
        assert_eq!(d.dependents.len(), 2);
        assert!(d.children.is_empty());
        // E was only needed by the discarded D 2.0
        assert!(graph.get("E").is_none());
        assert_eq!(graph.len(), 4);
    }

    #[tokio::test]
    async fn test_restart_reuses_cached_metadata() {
        let feed: LocalFeed = [
            pkg("A", "1.0", &[("B", "1.0"), ("C", "1.0")]),
            pkg("B", "1.0", &[("D", "1.0")]),
            pkg("C", "1.0", &[("D", "2.0")]),
            pkg("D", "1.0", &[]),
            pkg("D", "2.0", &[]),
        ]
        .into_iter()
        .collect();
        let source = CountingSource {
            feed,
            calls: AtomicUsize::new(0),
        };

        walk_with(&source, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "1.0"))
            .await
            .unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_cycle_reports_full_path() {
        let feed: LocalFeed = [
            pkg("A", "1.0", &[("B", "1.0")]),
            pkg("B", "1.0", &[("A", "[1.5]")]),
        ]
        .into_iter()
        .collect();

        let err = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "1.0"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CircularDependency { .. }));
        assert!(err.to_string().contains("A 1.0.0 => B 1.0.0 => A [1.5]"));
    }

    #[tokio::test]
    async fn test_finished_branch_leaves_the_path() {
        // C reaches B after B's subtree is done, which is sharing, not a cycle
        let feed: LocalFeed = [
            pkg("A", "1.0", &[("B", "1.0"), ("C", "1.0")]),
            pkg("B", "1.0", &[("D", "1.0")]),
            pkg("C", "1.0", &[("b", "1.0")]),
            pkg("D", "1.0", &[]),
        ]
        .into_iter()
        .collect();

        let graph = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "1.0"))
            .await
            .unwrap();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get("b").unwrap().dependents.len(), 2);
    }

    #[tokio::test]
    async fn test_cycle_path_skips_finished_branches() {
        let feed: LocalFeed = [
            pkg("A", "1.0", &[("B", "1.0"), ("C", "1.0")]),
            pkg("B", "1.0", &[("D", "1.0")]),
            pkg("C", "1.0", &[("E", "1.0")]),
            pkg("D", "1.0", &[]),
            pkg("E", "1.0", &[("c", "1.0")]),
        ]
        .into_iter()
        .collect();

        let err = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "1.0"))
            .await
            .unwrap_err();
        match &err {
            Error::CircularDependency { path, package, .. } => {
                let ids: Vec<&str> = path.iter().map(|p| p.id.as_str()).collect();
                assert_eq!(ids, vec!["A", "C", "E"]);
                assert_eq!(package, "c");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("A 1.0.0 => C 1.0.0 => E 1.0.0 => c"));
    }

    #[tokio::test]
    async fn test_self_dependency_is_a_cycle() {
        let feed: LocalFeed = [pkg("A", "1.0", &[("a", "")])].into_iter().collect();
        let err = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "1.0"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("A 1.0.0 => a"));
    }

    #[tokio::test]
    async fn test_missing_dependency_metadata() {
        let feed: LocalFeed = [pkg("A", "1.0", &[("Ghost", "1.0")])].into_iter().collect();
        let err = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "1.0"))
            .await
            .unwrap_err();
        match err {
            Error::MissingMetadata { package } => assert_eq!(package, "Ghost"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_root_version() {
        let feed: LocalFeed = [pkg("A", "1.0", &[])].into_iter().collect();
        let err = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "2.0"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingMetadata { .. }));
    }

    #[tokio::test]
    async fn test_ignore_resolves_root_only() {
        let feed = diamond();
        let graph = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Ignore, 1, id("A", "1.0"))
            .await
            .unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.root().unwrap().identity, id("A", "1.0"));
    }

    #[tokio::test]
    async fn test_prefetch_gives_same_graph() {
        let feed = diamond();
        let sequential = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "1.0"))
            .await
            .unwrap();
        let prefetched = walk_with(&feed, &InstalledPackages::new(), DependencyBehavior::Lowest, 8, id("A", "1.0"))
            .await
            .unwrap();

        let ids = |g: &ResolvedGraph| -> Vec<PackageIdentity> {
            g.nodes().iter().map(|n| n.identity.clone()).collect()
        };
        assert_eq!(ids(&sequential), ids(&prefetched));
    }

    #[tokio::test]
    async fn test_source_errors_propagate() {
        let err = walk_with(&FailingSource, &InstalledPackages::new(), DependencyBehavior::Lowest, 1, id("A", "1.0"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let feed = diamond();
        let installed = InstalledPackages::new();
        let target = TargetRef::new("app");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut walker = GraphWalker::new(
            &feed,
            &installed,
            &NearestFramework,
            &target,
            &cancel,
            VersionSelector::new(DependencyBehavior::Lowest, false),
        );
        let err = walker.walk(&id("A", "1.0")).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_installed_mode_follows_installed_packages_only() {
        let feed = diamond();
        let installed = InstalledPackages::new()
            .with("app", id("A", "1.0"))
            .with("app", id("B", "1.0"))
            .with("app", id("D", "1.0"));
        let target = TargetRef::new("app");
        let cancel = CancellationToken::new();

        let mut walker = GraphWalker::new(
            &feed,
            &installed,
            &NearestFramework,
            &target,
            &cancel,
            VersionSelector::new(DependencyBehavior::Lowest, false),
        )
        .with_mode(WalkMode::Installed);
        let graph = walker.walk(&id("A", "1.0")).await.unwrap();

        let order: Vec<&str> = graph.nodes().iter().map(|n| n.identity.id.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "D"]);
        assert!(graph.nodes().iter().all(|n| n.is_installed()));
    }
}

// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use depsolve::{
    Dependency, InstalledPackages, LocalFeed, PackageAction, PackageIdentity, PackageMetadata,
    Resolver, ResolverContext, Result, TargetRef, VersionRange,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Install a test subscriber once; `RUST_LOG=depsolve=debug` shows the walk.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn id(name: &str, version: &str) -> PackageIdentity {
    PackageIdentity::parse(name, version).unwrap()
}

/// Package metadata with one framework-agnostic dependency group.
///
/// An empty range string means "any version".
pub fn pkg(name: &str, version: &str, deps: &[(&str, &str)]) -> PackageMetadata {
    let dependencies = deps
        .iter()
        .map(|(dep, range)| {
            let range = if range.is_empty() {
                None
            } else {
                Some(VersionRange::parse(range).unwrap())
            };
            Dependency::new(*dep, range)
        })
        .collect();
    PackageMetadata::with_dependencies(id(name, version), dependencies)
}

pub fn feed(packages: Vec<PackageMetadata>) -> LocalFeed {
    packages.into_iter().collect()
}

/// Installed state for the `app` target.
pub fn installed(packages: &[(&str, &str)]) -> InstalledPackages {
    packages
        .iter()
        .fold(InstalledPackages::new(), |state, (name, version)| {
            state.with("app", id(name, version))
        })
}

pub fn app() -> TargetRef {
    TargetRef::new("app")
}

/// Diamond: A -> {B, C}, B -> D, C -> D.
pub fn diamond_feed() -> LocalFeed {
    feed(vec![
        pkg("A", "1.0", &[("B", "1.0"), ("C", "1.0")]),
        pkg("B", "1.0", &[("D", "1.0")]),
        pkg("C", "1.0", &[("D", "1.0")]),
        pkg("D", "1.0", &[]),
    ])
}

/// Resolve against the `app` target.
pub async fn resolve(
    feed: LocalFeed,
    installed: InstalledPackages,
    root: PackageIdentity,
    context: ResolverContext,
) -> Result<Vec<PackageAction>> {
    init_tracing();
    let resolver = Resolver::new(Arc::new(feed), Arc::new(installed));
    resolver
        .resolve_actions(&root, &context, &[app()], &CancellationToken::new())
        .await
}

/// Render actions as `install D 1.0.0 (app)` for compact assertions.
pub fn render(actions: &[PackageAction]) -> Vec<String> {
    actions.iter().map(|a| a.to_string()).collect()
}

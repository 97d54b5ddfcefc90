// src/resolver/mod.rs

//! Dependency resolution
//!
//! Given a requested package, an operation and one or more targets, the
//! resolver decides which version of every transitive dependency to use and
//! in which order packages must be installed or removed.
//!
//! The pieces, bottom up:
//! - [`MergedConstraint`]: intersection of every range imposed on an id
//! - [`VersionSelector`]: one version out of the candidates, per [`DependencyBehavior`]
//! - [`GraphWalker`]: the deduplicated graph, with cycle detection
//! - [`ActionSequencer`]: dependency-ordered [`PackageAction`]s
//! - [`Resolver`]: per-target orchestration of the above

mod action;
mod constraint;
mod context;
mod engine;
mod selector;
mod sequencer;
mod walker;

pub use action::{ActionType, PackageAction};
pub use constraint::{Contribution, MergedConstraint};
pub use context::{DependencyBehavior, Operation, ResolverContext};
pub use engine::Resolver;
pub use selector::VersionSelector;
pub use sequencer::ActionSequencer;
pub use walker::{GraphWalker, NodeId, ResolvedGraph, ResolvedNode, WalkMode};

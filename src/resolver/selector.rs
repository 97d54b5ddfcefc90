// src/resolver/selector.rs

//! Choosing one concrete version for a package id

use super::constraint::MergedConstraint;
use super::context::DependencyBehavior;
use crate::error::{Error, Result};
use crate::package::PackageMetadata;
use crate::version::SemanticVersion;
use std::cmp::Ordering;
use tracing::debug;

/// Picks a version from the candidates a metadata source returned
#[derive(Debug, Clone, Copy)]
pub struct VersionSelector {
    behavior: DependencyBehavior,
    allow_prerelease: bool,
}

impl VersionSelector {
    pub fn new(behavior: DependencyBehavior, allow_prerelease: bool) -> Self {
        Self {
            behavior,
            allow_prerelease,
        }
    }

    pub fn behavior(&self) -> DependencyBehavior {
        self.behavior
    }

    /// Select the version of `package_id` to use
    ///
    /// Candidates must satisfy the merged range and the pre-release policy.
    /// An installed version among them wins; otherwise the behavior policy
    /// chooses.
    pub fn select<'c>(
        &self,
        package_id: &str,
        constraint: &MergedConstraint,
        candidates: &'c [PackageMetadata],
        installed: Option<&SemanticVersion>,
    ) -> Result<&'c PackageMetadata> {
        let range = constraint.range();

        // A range that names a pre-release opts into pre-releases
        let allow_prerelease = self.allow_prerelease || range.has_prerelease_bound();
        let eligible: Vec<&PackageMetadata> = candidates
            .iter()
            .filter(|m| range.satisfies(&m.identity.version))
            .filter(|m| allow_prerelease || !m.identity.version.is_prerelease())
            .collect();

        if let Some(installed) = installed {
            if let Some(metadata) = eligible
                .iter()
                .copied()
                .find(|m| &m.identity.version == installed)
            {
                debug!("Keeping installed {} for range {}", metadata.identity, range);
                return Ok(metadata);
            }
        }

        self.apply_policy(&eligible).ok_or_else(|| Error::UnsatisfiableDependency {
            package: package_id.to_string(),
            range: range.clone(),
            required_by: constraint.requirers(),
        })
    }

    /// Apply the behavior policy to an already filtered candidate list
    fn apply_policy<'c>(&self, eligible: &[&'c PackageMetadata]) -> Option<&'c PackageMetadata> {
        let candidates = eligible.iter().copied();

        match self.behavior {
            // Ignore only stops the walk below the node; the node itself
            // still needs a version
            DependencyBehavior::Lowest | DependencyBehavior::Ignore => {
                candidates.min_by(|a, b| a.identity.version.cmp(&b.identity.version))
            }
            DependencyBehavior::Highest => first_max(candidates),
            DependencyBehavior::HighestPatch => {
                let train = |m: &PackageMetadata| {
                    (m.identity.version.major(), m.identity.version.minor())
                };
                let lowest = eligible.iter().map(|m| train(*m)).min()?;
                first_max(candidates.filter(|m| train(*m) == lowest))
            }
            DependencyBehavior::HighestMinor => {
                let lowest = eligible.iter().map(|m| m.identity.version.major()).min()?;
                first_max(candidates.filter(|m| m.identity.version.major() == lowest))
            }
        }
    }
}

/// Highest version, keeping the earliest candidate on ties
///
/// `Iterator::max_by` keeps the last, which would make the result depend
/// on build metadata ordering in the feed.
fn first_max<'c>(iter: impl Iterator<Item = &'c PackageMetadata>) -> Option<&'c PackageMetadata> {
    iter.fold(None, |best: Option<&PackageMetadata>, m| match best {
        Some(b) if m.identity.version.cmp(&b.identity.version) != Ordering::Greater => Some(b),
        _ => Some(m),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageIdentity;
    use crate::version::VersionRange;

    fn candidates(versions: &[&str]) -> Vec<PackageMetadata> {
        versions
            .iter()
            .map(|v| PackageMetadata::new(PackageIdentity::parse("B", v).unwrap()))
            .collect()
    }

    fn constraint(range: &str) -> MergedConstraint {
        MergedConstraint::new("A 1.0.0", VersionRange::parse(range).unwrap())
    }

    fn pick(behavior: DependencyBehavior, range: &str, versions: &[&str]) -> String {
        let c = candidates(versions);
        VersionSelector::new(behavior, false)
            .select("B", &constraint(range), &c, None)
            .unwrap()
            .identity
            .version
            .to_normalized_string()
    }

    const CHAIN: &[&str] = &["1.0", "1.0.1", "1.0.9", "1.1", "2.0"];

    #[test]
    fn test_lowest_picks_minimum() {
        assert_eq!(pick(DependencyBehavior::Lowest, "1.0", CHAIN), "1.0.0");
    }

    #[test]
    fn test_highest_patch_stays_in_lowest_minor() {
        assert_eq!(pick(DependencyBehavior::HighestPatch, "1.0", CHAIN), "1.0.9");
    }

    #[test]
    fn test_highest_minor_stays_in_lowest_major() {
        assert_eq!(pick(DependencyBehavior::HighestMinor, "1.0", CHAIN), "1.1.0");
    }

    #[test]
    fn test_highest_picks_maximum() {
        assert_eq!(pick(DependencyBehavior::Highest, "1.0", CHAIN), "2.0.0");
    }

    #[test]
    fn test_policy_respects_range() {
        assert_eq!(pick(DependencyBehavior::HighestPatch, "1.1", CHAIN), "1.1.0");
        assert_eq!(pick(DependencyBehavior::Highest, "[1.0, 2.0)", CHAIN), "1.1.0");
    }

    #[test]
    fn test_candidate_order_does_not_matter() {
        let shuffled = &["2.0", "1.0.1", "1.1", "1.0", "1.0.9"];
        assert_eq!(pick(DependencyBehavior::Lowest, "1.0", shuffled), "1.0.0");
        assert_eq!(pick(DependencyBehavior::HighestPatch, "1.0", shuffled), "1.0.9");
        assert_eq!(pick(DependencyBehavior::HighestMinor, "1.0", shuffled), "1.1.0");
        assert_eq!(pick(DependencyBehavior::Highest, "1.0", shuffled), "2.0.0");
    }

    #[test]
    fn test_installed_version_is_preferred() {
        let c = candidates(&["1.0", "1.1"]);
        let installed = SemanticVersion::parse("1.0").unwrap();
        let chosen = VersionSelector::new(DependencyBehavior::Highest, false)
            .select("B", &constraint("1.0"), &c, Some(&installed))
            .unwrap();
        assert_eq!(chosen.identity.version, installed);
    }

    #[test]
    fn test_installed_outside_range_is_ignored() {
        let c = candidates(&["1.0", "1.1", "2.0"]);
        let installed = SemanticVersion::parse("1.0").unwrap();
        let chosen = VersionSelector::new(DependencyBehavior::Lowest, false)
            .select("B", &constraint("1.1"), &c, Some(&installed))
            .unwrap();
        assert_eq!(chosen.identity.version.to_normalized_string(), "1.1.0");
    }

    #[test]
    fn test_prerelease_excluded_unless_allowed() {
        let c = candidates(&["1.0", "2.0-beta"]);
        let selector = VersionSelector::new(DependencyBehavior::Highest, false);
        let chosen = selector.select("B", &constraint("1.0"), &c, None).unwrap();
        assert_eq!(chosen.identity.version.to_normalized_string(), "1.0.0");

        let selector = VersionSelector::new(DependencyBehavior::Highest, true);
        let chosen = selector.select("B", &constraint("1.0"), &c, None).unwrap();
        assert_eq!(chosen.identity.version.to_normalized_string(), "2.0.0-beta");
    }

    #[test]
    fn test_installed_prerelease_needs_opt_in() {
        let c = candidates(&["1.0", "2.0-beta"]);
        let installed = SemanticVersion::parse("2.0-beta").unwrap();

        let chosen = VersionSelector::new(DependencyBehavior::Lowest, false)
            .select("B", &constraint("1.0"), &c, Some(&installed))
            .unwrap();
        assert_eq!(chosen.identity.version.to_normalized_string(), "1.0.0");

        let chosen = VersionSelector::new(DependencyBehavior::Lowest, true)
            .select("B", &constraint("1.0"), &c, Some(&installed))
            .unwrap();
        assert_eq!(chosen.identity.version, installed);
    }

    #[test]
    fn test_prerelease_bound_opts_in() {
        let c = candidates(&["2.0-beta"]);
        let chosen = VersionSelector::new(DependencyBehavior::Lowest, false)
            .select("B", &constraint("2.0-alpha"), &c, None)
            .unwrap();
        assert!(chosen.identity.version.is_prerelease());
    }

    #[test]
    fn test_unsatisfiable_exact_version() {
        let c = candidates(&["1.4"]);
        let err = VersionSelector::new(DependencyBehavior::Lowest, false)
            .select("B", &constraint("[1.3]"), &c, None)
            .unwrap_err();
        match err {
            Error::UnsatisfiableDependency {
                package,
                range,
                required_by,
            } => {
                assert_eq!(package, "B");
                assert_eq!(range.to_string(), "[1.3]");
                assert_eq!(required_by, vec!["A 1.0.0 [1.3]"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_range_is_unsatisfiable() {
        let c = candidates(&["1.3", "1.4"]);
        let mut merged = constraint("[1.3]");
        merged.merge("C 1.0.0", &VersionRange::parse("[1.4]").unwrap());
        let err = VersionSelector::new(DependencyBehavior::Lowest, false)
            .select("B", &merged, &c, None)
            .unwrap_err();
        assert!(matches!(err, Error::UnsatisfiableDependency { .. }));
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        let c = candidates(&["1.0+first", "1.0+second"]);
        let chosen = VersionSelector::new(DependencyBehavior::Highest, false)
            .select("B", &constraint("1.0"), &c, None)
            .unwrap();
        assert_eq!(chosen.identity.version.metadata(), Some("first"));

        let chosen = VersionSelector::new(DependencyBehavior::Lowest, false)
            .select("B", &constraint("1.0"), &c, None)
            .unwrap();
        assert_eq!(chosen.identity.version.metadata(), Some("first"));
    }
}

// src/resolver/constraint.rs

//! Merging version constraints that reach one package id from several paths

use crate::version::VersionRange;

/// One path's contribution to a merged constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    /// Who imposed the range, e.g. `A 1.0.0` or `requested`
    pub requirer: String,
    pub range: VersionRange,
}

/// The intersection of every range imposed on a package id so far
///
/// Merging is commutative and associative; the contribution list only
/// feeds error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConstraint {
    range: VersionRange,
    contributions: Vec<Contribution>,
}

impl MergedConstraint {
    pub fn new(requirer: impl Into<String>, range: VersionRange) -> Self {
        Self {
            contributions: vec![Contribution {
                requirer: requirer.into(),
                range: range.clone(),
            }],
            range,
        }
    }

    /// Intersect another path's range into this constraint
    pub fn merge(&mut self, requirer: impl Into<String>, range: &VersionRange) {
        self.range = self.range.intersect(range);
        self.contributions.push(Contribution {
            requirer: requirer.into(),
            range: range.clone(),
        });
    }

    pub fn range(&self) -> &VersionRange {
        &self.range
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Contributions rendered as `requirer range`, for diagnostics
    pub fn requirers(&self) -> Vec<String> {
        self.contributions
            .iter()
            .map(|c| {
                if c.range.is_unbounded() {
                    c.requirer.clone()
                } else {
                    format!("{} {}", c.requirer, c.range)
                }
            })
            .collect()
    }
}

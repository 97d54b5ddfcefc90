// src/version/range.rs

//! Version ranges in interval notation
//!
//! | Notation      | Meaning              |
//! |---------------|----------------------|
//! | `1.0`         | `1.0 <= x`           |
//! | `[1.0]`       | `x == 1.0`           |
//! | `(1.0,)`      | `1.0 < x`            |
//! | `(,1.0]`      | `x <= 1.0`           |
//! | `[1.0,2.0)`   | `1.0 <= x < 2.0`     |
//!
//! A missing bound is unbounded on that side.

use super::SemanticVersion;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// An interval over semantic versions
///
/// Ranges produced by [`VersionRange::intersect`] may be empty; that is a
/// state checked with [`VersionRange::is_empty`], not an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    min: Option<SemanticVersion>,
    min_inclusive: bool,
    max: Option<SemanticVersion>,
    max_inclusive: bool,
}

impl VersionRange {
    /// Create a range from explicit bounds
    ///
    /// Fails if both bounds are present and `min > max`.
    pub fn new(
        min: Option<SemanticVersion>,
        min_inclusive: bool,
        max: Option<SemanticVersion>,
        max_inclusive: bool,
    ) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (&min, &max) {
            if lo > hi {
                return Err(Error::InvalidVersionRange(format!(
                    "minimum {} is greater than maximum {}",
                    lo, hi
                )));
            }
        }
        Ok(Self {
            min,
            min_inclusive,
            max,
            max_inclusive,
        })
    }

    /// The range accepting every version
    pub fn all() -> Self {
        Self {
            min: None,
            min_inclusive: false,
            max: None,
            max_inclusive: false,
        }
    }

    /// The range accepting exactly `version`
    pub fn exact(version: SemanticVersion) -> Self {
        Self {
            min: Some(version.clone()),
            min_inclusive: true,
            max: Some(version),
            max_inclusive: true,
        }
    }

    /// The range accepting `version` and anything above it
    pub fn at_least(version: SemanticVersion) -> Self {
        Self {
            min: Some(version),
            min_inclusive: true,
            max: None,
            max_inclusive: false,
        }
    }

    pub fn min_version(&self) -> Option<&SemanticVersion> {
        self.min.as_ref()
    }

    pub fn is_min_inclusive(&self) -> bool {
        self.min_inclusive
    }

    pub fn max_version(&self) -> Option<&SemanticVersion> {
        self.max.as_ref()
    }

    pub fn is_max_inclusive(&self) -> bool {
        self.max_inclusive
    }

    /// Whether neither side is bounded
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether this range pins a single version
    pub fn is_exact(&self) -> bool {
        match (&self.min, &self.max) {
            (Some(lo), Some(hi)) => lo == hi && self.min_inclusive && self.max_inclusive,
            _ => false,
        }
    }

    /// Whether no version can satisfy this range
    pub fn is_empty(&self) -> bool {
        match (&self.min, &self.max) {
            (Some(lo), Some(hi)) => match lo.cmp(hi) {
                Ordering::Greater => true,
                Ordering::Equal => !(self.min_inclusive && self.max_inclusive),
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    /// Whether either bound is itself a pre-release version
    pub fn has_prerelease_bound(&self) -> bool {
        self.min.as_ref().is_some_and(|v| v.is_prerelease())
            || self.max.as_ref().is_some_and(|v| v.is_prerelease())
    }

    /// Check if a version lies inside this range
    pub fn satisfies(&self, version: &SemanticVersion) -> bool {
        if let Some(min) = &self.min {
            match version.cmp(min) {
                Ordering::Less => return false,
                Ordering::Equal if !self.min_inclusive => return false,
                _ => {}
            }
        }
        if let Some(max) = &self.max {
            match version.cmp(max) {
                Ordering::Greater => return false,
                Ordering::Equal if !self.max_inclusive => return false,
                _ => {}
            }
        }
        true
    }

    /// Intersect two ranges
    ///
    /// Takes the higher lower bound and the lower upper bound. When two
    /// bounds sit on the same version the exclusive one wins. The result
    /// may be empty.
    pub fn intersect(&self, other: &VersionRange) -> VersionRange {
        let (min, min_inclusive) = match (&self.min, &other.min) {
            (None, None) => (None, false),
            (Some(v), None) => (Some(v.clone()), self.min_inclusive),
            (None, Some(v)) => (Some(v.clone()), other.min_inclusive),
            (Some(a), Some(b)) => match a.cmp(b) {
                Ordering::Greater => (Some(a.clone()), self.min_inclusive),
                Ordering::Less => (Some(b.clone()), other.min_inclusive),
                Ordering::Equal => (
                    Some(a.clone()),
                    self.min_inclusive && other.min_inclusive,
                ),
            },
        };

        let (max, max_inclusive) = match (&self.max, &other.max) {
            (None, None) => (None, false),
            (Some(v), None) => (Some(v.clone()), self.max_inclusive),
            (None, Some(v)) => (Some(v.clone()), other.max_inclusive),
            (Some(a), Some(b)) => match a.cmp(b) {
                Ordering::Less => (Some(a.clone()), self.max_inclusive),
                Ordering::Greater => (Some(b.clone()), other.max_inclusive),
                Ordering::Equal => (
                    Some(a.clone()),
                    self.max_inclusive && other.max_inclusive,
                ),
            },
        };

        VersionRange {
            min,
            min_inclusive,
            max,
            max_inclusive,
        }
    }

    /// Parse a range in interval notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::InvalidVersionRange(s.to_string());

        if s.is_empty() {
            return Err(invalid());
        }

        let first = s.chars().next().ok_or_else(invalid)?;
        if first != '[' && first != '(' {
            // A bare version is a minimum, inclusive
            let version = SemanticVersion::parse(s).map_err(|_| invalid())?;
            return Ok(Self::at_least(version));
        }

        let last = s.chars().last().ok_or_else(invalid)?;
        if s.len() < 2 || (last != ']' && last != ')') {
            return Err(invalid());
        }

        let min_inclusive = first == '[';
        let max_inclusive = last == ']';
        let inner = s[1..s.len() - 1].trim();

        let bound = |part: &str| -> Result<Option<SemanticVersion>> {
            let part = part.trim();
            if part.is_empty() {
                Ok(None)
            } else {
                SemanticVersion::parse(part).map(Some).map_err(|_| invalid())
            }
        };

        match inner.split_once(',') {
            None => {
                // Only `[x]` is meaningful without a comma
                if !(min_inclusive && max_inclusive) {
                    return Err(invalid());
                }
                let version = bound(inner)?.ok_or_else(invalid)?;
                Ok(Self::exact(version))
            }
            Some((lo, hi)) => {
                if hi.contains(',') {
                    return Err(invalid());
                }
                let min = bound(lo)?;
                let max = bound(hi)?;
                let range = Self::new(min, min_inclusive, max, max_inclusive)
                    .map_err(|_| invalid())?;
                if range.is_empty() {
                    return Err(invalid());
                }
                Ok(range)
            }
        }
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            if let Some(v) = &self.min {
                return write!(f, "[{}]", v);
            }
        }

        write!(f, "{}", if self.min_inclusive { '[' } else { '(' })?;
        if let Some(min) = &self.min {
            write!(f, "{}", min)?;
        }
        write!(f, ", ")?;
        if let Some(max) = &self.max {
            write!(f, "{}", max)?;
        }
        write!(f, "{}", if self.max_inclusive { ']' } else { ')' })
    }
}

impl FromStr for VersionRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VersionRange> for String {
    fn from(value: VersionRange) -> Self {
        value.to_string()
    }
}

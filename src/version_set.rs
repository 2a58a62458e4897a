// SPDX-License-Identifier: MPL-2.0

//! Sets of versions, closed under intersection and union.
//!
//! A [`VersionSet`] is one of:
//!  - [`empty()`](VersionSet::empty): the empty set
//!  - [`any()`](VersionSet::any): the set of all versions
//!  - [`exact(v)`](VersionSet::exact): the set containing only the version v
//!  - [`between(v1, v2)`](VersionSet::between): the half-open range `v1 <= versions < v2`
//!  - a union of the above
//!
//! Every operation returns the canonical form: pieces are sorted and
//! disjoint, overlapping and adjacent ranges are coalesced, singletons
//! inside a range are absorbed, and a union of a single piece collapses
//! to that piece. Membership tests are `O(log n)` in the number of pieces.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

use crate::version::Version;

/// Error raised when a requirement string is not `any`, `=X.Y.Z`,
/// `X.Y.Z..<A.B.C`, or a comma-separated union of those.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed version set `{0}`")]
pub struct MalformedVersionSet(pub String);

/// One building block of a union: a singleton or a half-open range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Piece {
    /// A single version.
    Exact(Version),
    /// The half-open range `[lower, upper)`.
    Range {
        /// Inclusive lower bound.
        lower: Version,
        /// Exclusive upper bound.
        upper: Version,
    },
}

impl Piece {
    fn lower(&self) -> &Version {
        match self {
            Piece::Exact(v) => v,
            Piece::Range { lower, .. } => lower,
        }
    }

    fn contains(&self, v: &Version) -> bool {
        match self {
            Piece::Exact(w) => w == v,
            Piece::Range { lower, upper } => lower <= v && v < upper,
        }
    }

    fn intersect(&self, other: &Piece) -> Option<Piece> {
        match (self, other) {
            (Piece::Exact(v), other) | (other, Piece::Exact(v)) => {
                other.contains(v).then(|| Piece::Exact(v.clone()))
            }
            (
                Piece::Range { lower: a, upper: b },
                Piece::Range { lower: c, upper: d },
            ) => {
                let lower = a.max(c).clone();
                let upper = b.min(d).clone();
                (lower < upper).then_some(Piece::Range { lower, upper })
            }
        }
    }

    /// Compare where two pieces stop covering the version line.
    /// A singleton `v` stops at `v` inclusive, a range at its upper bound
    /// exclusive, so the singleton outlasts a range ending at `v`.
    fn cmp_end(&self, other: &Piece) -> Ordering {
        match (self, other) {
            (Piece::Exact(v), Piece::Exact(w)) => v.cmp(w),
            (Piece::Range { upper: b, .. }, Piece::Range { upper: d, .. }) => b.cmp(d),
            (Piece::Exact(v), Piece::Range { upper: d, .. }) => {
                if v < d {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (Piece::Range { upper: b, .. }, Piece::Exact(v)) => {
                if v < b {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
        }
    }

    // Ranges sort before singletons at the same lower bound so the sweep
    // in `normalize` absorbs the singleton.
    fn rank(&self) -> u8 {
        match self {
            Piece::Range { .. } => 0,
            Piece::Exact(_) => 1,
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Piece::Exact(v) => write!(f, "={v}"),
            Piece::Range { lower, upper } => write!(f, "{lower}..<{upper}"),
        }
    }
}

/// A canonical set of versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSet {
    /// The empty set.
    Empty,
    /// Every version.
    Any,
    /// Exactly one version.
    Exact(Version),
    /// The half-open range `[lower, upper)`.
    Range {
        /// Inclusive lower bound.
        lower: Version,
        /// Exclusive upper bound.
        upper: Version,
    },
    /// At least two disjoint, sorted pieces. Never constructed directly;
    /// produced by [`union`](VersionSet::union) and normalization.
    Union(Vec<Piece>),
}

impl VersionSet {
    /// The empty set of versions.
    pub fn empty() -> Self {
        VersionSet::Empty
    }

    /// The set of all versions.
    pub fn any() -> Self {
        VersionSet::Any
    }

    /// The set containing exactly one version.
    pub fn exact(v: impl Into<Version>) -> Self {
        VersionSet::Exact(v.into())
    }

    /// Versions greater or equal to `lower` but strictly less than `upper`.
    /// An inverted or degenerate pair yields the empty set.
    pub fn between(lower: impl Into<Version>, upper: impl Into<Version>) -> Self {
        let (lower, upper) = (lower.into(), upper.into());
        if lower < upper {
            VersionSet::Range { lower, upper }
        } else {
            VersionSet::Empty
        }
    }

    /// Whether no version is in the set.
    pub fn is_empty(&self) -> bool {
        matches!(self, VersionSet::Empty)
    }

    /// Whether every version is in the set.
    pub fn is_any(&self) -> bool {
        matches!(self, VersionSet::Any)
    }

    /// Whether the given version is a member.
    pub fn contains(&self, v: &Version) -> bool {
        match self {
            VersionSet::Empty => false,
            VersionSet::Any => true,
            VersionSet::Exact(w) => w == v,
            VersionSet::Range { lower, upper } => lower <= v && v < upper,
            VersionSet::Union(pieces) => {
                let idx = pieces.partition_point(|p| p.lower() <= v);
                idx > 0 && pieces[idx - 1].contains(v)
            }
        }
    }

    /// The intersection of two sets, in canonical form.
    pub fn intersection(&self, other: &Self) -> Self {
        match (self, other) {
            (VersionSet::Empty, _) | (_, VersionSet::Empty) => VersionSet::Empty,
            (VersionSet::Any, x) | (x, VersionSet::Any) => x.clone(),
            (VersionSet::Exact(v), x) | (x, VersionSet::Exact(v)) => {
                if x.contains(v) {
                    VersionSet::Exact(v.clone())
                } else {
                    VersionSet::Empty
                }
            }
            _ => {
                let a = self.to_pieces();
                let b = other.to_pieces();
                let (mut i, mut j) = (0, 0);
                let mut out = Vec::new();
                while i < a.len() && j < b.len() {
                    if let Some(piece) = a[i].intersect(&b[j]) {
                        out.push(piece);
                    }
                    // Advance whichever piece stops covering first.
                    match a[i].cmp_end(&b[j]) {
                        Ordering::Less => i += 1,
                        Ordering::Greater => j += 1,
                        Ordering::Equal => {
                            i += 1;
                            j += 1;
                        }
                    }
                }
                Self::normalize(out)
            }
        }
    }

    /// The union of two sets, in canonical form.
    pub fn union(&self, other: &Self) -> Self {
        match (self, other) {
            (VersionSet::Empty, x) | (x, VersionSet::Empty) => x.clone(),
            (VersionSet::Any, _) | (_, VersionSet::Any) => VersionSet::Any,
            _ => {
                let mut pieces = self.to_pieces();
                pieces.extend(other.to_pieces());
                Self::normalize(pieces)
            }
        }
    }

    fn to_pieces(&self) -> Vec<Piece> {
        match self {
            VersionSet::Empty | VersionSet::Any => Vec::new(),
            VersionSet::Exact(v) => vec![Piece::Exact(v.clone())],
            VersionSet::Range { lower, upper } => vec![Piece::Range {
                lower: lower.clone(),
                upper: upper.clone(),
            }],
            VersionSet::Union(pieces) => pieces.clone(),
        }
    }

    /// Sort, coalesce, and collapse a bag of pieces into canonical form.
    fn normalize(mut pieces: Vec<Piece>) -> Self {
        pieces.retain(|p| match p {
            Piece::Range { lower, upper } => lower < upper,
            Piece::Exact(_) => true,
        });
        pieces.sort_by(|x, y| {
            x.lower()
                .cmp(y.lower())
                .then_with(|| x.rank().cmp(&y.rank()))
        });

        let mut out: Vec<Piece> = Vec::with_capacity(pieces.len());
        for next in pieces {
            let Some(last) = out.last_mut() else {
                out.push(next);
                continue;
            };
            let disjoint = match (&*last, &next) {
                (Piece::Range { upper: b, .. }, Piece::Range { lower: c, .. }) => c > b,
                // v == b stays a separate piece: `[a, b) ∪ {b}` has no
                // half-open representation.
                (Piece::Range { upper: b, .. }, Piece::Exact(v)) => v >= b,
                (Piece::Exact(_), Piece::Range { .. }) => true,
                (Piece::Exact(v), Piece::Exact(w)) => w != v,
            };
            if disjoint {
                out.push(next);
            } else if let (Piece::Range { upper: b, .. }, Piece::Range { upper: d, .. }) =
                (last, next)
            {
                // Overlapping ranges coalesce; anything else is absorbed.
                if d > *b {
                    *b = d;
                }
            }
        }

        match out.len() {
            0 => VersionSet::Empty,
            1 => match out.into_iter().next().unwrap() {
                Piece::Exact(v) => VersionSet::Exact(v),
                Piece::Range { lower, upper } => VersionSet::Range { lower, upper },
            },
            _ => VersionSet::Union(out),
        }
    }
}

// REPORT ######################################################################

impl Display for VersionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSet::Empty => write!(f, "∅"),
            VersionSet::Any => write!(f, "any"),
            VersionSet::Exact(v) => write!(f, "={v}"),
            VersionSet::Range { lower, upper } => write!(f, "{lower}..<{upper}"),
            VersionSet::Union(pieces) => {
                for (idx, piece) in pieces.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{piece}")?;
                }
                Ok(())
            }
        }
    }
}

fn parse_piece(s: &str, input: &str) -> Result<VersionSet, MalformedVersionSet> {
    if let Some(v) = s.strip_prefix('=') {
        let v: Version = v.parse().map_err(|_| MalformedVersionSet(input.to_string()))?;
        Ok(VersionSet::exact(v))
    } else if let Some((lower, upper)) = s.split_once("..<") {
        let lower: Version = lower
            .parse()
            .map_err(|_| MalformedVersionSet(input.to_string()))?;
        let upper: Version = upper
            .parse()
            .map_err(|_| MalformedVersionSet(input.to_string()))?;
        Ok(VersionSet::between(lower, upper))
    } else {
        Err(MalformedVersionSet(input.to_string()))
    }
}

impl FromStr for VersionSet {
    type Err = MalformedVersionSet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "any" => Ok(VersionSet::Any),
            "∅" => Ok(VersionSet::Empty),
            "" => Err(MalformedVersionSet(s.to_string())),
            _ => trimmed
                .split(',')
                .map(|piece| parse_piece(piece.trim(), s))
                .try_fold(VersionSet::Empty, |acc, piece| Ok(acc.union(&piece?))),
        }
    }
}

// SERIALIZATION ###############################################################

#[cfg(feature = "serde")]
impl serde::Serialize for VersionSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VersionSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// TESTS #######################################################################

// SPDX-License-Identifier: MPL-2.0

//! Semantic versions with pre-release and build metadata.
//!
//! [`Version`] implements the full semver 2.0 precedence rules:
//! numeric precedence on the `major.minor.patch` triple, pre-release
//! versions ordered before their release counterpart, and build metadata
//! ignored entirely for comparison.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Error raised when a version string does not follow the
/// `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]` grammar.
/// Carries the offending text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed version `{0}`")]
pub struct MalformedVersion(pub String);

/// One dot-separated identifier in a pre-release suffix.
///
/// Numeric identifiers compare numerically and order before any
/// alphanumeric identifier, per semver 2.0 §11.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PreRelease {
    /// A purely numeric identifier, e.g. the `2` in `1.0.0-rc.2`.
    Numeric(u64),
    /// An alphanumeric identifier, e.g. the `rc` in `1.0.0-rc.2`.
    Alphanumeric(String),
}

impl PreRelease {
    fn parse(s: &str, input: &str) -> Result<Self, MalformedVersion> {
        if s.is_empty() {
            return Err(MalformedVersion(input.to_string()));
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            if s.len() > 1 && s.starts_with('0') {
                return Err(MalformedVersion(s.to_string()));
            }
            s.parse::<u64>()
                .map(PreRelease::Numeric)
                .map_err(|_| MalformedVersion(s.to_string()))
        } else if s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            Ok(PreRelease::Alphanumeric(s.to_string()))
        } else {
            Err(MalformedVersion(s.to_string()))
        }
    }
}

impl Ord for PreRelease {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PreRelease::Numeric(a), PreRelease::Numeric(b)) => a.cmp(b),
            (PreRelease::Numeric(_), PreRelease::Alphanumeric(_)) => Ordering::Less,
            (PreRelease::Alphanumeric(_), PreRelease::Numeric(_)) => Ordering::Greater,
            (PreRelease::Alphanumeric(a), PreRelease::Alphanumeric(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for PreRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreRelease::Numeric(n) => write!(f, "{n}"),
            PreRelease::Alphanumeric(s) => write!(f, "{s}"),
        }
    }
}

/// A semantic version: `major.minor.patch` with optional pre-release
/// identifiers and build metadata.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Vec<PreRelease>,
    build: Vec<String>,
}

impl Version {
    /// Create a release version `major.minor.patch`.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
            build: Vec::new(),
        }
    }

    /// Attach pre-release identifiers, e.g. `[Alphanumeric("beta"), Numeric(1)]`.
    pub fn with_pre(mut self, pre: Vec<PreRelease>) -> Self {
        self.pre = pre;
        self
    }

    /// Attach build metadata identifiers.
    pub fn with_build(mut self, build: Vec<String>) -> Self {
        self.build = build;
        self
    }

    /// The major component.
    pub fn major(&self) -> u64 {
        self.major
    }

    /// The minor component.
    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// The patch component.
    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// The pre-release identifiers, empty for a release version.
    pub fn pre(&self) -> &[PreRelease] {
        &self.pre
    }

    /// The build metadata identifiers. Never participates in ordering.
    pub fn build(&self) -> &[String] {
        &self.build
    }

    /// Whether this version carries a pre-release suffix.
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

// Convert a tuple (major, minor, patch) into a release version.
impl From<(u64, u64, u64)> for Version {
    fn from(tuple: (u64, u64, u64)) -> Self {
        let (major, minor, patch) = tuple;
        Self::new(major, minor, patch)
    }
}

// Build metadata is excluded from equality, ordering and hashing.

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major
            && self.minor == other.minor
            && self.patch == other.patch
            && self.pre == other.pre
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.pre.hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // A pre-release precedes the bare triple.
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                // Slice ordering already gives shorter-prefix-first.
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for (idx, id) in self.pre.iter().enumerate() {
            write!(f, "{}{}", if idx == 0 { '-' } else { '.' }, id)?;
        }
        for (idx, id) in self.build.iter().enumerate() {
            write!(f, "{}{}", if idx == 0 { '+' } else { '.' }, id)?;
        }
        Ok(())
    }
}

fn parse_component(s: &str, input: &str) -> Result<u64, MalformedVersion> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MalformedVersion(input.to_string()));
    }
    if s.len() > 1 && s.starts_with('0') {
        return Err(MalformedVersion(input.to_string()));
    }
    s.parse::<u64>()
        .map_err(|_| MalformedVersion(input.to_string()))
}

fn parse_build(s: &str, input: &str) -> Result<String, MalformedVersion> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        Ok(s.to_string())
    } else {
        Err(MalformedVersion(input.to_string()))
    }
}

impl FromStr for Version {
    type Err = MalformedVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (core, build) = match s.split_once('+') {
            Some((core, build)) => (core, Some(build)),
            None => (s, None),
        };
        let (triple, pre) = match core.split_once('-') {
            Some((triple, pre)) => (triple, Some(pre)),
            None => (core, None),
        };

        let mut components = triple.split('.');
        let major = parse_component(components.next().unwrap_or(""), s)?;
        let minor = parse_component(components.next().unwrap_or(""), s)?;
        let patch = parse_component(components.next().unwrap_or(""), s)?;
        if components.next().is_some() {
            return Err(MalformedVersion(s.to_string()));
        }

        let pre = match pre {
            Some(pre) => pre
                .split('.')
                .map(|id| PreRelease::parse(id, s))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let build = match build {
            Some(build) => build
                .split('.')
                .map(|id| parse_build(id, s))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Version {
            major,
            minor,
            patch,
            pre,
            build,
        })
    }
}

// SERIALIZATION ###############################################################

#[cfg(feature = "serde")]
impl serde::Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// TESTS #######################################################################

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display_round_trip() {
        for s in [
            "0.0.0",
            "1.2.3",
            "10.20.30",
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-0.3.7",
            "1.0.0-x-y-z.0",
            "1.0.0+20130313144700",
            "1.0.0-beta+exp.sha.5114f85",
        ] {
            assert_eq!(v(s).to_string(), s);
        }
    }

    #[test]
    fn rejects_malformed() {
        for s in [
            "",
            "1",
            "1.2",
            "1.2.3.4",
            "01.2.3",
            "1.02.3",
            "1.2.03",
            "1.2.3-",
            "1.2.3-alpha..1",
            "1.2.3-01",
            "1.2.3+",
            "1.2.3+a..b",
            "a.b.c",
            "1.2.-3",
            "1.2.3-béta",
        ] {
            assert!(s.parse::<Version>().is_err(), "accepted `{s}`");
        }
    }

    #[test]
    fn semver_precedence_chain() {
        // The ordering chain from semver 2.0 §11.4.
        let chain = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
            "2.0.0",
            "2.1.0",
            "2.1.1",
        ];
        for pair in chain.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn build_metadata_ignored() {
        assert_eq!(v("1.0.0+a"), v("1.0.0+b"));
        assert_eq!(v("1.0.0+a").cmp(&v("1.0.0")), Ordering::Equal);
        assert_eq!(v("1.0.0-rc.1+build.5"), v("1.0.0-rc.1"));
    }

    #[test]
    fn numeric_identifiers_precede_alphanumeric() {
        assert!(v("1.0.0-1") < v("1.0.0-a"));
        assert!(v("1.0.0-2") < v("1.0.0-10"));
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.0"));
    }
}

//! Instance version parsing and ordering.
//!
//! Coolify reports versions such as `4.0.0-beta.383`. Ordering follows semver
//! precedence: numeric components first, then a pre-release sorts before the
//! matching release, and dotted pre-release identifiers compare numerically
//! when both are numbers.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while parsing an [`ApiVersion`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionParseError {
    /// The input was empty after trimming.
    #[error("version string is empty")]
    Empty,
    /// A numeric component was missing or not a number.
    #[error("invalid {component} component '{value}'")]
    InvalidComponent {
        /// Which component failed (`major`, `minor`, `patch`).
        component: &'static str,
        /// Offending text.
        value: String,
    },
    /// More than three numeric components were supplied.
    #[error("too many numeric components in '{value}'")]
    TooManyComponents {
        /// Full input.
        value: String,
    },
    /// A pre-release identifier was empty (e.g. `4.0.0-beta..1`).
    #[error("empty pre-release identifier in '{value}'")]
    EmptyPreRelease {
        /// Full input.
        value: String,
    },
}

/// A single dotted pre-release identifier.
///
/// Variant order matters: numeric identifiers sort before alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    /// Purely numeric identifier.
    Numeric(u64),
    /// Identifier containing non-digit characters.
    Alpha(String),
}

impl Display for PreRelease {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(value) => write!(formatter, "{value}"),
            Self::Alpha(value) => formatter.write_str(value),
        }
    }
}

/// Parsed instance version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiVersion {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
    /// Pre-release identifiers; empty for a release.
    pub pre: Vec<PreRelease>,
}

impl ApiVersion {
    /// Whether this version carries pre-release identifiers.
    #[must_use]
    pub const fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl FromStr for ApiVersion {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let without_build = trimmed.split_once('+').map_or(trimmed, |(core, _)| core);
        let (core, pre) = without_build
            .split_once('-')
            .map_or((without_build, None), |(core, pre)| (core, Some(pre)));

        let mut numbers = [0_u64; 3];
        let mut parts = core.split('.');
        for (slot, component) in numbers.iter_mut().zip(["major", "minor", "patch"]) {
            match parts.next() {
                Some(part) => {
                    *slot = part
                        .parse()
                        .map_err(|_| VersionParseError::InvalidComponent {
                            component,
                            value: part.to_string(),
                        })?;
                }
                None if component == "major" => {
                    return Err(VersionParseError::InvalidComponent {
                        component,
                        value: String::new(),
                    });
                }
                None => break,
            }
        }
        if parts.next().is_some() {
            return Err(VersionParseError::TooManyComponents {
                value: input.to_string(),
            });
        }

        let pre = match pre {
            None => Vec::new(),
            Some(pre) => pre
                .split('.')
                .map(|ident| {
                    if ident.is_empty() {
                        Err(VersionParseError::EmptyPreRelease {
                            value: input.to_string(),
                        })
                    } else if ident.bytes().all(|byte| byte.is_ascii_digit()) {
                        ident
                            .parse()
                            .map(PreRelease::Numeric)
                            .or_else(|_| Ok(PreRelease::Alpha(ident.to_string())))
                    } else {
                        Ok(PreRelease::Alpha(ident.to_string()))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        let [major, minor, patch] = numbers;
        Ok(Self {
            major,
            minor,
            patch,
            pre,
        })
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for ApiVersion {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for (index, ident) in self.pre.iter().enumerate() {
            let separator = if index == 0 { '-' } else { '.' };
            write!(formatter, "{separator}{ident}")?;
        }
        Ok(())
    }
}

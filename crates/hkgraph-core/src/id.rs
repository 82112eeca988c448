//! Identifiers for nodes, pins and edges.
//!
//! Every entity in a [`Graph`](crate::Graph) is addressed by an [`Identifier`],
//! a 128-bit value laid out as an RFC 4122 version-4 UUID. Identifiers are
//! drawn from an [`IdProvider`], a seeded pseudo-random generator. Each graph
//! owns its own provider, so two graphs never share generator state.
//!
//! The textual form (hyphenated, lowercase) is the persisted representation:
//! [`Identifier::parse`] is the exact inverse of `to_string()`.

use core::fmt;
use core::str::FromStr;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use thiserror::Error;
use uuid::{Builder, Uuid};

/// A 128-bit universally-unique identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Identifier(Uuid);

/// Identifier of a node.
pub type NodeId = Identifier;
/// Identifier of a pin.
pub type PinId = Identifier;
/// Identifier of an edge.
pub type EdgeId = Identifier;

impl Identifier {
    /// Parses the textual form produced by `to_string()`.
    ///
    /// Braced, URN and simple (no hyphen) UUID spellings are accepted as well;
    /// they all map to the same identifier.
    pub fn parse(text: &str) -> Result<Self, IdParseError> {
        Uuid::parse_str(text)
            .map(Self)
            .map_err(|source| IdParseError {
                text: text.to_owned(),
                source,
            })
    }

    /// Returns the raw 16 bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Returns the underlying UUID.
    #[inline]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for Identifier {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for Identifier {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A persisted identifier could not be parsed.
#[derive(Debug, Error)]
#[error("invalid identifier '{text}': {source}")]
pub struct IdParseError {
    text: String,
    #[source]
    source: uuid::Error,
}

impl IdParseError {
    /// The text that failed to parse.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Stateful identifier generator.
///
/// Wraps a [`StdRng`] seeded once at construction. Identifiers carry 122
/// random bits (the remaining six encode the UUID version and variant), so a
/// collision within one provider is statistically excluded.
pub struct IdProvider {
    rng: StdRng,
}

impl IdProvider {
    /// Creates a provider seeded from the operating system's entropy source.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a provider with a fixed seed. Two providers built from the
    /// same seed issue the same sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Issues a fresh identifier.
    pub fn make_id(&mut self) -> Identifier {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        Identifier(Builder::from_random_bytes(bytes).into_uuid())
    }
}

impl Default for IdProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdProvider").finish_non_exhaustive()
    }
}

//! Dense integer identifiers used throughout the graph and planners.
//!
//! Unlike the content-addressed hashes used elsewhere in this lineage of
//! engines, TARO's ids are plain array indices into the CSR-style stores in
//! [`crate::graph::EdgeGraph`] and [`crate::profile::ProfileStore`]. Newtype
//! wrappers exist purely to stop nodes, edges, profiles, and labels from
//! being mixed up at call sites; they carry no hashing semantics.

use std::fmt;

/// Identifier for a node in [`crate::graph::EdgeGraph`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    /// Returns the identifier as a `usize` for array indexing.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Identifier for a directed edge in [`crate::graph::EdgeGraph`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Returns the identifier as a `usize` for array indexing.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Identifier for a temporal profile in [`crate::profile::ProfileStore`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileId(pub u32);

impl ProfileId {
    /// Returns the identifier as a `usize` for array indexing.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for a [`crate::label::Label`] within a single query's arena.
///
/// Negative values are never produced by the arena; the signed
/// representation exists so callers can use `-1` as a sentinel for "no
/// predecessor" without a separate `Option` layer on the hot path (see
/// spec §3's `predecessor_label_id: i32`).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LabelId(pub i32);

impl LabelId {
    /// Sentinel value meaning "no predecessor".
    pub const NONE: Self = Self(-1);

    /// Returns `true` if this is the [`LabelId::NONE`] sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 < 0
    }

    /// Returns the identifier as a `usize` for array indexing.
    ///
    /// Callers must check [`LabelId::is_none`] first.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

//! Node storage for interaction-combinator nets.
//!
//! Provides `NodeId` (a dense, total-orderable identifier), the `Agent` and
//! `Node` records, and `NodeArena` (fixed-capacity bump storage). The arena
//! never reuses a slot while a reduction is in flight: a retired node keeps
//! its storage until the whole arena is reset.
//!
//! # Determinism
//! - `NodeId` ordering is by its inner `u32`.
//! - Allocation order is the slot order; iteration over live nodes is by
//!   ascending index.
//! - `reset` drops every slot and restarts the high-water mark at zero, so
//!   rebuilding the same net yields the same identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of the principal port.
pub const PRINCIPAL: u8 = 0;
/// Index of the first auxiliary port.
pub const AUX_1: u8 = 1;
/// Index of the second auxiliary port.
pub const AUX_2: u8 = 2;

/// Number of ports on every node.
pub const PORT_COUNT: usize = 3;

/// Dense node identifier within a single net.
///
/// `NodeId(u32)` is `Copy`, `Eq`, `Ord`, `Hash`. The inner value is an index
/// into the arena's slot array; its validity is scoped to the owning net's
/// lifetime and is invalidated by `reset`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new `NodeId` from a raw `u32`.
    ///
    /// The caller must ensure the index refers to an allocated slot of the
    /// arena that will resolve it; out-of-range ids are rejected by the
    /// net's accessors rather than causing panics.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` index.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns the index widened to `usize` for slot addressing.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The three combinator agents.
///
/// `Delta` and `Gamma` are the binary combinators; `Epsilon` is the eraser.
/// All three store the same three-port record for storage uniformity, but
/// only the eraser's principal port ever participates in a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Agent {
    /// δ, the duplicator. Annihilates crosswise against itself.
    Delta,
    /// γ, the constructor. Annihilates straight against itself.
    Gamma,
    /// ε, the eraser. Consumes whatever it meets on its principal port.
    Epsilon,
}

impl Agent {
    /// Returns the conventional single-glyph rendering of the agent.
    pub const fn glyph(&self) -> &'static str {
        match self {
            Agent::Delta => "δ",
            Agent::Gamma => "γ",
            Agent::Epsilon => "ε",
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// One endpoint of a wire: a node and one of its three ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Peer node.
    pub node: NodeId,
    /// Peer port, in `0..3`.
    pub port: u8,
}

impl Link {
    /// Creates a link endpoint.
    #[inline]
    pub const fn new(node: NodeId, port: u8) -> Self {
        Self { node, port }
    }
}

/// A node record: agent, three ports, and the live flag.
///
/// Port 0 is the principal port; ports 1 and 2 are auxiliaries. `None` means
/// the port is unlinked. Retiring a node flips `active` off; its ports are
/// left as the last rewrite wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Which combinator this node is.
    pub agent: Agent,
    /// Port table; index 0 is principal.
    pub ports: [Option<Link>; PORT_COUNT],
    /// Live flag. Retired nodes are skipped by scans and rewrites.
    pub active: bool,
}

impl Node {
    /// Creates a fresh, fully unlinked, live node.
    pub const fn new(agent: Agent) -> Self {
        Self {
            agent,
            ports: [None, None, None],
            active: true,
        }
    }

    /// Returns the principal-port link, if any.
    #[inline]
    pub fn principal(&self) -> Option<Link> {
        self.ports[PRINCIPAL as usize]
    }
}

/// Fixed-capacity bump storage for nodes.
///
/// Slots are handed out in ascending order up to `capacity`; there is no
/// free list. A retired node's slot stays occupied so that node indices
/// remain stable for the lifetime of one reduction, which the factorization
/// side channel depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeArena {
    slots: Vec<Node>,
    capacity: usize,
}

impl NodeArena {
    /// Creates an empty arena that will hold at most `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Allocates a new live node of the given agent.
    ///
    /// Returns `None` when the high-water mark has reached capacity; this is
    /// the only failure mode.
    pub fn alloc(&mut self, agent: Agent) -> Option<NodeId> {
        if self.slots.len() >= self.capacity {
            return None;
        }
        let idx = self.slots.len() as u32;
        self.slots.push(Node::new(agent));
        Some(NodeId::new(idx))
    }

    /// Number of allocated slots (live plus retired).
    #[inline]
    pub fn used(&self) -> usize {
        self.slots.len()
    }

    /// Maximum number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the node at `id`, if allocated.
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index())
    }

    /// Returns the node at `id` mutably, if allocated.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index())
    }

    /// Drops every slot and restarts the high-water mark at zero.
    ///
    /// This is the only way storage is reclaimed; it invalidates every
    /// outstanding `NodeId`.
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    /// Iterates over all allocated nodes in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId::new(idx as u32), node))
    }

    /// Iterates over live nodes only, in ascending index order.
    pub fn iter_live(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.iter().filter(|(_, node)| node.active)
    }
}

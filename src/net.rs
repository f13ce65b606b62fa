//! The net: a self-contained arena of combinator nodes plus the machinery
//! reduction needs around it (gas accounting, the pending-redex queue, and
//! the factorization side channel).
//!
//! `connect` is the single mutation primitive for wires. It severs whatever
//! either endpoint was previously linked to before writing the new wire, so
//! the bidirectionality invariant holds after every call no matter what the
//! caller rewires. Rewrite rules may therefore reason purely in terms of
//! peers they snapshotted before severing.
//!
//! # Invariants
//! - If node `a` port `p` links to `(b, q)` then node `b` port `q` links to
//!   `(a, p)`.
//! - Every stored peer references a slot below the high-water mark and a
//!   port in `0..3`.
//! - `gas_used` never exceeds `gas_limit`.
//! - Queue entries are advisory: consumers revalidate before rewriting.

use crate::arena::{Agent, Link, Node, NodeArena, NodeId, PRINCIPAL};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Upper bound on pending redexes.
///
/// The queue is an accelerator, not the source of truth; entries past the
/// bound are dropped and recovered by the engine's full scans.
pub const MAX_PENDING_REDEXES: usize = 1024;

/// Bounded FIFO of candidate active pairs.
///
/// Entries may go stale (either node retired or rewired) between push and
/// pop; the consumer revalidates at pop time.
#[derive(Debug, Clone, Default)]
pub(crate) struct RedexQueue {
    items: VecDeque<(NodeId, NodeId)>,
}

impl RedexQueue {
    /// Appends a pair, silently dropping it when the queue is full.
    pub(crate) fn push(&mut self, pair: (NodeId, NodeId)) {
        if self.items.len() < MAX_PENDING_REDEXES {
            self.items.push_back(pair);
        }
    }

    /// Removes and returns the oldest pair.
    pub(crate) fn pop(&mut self) -> Option<(NodeId, NodeId)> {
        self.items.pop_front()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

/// The side channel by which the factorization predicate communicates,
/// bypassing any combinator-level number encoding.
///
/// `input` is preserved across net resets so a driver can set it once per
/// search; `found` is cleared by every reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorChannel {
    /// The number being factored; `0` disables predicate evaluation.
    pub input: u64,
    /// First recorded factor candidate.
    pub factor_a: u64,
    /// Second recorded factor candidate.
    pub factor_b: u64,
    /// Whether a factorization was recorded by the last reduction.
    pub found: bool,
}

/// A bounded interaction-combinator net.
///
/// Owns its node storage and redex queue exclusively; node-to-node
/// references are non-owning indices whose validity is scoped to this net
/// between resets.
#[derive(Debug, Clone)]
pub struct Net {
    arena: NodeArena,
    gas_limit: usize,
    gas_used: usize,
    queue: RedexQueue,
    /// Factorization side channel, freely inspectable and settable.
    pub channel: FactorChannel,
}

impl Net {
    /// Creates an empty net with the given node capacity and gas budget.
    pub fn new(capacity: usize, gas_limit: usize) -> Self {
        Self {
            arena: NodeArena::with_capacity(capacity),
            gas_limit,
            gas_used: 0,
            queue: RedexQueue::default(),
            channel: FactorChannel::default(),
        }
    }

    /// Node capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Number of allocated nodes, live plus retired.
    #[inline]
    pub fn used_nodes(&self) -> usize {
        self.arena.used()
    }

    /// Gas budget for one reduction.
    #[inline]
    pub fn gas_limit(&self) -> usize {
        self.gas_limit
    }

    /// Rewrites performed by the current or last reduction.
    #[inline]
    pub fn gas_used(&self) -> usize {
        self.gas_used
    }

    /// Returns the node at `id`, if allocated.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Iterates over live nodes in ascending index order.
    pub fn live_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.arena.iter_live()
    }

    /// Number of live nodes.
    pub fn live_count(&self) -> usize {
        self.arena.iter_live().count()
    }

    /// Allocates a live node of the given agent, all ports unlinked.
    ///
    /// Returns `None` when the net is full.
    pub fn new_node(&mut self, agent: Agent) -> Option<NodeId> {
        self.arena.alloc(agent)
    }

    /// Clears nodes, gas, the queue, and the `found` flag.
    ///
    /// `channel.input` survives so a driver can configure it once and build
    /// candidate nets in place.
    pub fn reset(&mut self) {
        self.arena.reset();
        self.gas_used = 0;
        self.queue.clear();
        self.channel.found = false;
    }

    /// Wires port `pa` of `a` to port `pb` of `b`.
    ///
    /// In order:
    /// 1. Out-of-range node indices or ports make the call a no-op.
    /// 2. The prior peer of `(a, pa)`, if any, is unlinked.
    /// 3. The prior peer of `(b, pb)`, if any, is unlinked.
    /// 4. The mutual link is written.
    /// 5. If both ports are principal and both nodes live, the pair is
    ///    queued as a candidate redex.
    pub fn connect(&mut self, a: NodeId, pa: u8, b: NodeId, pb: u8) {
        let used = self.arena.used();
        if a.index() >= used || b.index() >= used || pa > 2 || pb > 2 {
            return;
        }
        if let Some(old) = self.port(a, pa) {
            self.clear_port(old.node, old.port);
        }
        if let Some(old) = self.port(b, pb) {
            self.clear_port(old.node, old.port);
        }
        self.set_port(a, pa, Some(Link::new(b, pb)));
        self.set_port(b, pb, Some(Link::new(a, pa)));
        if pa == PRINCIPAL && pb == PRINCIPAL {
            self.enqueue_redex(a, b);
        }
    }

    /// True exactly when `(a, b)` is an active pair: mutually linked through
    /// their principal ports with both nodes live.
    pub fn is_redex(&self, a: NodeId, b: NodeId) -> bool {
        let (Some(na), Some(nb)) = (self.arena.get(a), self.arena.get(b)) else {
            return false;
        };
        na.active
            && nb.active
            && na.principal() == Some(Link::new(b, PRINCIPAL))
            && nb.principal() == Some(Link::new(a, PRINCIPAL))
    }

    /// Queues `(a, b)` if it currently is an active pair; drops it otherwise
    /// (and silently when the queue is full).
    pub(crate) fn enqueue_redex(&mut self, a: NodeId, b: NodeId) {
        if self.is_redex(a, b) {
            self.queue.push((a, b));
        }
    }

    pub(crate) fn pop_redex(&mut self) -> Option<(NodeId, NodeId)> {
        self.queue.pop()
    }

    pub(crate) fn clear_redexes(&mut self) {
        self.queue.clear();
    }

    pub(crate) fn redex_queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Reads a port without bounds guarantees beyond slot existence.
    pub(crate) fn port(&self, id: NodeId, port: u8) -> Option<Link> {
        self.arena
            .get(id)
            .and_then(|node| node.ports[usize::from(port)])
    }

    /// Unlinks one side of a wire. The caller is responsible for clearing
    /// the other side, which every rewrite does via its snapshot.
    pub(crate) fn clear_port(&mut self, id: NodeId, port: u8) {
        if let Some(node) = self.arena.get_mut(id) {
            if usize::from(port) < node.ports.len() {
                node.ports[usize::from(port)] = None;
            }
        }
    }

    fn set_port(&mut self, id: NodeId, port: u8, link: Option<Link>) {
        if let Some(node) = self.arena.get_mut(id) {
            node.ports[usize::from(port)] = link;
        }
    }

    /// Flips a node's live flag off. Its storage and ports are untouched.
    pub(crate) fn retire(&mut self, id: NodeId) {
        if let Some(node) = self.arena.get_mut(id) {
            node.active = false;
        }
    }

    pub(crate) fn reset_gas(&mut self) {
        self.gas_used = 0;
    }

    /// Counts one performed rewrite against the budget.
    pub(crate) fn burn_gas(&mut self) {
        debug_assert!(self.gas_used < self.gas_limit);
        self.gas_used += 1;
    }
}

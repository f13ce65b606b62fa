//! Indexed net enumeration.
//!
//! `build_net` is a total, deterministic map from a non-negative index to a
//! syntactically valid net: same index and capacity, same net, every time.
//! It is the candidate generator for the search driver; the only failure is
//! a capacity too small for the ring size the index selects.
//!
//! # Construction schema
//! - Ring size `n = 3 + (index mod 10)`; the quotient is the bit pattern.
//! - Node 0 is δ and node 1 is γ, principal ports linked, so every
//!   candidate starts with at least one active pair.
//! - Node `k >= 2` takes its agent from two pattern bits:
//!   `0` is δ, `1` is γ, anything else is ε.
//! - Auxiliary ports are wired into a ring (aux1 forward, aux2 backward);
//!   nodes past the seed pair also get a principal chord two steps ahead.
//!
//! Because `connect` severs before it writes, the later ring wires may
//! overwrite earlier ones; in particular some principal ports end up
//! unlinked again (the chord targeting node 0 or 1 steals the seed pair's
//! wire, and odd rings strand one chord endpoint). What survives is
//! guaranteed: at least one principal-principal pair among live nodes, and
//! every linked port bidirectionally consistent and in range.

use crate::arena::{Agent, NodeId, AUX_1, AUX_2, PRINCIPAL};
use crate::net::Net;
use std::fmt;

/// Number of distinct ring sizes; sizes run `3 ..= 2 + SIZE_CAP`.
pub const SIZE_CAP: usize = 10;

/// Why a build failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// The net's capacity is smaller than the ring size for this index.
    CapacityExhausted,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::CapacityExhausted => {
                write!(f, "net capacity exhausted while building candidate")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Agent chosen by the pattern bits for ring position `k`.
fn agent_for(pattern: usize, k: usize) -> Agent {
    match (pattern >> ((k % 16) * 2)) & 0x3 {
        0 => Agent::Delta,
        1 => Agent::Gamma,
        _ => Agent::Epsilon,
    }
}

/// Resets `net` and builds the candidate graph for `index` in place.
///
/// Idempotent in `(index, capacity)`. On `Err` the net holds a partial
/// build and should be rebuilt or reset before use.
pub fn build_net(index: usize, net: &mut Net) -> Result<(), BuildError> {
    net.reset();

    let n = 3 + index % SIZE_CAP;
    let pattern = index / SIZE_CAP;

    let delta = net
        .new_node(Agent::Delta)
        .ok_or(BuildError::CapacityExhausted)?;
    let gamma = net
        .new_node(Agent::Gamma)
        .ok_or(BuildError::CapacityExhausted)?;
    net.connect(delta, PRINCIPAL, gamma, PRINCIPAL);

    for k in 2..n {
        net.new_node(agent_for(pattern, k))
            .ok_or(BuildError::CapacityExhausted)?;
    }

    let ring = net.used_nodes();
    for i in 0..ring {
        let id = NodeId::new(i as u32);
        let next = NodeId::new(((i + 1) % ring) as u32);
        let prev = NodeId::new(((i + ring - 1) % ring) as u32);
        if i >= 2 {
            let chord = NodeId::new(((i + 2) % ring) as u32);
            net.connect(id, PRINCIPAL, chord, PRINCIPAL);
        }
        net.connect(id, AUX_1, next, AUX_2);
        net.connect(id, AUX_2, prev, AUX_1);
    }

    Ok(())
}

/// Enumeration cursor: builds at the current index, then advances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Enumerator {
    /// Next index to build.
    pub current_index: usize,
}

impl Enumerator {
    /// Starts at index zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the net at the cursor and advances it.
    ///
    /// Returns whether the build succeeded; the cursor advances either way,
    /// so a driver can skip indices that exceed its net's capacity.
    pub fn next(&mut self, net: &mut Net) -> bool {
        let built = build_net(self.current_index, net).is_ok();
        self.current_index += 1;
        built
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::PORT_COUNT;

    /// Every linked port must point at an allocated slot and be pointed
    /// back at exactly.
    fn links_consistent(net: &Net) -> bool {
        for i in 0..net.used_nodes() {
            let id = NodeId::new(i as u32);
            let node = net.node(id).unwrap();
            for p in 0..PORT_COUNT {
                if let Some(link) = node.ports[p] {
                    if link.node.index() >= net.used_nodes() || usize::from(link.port) >= PORT_COUNT
                    {
                        return false;
                    }
                    let peer = net.node(link.node).unwrap();
                    if peer.ports[usize::from(link.port)]
                        != Some(crate::arena::Link::new(id, p as u8))
                    {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn has_active_pair(net: &Net) -> bool {
        net.live_nodes().any(|(id, node)| {
            node.principal()
                .is_some_and(|link| link.port == PRINCIPAL && net.is_redex(id, link.node))
        })
    }

    #[test]
    fn first_thousand_indices_are_total() {
        let mut net = Net::new(16, 100);
        for index in 0..1000 {
            build_net(index, &mut net).expect("capacity 16 covers every ring size");
            let used = net.used_nodes();
            assert!((3..=12).contains(&used), "index {index} built {used} nodes");
            assert!(links_consistent(&net), "index {index} has a broken link");
            assert!(has_active_pair(&net), "index {index} has no active pair");
        }
    }

    #[test]
    fn ring_size_follows_the_index() {
        let mut net = Net::new(16, 100);
        for (index, expected) in [(0, 3), (1, 4), (9, 12), (10, 3), (25, 8)] {
            build_net(index, &mut net).unwrap();
            assert_eq!(net.used_nodes(), expected);
        }
    }

    #[test]
    fn seed_pair_agents_are_fixed() {
        let mut net = Net::new(16, 100);
        build_net(47, &mut net).unwrap();
        assert_eq!(net.node(NodeId::new(0)).unwrap().agent, Agent::Delta);
        assert_eq!(net.node(NodeId::new(1)).unwrap().agent, Agent::Gamma);
    }

    #[test]
    fn small_capacity_rejects_large_rings() {
        let mut net = Net::new(5, 100);
        for index in 0..10 {
            let result = build_net(index, &mut net);
            if index <= 2 {
                // Ring sizes 3, 4, 5 fit.
                result.expect("ring fits in five nodes");
                assert!(links_consistent(&net));
            } else {
                assert_eq!(result, Err(BuildError::CapacityExhausted));
            }
        }
    }

    #[test]
    fn builds_are_deterministic() {
        let mut first = Net::new(16, 100);
        let mut second = Net::new(16, 100);
        for index in [0, 3, 17, 256, 5122, 99_999] {
            build_net(index, &mut first).unwrap();
            build_net(index, &mut second).unwrap();
            assert_eq!(first.used_nodes(), second.used_nodes());
            for i in 0..first.used_nodes() {
                let id = NodeId::new(i as u32);
                assert_eq!(first.node(id), second.node(id), "index {index} node {i}");
            }
        }
    }

    #[test]
    fn enumerator_advances_past_failures() {
        let mut state = Enumerator::new();
        let mut net = Net::new(5, 100);
        let built: Vec<bool> = (0..10).map(|_| state.next(&mut net)).collect();
        assert_eq!(state.current_index, 10);
        assert_eq!(built[..3], [true, true, true]);
        assert!(built[3..].iter().all(|b| !b));
    }
}

//! The reduction work loop.
//!
//! Reduction combines a bounded FIFO of speculative redexes with full scans
//! of the node table. The queue accelerates the common case; the scans
//! guarantee completeness when the queue was truncated or went stale. Queue
//! entries are appended without deduplication, so the pop-side revalidation
//! is the canonical correctness point.
//!
//! # Determinism
//! - The queue is FIFO; scans walk node indices in ascending order and
//!   enqueue `(i, j)` only for `j > i`.
//! - Given the same initial net, the sequence of rewrites, the gas consumed
//!   and the terminal net are identical across runs.
//!
//! # Termination
//! The loop stops when the gas budget is exhausted, or when a full scan's
//! batch of candidates drains without a single rewrite being performed.
//! The latter covers both quiescence (no active pairs remain) and the
//! degenerate case of an active pair whose duplication rewrite aborts for
//! lack of capacity on every attempt.

use crate::arena::PRINCIPAL;
use crate::net::Net;
use crate::reduce::rules;

/// How a reduction run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No active pairs remain (or none can be rewritten).
    Finished,
    /// The gas budget ran out with work possibly left in the net.
    GasExhausted,
}

/// Runs the net to its normal form or to gas exhaustion.
///
/// Zeroes `gas_used` on entry. On exit the net satisfies the link
/// invariants and, when `channel.input` is nonzero, the factorization side
/// channel has been evaluated against the terminal graph.
pub fn reduce(net: &mut Net) -> Outcome {
    net.reset_gas();
    rescan(net, true);

    // True while the most recent scan batch has produced at least one
    // rewrite; cleared at each queue-empty scan.
    let mut progressed = true;

    while net.gas_used() < net.gas_limit() {
        match net.pop_redex() {
            Some((a, b)) => {
                if !net.is_redex(a, b) {
                    continue;
                }
                if rules::apply_rewrite(net, a, b) {
                    net.burn_gas();
                    progressed = true;
                    // Rewiring may have formed pairs the queue missed.
                    rescan(net, false);
                }
            }
            None => {
                if !progressed {
                    break;
                }
                progressed = false;
                rescan(net, true);
                if net.redex_queue_is_empty() {
                    break;
                }
            }
        }
    }

    evaluate_factor_channel(net);
    if net.gas_used() < net.gas_limit() {
        Outcome::Finished
    } else {
        Outcome::GasExhausted
    }
}

/// Enqueues every current active pair, walking nodes in ascending order and
/// pairing each with a strictly larger peer so no pair is queued twice per
/// scan. With `fresh` the queue is cleared first; otherwise entries are
/// appended and duplicates are tolerated.
fn rescan(net: &mut Net, fresh: bool) {
    if fresh {
        net.clear_redexes();
    }
    for i in 0..net.used_nodes() {
        let id = crate::arena::NodeId::new(i as u32);
        let Some(node) = net.node(id) else { continue };
        if !node.active {
            continue;
        }
        match node.principal() {
            Some(link) if link.port == PRINCIPAL && link.node > id => {
                net.enqueue_redex(id, link.node);
            }
            _ => {}
        }
    }
}

/// Reads the factorization predicate off the terminal graph.
///
/// When exactly one δ and one γ are still live, their indices plus one are
/// taken as candidate factors; the channel records them only if their
/// product is the input. Disabled while `channel.input` is zero.
fn evaluate_factor_channel(net: &mut Net) {
    if net.channel.input == 0 {
        return;
    }
    let mut deltas = (0usize, 0u64);
    let mut gammas = (0usize, 0u64);
    for (id, node) in net.live_nodes() {
        match node.agent {
            crate::arena::Agent::Delta => deltas = (deltas.0 + 1, u64::from(id.as_u32()) + 1),
            crate::arena::Agent::Gamma => gammas = (gammas.0 + 1, u64::from(id.as_u32()) + 1),
            crate::arena::Agent::Epsilon => {}
        }
    }
    if deltas.0 == 1 && gammas.0 == 1 {
        let (factor_a, factor_b) = (deltas.1, gammas.1);
        if factor_a * factor_b == net.channel.input {
            net.channel.factor_a = factor_a;
            net.channel.factor_b = factor_b;
            net.channel.found = true;
        }
    }
}

/// True when the channel holds a recorded factorization of `n`.
pub fn has_valid_factor(net: &Net, n: u64) -> bool {
    net.channel.found && net.channel.factor_a * net.channel.factor_b == n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Agent, AUX_1, AUX_2, PRINCIPAL};
    use crate::net::Net;

    #[test]
    fn delta_gamma_pair_cascades_until_full() {
        let mut net = Net::new(10, 100);
        let d = net.new_node(Agent::Delta).unwrap();
        let g = net.new_node(Agent::Gamma).unwrap();
        net.connect(d, PRINCIPAL, g, PRINCIPAL);

        let outcome = reduce(&mut net);

        // Each duplication spawns a fresh pair two slots up; the fifth
        // attempt finds no room and aborts, leaving the last pair live.
        assert_eq!(outcome, Outcome::Finished);
        assert_eq!(net.gas_used(), 4);
        assert_eq!(net.used_nodes(), 10);
        assert!(!net.node(d).unwrap().active);
        assert!(!net.node(g).unwrap().active);
        let live: Vec<u32> = net.live_nodes().map(|(id, _)| id.as_u32()).collect();
        assert_eq!(live, vec![8, 9]);
        let last = crate::arena::NodeId::new(8);
        let peer = net.node(last).unwrap().principal().unwrap();
        assert_eq!(peer.node.as_u32(), 9);
        assert_eq!(peer.port, PRINCIPAL);
    }

    #[test]
    fn single_step_duplication_under_gas_one() {
        let mut net = Net::new(20, 1);
        let d = net.new_node(Agent::Delta).unwrap();
        let g = net.new_node(Agent::Gamma).unwrap();
        net.connect(d, PRINCIPAL, g, PRINCIPAL);

        let outcome = reduce(&mut net);

        assert_eq!(outcome, Outcome::GasExhausted);
        assert_eq!(net.gas_used(), 1);
        assert_eq!(net.used_nodes(), 4);
        assert!(!net.node(d).unwrap().active);
        assert!(!net.node(g).unwrap().active);
        let nd = crate::arena::NodeId::new(2);
        let ng = crate::arena::NodeId::new(3);
        assert_eq!(net.node(nd).unwrap().agent, Agent::Delta);
        assert_eq!(net.node(ng).unwrap().agent, Agent::Gamma);
        assert!(net.is_redex(nd, ng));
    }

    #[test]
    fn gas_limit_halts_divergent_configurations() {
        let mut net = Net::new(10, 2);
        for i in 0..3 {
            let d1 = net.new_node(Agent::Delta).unwrap();
            let d2 = net.new_node(Agent::Delta).unwrap();
            net.connect(d1, PRINCIPAL, d2, PRINCIPAL);
            if i > 0 {
                net.connect(d1, AUX_1, d1, AUX_2);
                net.connect(d2, AUX_1, d2, AUX_2);
            }
        }

        let outcome = reduce(&mut net);

        assert_eq!(outcome, Outcome::GasExhausted);
        assert_eq!(net.gas_used(), 2);
        assert_eq!(net.gas_limit(), 2);
    }

    #[test]
    fn reduction_is_deterministic() {
        let build = || {
            let mut net = Net::new(16, 1000);
            let d = net.new_node(Agent::Delta).unwrap();
            let g = net.new_node(Agent::Gamma).unwrap();
            let e = net.new_node(Agent::Epsilon).unwrap();
            net.connect(d, AUX_1, e, AUX_1);
            net.connect(d, AUX_2, g, AUX_2);
            net.connect(d, PRINCIPAL, g, PRINCIPAL);
            net
        };
        let mut first = build();
        let mut second = build();
        assert_eq!(reduce(&mut first), reduce(&mut second));
        assert_eq!(first.gas_used(), second.gas_used());
        let live_a: Vec<_> = first.live_nodes().map(|(id, n)| (id, n.clone())).collect();
        let live_b: Vec<_> = second.live_nodes().map(|(id, n)| (id, n.clone())).collect();
        assert_eq!(live_a, live_b);
    }

    #[test]
    fn quiescent_net_finishes_without_gas() {
        let mut net = Net::new(4, 10);
        let d = net.new_node(Agent::Delta).unwrap();
        let g = net.new_node(Agent::Gamma).unwrap();
        net.connect(d, AUX_1, g, AUX_1);
        assert_eq!(reduce(&mut net), Outcome::Finished);
        assert_eq!(net.gas_used(), 0);
    }

    #[test]
    fn factor_channel_reads_terminal_graph() {
        let mut net = Net::new(4, 10);
        net.channel.input = 6;
        net.new_node(Agent::Epsilon).unwrap(); // index 0, inert
        net.new_node(Agent::Delta).unwrap(); // index 1 -> factor 2
        net.new_node(Agent::Gamma).unwrap(); // index 2 -> factor 3
        assert_eq!(reduce(&mut net), Outcome::Finished);
        assert!(net.channel.found);
        assert_eq!(net.channel.factor_a, 2);
        assert_eq!(net.channel.factor_b, 3);
        assert!(has_valid_factor(&net, 6));
    }

    #[test]
    fn factor_channel_rejects_wrong_product() {
        let mut net = Net::new(4, 10);
        net.channel.input = 7;
        net.new_node(Agent::Delta).unwrap();
        net.new_node(Agent::Gamma).unwrap();
        assert_eq!(reduce(&mut net), Outcome::Finished);
        // One delta, one gamma, but 1 * 2 != 7.
        assert!(!net.channel.found);
        assert!(!has_valid_factor(&net, 7));
    }

    #[test]
    fn manual_channel_validation() {
        let mut net = Net::new(10, 100);
        net.channel.input = 6;
        net.channel.factor_a = 2;
        net.channel.factor_b = 3;
        net.channel.found = true;
        assert!(has_valid_factor(&net, 6));
        net.channel.factor_a = 4;
        assert!(!has_valid_factor(&net, 6));
        net.channel.factor_a = 2;
        assert!(has_valid_factor(&net, 6));
    }
}

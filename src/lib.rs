//! Combinet: a bounded interaction-combinator runtime with an indexed net
//! enumerator and a universal-search driver.
//!
//! This crate implements:
//! - a fixed-capacity net of the three Lafont agents δ, γ, ε, with
//!   bidirectional port wires and a single sever-first `connect` primitive;
//! - bounded reduction driven by a FIFO of candidate active pairs under a
//!   gas budget, with full scans guaranteeing completeness;
//! - a total, deterministic enumerator from indices to candidate nets;
//! - a search driver (sequential and rayon-parallel) that hunts for a net
//!   whose normal form encodes a factorization of a given number through a
//!   side channel;
//! - read-only views with a Graphviz DOT renderer.
//!
//! The factorization predicate is a demonstration stand-in: it reads the
//! surviving δ/γ indices off the terminal graph rather than decoding a
//! combinator-level number representation.
//!
//! # References
//!
//! - Lafont, Y. "Interaction Combinators" (1997), Information and
//!   Computation 137(1): the δ/γ/ε system and its rewrite rules.
//! - Lafont, Y. "Interaction Nets" (1990), POPL: principal ports and
//!   active pairs.
//!
//! # Example
//!
//! ```
//! use combinet::prelude::*;
//!
//! let mut net = Net::new(16, 100);
//! let d = net.new_node(Agent::Delta).unwrap();
//! let g = net.new_node(Agent::Delta).unwrap();
//! net.connect(d, PRINCIPAL, g, PRINCIPAL);
//! assert_eq!(reduce(&mut net), Outcome::Finished);
//! assert!(!net.node(d).unwrap().active);
//! ```

pub mod arena;
pub mod enumerate;
pub mod export;
pub mod net;
pub mod reduce;
pub mod search;

pub use arena::{Agent, Link, Node, NodeId, AUX_1, AUX_2, PRINCIPAL};
pub use enumerate::{build_net, BuildError, Enumerator};
pub use export::{render_dot, snapshot, summarize, NetSummary, NodeView, PortLink};
pub use net::{FactorChannel, Net};
pub use reduce::{has_valid_factor, reduce, Outcome};
pub use search::{search_factor, search_factor_parallel, SearchConfig, Solution};

/// Prelude for convenient usage.
pub mod prelude {
    pub use crate::arena::{Agent, Link, Node, NodeId, AUX_1, AUX_2, PRINCIPAL};
    pub use crate::enumerate::{build_net, BuildError, Enumerator};
    pub use crate::export::{render_dot, snapshot, summarize, NetSummary, NodeView, PortLink};
    pub use crate::net::{FactorChannel, Net};
    pub use crate::reduce::{has_valid_factor, reduce, Outcome};
    pub use crate::search::{search_factor, search_factor_parallel, SearchConfig, Solution};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    /// A built candidate reduces to the same terminal state however often
    /// it is rebuilt and reduced.
    #[test]
    fn build_reduce_roundtrip_is_stable() {
        let mut net = Net::new(16, 1000);
        net.channel.input = 6;
        build_net(42, &mut net).unwrap();
        let first_outcome = reduce(&mut net);
        let first_gas = net.gas_used();
        let first_live: Vec<NodeId> = net.live_nodes().map(|(id, _)| id).collect();

        build_net(42, &mut net).unwrap();
        let second_outcome = reduce(&mut net);
        assert_eq!(first_outcome, second_outcome);
        assert_eq!(first_gas, net.gas_used());
        let second_live: Vec<NodeId> = net.live_nodes().map(|(id, _)| id).collect();
        assert_eq!(first_live, second_live);
    }

    /// The enumerator, engine and predicate compose into a working driver.
    #[test]
    fn mini_search_over_a_window() {
        let config = SearchConfig {
            index_ceiling: 200,
            ..SearchConfig::default()
        };
        // No solving net for 6 exists this early; the driver must sweep the
        // whole window and report nothing.
        assert_eq!(search_factor(6, &config, None), None);
    }

    /// Reduced nets stay renderable.
    #[test]
    fn dot_renders_after_reduction() {
        let mut net = Net::new(16, 1000);
        build_net(7, &mut net).unwrap();
        reduce(&mut net);
        let dot = render_dot(&net);
        assert!(dot.starts_with("digraph combinet {"));
        for (id, _) in net.live_nodes() {
            assert!(dot.contains(&format!("node{} [", id.as_u32())));
        }
    }
}

//! Read-only views of a net and their renderings.
//!
//! The views carry exactly what an external visualizer needs: node id,
//! agent, and the linked ports with their peers. `render_dot` turns a net
//! into a Graphviz digraph; `summarize` produces a serializable run summary
//! for programmatic consumers.

use crate::arena::{Agent, NodeId, PORT_COUNT, PRINCIPAL};
use crate::net::Net;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One linked port of a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortLink {
    /// Port on the viewed node, in `0..3`.
    pub port: u8,
    /// Peer node.
    pub peer: NodeId,
    /// Port on the peer, in `0..3`.
    pub peer_port: u8,
}

/// Snapshot of one live node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    /// The node's id within its net.
    pub id: NodeId,
    /// The node's agent.
    pub agent: Agent,
    /// Linked ports only, in port order.
    pub links: Vec<PortLink>,
}

/// Snapshots every live node in ascending index order.
pub fn snapshot(net: &Net) -> Vec<NodeView> {
    net.live_nodes()
        .map(|(id, node)| NodeView {
            id,
            agent: node.agent,
            links: (0..PORT_COUNT as u8)
                .filter_map(|port| {
                    node.ports[usize::from(port)].map(|link| PortLink {
                        port,
                        peer: link.node,
                        peer_port: link.port,
                    })
                })
                .collect(),
        })
        .collect()
}

fn agent_color(agent: Agent) -> &'static str {
    match agent {
        Agent::Delta => "red",
        Agent::Gamma => "blue",
        Agent::Epsilon => "green",
    }
}

fn port_suffix(port: u8) -> &'static str {
    match port {
        0 => "p",
        1 => "a1",
        _ => "a2",
    }
}

/// Renders the live part of the net as a Graphviz digraph.
///
/// Each live node is a colored circle (δ red, γ blue, ε green) with three
/// port stubs; each wire between live nodes is drawn once, black when it
/// runs through a principal port and gray otherwise.
pub fn render_dot(net: &Net) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph combinet {{");
    let _ = writeln!(out, "  rankdir=LR;");

    for (id, node) in net.live_nodes() {
        let _ = writeln!(
            out,
            "  node{id} [label=\"{agent}{id}\", shape=circle, color={color}];",
            id = id.as_u32(),
            agent = node.agent,
            color = agent_color(node.agent),
        );
        for port in 0..PORT_COUNT as u8 {
            let _ = writeln!(
                out,
                "  node{id}_{suffix} [label=\"{label}\", shape=none, width=0, height=0];",
                id = id.as_u32(),
                suffix = port_suffix(port),
                label = match port {
                    0 => "P",
                    1 => "A1",
                    _ => "A2",
                },
            );
            let _ = writeln!(
                out,
                "  node{id} -> node{id}_{suffix} [arrowhead=none];",
                id = id.as_u32(),
                suffix = port_suffix(port),
            );
        }
    }

    for (id, node) in net.live_nodes() {
        for port in 0..PORT_COUNT as u8 {
            let Some(link) = node.ports[usize::from(port)] else {
                continue;
            };
            // Draw each wire once, from the smaller endpoint, and only when
            // the peer is still live.
            if link.node <= id {
                continue;
            }
            let Some(peer) = net.node(link.node) else {
                continue;
            };
            if !peer.active {
                continue;
            }
            let color = if port == PRINCIPAL || link.port == PRINCIPAL {
                "black:black"
            } else {
                "gray:gray"
            };
            let _ = writeln!(
                out,
                "  node{a}_{ap} -> node{b}_{bp} [dir=both, color=\"{color}\"];",
                a = id.as_u32(),
                ap = port_suffix(port),
                b = link.node.as_u32(),
                bp = port_suffix(link.port),
            );
        }
    }

    let _ = writeln!(out, "}}");
    out
}

/// Serializable summary of a net after a reduction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSummary {
    /// Allocated nodes, live plus retired.
    pub used_nodes: usize,
    /// Nodes still live.
    pub live_nodes: usize,
    /// Rewrites performed by the last reduction.
    pub gas_used: usize,
    /// Rewrite budget.
    pub gas_limit: usize,
    /// The number being factored.
    pub input: u64,
    /// Recorded factor, meaningful when `found`.
    pub factor_a: u64,
    /// Recorded factor, meaningful when `found`.
    pub factor_b: u64,
    /// Whether the side channel recorded a factorization.
    pub found: bool,
}

/// Summarizes the net's storage, gas, and side-channel state.
pub fn summarize(net: &Net) -> NetSummary {
    NetSummary {
        used_nodes: net.used_nodes(),
        live_nodes: net.live_count(),
        gas_used: net.gas_used(),
        gas_limit: net.gas_limit(),
        input: net.channel.input,
        factor_a: net.channel.factor_a,
        factor_b: net.channel.factor_b,
        found: net.channel.found,
    }
}

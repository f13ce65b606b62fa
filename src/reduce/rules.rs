//! The four local rewrite schemas.
//!
//! Every rule follows the same discipline: snapshot the auxiliary peers of
//! the pair, sever all six links around it, rewire through `Net::connect`
//! (which re-queues any freshly formed active pair), then retire the
//! consumed nodes. Severing before rewiring means a rule never observes a
//! half-updated wire, even when the pair's auxiliaries loop back onto the
//! pair itself.

use crate::arena::{Agent, Link, NodeId, AUX_1, AUX_2, PRINCIPAL};
use crate::net::Net;

/// Applies the rewrite selected by the pair's agent types.
///
/// Returns `true` when a rewrite was performed. The only failing case is a
/// δ-γ duplication that cannot allocate its two replacement nodes; the pair
/// is then left untouched and the caller counts no gas.
pub(crate) fn apply_rewrite(net: &mut Net, a: NodeId, b: NodeId) -> bool {
    let used = net.used_nodes();
    if a.index() >= used || b.index() >= used {
        return false;
    }
    let ta = net.node(a).map(|n| n.agent);
    let tb = net.node(b).map(|n| n.agent);
    match (ta, tb) {
        (Some(Agent::Epsilon), Some(_)) => {
            erase(net, a);
            true
        }
        (Some(_), Some(Agent::Epsilon)) => {
            erase(net, b);
            true
        }
        (Some(Agent::Delta), Some(Agent::Delta)) => {
            annihilate_cross(net, a, b);
            true
        }
        (Some(Agent::Gamma), Some(Agent::Gamma)) => {
            annihilate_straight(net, a, b);
            true
        }
        (Some(Agent::Delta), Some(Agent::Gamma)) => commute(net, a, b),
        (Some(Agent::Gamma), Some(Agent::Delta)) => commute(net, b, a),
        _ => false,
    }
}

/// Snapshot of a pair's four auxiliary peers, read before any severing.
struct AuxPeers {
    a1: Option<Link>,
    a2: Option<Link>,
    b1: Option<Link>,
    b2: Option<Link>,
}

fn aux_peers(net: &Net, a: NodeId, b: NodeId) -> AuxPeers {
    AuxPeers {
        a1: net.port(a, AUX_1),
        a2: net.port(a, AUX_2),
        b1: net.port(b, AUX_1),
        b2: net.port(b, AUX_2),
    }
}

/// Severs the six links around the pair: the shared principal wire and each
/// auxiliary wire recorded in the snapshot (both sides of each).
fn sever_around(net: &mut Net, a: NodeId, b: NodeId, peers: &AuxPeers) {
    net.clear_port(a, PRINCIPAL);
    net.clear_port(b, PRINCIPAL);
    for (owner, port, peer) in [
        (a, AUX_1, peers.a1),
        (a, AUX_2, peers.a2),
        (b, AUX_1, peers.b1),
        (b, AUX_2, peers.b2),
    ] {
        if let Some(link) = peer {
            net.clear_port(link.node, link.port);
            net.clear_port(owner, port);
        }
    }
}

fn connect_peers(net: &mut Net, x: Option<Link>, y: Option<Link>) {
    if let (Some(x), Some(y)) = (x, y) {
        net.connect(x.node, x.port, y.node, y.port);
    }
}

/// δ-δ: the duplicators cancel and their auxiliary wires cross over
/// (first aux of one to second aux of the other).
fn annihilate_cross(net: &mut Net, a: NodeId, b: NodeId) {
    let peers = aux_peers(net, a, b);
    sever_around(net, a, b, &peers);
    connect_peers(net, peers.a1, peers.b2);
    connect_peers(net, peers.a2, peers.b1);
    net.retire(a);
    net.retire(b);
}

/// γ-γ: the constructors cancel and their auxiliary wires pass straight
/// through (first to first, second to second).
fn annihilate_straight(net: &mut Net, a: NodeId, b: NodeId) {
    let peers = aux_peers(net, a, b);
    sever_around(net, a, b, &peers);
    connect_peers(net, peers.a1, peers.b1);
    connect_peers(net, peers.a2, peers.b2);
    net.retire(a);
    net.retire(b);
}

/// δ-γ: duplication. A fresh δ-γ pair replaces the originals, principal to
/// principal, and picks up the four auxiliary wires:
/// δ′₁ ↔ old δ₁, δ′₂ ↔ old γ₁, γ′₁ ↔ old δ₂, γ′₂ ↔ old γ₂.
///
/// The replacements are allocated before anything is severed; if either
/// allocation fails the rewrite aborts with no visible link change (the
/// partially allocated node, if any, is retired in place).
fn commute(net: &mut Net, delta: NodeId, gamma: NodeId) -> bool {
    let peers = aux_peers(net, delta, gamma);
    let new_delta = net.new_node(Agent::Delta);
    let new_gamma = net.new_node(Agent::Gamma);
    let (new_delta, new_gamma) = match (new_delta, new_gamma) {
        (Some(d), Some(g)) => (d, g),
        (d, g) => {
            // Retire whichever replacement did get a slot.
            if let Some(d) = d {
                net.retire(d);
            }
            if let Some(g) = g {
                net.retire(g);
            }
            return false;
        }
    };
    sever_around(net, delta, gamma, &peers);
    net.connect(new_delta, PRINCIPAL, new_gamma, PRINCIPAL);
    if let Some(link) = peers.a1 {
        net.connect(new_delta, AUX_1, link.node, link.port);
    }
    if let Some(link) = peers.b1 {
        net.connect(new_delta, AUX_2, link.node, link.port);
    }
    if let Some(link) = peers.a2 {
        net.connect(new_gamma, AUX_1, link.node, link.port);
    }
    if let Some(link) = peers.b2 {
        net.connect(new_gamma, AUX_2, link.node, link.port);
    }
    net.retire(delta);
    net.retire(gamma);
    true
}

/// ε against anything: the eraser is consumed and nothing else moves. The
/// peer keeps its (now dead) principal wire and its auxiliaries; scans skip
/// retired peers, so the wire is inert. For ε-ε the first node of the pair
/// is the one erased.
fn erase(net: &mut Net, epsilon: NodeId) {
    net.retire(epsilon);
}

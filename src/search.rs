//! The universal search driver.
//!
//! Loops enumerator indices, reduces each candidate net, and asks the
//! factorization predicate whether the terminal graph solves the input.
//! Ships a sequential loop and a rayon fan-out over disjoint index blocks;
//! both return the smallest solving index they observed.

use crate::enumerate::build_net;
use crate::net::Net;
use crate::reduce::{has_valid_factor, reduce};
use rayon::prelude::*;

/// Indices handed to one parallel worker at a time.
const PARALLEL_BLOCK: usize = 1000;

/// Progress observer: `(current_index, found_solution)`.
///
/// Called with `found = false` at coarse intervals and exactly once with
/// `found = true` when a solution is detected. Workers in the parallel
/// driver call it concurrently and out of index order; synchronization
/// beyond `Sync` is the caller's concern.
pub type Progress<'a> = &'a (dyn Fn(usize, bool) + Sync);

/// Bounds and cadence for one search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Node capacity of each candidate net.
    pub max_nodes: usize,
    /// Rewrite budget per reduction.
    pub gas_limit: usize,
    /// Exclusive upper bound on candidate indices.
    pub index_ceiling: usize,
    /// Progress callback cadence, in indices.
    pub progress_interval: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_nodes: 100,
            gas_limit: 100_000,
            index_ceiling: 1_000_000,
            progress_interval: 1000,
        }
    }
}

/// A solving candidate: its enumerator index and the recorded factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// Enumerator index of the solving net.
    pub index: usize,
    /// Recorded factor from the terminal δ.
    pub factor_a: u64,
    /// Recorded factor from the terminal γ.
    pub factor_b: u64,
}

/// Builds, reduces and tests the candidate at `index` in the caller's net.
///
/// Indices whose ring does not fit the capacity are skipped (the enumerator
/// stays total for every index the capacity admits; larger rings simply
/// cannot solve under this capacity).
fn check_index(net: &mut Net, index: usize, n: u64) -> Option<Solution> {
    if build_net(index, net).is_err() {
        return None;
    }
    reduce(net);
    if has_valid_factor(net, n) {
        Some(Solution {
            index,
            factor_a: net.channel.factor_a,
            factor_b: net.channel.factor_b,
        })
    } else {
        None
    }
}

/// Sequential search for a net that factors `n`.
///
/// Returns the first solving index below the ceiling, or `None`. Numbers
/// `n <= 1` are never searched.
pub fn search_factor(n: u64, config: &SearchConfig, progress: Option<Progress<'_>>) -> Option<Solution> {
    if n <= 1 {
        return None;
    }
    let interval = config.progress_interval.max(1);
    let mut net = Net::new(config.max_nodes, config.gas_limit);
    net.channel.input = n;
    for index in 0..config.index_ceiling {
        if let Some(solution) = check_index(&mut net, index, n) {
            if let Some(report) = progress {
                report(solution.index, true);
            }
            return Some(solution);
        }
        if index > 0 && index % interval == 0 {
            if let Some(report) = progress {
                report(index, false);
            }
        }
    }
    None
}

/// Parallel search over disjoint index blocks.
///
/// Each worker owns its net, queue and side channel; nothing is shared but
/// the completion signal rayon maintains for `find_map_first`, which also
/// gives the required semantics: the returned index is the minimum among
/// all workers that found one, and blocks past a known solution are pruned
/// rather than searched.
pub fn search_factor_parallel(
    n: u64,
    config: &SearchConfig,
    progress: Option<Progress<'_>>,
) -> Option<Solution> {
    if n <= 1 {
        return None;
    }
    let ceiling = config.index_ceiling;
    let blocks = ceiling.div_ceil(PARALLEL_BLOCK);
    let solution = (0..blocks).into_par_iter().find_map_first(|block| {
        let start = block * PARALLEL_BLOCK;
        let end = ((block + 1) * PARALLEL_BLOCK).min(ceiling);
        let mut net = Net::new(config.max_nodes, config.gas_limit);
        net.channel.input = n;
        for index in start..end {
            if let Some(solution) = check_index(&mut net, index, n) {
                return Some(solution);
            }
        }
        if let Some(report) = progress {
            report(end - 1, false);
        }
        None
    });
    if let (Some(report), Some(solution)) = (progress, solution.as_ref()) {
        report(solution.index, true);
    }
    solution
}

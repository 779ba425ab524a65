//! Greedy nearest-neighbour reconstruction
//!
//! Deterministic baseline: starting at the anchor, always step to the
//! unvisited read with the smallest outgoing shift. Only neighbours within
//! `max_offset` are considered first; when none is left the nearest unvisited
//! read of any shift is taken so the walk never dead-ends.

use crate::overlap::CostMatrix;
use crate::types::ANCHOR;
use serde::{Deserialize, Serialize};

/// Largest shift kept in a read's neighbour table
pub const DEFAULT_MAX_OFFSET: i32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedyParams {
    pub max_offset: i32,
    /// Stop once the reconstructed sequence reaches this length
    pub target_length: Option<usize>,
}

impl Default for GreedyParams {
    fn default() -> Self {
        Self {
            max_offset: DEFAULT_MAX_OFFSET,
            target_length: None,
        }
    }
}

pub fn greedy_path(costs: &CostMatrix, read_len: usize, params: &GreedyParams) -> Vec<usize> {
    let n = costs.rows();
    if n == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut path = vec![ANCHOR];
    visited[ANCHOR] = true;
    let mut length = read_len;

    while path.len() < n && params.target_length.map_or(true, |target| length < target) {
        let current = path[path.len() - 1];
        let row = costs.row(current);

        let nearest = |limit: Option<i32>| {
            (0..n)
                .filter(|&j| !visited[j] && row[j] > 0 && limit.map_or(true, |l| row[j] <= l))
                .min_by_key(|&j| (row[j], j))
        };

        let Some(next) = nearest(Some(params.max_offset)).or_else(|| nearest(None)) else {
            break;
        };

        log::trace!("Greedy step {} -> {} (shift {})", current, next, row[next]);
        visited[next] = true;
        length += row[next] as usize;
        path.push(next);
    }

    log::debug!("Greedy walk visited {} of {} reads, length {}", path.len(), n, length);
    path
}

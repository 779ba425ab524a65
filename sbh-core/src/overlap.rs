//! Suffix-prefix overlap model for fixed-length reads.

use crate::matrix::Matrix;
use crate::types::ReadSet;
use rayon::prelude::*;

/// Square matrix of overlap shifts, `D[i][j]` for read `i` followed by read `j`
pub type CostMatrix = Matrix<i32>;

/// Diagonal marker: a read never follows itself
pub const SELF_OVERLAP: i32 = -1;

/// Shift of a one-base step, the strongest possible overlap
pub const PERFECT_SHIFT: i32 = 1;

/// Smallest shift `s` in `1..len(a)` at which the last `len(a) - s` bases of
/// `a` equal the first `len(a) - s` bases of `b`.
///
/// Falls back to `len(a) - 1` when no shift matches, treating the reads as
/// adjacent with minimal shared information.
pub fn overlap_shift(a: &[u8], b: &[u8]) -> usize {
    let len = a.len();
    (1..len)
        .find(|&s| b.get(..len - s) == Some(&a[s..]))
        .unwrap_or(len.saturating_sub(1))
}

/// Pairwise overlap shifts for every ordered pair of reads, `-1` on the diagonal
pub fn build_cost_matrix(reads: &ReadSet) -> CostMatrix {
    let n = reads.len();
    let bytes: Vec<&[u8]> = reads.iter().map(str::as_bytes).collect();

    let data: Vec<i32> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let bytes = &bytes;
            (0..n).map(move |j| {
                if i == j {
                    SELF_OVERLAP
                } else {
                    overlap_shift(bytes[i], bytes[j]) as i32
                }
            })
        })
        .collect();

    let costs = Matrix::from_square_data(n, data);
    log::debug!(
        "Built {}x{} overlap cost matrix (k = {}), {} one-base overlaps",
        n,
        n,
        reads.read_len(),
        perfect_overlap_count(&costs)
    );

    costs
}

/// Number of off-diagonal entries holding a one-base shift
pub fn perfect_overlap_count(costs: &CostMatrix) -> usize {
    costs
        .indexed_iter()
        .filter(|&(i, j, &d)| i != j && d == PERFECT_SHIFT)
        .count()
}

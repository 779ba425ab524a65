//! Merging ordered reads back into a sequence, and measuring how far the
//! result is from the original.

use crate::overlap::CostMatrix;
use crate::types::ReadSet;
use serde::{Deserialize, Serialize};

/// Sequence assembled from a read ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedSequence {
    pub sequence: String,
    /// The contribution of each read, in path order
    pub fragments: Vec<String>,
}

/// Concatenate reads along `path`: the first read in full, then for every
/// consecutive pair `(a, b)` the last `D[a][b]` bases of `b`.
///
/// Indices outside the read set contribute nothing, nor do the pairs they
/// take part in.
pub fn merge_path(path: &[usize], reads: &ReadSet, costs: &CostMatrix) -> MergedSequence {
    let mut fragments = Vec::with_capacity(path.len());

    if let Some(read) = path.first().and_then(|&first| reads.get(first)) {
        fragments.push(read.to_string());
    }

    for pair in path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (Some(read), Some(&shift)) = (reads.get(b), costs.get(a, b)) else {
            continue;
        };
        let shift = usize::try_from(shift).unwrap_or(0).min(read.len());
        fragments.push(read[read.len() - shift..].to_string());
    }

    MergedSequence {
        sequence: fragments.concat(),
        fragments,
    }
}

/// Edit distance with unit costs for substitution, insertion and deletion
pub fn levenshtein(a: &[u8], b: &[u8]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Edit distance normalised by the original length
pub fn error_rate(result: &str, original: &str) -> f64 {
    if original.is_empty() {
        return if result.is_empty() { 0.0 } else { 1.0 };
    }
    levenshtein(result.as_bytes(), original.as_bytes()) as f64 / original.len() as f64
}

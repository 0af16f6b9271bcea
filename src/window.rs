use crate::types::{round_decimals, Statistic, VariantRecord, WindowParams};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Attach the windowed linkage statistic to every candidate record.
///
/// Windows run over candidate-list indices (filtered-list adjacency, not
/// genomic distance). Interior candidates get the 2W+1 neighbors centered
/// on them; candidates near a boundary get a fixed W-wide one-sided window
/// (forward-only at the left edge, backward-only at the right). Edge windows
/// keep their full width rather than shrinking as the list runs out, at the
/// cost of weighting the edge region's own candidates more heavily.
/// TODO: compare the fixed-width edge policy against a shrinking window once
/// a reference dataset exists to calibrate on.
///
/// If the list is shorter than W, W is reduced to N-1 for this run. A
/// neighbor position missing from `records` is skipped and the denominator
/// shrunk to the neighbors actually found; a window that finds none leaves
/// its center unannotated.
///
/// All signals are computed before any record is touched. Returns the
/// number of records annotated.
pub fn attach_linkage_signal(
    records: &mut BTreeMap<u64, VariantRecord>,
    candidates: &[u64],
    params: &WindowParams,
) -> usize {
    let n = candidates.len();
    if n == 0 {
        return 0;
    }
    let w = if n < params.neighbors {
        n - 1
    } else {
        params.neighbors
    };

    let signals: Vec<(u64, Option<f64>)> = candidates
        .par_iter()
        .enumerate()
        .map(|(i, &pos)| {
            let (lo, hi) = window_bounds(i, n, w);
            let mut sum = 0.0;
            let mut found = 0usize;
            for &neighbor in &candidates[lo..=hi] {
                if let Some(record) = records.get(&neighbor) {
                    let ratio = record.dominant_ratio();
                    sum += match params.statistic {
                        Statistic::Mean => ratio,
                        Statistic::Rms => ratio * ratio,
                    };
                    found += 1;
                }
            }
            if found == 0 {
                return (pos, None);
            }
            let mean = sum / found as f64;
            let value = match params.statistic {
                Statistic::Mean => mean,
                Statistic::Rms => mean.sqrt(),
            };
            (pos, Some(round_decimals(value, 7)))
        })
        .collect();

    let mut annotated = 0;
    for (pos, signal) in signals {
        if let Some(value) = signal {
            if let Some(record) = records.get_mut(&pos) {
                record.linkage_signal = Some(value);
                annotated += 1;
            }
        }
    }
    annotated
}

/// Inclusive index bounds of candidate `i`'s window in a list of length `n`
/// with effective half-width `w`.
///
/// The fixed-size edge windows can overrun the list when w <= n < 2w+1;
/// such a window is clamped to the list and its actual length becomes the
/// denominator.
fn window_bounds(i: usize, n: usize, w: usize) -> (usize, usize) {
    if i >= w && i + w <= n - 1 {
        // interior: 2w+1 candidates centered on i
        (i - w, i + w)
    } else if i < w && i + w <= n {
        // left edge: forward-only window of w candidates
        (i, i + w - 1)
    } else if i + 1 >= w {
        // right edge: backward-only window of w candidates
        (i + 1 - w, i)
    } else {
        (0, (i + w - 1).min(n - 1))
    }
}

use std::collections::HashSet;

/// Intersect the mutant candidate list with the wildtype's.
///
/// A mutant-only signal cannot triangulate linkage; a marker counts only
/// where the same locus segregates informatively in both backgrounds.
/// Mutant-list order is preserved. Pure and idempotent.
pub fn intersect_markers(mutant: &[u64], wildtype: &[u64]) -> Vec<u64> {
    let background: HashSet<u64> = wildtype.iter().copied().collect();
    mutant
        .iter()
        .copied()
        .filter(|pos| background.contains(pos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_shared_positions_in_mutant_order() {
        let markers = intersect_markers(&[50, 75, 90], &[75, 90, 110]);
        assert_eq!(markers, vec![75, 90]);
    }

    #[test]
    fn intersection_is_idempotent() {
        let wildtype = [75, 90, 110];
        let once = intersect_markers(&[50, 75, 90], &wildtype);
        let twice = intersect_markers(&once, &wildtype);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        assert!(intersect_markers(&[], &[75]).is_empty());
        assert!(intersect_markers(&[75], &[]).is_empty());
    }
}

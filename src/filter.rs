use crate::types::{FilterParams, FilterStats, SampleRole, VariantRecord};
use std::collections::{BTreeMap, BTreeSet};

/// Positions within this distance of an indel (closed interval, either
/// side) are scrubbed from candidacy.
pub const INDEL_PROXIMITY_BP: u64 = 10;

/// Which exclusion rules apply to a sample.
///
/// Coverage and zygosity are background-sample rules: at a linked locus the
/// mutant's allele ratio is expected to sit outside the heterozygous band,
/// so only the wildtype enforces them by default. Zero-depth and
/// indel-proximity exclusion apply to every role.
#[derive(Debug, Clone, Copy)]
pub struct FilterPolicy {
    pub enforce_coverage: bool,
    pub enforce_zygosity: bool,
}

impl FilterPolicy {
    pub fn for_role(role: SampleRole) -> Self {
        match role {
            SampleRole::Wildtype => Self {
                enforce_coverage: true,
                enforce_zygosity: true,
            },
            SampleRole::Mutant => Self {
                enforce_coverage: false,
                enforce_zygosity: false,
            },
        }
    }
}

/// Result of candidate selection over one sample's record map.
#[derive(Debug)]
pub struct FilterOutcome {
    /// Surviving candidate positions, ascending.
    pub candidates: Vec<u64>,
    /// Indel-proximity exclusions. Callers may delete these from their
    /// working map; the full dump has already been written by then.
    pub excluded: BTreeSet<u64>,
    pub stats: FilterStats,
}

/// Collect every position scrubbed by an indel neighborhood.
///
/// Runs over the entire map, not just coverage-passing records: an indel
/// that would itself fail coverage still scrubs its neighbors. The indel
/// position itself is excluded only when `remove_indels` is set.
pub fn indel_exclusions(
    records: &BTreeMap<u64, VariantRecord>,
    remove_indels: bool,
) -> BTreeSet<u64> {
    let mut excluded = BTreeSet::new();
    for (&pos, record) in records {
        if !record.is_indel {
            continue;
        }
        let start = pos.saturating_sub(INDEL_PROXIMITY_BP);
        let end = pos + INDEL_PROXIMITY_BP;
        for &neighbor in records.range(start..=end).map(|(p, _)| p) {
            if neighbor != pos {
                excluded.insert(neighbor);
            }
        }
        if remove_indels {
            excluded.insert(pos);
        }
    }
    excluded
}

/// Select mapping candidates from one sample's record map.
///
/// The exclusion set is computed up front as a pure function, then a single
/// pass in ascending-position order applies the role's rules. No collection
/// is mutated while being iterated.
pub fn select_candidates(
    records: &BTreeMap<u64, VariantRecord>,
    params: &FilterParams,
    policy: FilterPolicy,
) -> FilterOutcome {
    let excluded = indel_exclusions(records, params.remove_indels);

    let low_zygo = f64::from(params.zygosity) / 100.0;
    let high_zygo = 1.0 - low_zygo;

    let mut stats = FilterStats::default();
    let mut candidates = Vec::new();

    for (&pos, record) in records {
        if record.total_depth() == 0 {
            stats.zero_depth += 1;
            continue;
        }
        if excluded.contains(&pos) {
            stats.indel_proximity += 1;
            continue;
        }
        if record.is_indel {
            // Mapping markers are substitutions. Without `remove_indels`
            // the indel stays in the map (and the dump); it is just never
            // a candidate.
            stats.indel_sites += 1;
            continue;
        }
        if policy.enforce_coverage && record.total_depth() < params.coverage {
            stats.low_coverage += 1;
            continue;
        }
        if policy.enforce_zygosity {
            let ratio = record.ref_ratio();
            if ratio < low_zygo || ratio > high_zygo {
                stats.out_of_band += 1;
                continue;
            }
        }
        candidates.push(pos);
    }

    stats.candidates = candidates.len() as u64;
    FilterOutcome {
        candidates,
        excluded,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(pos: u64, fref: u32, rref: u32, falt: u32, ralt: u32) -> VariantRecord {
        VariantRecord {
            chrom: "chr1".to_string(),
            pos,
            ref_allele: "A".to_string(),
            alt_allele: "T".to_string(),
            qual: 60,
            raw_depth: fref + rref + falt + ralt,
            forward_ref: fref,
            reverse_ref: rref,
            forward_alt: falt,
            reverse_alt: ralt,
            is_indel: false,
            linkage_signal: None,
        }
    }

    fn make_indel(pos: u64) -> VariantRecord {
        let mut record = make_record(pos, 10, 10, 10, 10);
        record.is_indel = true;
        record
    }

    fn map_of(records: Vec<VariantRecord>) -> BTreeMap<u64, VariantRecord> {
        records.into_iter().map(|r| (r.pos, r)).collect()
    }

    fn params(coverage: u32, zygosity: u8, remove_indels: bool) -> FilterParams {
        FilterParams {
            coverage,
            zygosity,
            remove_indels,
        }
    }

    #[test]
    fn wildtype_zygosity_band_scenario() {
        // refRatio 0.5 at depth 30 survives; refRatio ~0.02 is excluded.
        let records = map_of(vec![
            make_record(100, 8, 7, 8, 7),
            make_record(105, 1, 0, 25, 24),
        ]);
        let outcome = select_candidates(
            &records,
            &params(25, 20, false),
            FilterPolicy::for_role(SampleRole::Wildtype),
        );
        assert_eq!(outcome.candidates, vec![100]);
        assert_eq!(outcome.stats.out_of_band, 1);
        assert_eq!(outcome.stats.candidates, 1);
    }

    #[test]
    fn wildtype_coverage_threshold() {
        let records = map_of(vec![
            make_record(100, 8, 7, 8, 7),  // depth 30
            make_record(110, 3, 3, 3, 3),  // depth 12
        ]);
        let outcome = select_candidates(
            &records,
            &params(25, 20, false),
            FilterPolicy::for_role(SampleRole::Wildtype),
        );
        assert_eq!(outcome.candidates, vec![100]);
        assert_eq!(outcome.stats.low_coverage, 1);
    }

    #[test]
    fn mutant_skips_coverage_and_zygosity() {
        // Heavily skewed, shallow call: a mutant candidate, never a
        // wildtype one.
        let records = map_of(vec![make_record(100, 1, 0, 6, 5)]);
        let mutant = select_candidates(
            &records,
            &params(25, 20, false),
            FilterPolicy::for_role(SampleRole::Mutant),
        );
        assert_eq!(mutant.candidates, vec![100]);

        let wildtype = select_candidates(
            &records,
            &params(25, 20, false),
            FilterPolicy::for_role(SampleRole::Wildtype),
        );
        assert!(wildtype.candidates.is_empty());
    }

    #[test]
    fn zero_depth_never_a_candidate_for_any_role() {
        let records = map_of(vec![make_record(100, 0, 0, 0, 0)]);
        for role in [SampleRole::Wildtype, SampleRole::Mutant] {
            let outcome =
                select_candidates(&records, &params(0, 0, false), FilterPolicy::for_role(role));
            assert!(outcome.candidates.is_empty());
            assert_eq!(outcome.stats.zero_depth, 1);
        }
    }

    #[test]
    fn indel_scrubs_closed_neighborhood_only() {
        let records = map_of(vec![
            make_indel(200),
            make_record(189, 8, 7, 8, 7), // outside [190, 210]
            make_record(190, 8, 7, 8, 7), // boundary, excluded
            make_record(205, 8, 7, 8, 7), // interior, excluded
            make_record(210, 8, 7, 8, 7), // boundary, excluded
            make_record(211, 8, 7, 8, 7), // outside
        ]);
        let excluded = indel_exclusions(&records, false);
        assert_eq!(
            excluded.iter().copied().collect::<Vec<_>>(),
            vec![190, 205, 210]
        );
    }

    #[test]
    fn indel_itself_excluded_only_when_requested() {
        let records = map_of(vec![make_indel(200), make_record(205, 8, 7, 8, 7)]);

        let kept = indel_exclusions(&records, false);
        assert!(!kept.contains(&200));
        assert!(kept.contains(&205));

        let removed = indel_exclusions(&records, true);
        assert!(removed.contains(&200));
        assert!(removed.contains(&205));
    }

    #[test]
    fn low_coverage_indel_still_scrubs_neighbors() {
        let mut indel = make_indel(200);
        indel.forward_ref = 1;
        indel.reverse_ref = 0;
        indel.forward_alt = 1;
        indel.reverse_alt = 0;
        let records = map_of(vec![indel, make_record(205, 8, 7, 8, 7)]);
        let outcome = select_candidates(
            &records,
            &params(25, 20, false),
            FilterPolicy::for_role(SampleRole::Wildtype),
        );
        assert!(outcome.candidates.is_empty());
        assert!(outcome.excluded.contains(&205));
    }

    #[test]
    fn proximity_excluded_record_stays_in_map() {
        // The candidate list loses the neighbor; the map (and with it the
        // full dump) keeps both positions until the caller deletes them.
        let records = map_of(vec![make_indel(200), make_record(205, 8, 7, 8, 7)]);
        let outcome = select_candidates(
            &records,
            &params(25, 20, false),
            FilterPolicy::for_role(SampleRole::Mutant),
        );
        assert!(outcome.candidates.is_empty());
        assert!(records.contains_key(&205));
        assert!(records.contains_key(&200));
        // Without `remove_indels` the indel is not in the exclusion set,
        // but an indel call is still never a mapping candidate.
        assert!(!outcome.excluded.contains(&200));
        assert_eq!(outcome.stats.indel_sites, 1);
        assert_eq!(outcome.stats.indel_proximity, 1);
    }
}

/// One genomic position's call data, parsed from a single input line.
///
/// Read support is strand-resolved; the depth used for filtering is the sum
/// of the four strand counts, not the caller-reported `raw_depth` (the two
/// can legitimately disagree and the derived sum is authoritative).
#[derive(Debug, Clone)]
pub struct VariantRecord {
    pub chrom: String,
    /// 1-based coordinate; unique key within one sample's collection.
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub qual: u32,
    /// Depth as reported in the DP info field. Reporting only.
    pub raw_depth: u32,
    pub forward_ref: u32,
    pub reverse_ref: u32,
    pub forward_alt: u32,
    pub reverse_alt: u32,
    pub is_indel: bool,
    /// Windowed linkage statistic, attached only to mapping candidates.
    pub linkage_signal: Option<f64>,
}

impl VariantRecord {
    pub fn total_ref(&self) -> u32 {
        self.forward_ref + self.reverse_ref
    }

    pub fn total_alt(&self) -> u32 {
        self.forward_alt + self.reverse_alt
    }

    /// Derived depth; authoritative for coverage filtering.
    pub fn total_depth(&self) -> u32 {
        self.total_ref() + self.total_alt()
    }

    /// Fraction of reads supporting the reference allele. 0.0 at zero depth.
    pub fn ref_ratio(&self) -> f64 {
        let depth = self.total_depth();
        if depth == 0 {
            0.0
        } else {
            f64::from(self.total_ref()) / f64::from(depth)
        }
    }

    /// Fraction of reads supporting the alternate allele. 0.0 at zero depth.
    pub fn alt_ratio(&self) -> f64 {
        let depth = self.total_depth();
        if depth == 0 {
            0.0
        } else {
            f64::from(self.total_alt()) / f64::from(depth)
        }
    }

    /// Larger of the two allele ratios, rounded to 2 decimal digits for
    /// downstream comparison stability.
    pub fn dominant_ratio(&self) -> f64 {
        round_decimals(self.ref_ratio().max(self.alt_ratio()), 2)
    }
}

/// Round to `digits` decimal places.
pub(crate) fn round_decimals(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (x * scale).round() / scale
}

/// Which sample a stream represents. Coverage and zygosity enforcement is
/// role-dependent; see `filter::FilterPolicy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRole {
    Wildtype,
    Mutant,
}

/// Statistic applied over each candidate's window of dominant ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Mean,
    Rms,
}

/// Candidacy thresholds shared by both samples.
#[derive(Debug, Clone, Copy)]
pub struct FilterParams {
    /// Minimum derived depth for a coverage-enforced candidate.
    pub coverage: u32,
    /// Heterozygosity band half-width in percent (band is [z, 100-z]).
    pub zygosity: u8,
    /// Exclude indel positions themselves, not just their neighborhoods.
    pub remove_indels: bool,
}

/// Sliding-window configuration.
#[derive(Debug, Clone, Copy)]
pub struct WindowParams {
    /// Window half-width: candidates considered on either side.
    pub neighbors: usize,
    pub statistic: Statistic,
}

/// Ingestion counts for the summary report.
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    /// Data lines consumed (headers and blanks excluded).
    pub lines: u64,
    /// Lines dropped because the alternate field was the no-call sentinel.
    pub no_call: u64,
    /// Distinct positions held after last-write-wins insertion.
    pub kept: u64,
}

/// Per-reason drop counts from candidate selection.
#[derive(Debug, Clone, Default)]
pub struct FilterStats {
    pub zero_depth: u64,
    pub indel_proximity: u64,
    /// Indel calls themselves: candidates are substitutions only.
    pub indel_sites: u64,
    pub low_coverage: u64,
    pub out_of_band: u64,
    pub candidates: u64,
}

/// One sample's counts across the whole pipeline.
#[derive(Debug, Clone)]
pub struct SampleSummary {
    pub ingest: IngestStats,
    pub filter: FilterStats,
    /// Candidates that received a linkage signal.
    pub annotated: usize,
}

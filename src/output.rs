use crate::types::{SampleSummary, VariantRecord};
use anyhow::Result;
use csv::WriterBuilder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const DUMP_HEADER: [&str; 15] = [
    "#CHROM",
    "POS",
    "REF",
    "ALT",
    "QUAL",
    "DP",
    "FREF",
    "RREF",
    "FALT",
    "RALT",
    "TOTALREF",
    "TOTALALT",
    "REFRATIO",
    "ALTRATIO",
    "INDEL",
];

const MARKER_HEADER: [&str; 16] = [
    "#CHROM",
    "POS",
    "REF",
    "ALT",
    "QUAL",
    "DP",
    "FREF",
    "RREF",
    "FALT",
    "RALT",
    "TOTALREF",
    "TOTALALT",
    "REFRATIO",
    "ALTRATIO",
    "INDEL",
    "SLIDINGAVG",
];

fn record_fields(record: &VariantRecord) -> Vec<String> {
    vec![
        record.chrom.clone(),
        record.pos.to_string(),
        record.ref_allele.clone(),
        record.alt_allele.clone(),
        record.qual.to_string(),
        record.raw_depth.to_string(),
        record.forward_ref.to_string(),
        record.reverse_ref.to_string(),
        record.forward_alt.to_string(),
        record.reverse_alt.to_string(),
        record.total_ref().to_string(),
        record.total_alt().to_string(),
        format!("{:.6}", record.ref_ratio()),
        format!("{:.6}", record.alt_ratio()),
        record.is_indel.to_string(),
    ]
}

/// Write every ingested record (all non-no-call positions) for one sample,
/// one tab-separated line per position.
pub fn write_sample_dump(records: &BTreeMap<u64, VariantRecord>, path: &Path) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    wtr.write_record(DUMP_HEADER)?;
    for record in records.values() {
        wtr.write_record(&record_fields(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the reconciled mutant markers, one line per position, restricted
/// to annotated records and (when given) to signals at or above
/// `linkage_threshold`. Returns the number of marker lines written.
pub fn write_marker_report(
    records: &BTreeMap<u64, VariantRecord>,
    markers: &[u64],
    linkage_threshold: Option<f64>,
    path: &Path,
) -> Result<usize> {
    let mut wtr = WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    wtr.write_record(MARKER_HEADER)?;

    let mut written = 0;
    for pos in markers {
        let Some(record) = records.get(pos) else {
            continue;
        };
        let Some(signal) = record.linkage_signal else {
            continue;
        };
        if let Some(threshold) = linkage_threshold {
            if signal < threshold {
                continue;
            }
        }
        let mut fields = record_fields(record);
        fields.push(format!("{:.7}", signal));
        wtr.write_record(&fields)?;
        written += 1;
    }

    wtr.flush()?;
    Ok(written)
}

/// Plain-text counts at each pipeline stage for both samples.
pub fn write_summary(
    path: &Path,
    wildtype: &SampleSummary,
    mutant: &SampleSummary,
    reconciled: usize,
    reported: usize,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "linkmap pipeline summary")?;
    writeln!(out, "========================")?;
    for (name, sample) in [("wildtype", wildtype), ("mutant", mutant)] {
        writeln!(out)?;
        writeln!(out, "{}", name)?;
        writeln!(out, "  data lines read:        {}", sample.ingest.lines)?;
        writeln!(out, "  no-call positions:      {}", sample.ingest.no_call)?;
        writeln!(out, "  records kept:           {}", sample.ingest.kept)?;
        writeln!(out, "  zero depth:             {}", sample.filter.zero_depth)?;
        writeln!(out, "  near indel:             {}", sample.filter.indel_proximity)?;
        writeln!(out, "  indel sites:            {}", sample.filter.indel_sites)?;
        writeln!(out, "  low coverage:           {}", sample.filter.low_coverage)?;
        writeln!(out, "  outside zygosity band:  {}", sample.filter.out_of_band)?;
        writeln!(out, "  mapping candidates:     {}", sample.filter.candidates)?;
        writeln!(out, "  annotated with signal:  {}", sample.annotated)?;
    }
    writeln!(out)?;
    writeln!(out, "reconciled markers:       {}", reconciled)?;
    writeln!(out, "markers reported:         {}", reported)?;

    out.flush()?;
    Ok(())
}

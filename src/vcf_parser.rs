use crate::types::{IngestStats, VariantRecord};
use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Alternate-allele sentinel meaning the position carries no alternate
/// evidence. Pure-sentinel positions are dropped; a trailing `,<*>` on an
/// informative alternate is stripped.
const NO_CALL: &str = "<*>";

/// Minimum columns per data line: contig, pos, id, ref, alt, qual, filter,
/// info. Trailing format columns are ignored.
const MIN_COLUMNS: usize = 8;

/// Parse one sample's variant stream into a position-keyed record map.
///
/// Inputs ending in `.gz` are decompressed on the fly. Header (`#`) and
/// blank lines are skipped. Duplicate positions are last-write-wins in
/// stream order. A malformed line is fatal for the stream.
pub fn parse_variants(path: &Path) -> Result<(BTreeMap<u64, VariantRecord>, IngestStats)> {
    let reader = open_input(path)?;
    parse_stream(reader, &path.display().to_string())
}

/// Stream-level parser, separated from file opening so tests can feed it
/// from memory.
pub fn parse_stream<R: BufRead>(
    reader: R,
    source: &str,
) -> Result<(BTreeMap<u64, VariantRecord>, IngestStats)> {
    let mut records = BTreeMap::new();
    let mut stats = IngestStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("Failed to read line {} of {}", idx + 1, source))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        stats.lines += 1;

        let parsed = parse_line(trimmed).with_context(|| {
            format!("Malformed variant line {} of {}: {}", idx + 1, source, trimmed)
        })?;
        match parsed {
            Some(record) => {
                records.insert(record.pos, record);
            }
            None => stats.no_call += 1,
        }
    }

    stats.kept = records.len() as u64;
    Ok((records, stats))
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    if path.extension().map_or(false, |ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parse one data line. `Ok(None)` means a well-formed no-call position.
fn parse_line(line: &str) -> Result<Option<VariantRecord>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_COLUMNS {
        bail!(
            "expected at least {} columns, found {}",
            MIN_COLUMNS,
            fields.len()
        );
    }

    let pos: u64 = fields[1]
        .parse()
        .with_context(|| format!("position '{}' is not an integer", fields[1]))?;

    let alt_raw = fields[4];
    if alt_raw == NO_CALL {
        return Ok(None);
    }
    let alt_allele = alt_raw
        .strip_suffix(",<*>")
        .unwrap_or(alt_raw)
        .to_string();

    let qual: u32 = fields[5]
        .parse()
        .with_context(|| format!("quality '{}' is not an integer", fields[5]))?;

    let info = parse_info(fields[7])?;

    Ok(Some(VariantRecord {
        chrom: fields[0].to_string(),
        pos,
        ref_allele: fields[3].to_string(),
        alt_allele,
        qual,
        raw_depth: info.depth,
        forward_ref: info.strand_counts[0],
        reverse_ref: info.strand_counts[1],
        forward_alt: info.strand_counts[2],
        reverse_alt: info.strand_counts[3],
        is_indel: info.indel,
        linkage_signal: None,
    }))
}

struct InfoFields {
    depth: u32,
    /// forward-ref, reverse-ref, forward-alt, reverse-alt
    strand_counts: [u32; 4],
    indel: bool,
}

/// Extract `INDEL`, `DP=`, and the first four `I16=` values from the
/// semicolon-delimited info column.
fn parse_info(info: &str) -> Result<InfoFields> {
    let mut depth = None;
    let mut strand_counts = None;
    let mut indel = false;

    for field in info.split(';') {
        if field == "INDEL" {
            indel = true;
        } else if let Some(value) = field.strip_prefix("DP=") {
            let parsed = value
                .parse()
                .with_context(|| format!("DP value '{}' is not an integer", value))?;
            depth = Some(parsed);
        } else if let Some(value) = field.strip_prefix("I16=") {
            let mut tokens = value.split(',');
            let mut counts = [0u32; 4];
            for slot in counts.iter_mut() {
                let token = tokens
                    .next()
                    .context("I16 field carries fewer than four values")?;
                *slot = token
                    .parse()
                    .with_context(|| format!("I16 value '{}' is not an integer", token))?;
            }
            strand_counts = Some(counts);
        }
    }

    Ok(InfoFields {
        depth: depth.context("info column is missing the DP field")?,
        strand_counts: strand_counts.context("info column is missing the I16 field")?,
        indel,
    })
}

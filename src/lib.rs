//! Map causative-mutation linkage from paired wildtype/mutant variant calls.
//!
//! The pipeline runs once per sample: ingest a simplified variant stream
//! into a position-keyed record map, select mapping candidates (coverage,
//! zygosity band, indel proximity), attach a sliding-window statistic over
//! each candidate neighborhood's dominant allele ratios, then intersect the
//! mutant candidates with the wildtype's and report the survivors.

pub mod filter;
pub mod output;
pub mod reconcile;
pub mod types;
pub mod vcf_parser;
pub mod window;

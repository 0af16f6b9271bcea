use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use linkmap::filter::{self, FilterPolicy};
use linkmap::types::{FilterParams, SampleRole, SampleSummary, Statistic, WindowParams};
use linkmap::{output, reconcile, vcf_parser, window};
use std::path::Path;

#[derive(Parser)]
#[command(name = "linkmap")]
#[command(version)]
#[command(about = "Map causative-mutation linkage from paired wildtype/mutant variant calls", long_about = None)]
struct Args {
    /// Wildtype (background) variant file (can be gzipped)
    #[arg(short, long)]
    wildtype: String,

    /// Mutant variant file (can be gzipped)
    #[arg(short, long)]
    mutant: String,

    /// Output file prefix
    #[arg(short, long, default_value = "linkmap")]
    out: String,

    /// Minimum derived read depth for a wildtype mapping candidate
    #[arg(long, default_value = "25")]
    coverage: u32,

    /// Heterozygosity band half-width in percent (candidates need a
    /// reference ratio within [z, 100-z])
    #[arg(long, default_value = "20")]
    zygosity: u8,

    /// Sliding-window half-width: candidates considered on either side
    #[arg(long, default_value = "50")]
    neighbors: usize,

    /// Exclude indel positions themselves, not just their neighborhoods
    #[arg(long)]
    remove_indels: bool,

    /// Window statistic: "mean" or "rms"
    #[arg(long, default_value = "mean")]
    statistic: String,

    /// Only report markers with a linkage signal at or above this value
    #[arg(long)]
    linkage_threshold: Option<f64>,

    /// Number of threads for parallel processing
    #[arg(long, default_value_t = num_cpus())]
    threads: usize,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

macro_rules! progress {
    ($quiet:expr) => {
        if !$quiet {
            eprintln!();
        }
    };
    ($quiet:expr, $($arg:tt)*) => {
        if !$quiet {
            eprintln!($($arg)*);
        }
    };
}

fn make_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("  {spinner} [{elapsed_precise}] {msg}").unwrap());
    pb
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configure rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
        .unwrap();

    // Validate inputs
    if !Path::new(&args.wildtype).exists() {
        anyhow::bail!("Wildtype input not found: {}", args.wildtype);
    }
    if !Path::new(&args.mutant).exists() {
        anyhow::bail!("Mutant input not found: {}", args.mutant);
    }
    if args.zygosity > 50 {
        anyhow::bail!(
            "--zygosity is a band half-width in percent and must be between 0 and 50, got {}",
            args.zygosity
        );
    }
    let statistic = match args.statistic.to_lowercase().as_str() {
        "mean" => Statistic::Mean,
        "rms" => Statistic::Rms,
        other => anyhow::bail!("Invalid --statistic '{}'. Must be 'mean' or 'rms'", other),
    };
    if let Some(threshold) = args.linkage_threshold {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!(
                "--linkage-threshold must be between 0 and 1, got {}",
                threshold
            );
        }
    }

    progress!(args.quiet, "linkmap");
    progress!(args.quiet, "=========================================");
    progress!(args.quiet, "Wildtype input: {}", args.wildtype);
    progress!(args.quiet, "Mutant input: {}", args.mutant);
    progress!(args.quiet, "Output prefix: {}", args.out);
    progress!(args.quiet, "Coverage: {}", args.coverage);
    progress!(args.quiet, "Zygosity band: [{}%, {}%]", args.zygosity, 100 - args.zygosity as u32);
    progress!(args.quiet, "Neighbors: {}", args.neighbors);
    progress!(args.quiet, "Remove indels: {}", args.remove_indels);
    progress!(args.quiet, "Statistic: {}", args.statistic);
    if let Some(threshold) = args.linkage_threshold {
        progress!(args.quiet, "Linkage threshold: {}", threshold);
    }
    progress!(args.quiet, "Threads: {}", args.threads);
    progress!(args.quiet);

    let filter_params = FilterParams {
        coverage: args.coverage,
        zygosity: args.zygosity,
        remove_indels: args.remove_indels,
    };
    let window_params = WindowParams {
        neighbors: args.neighbors,
        statistic,
    };

    // Step 1: Ingest both streams. The sample pipelines are independent
    // until reconciliation.
    progress!(args.quiet, "Step 1: Parsing variant streams...");
    let pb = make_spinner(args.quiet);
    pb.set_message("parsing wildtype and mutant variants");
    let (wt_loaded, mut_loaded) = rayon::join(
        || vcf_parser::parse_variants(Path::new(&args.wildtype)),
        || vcf_parser::parse_variants(Path::new(&args.mutant)),
    );
    pb.finish_and_clear();
    let (mut wt_records, wt_ingest) = wt_loaded?;
    let (mut mut_records, mut_ingest) = mut_loaded?;
    progress!(
        args.quiet,
        "  Wildtype: {} records ({} no-call dropped)",
        wt_ingest.kept,
        wt_ingest.no_call
    );
    progress!(
        args.quiet,
        "  Mutant: {} records ({} no-call dropped)",
        mut_ingest.kept,
        mut_ingest.no_call
    );

    // Step 2: Full per-sample dumps, before any position is excluded.
    progress!(args.quiet);
    progress!(args.quiet, "Step 2: Writing per-sample variant dumps...");
    let wt_dump = format!("{}_wt_allALT.tsv", args.out);
    let mut_dump = format!("{}_mut_allALT.tsv", args.out);
    output::write_sample_dump(&wt_records, Path::new(&wt_dump))?;
    output::write_sample_dump(&mut_records, Path::new(&mut_dump))?;

    // Step 3: Candidate selection.
    progress!(args.quiet);
    progress!(args.quiet, "Step 3: Selecting mapping candidates...");
    let wt_outcome = filter::select_candidates(
        &wt_records,
        &filter_params,
        FilterPolicy::for_role(SampleRole::Wildtype),
    );
    let mut_outcome = filter::select_candidates(
        &mut_records,
        &filter_params,
        FilterPolicy::for_role(SampleRole::Mutant),
    );
    // Indel neighborhoods leave the working maps; the dumps above keep
    // the full picture.
    for pos in &wt_outcome.excluded {
        wt_records.remove(pos);
    }
    for pos in &mut_outcome.excluded {
        mut_records.remove(pos);
    }
    progress!(
        args.quiet,
        "  Wildtype candidates: {} ({} near indels, {} low coverage, {} outside band)",
        wt_outcome.stats.candidates,
        wt_outcome.stats.indel_proximity,
        wt_outcome.stats.low_coverage,
        wt_outcome.stats.out_of_band
    );
    progress!(
        args.quiet,
        "  Mutant candidates: {} ({} near indels)",
        mut_outcome.stats.candidates,
        mut_outcome.stats.indel_proximity
    );

    // Step 4: Sliding-window linkage signal per sample.
    progress!(args.quiet);
    progress!(
        args.quiet,
        "Step 4: Computing sliding-window linkage signal ({})...",
        args.statistic
    );
    let wt_annotated =
        window::attach_linkage_signal(&mut wt_records, &wt_outcome.candidates, &window_params);
    let mut_annotated =
        window::attach_linkage_signal(&mut mut_records, &mut_outcome.candidates, &window_params);
    progress!(
        args.quiet,
        "  Annotated {} wildtype and {} mutant candidates",
        wt_annotated,
        mut_annotated
    );

    // Step 5: Reconcile mutant candidates against the wildtype.
    progress!(args.quiet);
    progress!(args.quiet, "Step 5: Reconciling markers against wildtype...");
    let markers = reconcile::intersect_markers(&mut_outcome.candidates, &wt_outcome.candidates);
    progress!(
        args.quiet,
        "  {} of {} mutant candidates segregate in both samples",
        markers.len(),
        mut_outcome.stats.candidates
    );

    // Step 6: Marker report and pipeline summary.
    progress!(args.quiet);
    progress!(args.quiet, "Step 6: Writing marker report and summary...");
    let marker_path = format!("{}_mut_atMarkers.tsv", args.out);
    let reported = output::write_marker_report(
        &mut_records,
        &markers,
        args.linkage_threshold,
        Path::new(&marker_path),
    )?;

    let wt_summary = SampleSummary {
        ingest: wt_ingest,
        filter: wt_outcome.stats,
        annotated: wt_annotated,
    };
    let mut_summary = SampleSummary {
        ingest: mut_ingest,
        filter: mut_outcome.stats,
        annotated: mut_annotated,
    };
    let summary_path = format!("{}_summary.txt", args.out);
    output::write_summary(
        Path::new(&summary_path),
        &wt_summary,
        &mut_summary,
        markers.len(),
        reported,
    )?;

    progress!(args.quiet);
    progress!(args.quiet, "Done! Outputs:");
    progress!(args.quiet, "  {}", wt_dump);
    progress!(args.quiet, "  {}", mut_dump);
    progress!(args.quiet, "  {} ({} markers)", marker_path, reported);
    progress!(args.quiet, "  {}", summary_path);

    Ok(())
}

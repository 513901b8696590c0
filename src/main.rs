use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use blastsieve::config::{RunConfig, DEFAULT_MAX_EVALUE, DEFAULT_MIN_IDENTITY};
use blastsieve::fasta::DEFAULT_LINE_WIDTH;
use blastsieve::pipeline::run;
use blastsieve::threshold::Criterion;

/// blastsieve - Filter BLAST hits by identity and E-value
///
/// Builds one hit list per criterion, compares them, draws a heat-map of the
/// hits passing both, and extracts their sequences from a FASTA database.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Tab-separated BLAST table (may be gzip/bgzip compressed)
    #[clap(short = 'b', long = "blast")]
    blast: PathBuf,

    /// FASTA database holding the subject sequences
    #[clap(short = 'f', long = "fasta")]
    fasta: PathBuf,

    /// Output directory (created if missing)
    #[clap(short = 'o', long = "outdir", default_value = "results")]
    outdir: PathBuf,

    /// Minimum percent identity for list 1
    #[clap(short = 'i', long = "min-identity", default_value_t = DEFAULT_MIN_IDENTITY)]
    min_identity: f64,

    /// Maximum E-value for list 2
    #[clap(short = 'e', long = "max-evalue", default_value_t = DEFAULT_MAX_EVALUE)]
    max_evalue: f64,

    /// Residues per line in the extracted FASTA
    #[clap(short = 'w', long = "wrap", default_value_t = DEFAULT_LINE_WIDTH)]
    wrap: usize,

    /// The BLAST table has no header line (standard 12-column outfmt 6)
    #[clap(long = "no-header")]
    no_header: bool,

    /// Quiet mode (warnings and errors only)
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// More log output (-v debug, -vv trace)
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }

    fn into_config(self) -> RunConfig {
        let mut config = RunConfig::new(self.blast, self.fasta, self.outdir);
        config.first = Criterion::min_identity(self.min_identity);
        config.second = Criterion::max_evalue(self.max_evalue);
        config.line_width = self.wrap;
        config.has_header = !self.no_header;
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .format_timestamp(None)
        .init();

    let config = args.into_config();
    let summary = run(&config)?;
    println!("{summary}");

    Ok(())
}

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::fasta::DEFAULT_LINE_WIDTH;
use crate::heatmap::HeatmapStyle;
use crate::hit::Column;
use crate::threshold::Criterion;

pub const DEFAULT_MIN_IDENTITY: f64 = 35.0;
pub const DEFAULT_MAX_EVALUE: f64 = 1e-7;

/// Everything one run needs; built once by the caller and passed down
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub blast_path: PathBuf,
    pub fasta_path: PathBuf,
    pub outdir: PathBuf,
    pub first: Criterion,  // list 1
    pub second: Criterion, // list 2
    pub line_width: usize,
    pub has_header: bool,
    pub style: HeatmapStyle,
}

impl RunConfig {
    pub fn new<P: Into<PathBuf>>(blast_path: P, fasta_path: P, outdir: P) -> Self {
        RunConfig {
            blast_path: blast_path.into(),
            fasta_path: fasta_path.into(),
            outdir: outdir.into(),
            first: Criterion::min_identity(DEFAULT_MIN_IDENTITY),
            second: Criterion::max_evalue(DEFAULT_MAX_EVALUE),
            line_width: DEFAULT_LINE_WIDTH,
            has_header: true,
            style: HeatmapStyle::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.line_width == 0 {
            bail!("Line width must be at least 1");
        }
        for criterion in [&self.first, &self.second] {
            validate_criterion(criterion)?;
        }
        if self.first.label() == self.second.label() {
            bail!("Both criteria are identical ({})", self.first);
        }
        Ok(())
    }

    pub fn outputs(&self) -> OutputPaths {
        OutputPaths::new(&self.outdir, &self.first, &self.second)
    }
}

fn validate_criterion(criterion: &Criterion) -> Result<()> {
    let threshold = criterion.threshold;
    if !threshold.is_finite() {
        bail!("Threshold for {} must be a finite number", criterion.column);
    }
    match criterion.column {
        Column::Identity if !(0.0..=100.0).contains(&threshold) => {
            bail!("Identity threshold {threshold} outside 0-100")
        }
        Column::Evalue if threshold < 0.0 => bail!("E-value threshold {threshold} is negative"),
        _ => {}
    }
    Ok(())
}

/// Files written into the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub first_list: PathBuf,
    pub second_list: PathBuf,
    pub shared_list: PathBuf,
    pub only_first: PathBuf,
    pub only_second: PathBuf,
    pub heatmap: PathBuf,
    pub sequences: PathBuf,
}

impl OutputPaths {
    pub fn new(outdir: &Path, first: &Criterion, second: &Criterion) -> Self {
        let (a, b) = (first.label(), second.label());
        OutputPaths {
            first_list: outdir.join(format!("list1_{a}.txt")),
            second_list: outdir.join(format!("list2_{b}.txt")),
            shared_list: outdir.join("shared_hits.txt"),
            only_first: outdir.join(format!("only_{a}.txt")),
            only_second: outdir.join(format!("only_{b}.txt")),
            heatmap: outdir.join("shared_hits_heatmap.svg"),
            sequences: outdir.join("shared_hits_sequences.fasta"),
        }
    }
}

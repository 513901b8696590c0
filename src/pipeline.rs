/// The full filtering run: read hits, build both lists, compare them, render
/// the shared-hit heat-map and extract the shared sequences.
use anyhow::{Context, Result};
use std::fmt;
use std::fs;

use crate::blast_table::read_blast_file;
use crate::compare::{dominance, sorted, write_id_file, Dominance, SetComparison};
use crate::config::{OutputPaths, RunConfig};
use crate::extract::{extract_to_file, ExtractionReport};
use crate::heatmap::write_heatmap;
use crate::shared::select_shared_hits;
use crate::threshold::{filter_ids, Criterion, IdSet};

/// Counts and outcomes of one run, for the end-of-run report
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub first: Criterion,
    pub second: Criterion,
    pub hits_read: usize,
    pub first_count: usize,
    pub second_count: usize,
    pub comparison: SetComparison,
    pub dominance: Dominance,
    /// `None` when there were no shared hits and the run stopped early
    pub extraction: Option<ExtractionReport>,
    pub outputs: OutputPaths,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- List comparison ---")?;
        writeln!(f, "Hits read                     : {:6}", self.hits_read)?;
        writeln!(f, "Hits fulfilling ({}) only : {:6}", self.first, self.comparison.only_a.len())?;
        writeln!(f, "Hits fulfilling ({}) only : {:6}", self.second, self.comparison.only_b.len())?;
        writeln!(f, "Hits fulfilling both criteria : {:6}", self.comparison.shared.len())?;
        writeln!(f)?;

        match self.dominance {
            Dominance::First => writeln!(
                f,
                "Criterion ({}) retrieves more candidates than ({}): {} vs {}",
                self.first, self.second, self.first_count, self.second_count
            )?,
            Dominance::Second => writeln!(
                f,
                "Criterion ({}) retrieves more candidates than ({}): {} vs {}",
                self.second, self.first, self.second_count, self.first_count
            )?,
            Dominance::Equal => writeln!(
                f,
                "Both criteria retrieve the same number of candidates ({})",
                self.first_count
            )?,
        }

        match &self.extraction {
            None => writeln!(f, "No shared hits - no heat-map or sequences written")?,
            Some(report) => {
                writeln!(f, "Heat-map saved as: {}", self.outputs.heatmap.display())?;
                writeln!(
                    f,
                    "FASTA of {} shared hit sequences written to: {}",
                    report.written,
                    self.outputs.sequences.display()
                )?;
                if !report.missing.is_empty() {
                    writeln!(
                        f,
                        "Sequences not found in the database ({}): {}",
                        report.missing.len(),
                        report.missing.join(", ")
                    )?;
                }
            }
        }
        Ok(())
    }
}

pub fn run(config: &RunConfig) -> Result<RunSummary> {
    config.validate()?;
    fs::create_dir_all(&config.outdir)
        .with_context(|| format!("Failed to create output directory {}", config.outdir.display()))?;
    let outputs = config.outputs();

    let hits = read_blast_file(&config.blast_path, config.has_header)?;

    let first_ids = filter_ids(&hits, &config.first)?;
    let second_ids = filter_ids(&hits, &config.second)?;
    log::info!("{} hits with {}", first_ids.len(), config.first);
    log::info!("{} hits with {}", second_ids.len(), config.second);

    write_id_file(&outputs.first_list, first_ids.iter().map(String::as_str))?;
    write_id_file(&outputs.second_list, second_ids.iter().map(String::as_str))?;

    let comparison = SetComparison::new(&first_ids, &second_ids);
    write_id_file(&outputs.shared_list, sorted(&comparison.shared))?;
    write_id_file(&outputs.only_first, sorted(&comparison.only_a))?;
    write_id_file(&outputs.only_second, sorted(&comparison.only_b))?;

    let mut summary = RunSummary {
        first: config.first,
        second: config.second,
        hits_read: hits.len(),
        first_count: first_ids.len(),
        second_count: second_ids.len(),
        dominance: dominance(&first_ids, &second_ids),
        comparison,
        extraction: None,
        outputs,
    };

    if summary.comparison.shared.is_empty() {
        log::info!("No shared hits, nothing more to do");
        return Ok(summary);
    }

    let shared_hits = select_shared_hits(&hits, &summary.comparison.shared)?;
    write_heatmap(&summary.outputs.heatmap, &shared_hits, &config.style)?;

    // sequences follow the heat-map's row order
    let targets: IdSet = shared_hits.iter().map(|hit| hit.id.clone()).collect();
    let report = extract_to_file(
        &config.fasta_path,
        &targets,
        &summary.outputs.sequences,
        config.line_width,
    )?;
    summary.extraction = Some(report);

    Ok(summary)
}

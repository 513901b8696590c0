/// Extraction of selected records from a FASTA database
///
/// The database is scanned once. Only records whose identifier is a target
/// are kept, one slot per target, and they are written in target order once
/// the scan is complete.
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use crate::fasta::{FastaReader, FastaRecord};
use crate::input::open_input;
use crate::threshold::IdSet;

/// Outcome of one extraction run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    /// Database records read before the scan finished
    pub records_scanned: usize,
    /// Records written to the output
    pub written: usize,
    /// Later occurrences of an already-found identifier that were ignored
    pub duplicates_skipped: usize,
    /// Targets with no record in the database, in target order
    pub missing: Vec<String>,
}

impl ExtractionReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Copy the records named in `targets` from `reader` to `writer`, wrapping
/// residues at `line_width` columns.
pub fn extract_sequences<R, W>(
    mut reader: FastaReader<R>,
    targets: &IdSet,
    writer: &mut W,
    line_width: usize,
) -> Result<ExtractionReport>
where
    R: BufRead,
    W: Write,
{
    if line_width == 0 {
        bail!("Line width must be at least 1");
    }

    let mut slots: Vec<Option<FastaRecord>> = vec![None; targets.len()];
    let mut remaining = targets.len();
    let mut report = ExtractionReport::default();

    while remaining > 0 {
        let Some(record) = reader.next() else {
            break;
        };
        let record = record?;
        report.records_scanned += 1;

        let Some(slot) = targets.get_index_of(record.id()) else {
            continue;
        };
        if slots[slot].is_some() {
            log::warn!("Duplicate database record for {}, keeping the first", record.id());
            report.duplicates_skipped += 1;
            continue;
        }
        log::debug!("Found {} ({} residues)", record.id(), record.len());
        slots[slot] = Some(record);
        remaining -= 1;
    }

    for (id, slot) in targets.iter().zip(&slots) {
        match slot {
            Some(record) => {
                record.write_wrapped(writer, line_width)?;
                report.written += 1;
            }
            None => {
                log::warn!("No sequence found for {id}");
                report.missing.push(id.clone());
            }
        }
    }

    Ok(report)
}

/// File-to-file variant of [`extract_sequences`]
pub fn extract_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
    database: P,
    targets: &IdSet,
    output: Q,
    line_width: usize,
) -> Result<ExtractionReport> {
    let (database, output) = (database.as_ref(), output.as_ref());
    let reader = FastaReader::new(open_input(database)?);

    let file =
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    let report = extract_sequences(reader, targets, &mut writer, line_width)
        .with_context(|| format!("Failed to extract sequences from {}", database.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "Extracted {}/{} sequences to {} ({} database records scanned)",
        report.written,
        targets.len(),
        output.display(),
        report.records_scanned
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DB: &str = ">A1 alpha protein\nMKVL\nLA\n>A2 beta protein [Olea europaea]\nGGGGHHHH\nII\n>A3\nPP\n";

    fn set(ids: &[&str]) -> IdSet {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn run(db: &str, targets: &IdSet, width: usize) -> (String, ExtractionReport) {
        let mut out = Vec::new();
        let report =
            extract_sequences(FastaReader::new(Cursor::new(db.as_bytes())), targets, &mut out, width)
                .unwrap();
        (String::from_utf8(out).unwrap(), report)
    }

    #[test]
    fn test_single_target() {
        let (out, report) = run(DB, &set(&["A2"]), 4);
        assert_eq!(out, ">A2 beta protein [Olea europaea]\nGGGG\nHHHH\nII\n");
        assert_eq!(report.written, 1);
        assert!(report.is_complete());
    }

    #[test]
    fn test_target_order_not_database_order() {
        let (out, _) = run(DB, &set(&["A3", "A1"]), 60);
        assert_eq!(out, ">A3\nPP\n>A1 alpha protein\nMKVLLA\n");
    }

    #[test]
    fn test_missing_target_is_reported() {
        let (out, report) = run(DB, &set(&["A1", "ZZ9"]), 60);
        assert_eq!(out, ">A1 alpha protein\nMKVLLA\n");
        assert_eq!(report.missing, vec!["ZZ9".to_string()]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_duplicate_database_ids_keep_first() {
        let db = ">A1 first\nMK\n>A2\nGG\n>A1 second\nVV\n";
        let (out, report) = run(db, &set(&["A2", "A1"]), 60);
        assert_eq!(out, ">A2\nGG\n>A1 first\nMK\n");
        // scanning stops once every target is found
        assert_eq!(report.records_scanned, 2);
        assert_eq!(report.duplicates_skipped, 0);

        let (_, report) = run(db, &set(&["A1", "A9"]), 60);
        assert_eq!(report.duplicates_skipped, 1);
        assert_eq!(report.records_scanned, 3);
    }

    #[test]
    fn test_empty_targets() {
        let (out, report) = run(DB, &IdSet::new(), 60);
        assert!(out.is_empty());
        assert_eq!(report.records_scanned, 0);
    }

    #[test]
    fn test_identifier_match_is_exact() {
        let (out, report) = run(DB, &set(&["A"]), 60);
        assert!(out.is_empty());
        assert_eq!(report.missing, vec!["A".to_string()]);
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut out = Vec::new();
        let reader = FastaReader::new(Cursor::new(DB.as_bytes()));
        assert!(extract_sequences(reader, &set(&["A1"]), &mut out, 0).is_err());
    }

    #[test]
    fn test_malformed_database_is_error() {
        let mut out = Vec::new();
        let reader = FastaReader::new(Cursor::new(&b"MKV\n>A1\nMK\n"[..]));
        assert!(extract_sequences(reader, &set(&["A1"]), &mut out, 60).is_err());
    }
}

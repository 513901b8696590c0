/// Reader for tab-separated BLAST results (outfmt 6/7 style)
///
/// Column positions are resolved from the header line, so tables with extra or
/// reordered columns work as long as the subject, identity and E-value columns
/// are present. Comment lines (`#`) and blank lines are skipped.
use anyhow::{anyhow, bail, Context, Result};
use std::io::BufRead;
use std::path::Path;

use crate::hit::HitRecord;
use crate::input::open_input;

const QUERY_ALIASES: &[&str] = &["query_id", "qseqid", "query", "query id", "query acc.ver"];
const SUBJECT_ALIASES: &[&str] = &[
    "subject_id",
    "sseqid",
    "subject",
    "subject id",
    "subject acc.ver",
];
const IDENTITY_ALIASES: &[&str] = &["%identity", "pident", "identity", "% identity"];
const EVALUE_ALIASES: &[&str] = &["evalue", "e-value", "expect"];
const BIT_SCORE_ALIASES: &[&str] = &["bit_score", "bitscore", "bit score"];
const LENGTH_ALIASES: &[&str] = &["alignment_length", "length", "alignment length"];

/// Field positions of the columns this tool reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub query: Option<usize>,
    pub subject: usize,
    pub identity: usize,
    pub evalue: usize,
    pub bit_score: Option<usize>,
    pub alignment_length: Option<usize>,
}

impl ColumnLayout {
    /// Standard 12-column BLAST tabular layout
    /// (qseqid sseqid pident length mismatch gapopen qstart qend sstart send evalue bitscore)
    pub fn outfmt6() -> Self {
        ColumnLayout {
            query: Some(0),
            subject: 1,
            identity: 2,
            evalue: 10,
            bit_score: Some(11),
            alignment_length: Some(3),
        }
    }

    /// Resolve column positions from a header line
    pub fn from_header(line: &str) -> Result<Self> {
        let names: Vec<String> = line
            .split('\t')
            .map(|name| name.trim().to_lowercase())
            .collect();

        let find = |aliases: &[&str]| names.iter().position(|n| aliases.contains(&n.as_str()));
        let require = |aliases: &[&str], what: &str| {
            find(aliases).ok_or_else(|| {
                anyhow!(
                    "Missing {} column in header (expected one of: {})",
                    what,
                    aliases.join(", ")
                )
            })
        };

        Ok(ColumnLayout {
            query: find(QUERY_ALIASES),
            subject: require(SUBJECT_ALIASES, "subject identifier")?,
            identity: require(IDENTITY_ALIASES, "percent identity")?,
            evalue: require(EVALUE_ALIASES, "E-value")?,
            bit_score: find(BIT_SCORE_ALIASES),
            alignment_length: find(LENGTH_ALIASES),
        })
    }

    /// Smallest number of fields a data row must have
    pub fn min_fields(&self) -> usize {
        [
            self.query,
            Some(self.subject),
            Some(self.identity),
            Some(self.evalue),
            self.bit_score,
            self.alignment_length,
        ]
        .into_iter()
        .flatten()
        .max()
        .map_or(0, |max| max + 1)
    }
}

/// Parse a numeric field, rejecting empty, NaN and infinite values
fn parse_number(field: &str, column: &str, line_number: usize) -> Result<f64> {
    let trimmed = field.trim();
    let value: f64 = trimmed.parse().map_err(|_| {
        anyhow!("Line {line_number}: invalid {column} value '{trimmed}' (expected a number)")
    })?;
    if !value.is_finite() {
        bail!("Line {line_number}: invalid {column} value '{trimmed}' (not a finite number)");
    }
    Ok(value)
}

pub struct BlastReader<R: BufRead> {
    reader: R,
    layout: Option<ColumnLayout>,
    line_number: usize,
    line: String,
}

impl<R: BufRead> BlastReader<R> {
    /// Reader for a table whose first non-comment line names the columns
    pub fn new(reader: R) -> Self {
        BlastReader {
            reader,
            layout: None,
            line_number: 0,
            line: String::new(),
        }
    }

    /// Reader for a headerless table in the standard outfmt 6 layout
    pub fn headerless(reader: R) -> Self {
        BlastReader {
            layout: Some(ColumnLayout::outfmt6()),
            ..Self::new(reader)
        }
    }

    /// Column layout, known once the header has been read
    pub fn layout(&self) -> Option<&ColumnLayout> {
        self.layout.as_ref()
    }

    /// Next non-comment, non-blank line with the line terminator removed
    fn next_line(&mut self) -> Result<bool> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            self.line_number += 1;

            let trimmed_len = self.line.trim_end_matches(['\n', '\r']).len();
            self.line.truncate(trimmed_len);

            if !self.line.trim().is_empty() && !self.line.starts_with('#') {
                return Ok(true);
            }
        }
    }

    pub fn read_record(&mut self) -> Result<Option<HitRecord>> {
        if self.layout.is_none() {
            if !self.next_line()? {
                return Ok(None);
            }
            let layout = ColumnLayout::from_header(&self.line)
                .with_context(|| format!("Line {}: unrecognized header", self.line_number))?;
            log::debug!("BLAST table layout: {layout:?}");
            self.layout = Some(layout);
        }

        if !self.next_line()? {
            return Ok(None);
        }

        match &self.layout {
            Some(layout) => parse_hit_line(&self.line, layout, self.line_number).map(Some),
            None => Ok(None),
        }
    }

    pub fn read_all(&mut self) -> Result<Vec<HitRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }
}

fn parse_hit_line(line: &str, layout: &ColumnLayout, line_number: usize) -> Result<HitRecord> {
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() < layout.min_fields() {
        bail!(
            "Line {line_number}: expected at least {} tab-separated fields, found {}",
            layout.min_fields(),
            fields.len()
        );
    }

    let subject_id = fields[layout.subject].trim();
    if subject_id.is_empty() {
        bail!("Line {line_number}: empty subject identifier");
    }

    let identity = parse_number(fields[layout.identity], "percent identity", line_number)?;
    if !(0.0..=100.0).contains(&identity) {
        bail!("Line {line_number}: percent identity {identity} outside 0-100");
    }

    let evalue = parse_number(fields[layout.evalue], "E-value", line_number)?;
    if evalue < 0.0 {
        bail!("Line {line_number}: negative E-value {evalue}");
    }

    let bit_score = layout
        .bit_score
        .map(|idx| parse_number(fields[idx], "bit score", line_number))
        .transpose()?;

    let alignment_length = layout
        .alignment_length
        .map(|idx| {
            let field = fields[idx].trim();
            field.parse::<u32>().map_err(|_| {
                anyhow!("Line {line_number}: invalid alignment length value '{field}'")
            })
        })
        .transpose()?;

    Ok(HitRecord {
        query_id: layout
            .query
            .map(|idx| fields[idx].trim().to_string())
            .unwrap_or_default(),
        subject_id: subject_id.to_string(),
        identity,
        evalue,
        bit_score,
        alignment_length,
    })
}

/// Read a whole BLAST table from file (auto-detects gzip/bgzip compression)
pub fn read_blast_file<P: AsRef<Path>>(path: P, has_header: bool) -> Result<Vec<HitRecord>> {
    let path = path.as_ref();
    let input = open_input(path)?;
    let mut reader = if has_header {
        BlastReader::new(input)
    } else {
        BlastReader::headerless(input)
    };
    let records = reader
        .read_all()
        .with_context(|| format!("Malformed BLAST table {}", path.display()))?;
    log::info!("Read {} hits from {}", records.len(), path.display());
    Ok(records)
}

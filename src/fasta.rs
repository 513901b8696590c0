/// Streaming FASTA reading and wrapped FASTA writing
///
/// `FastaReader` is a pull-based iterator: it holds at most one record in
/// memory, so databases far larger than RAM can be scanned in a single pass.
use anyhow::{bail, Result};
use std::io::{BufRead, Write};

pub const HEADER_SENTINEL: char = '>';
pub const DEFAULT_LINE_WIDTH: usize = 60;

/// One FASTA record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Header text after the sentinel, kept verbatim
    header: String,
    /// Length of the identifier at the start of `header`
    id_len: usize,
    pub sequence: Vec<u8>,
}

impl FastaRecord {
    /// Build a record from header text (without the leading `>`)
    pub fn from_header(header: &str) -> Option<Self> {
        let id_len = header.find(char::is_whitespace).unwrap_or(header.len());
        if id_len == 0 {
            return None;
        }
        Some(FastaRecord {
            header: header.to_string(),
            id_len,
            sequence: Vec::new(),
        })
    }

    /// First whitespace-delimited token of the header
    pub fn id(&self) -> &str {
        &self.header[..self.id_len]
    }

    /// Remainder of the header after the identifier, empty if absent
    pub fn description(&self) -> &str {
        self.header[self.id_len..].trim_start()
    }

    /// Full header text as it appeared after `>`
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Write the record with its header verbatim and residues wrapped at `width`
    pub fn write_wrapped<W: Write>(&self, writer: &mut W, width: usize) -> std::io::Result<()> {
        writeln!(writer, "{}{}", HEADER_SENTINEL, self.header)?;
        for line in self.sequence.chunks(width.max(1)) {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    AwaitingHeader,
    AccumulatingSequence,
}

pub struct FastaReader<R: BufRead> {
    reader: R,
    state: ParseState,
    current: Option<FastaRecord>,
    line: Vec<u8>,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        FastaReader {
            reader,
            state: ParseState::AwaitingHeader,
            current: None,
            line: Vec::new(),
            line_number: 0,
            done: false,
        }
    }

    /// Number of input lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn start_record(&mut self) -> Result<()> {
        let header = match std::str::from_utf8(&self.line[1..]) {
            Ok(text) => text,
            Err(_) => bail!("Line {}: header is not valid UTF-8", self.line_number),
        };
        match FastaRecord::from_header(header) {
            Some(record) => {
                self.current = Some(record);
                self.state = ParseState::AccumulatingSequence;
                Ok(())
            }
            None => bail!("Line {}: header without an identifier", self.line_number),
        }
    }

    /// Advance the state machine until a record is complete
    pub fn read_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                self.done = true;
                self.state = ParseState::AwaitingHeader;
                return Ok(self.current.take());
            }
            self.line_number += 1;

            while matches!(self.line.last(), Some(b'\n' | b'\r')) {
                self.line.pop();
            }

            if self.line.first() == Some(&(HEADER_SENTINEL as u8)) {
                let finished = self.current.take();
                self.start_record()?;
                if finished.is_some() {
                    return Ok(finished);
                }
                continue;
            }

            if self.line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match (self.state, self.current.as_mut()) {
                (ParseState::AccumulatingSequence, Some(record)) => {
                    record.sequence.extend_from_slice(&self.line);
                }
                _ => bail!(
                    "Line {}: sequence data before the first '{}' header",
                    self.line_number,
                    HEADER_SENTINEL
                ),
            }
        }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_record() {
            Ok(record) => record.map(Ok),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

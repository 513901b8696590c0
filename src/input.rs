use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use noodles::bgzf;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// How an input file is compressed, judged from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bgzf,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => Compression::Gzip,
            Some("bgz") => Compression::Bgzf,
            _ => Compression::None,
        }
    }
}

/// Open a file and auto-detect gzip/bgzip compression, returning a boxed BufRead
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    Ok(match Compression::from_path(path) {
        Compression::Bgzf => Box::new(BufReader::new(bgzf::io::reader::Reader::new(file))),
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Compression::None => Box::new(BufReader::new(file)),
    })
}

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::threshold::IdSet;

/// Overlap of two identifier sets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetComparison {
    /// A ∩ B, in A's order
    pub shared: IdSet,
    /// A \ B, in A's order
    pub only_a: IdSet,
    /// B \ A, in B's order
    pub only_b: IdSet,
}

impl SetComparison {
    pub fn new(a: &IdSet, b: &IdSet) -> Self {
        let (shared, only_a): (IdSet, IdSet) = a.iter().cloned().partition(|id| b.contains(id));
        let only_b = b.iter().filter(|id| !a.contains(*id)).cloned().collect();

        SetComparison {
            shared,
            only_a,
            only_b,
        }
    }

    /// Size of A ∪ B
    pub fn union_len(&self) -> usize {
        self.shared.len() + self.only_a.len() + self.only_b.len()
    }
}

/// Which side of a comparison retrieves more candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    First,
    Second,
    Equal,
}

pub fn dominance(a: &IdSet, b: &IdSet) -> Dominance {
    match a.len().cmp(&b.len()) {
        std::cmp::Ordering::Greater => Dominance::First,
        std::cmp::Ordering::Less => Dominance::Second,
        std::cmp::Ordering::Equal => Dominance::Equal,
    }
}

/// Identifiers in lexicographic order
pub fn sorted(ids: &IdSet) -> Vec<&str> {
    let mut list: Vec<&str> = ids.iter().map(String::as_str).collect();
    list.sort_unstable();
    list
}

/// Write identifiers one per line
pub fn write_id_list<'a, W, I>(writer: &mut W, ids: I) -> std::io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a str>,
{
    let mut count = 0;
    for id in ids {
        writeln!(writer, "{id}")?;
        count += 1;
    }
    Ok(count)
}

/// Write identifiers one per line to `path`
pub fn write_id_file<'a, P, I>(path: P, ids: I) -> Result<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a str>,
{
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let count = write_id_list(&mut writer, ids)
        .and_then(|count| writer.flush().map(|_| count))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::debug!("Wrote {} identifiers to {}", count, path.display());
    Ok(count)
}

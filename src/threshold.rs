use anyhow::{bail, Result};
use indexmap::IndexSet;
use std::fmt;

use crate::hit::{Column, HitRecord};

/// Distinct hit identifiers, in order of first appearance
pub type IdSet = IndexSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    AtLeast, // value >= threshold
    AtMost,  // value <= threshold
}

impl Comparison {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::AtLeast => value >= threshold,
            Comparison::AtMost => value <= threshold,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Comparison::AtLeast => "ge",
            Comparison::AtMost => "le",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::AtLeast => ">=",
            Comparison::AtMost => "<=",
        }
    }
}

/// A threshold predicate over one numeric column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    pub column: Column,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl Criterion {
    pub fn new(column: Column, comparison: Comparison, threshold: f64) -> Self {
        Criterion {
            column,
            comparison,
            threshold,
        }
    }

    /// Percent identity at least `threshold`
    pub fn min_identity(threshold: f64) -> Self {
        Self::new(Column::Identity, Comparison::AtLeast, threshold)
    }

    /// E-value at most `threshold`
    pub fn max_evalue(threshold: f64) -> Self {
        Self::new(Column::Evalue, Comparison::AtMost, threshold)
    }

    /// File-name friendly label, e.g. `identity_ge35` or `evalue_le1e-7`
    pub fn label(&self) -> String {
        format!(
            "{}_{}{}",
            self.column.name(),
            self.comparison.tag(),
            format_threshold(self.threshold)
        )
    }

    pub fn matches(&self, hit: &HitRecord) -> Result<bool> {
        match hit.value(self.column) {
            Some(value) => Ok(self.comparison.holds(value, self.threshold)),
            None => bail!(
                "Hit {} has no {} value to compare against {}",
                hit.subject_id,
                self.column,
                self
            ),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.column,
            self.comparison.symbol(),
            format_threshold(self.threshold)
        )
    }
}

/// Plain notation for ordinary numbers, scientific notation for tiny/huge ones
fn format_threshold(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-3..1e6).contains(&magnitude) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}

/// Subject identifiers of all hits satisfying `criterion`
pub fn filter_ids(hits: &[HitRecord], criterion: &Criterion) -> Result<IdSet> {
    let mut ids = IdSet::new();
    for hit in hits {
        if criterion.matches(hit)? {
            ids.insert(hit.subject_id.clone());
        }
    }
    log::debug!("{} hits pass {}, {} distinct", hits.len(), criterion, ids.len());
    Ok(ids)
}

/// Hits satisfying `criterion`, in table order
pub fn filter_hits<'a>(hits: &'a [HitRecord], criterion: &Criterion) -> Result<Vec<&'a HitRecord>> {
    let mut kept = Vec::new();
    for hit in hits {
        if criterion.matches(hit)? {
            kept.push(hit);
        }
    }
    Ok(kept)
}

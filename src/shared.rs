use anyhow::{bail, Result};
use ordered_float::OrderedFloat;
use std::collections::HashMap;
use std::fmt;

use crate::hit::HitRecord;
use crate::threshold::IdSet;

/// A hit passing both criteria, reduced to one (identity, E-value) pair
#[derive(Debug, Clone, PartialEq)]
pub struct SharedHit {
    pub id: String,
    pub identity: f64,
    pub evalue: f64,
}

impl fmt::Display for SharedHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{:.2}\t{:e}", self.id, self.identity, self.evalue)
    }
}

/// Pair each shared identifier with the values of its first row in the table,
/// then sort by descending identity. The sort is stable, so ties keep the
/// order in which the identifiers first appear in the table.
pub fn select_shared_hits(hits: &[HitRecord], shared: &IdSet) -> Result<Vec<SharedHit>> {
    let mut first_seen: HashMap<&str, &HitRecord> = HashMap::with_capacity(shared.len());
    let mut order: Vec<&str> = Vec::with_capacity(shared.len());

    for hit in hits {
        let id = hit.subject_id.as_str();
        if shared.contains(id) && !first_seen.contains_key(id) {
            first_seen.insert(id, hit);
            order.push(id);
        }
    }

    if let Some(absent) = shared.iter().find(|id| !first_seen.contains_key(id.as_str())) {
        bail!("Shared identifier {absent} does not occur in the hit table");
    }

    let mut selected: Vec<SharedHit> = order
        .into_iter()
        .filter_map(|id| first_seen.get(id))
        .map(|hit| SharedHit {
            id: hit.subject_id.clone(),
            identity: hit.identity,
            evalue: hit.evalue,
        })
        .collect();

    selected.sort_by_key(|hit| std::cmp::Reverse(OrderedFloat(hit.identity)));
    Ok(selected)
}

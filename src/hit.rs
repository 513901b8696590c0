use std::fmt;

/// Numeric column of a BLAST hit that a threshold can be applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Identity,
    Evalue,
    BitScore,
    AlignmentLength,
}

impl Column {
    /// Short name used in labels and file names
    pub fn name(self) -> &'static str {
        match self {
            Column::Identity => "identity",
            Column::Evalue => "evalue",
            Column::BitScore => "bitscore",
            Column::AlignmentLength => "length",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of a tabular BLAST result
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    pub query_id: String,
    pub subject_id: String,
    pub identity: f64, // percent, 0-100
    pub evalue: f64,
    pub bit_score: Option<f64>,
    pub alignment_length: Option<u32>,
}

impl HitRecord {
    pub fn new(query_id: &str, subject_id: &str, identity: f64, evalue: f64) -> Self {
        HitRecord {
            query_id: query_id.to_string(),
            subject_id: subject_id.to_string(),
            identity,
            evalue,
            bit_score: None,
            alignment_length: None,
        }
    }

    /// Value of a numeric column, `None` when the table did not carry it
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Identity => Some(self.identity),
            Column::Evalue => Some(self.evalue),
            Column::BitScore => self.bit_score,
            Column::AlignmentLength => self.alignment_length.map(f64::from),
        }
    }
}

impl fmt::Display for HitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{:.2}\t{:e}",
            self.query_id, self.subject_id, self.identity, self.evalue
        )?;

        if let Some(bit_score) = self.bit_score {
            write!(f, "\t{bit_score}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_columns() {
        let mut hit = HitRecord::new("q1", "XP_1", 40.0, 1e-9);
        assert_eq!(hit.value(Column::Identity), Some(40.0));
        assert_eq!(hit.value(Column::Evalue), Some(1e-9));
        assert_eq!(hit.value(Column::BitScore), None);

        hit.alignment_length = Some(120);
        assert_eq!(hit.value(Column::AlignmentLength), Some(120.0));
    }

    #[test]
    fn test_display() {
        let hit = HitRecord::new("q1", "XP_1", 40.0, 1e-9);
        assert_eq!(hit.to_string(), "q1\tXP_1\t40.00\t1e-9");
    }
}

use std::collections::HashSet;

use serde::Serialize;

use super::model::{DType, Dataset};

// ---------------------------------------------------------------------------
// Read-only data-quality queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnType {
    pub column: String,
    pub dtype: DType,
}

/// Snapshot of the three diagnostics for one dataset state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub rows: usize,
    pub columns: usize,
    pub missing: Vec<MissingCount>,
    pub duplicates: usize,
    pub dtypes: Vec<ColumnType>,
}

impl Diagnostics {
    pub fn compute(dataset: &Dataset) -> Self {
        Diagnostics {
            rows: dataset.len(),
            columns: dataset.columns().len(),
            missing: missing_values(dataset),
            duplicates: duplicate_rows(dataset),
            dtypes: dtypes(dataset),
        }
    }

    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|m| m.missing).sum()
    }
}

/// Missing cells per column, in column order.
pub fn missing_values(dataset: &Dataset) -> Vec<MissingCount> {
    dataset
        .columns()
        .iter()
        .map(|c| MissingCount {
            column: c.name.clone(),
            missing: c.missing_count(),
        })
        .collect()
}

/// Rows equal across every column to an earlier row. The first occurrence is
/// not counted.
pub fn duplicate_rows(dataset: &Dataset) -> usize {
    let mut seen = HashSet::with_capacity(dataset.len());
    (0..dataset.len())
        .filter(|&i| !seen.insert(dataset.row(i)))
        .count()
}

pub fn dtypes(dataset: &Dataset) -> Vec<ColumnType> {
    dataset
        .columns()
        .iter()
        .map(|c| ColumnType {
            column: c.name.clone(),
            dtype: c.dtype,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_bytes;

    #[test]
    fn counts_missing_per_column() {
        let ds = load_bytes(b"PM2.5,wd\n1,N\n,\n3,\n").unwrap();
        let missing = missing_values(&ds);
        assert_eq!(missing[0], MissingCount { column: "PM2.5".into(), missing: 1 });
        assert_eq!(missing[1], MissingCount { column: "wd".into(), missing: 2 });
    }

    #[test]
    fn duplicates_count_every_repeat_after_the_first() {
        let csv = b"a,b\n1,x\n2,y\n1,x\n1,x\n2,z\n,\n,\n";
        let ds = load_bytes(csv).unwrap();
        // (1,x) twice more, (missing, missing) once more
        assert_eq!(duplicate_rows(&ds), 3);
    }

    #[test]
    fn partial_match_is_not_a_duplicate() {
        let ds = load_bytes(b"a,b\n1,x\n1,y\n").unwrap();
        assert_eq!(duplicate_rows(&ds), 0);
    }

    #[test]
    fn empty_dataset_reports_zeros() {
        let ds = load_bytes(b"PM2.5,PM10,wd\n").unwrap();
        let diag = Diagnostics::compute(&ds);
        assert_eq!(diag.rows, 0);
        assert_eq!(diag.columns, 3);
        assert_eq!(diag.duplicates, 0);
        assert_eq!(diag.total_missing(), 0);
        assert!(diag.missing.iter().all(|m| m.missing == 0));
    }

    #[test]
    fn reports_declared_types() {
        let ds = load_bytes(b"hour,PM2.5,wd\n0,1.5,N\n1,2.5,S\n").unwrap();
        let types: Vec<DType> = dtypes(&ds).into_iter().map(|t| t.dtype).collect();
        assert_eq!(types, vec![DType::Int64, DType::Float64, DType::Object]);
    }
}

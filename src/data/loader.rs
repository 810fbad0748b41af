use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, bail};

use super::error::Result;
use super::model::{Column, Dataset};
use super::schema::is_na_token;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a `.csv` file on disk.
pub fn load_file(path: &Path) -> anyhow::Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if ext != "csv" {
        bail!("Unsupported file extension: .{ext}");
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    read_csv(std::io::BufReader::new(file))
        .with_context(|| format!("reading CSV {}", path.display()))
}

/// Load a dataset from an in-memory upload.
pub fn load_bytes(bytes: &[u8]) -> Result<Dataset> {
    read_csv(bytes)
}

/// Parse CSV with a header row into a [`Dataset`].
///
/// Rows with a different number of fields than the header are rejected.
/// Column types are inferred from content once every row has been read.
pub fn read_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input);

    let headers = dedup_headers(reader.headers()?.iter());
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    let mut rows = 0;
    for result in reader.records() {
        let record = result?;
        for (col_idx, field) in record.iter().enumerate() {
            let value = if is_na_token(field) {
                None
            } else {
                Some(field.to_string())
            };
            raw[col_idx].push(value);
        }
        rows += 1;
    }

    let columns = headers
        .iter()
        .zip(raw)
        .map(|(name, values)| infer_column(name, values))
        .collect();

    Ok(Dataset::new(columns, rows))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Repeated header names get a `.1`, `.2`, … suffix so lookups stay unique.
fn dedup_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .map(|name| {
            let count = seen.entry(name.to_string()).or_insert(0);
            let unique = if *count == 0 {
                name.to_string()
            } else {
                format!("{name}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

/// Infer the declared type of a column from the values present in it.
///
/// * every value an integer and nothing missing → `int64`
/// * every value a float (or integers with gaps) → `float64`
/// * anything else → `object`
///
/// A column without a single present value is an all-missing `float64`.
fn infer_column(name: &str, values: Vec<Option<String>>) -> Column {
    let mut all_int = true;
    let mut all_float = true;
    for s in values.iter().flatten() {
        let s = s.trim();
        if all_int && s.parse::<i64>().is_err() {
            all_int = false;
        }
        if s.parse::<f64>().is_err() {
            all_float = false;
            break;
        }
    }

    if !all_float {
        return Column::text(name, values);
    }

    // Any NaN spelling the float parser accepts ("NAN", "Nan", …) is missing.
    let numbers = values
        .iter()
        .map(|v| {
            v.as_deref()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|x| !x.is_nan())
        })
        .collect();

    Column::numeric(name, numbers, all_int)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::data::error::PipelineError;
    use crate::data::model::DType;

    #[test]
    fn infers_column_types() {
        let csv = "No,PM2.5,wd,TEMP\n1,10,N,-1.5\n2,,NW,0.5\n3,30,NA,2\n";
        let ds = read_csv(Cursor::new(csv)).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column("No").unwrap().dtype, DType::Int64);
        assert_eq!(ds.column("PM2.5").unwrap().dtype, DType::Float64);
        assert_eq!(ds.column("wd").unwrap().dtype, DType::Object);
        assert_eq!(ds.column("TEMP").unwrap().dtype, DType::Float64);

        assert_eq!(ds.numeric("PM2.5").unwrap(), &[Some(10.0), None, Some(30.0)]);
        assert_eq!(ds.column("wd").unwrap().missing_count(), 1);
    }

    #[test]
    fn nan_spellings_are_missing() {
        let ds = load_bytes(b"PM2.5,hour\n10,0\nNAN,1\n30,2\nNan,3\n").unwrap();
        let pm = ds.column("PM2.5").unwrap();
        assert_eq!(pm.dtype, DType::Float64);
        assert_eq!(pm.missing_count(), 2);
        assert_eq!(ds.numeric("PM2.5").unwrap(), &[Some(10.0), None, Some(30.0), None]);
        assert_eq!(ds.column("hour").unwrap().dtype, DType::Int64);
    }

    #[test]
    fn header_only_file_is_empty() {
        let ds = read_csv(Cursor::new("PM2.5,wd\n")).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.column_names(), vec!["PM2.5", "wd"]);
        assert_eq!(ds.column("wd").unwrap().dtype, DType::Float64);
    }

    #[test]
    fn unequal_row_length_is_rejected() {
        let err = read_csv(Cursor::new("a,b\n1,2\n3\n")).unwrap_err();
        assert!(matches!(err, PipelineError::Csv(_)));
    }

    #[test]
    fn repeated_headers_get_suffix() {
        let ds = load_bytes(b"a,a,a\n1,2,3\n").unwrap();
        assert_eq!(ds.column_names(), vec!["a", "a.1", "a.2"]);
    }

    #[test]
    fn rejects_other_extensions() {
        let err = load_file(Path::new("measurements.parquet")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}

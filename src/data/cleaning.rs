use serde::Serialize;

use super::error::Result;
use super::model::Dataset;
use super::schema::{NUMERIC_COLUMNS, WIND_DIRECTION};

// ---------------------------------------------------------------------------
// Gap filling primitives
// ---------------------------------------------------------------------------

/// Fill gaps by linear interpolation in row order, forward direction only.
///
/// * interior gap → straight line between the surrounding known values
/// * trailing gap → last known value carried forward
/// * leading gap  → left missing (nothing to interpolate from)
///
/// Returns the number of cells filled.
pub fn interpolate_linear_forward(values: &mut [Option<f64>]) -> usize {
    let mut filled = 0;
    let mut last_known: Option<(usize, f64)> = None;
    let mut i = 0;

    while i < values.len() {
        if let Some(v) = values[i] {
            last_known = Some((i, v));
            i += 1;
            continue;
        }

        let gap_start = i;
        while i < values.len() && values[i].is_none() {
            i += 1;
        }
        let Some((left_idx, left)) = last_known else {
            continue;
        };

        match values.get(i).copied().flatten() {
            Some(right) => {
                let span = (i - left_idx) as f64;
                for (j, slot) in values.iter_mut().enumerate().take(i).skip(gap_start) {
                    let t = (j - left_idx) as f64 / span;
                    *slot = Some(left + (right - left) * t);
                }
            }
            None => {
                for slot in &mut values[gap_start..i] {
                    *slot = Some(left);
                }
            }
        }
        filled += i - gap_start;
    }

    filled
}

/// Replace each missing cell with the closest earlier present value.
/// Returns the number of cells filled.
pub fn forward_fill(values: &mut [Option<String>]) -> usize {
    let mut filled = 0;
    let mut last: Option<String> = None;
    for slot in values.iter_mut() {
        if slot.is_some() {
            last = slot.clone();
        } else if let Some(prev) = &last {
            *slot = Some(prev.clone());
            filled += 1;
        }
    }
    filled
}

/// Length of the missing run at the start of a column.
pub fn leading_gap<T>(values: &[Option<T>]) -> usize {
    values.iter().take_while(|v| v.is_none()).count()
}

// ---------------------------------------------------------------------------
// Dataset cleaning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFill {
    pub column: String,
    pub filled: usize,
    /// Cells of the leading gap that stay missing.
    pub unresolved: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CleaningSummary {
    pub columns: Vec<ColumnFill>,
}

impl CleaningSummary {
    pub fn total_filled(&self) -> usize {
        self.columns.iter().map(|c| c.filled).sum()
    }

    pub fn total_unresolved(&self) -> usize {
        self.columns.iter().map(|c| c.unresolved).sum()
    }
}

/// Interpolate the numeric measurement columns and forward-fill wind
/// direction, in place.
pub fn clean(dataset: &mut Dataset) -> Result<CleaningSummary> {
    let mut summary = CleaningSummary::default();

    for name in NUMERIC_COLUMNS {
        let values = dataset.numeric_mut(name)?;
        let filled = interpolate_linear_forward(values);
        let unresolved = leading_gap(values);
        log::debug!("{name}: interpolated {filled} cells");
        if unresolved > 0 {
            log::warn!("{name}: {unresolved} leading cells have no earlier value to interpolate from");
        }
        summary.columns.push(ColumnFill {
            column: name.to_string(),
            filled,
            unresolved,
        });
    }

    let values = dataset.text_mut(WIND_DIRECTION)?;
    let filled = forward_fill(values);
    let unresolved = leading_gap(values);
    log::debug!("{WIND_DIRECTION}: forward-filled {filled} cells");
    if unresolved > 0 {
        log::warn!("{WIND_DIRECTION}: {unresolved} leading cells have no earlier value");
    }
    summary.columns.push(ColumnFill {
        column: WIND_DIRECTION.to_string(),
        filled,
        unresolved,
    });

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::analysis::{Correlation, correlation_matrix};
    use crate::data::diagnostics::missing_values;
    use crate::data::error::PipelineError;
    use crate::data::loader::load_bytes;
    use crate::data::schema::POLLUTANTS;

    const HEADER: &str = "PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,WSPM,wd";

    #[test]
    fn midpoint_is_interpolated() {
        let mut v = vec![Some(10.0), None, Some(30.0)];
        assert_eq!(interpolate_linear_forward(&mut v), 1);
        assert_eq!(v, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn longer_interior_gap_is_linear() {
        let mut v = vec![Some(0.0), None, None, None, Some(8.0)];
        interpolate_linear_forward(&mut v);
        assert_eq!(v, vec![Some(0.0), Some(2.0), Some(4.0), Some(6.0), Some(8.0)]);
    }

    #[test]
    fn trailing_gap_carries_last_value() {
        let mut v = vec![Some(1.0), None, Some(3.0), None, None];
        assert_eq!(interpolate_linear_forward(&mut v), 3);
        assert_eq!(v, vec![Some(1.0), Some(2.0), Some(3.0), Some(3.0), Some(3.0)]);
    }

    #[test]
    fn leading_gap_is_left_alone() {
        let mut v = vec![None, None, Some(4.0), None, Some(6.0)];
        assert_eq!(interpolate_linear_forward(&mut v), 1);
        assert_eq!(v, vec![None, None, Some(4.0), Some(5.0), Some(6.0)]);
        assert_eq!(leading_gap(&v), 2);
    }

    #[test]
    fn all_missing_and_empty_are_noops() {
        let mut v: Vec<Option<f64>> = vec![None, None];
        assert_eq!(interpolate_linear_forward(&mut v), 0);
        let mut empty: Vec<Option<f64>> = Vec::new();
        assert_eq!(interpolate_linear_forward(&mut empty), 0);
    }

    #[test]
    fn wind_direction_forward_fill() {
        let mut wd = vec![Some("N".to_string()), None, None, Some("S".to_string())];
        assert_eq!(forward_fill(&mut wd), 2);
        let expected: Vec<Option<String>> = ["N", "N", "N", "S"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(wd, expected);

        let mut leading = vec![None, Some("E".to_string()), None];
        assert_eq!(forward_fill(&mut leading), 1);
        assert_eq!(leading[0], None);
    }

    #[test]
    fn clean_leaves_only_leading_gaps() {
        let csv = format!(
            "{HEADER}\n\
             ,1,1,1,1,1,1,1,1,0,1,\n\
             10,,2,2,2,2,2,2,2,0,2,NW\n\
             ,3,3,3,3,3,3,3,3,,3,\n\
             30,4,4,4,4,4,4,4,4,0.5,4,\n\
             40,5,,5,5,5,5,5,5,0,,E\n"
        );
        let mut ds = load_bytes(csv.as_bytes()).unwrap();
        let summary = clean(&mut ds).unwrap();

        assert_eq!(ds.numeric("PM2.5").unwrap(), &[None, Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);
        assert_eq!(ds.numeric("RAIN").unwrap()[2], Some(0.25));
        assert_eq!(ds.numeric("SO2").unwrap()[4], Some(4.0));

        let after = missing_values(&ds);
        for m in &after {
            let expected = match m.column.as_str() {
                "PM2.5" | "wd" => 1,
                _ => 0,
            };
            assert_eq!(m.missing, expected, "column {}", m.column);
        }
        assert_eq!(summary.total_unresolved(), 2);
        assert_eq!(summary.total_filled(), 1 + 1 + 1 + 1 + 1 + 2);
    }

    #[test]
    fn nan_text_is_interpolated_like_any_gap() {
        let csv = format!(
            "{HEADER}\n\
             10,1,5,2,300,70,1,1020,-5,0,2,N\n\
             NAN,2,4,4,350,60,2,1019,-4,0,3,N\n\
             30,3,2,6,420,50,4,1018,-3,0.4,4,NE\n"
        );
        let mut ds = load_bytes(csv.as_bytes()).unwrap();
        let before = missing_values(&ds);
        assert_eq!(before[0].column, "PM2.5");
        assert_eq!(before[0].missing, 1);

        clean(&mut ds).unwrap();
        assert_eq!(ds.numeric("PM2.5").unwrap(), &[Some(10.0), Some(20.0), Some(30.0)]);

        let Correlation::Matrix(matrix) = correlation_matrix(&ds, &POLLUTANTS).unwrap() else {
            panic!("three rows are enough for a matrix");
        };
        let r = matrix.get(0, 1).unwrap();
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,WSPM,wd\n1,1,1,1,1,1,1,1,1,1,N\n";
        let mut ds = load_bytes(csv.as_bytes()).unwrap();
        match clean(&mut ds) {
            Err(PipelineError::ColumnNotFound { column }) => assert_eq!(column, "RAIN"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn text_in_numeric_column_fails() {
        let csv = format!("{HEADER}\n1,1,1,1,1,1,1,1,1,0,1,N\nbad,1,1,1,1,1,1,1,1,0,1,N\n");
        let mut ds = load_bytes(csv.as_bytes()).unwrap();
        match clean(&mut ds) {
            Err(PipelineError::NotNumeric { column, row, value }) => {
                assert_eq!(column, "PM2.5");
                assert_eq!(row, 1);
                assert_eq!(value, "bad");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

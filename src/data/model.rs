use std::fmt;

use serde::Serialize;

use super::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Cell – a single value of a row, used for row identity
// ---------------------------------------------------------------------------

/// A dynamically-typed cell. Two missing cells compare equal, as in a
/// data-frame `duplicated()` check.
#[derive(Debug, Clone)]
pub enum Cell {
    Number(f64),
    Text(String),
    Null,
}

impl Cell {
    /// `-0.0` and `0.0` are the same value for row identity.
    fn number_bits(v: f64) -> u64 {
        if v == 0.0 {
            0.0f64.to_bits()
        } else {
            v.to_bits()
        }
    }
}

// -- Manual Eq/Hash so rows can go into a HashSet --

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => Cell::number_bits(*a) == Cell::number_bits(*b),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Null, Cell::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Number(v) => Cell::number_bits(*v).hash(state),
            Cell::Text(s) => s.hash(state),
            Cell::Null => {}
        }
    }
}

// ---------------------------------------------------------------------------
// DType – declared column type
// ---------------------------------------------------------------------------

/// Declared column type, named after the usual data-frame dtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Int64,
    Float64,
    Object,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::Int64 => write!(f, "int64"),
            DType::Float64 => write!(f, "float64"),
            DType::Object => write!(f, "object"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

/// One named column; every column of a [`Dataset`] has the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
    pub data: ColumnData,
}

impl Column {
    /// Numeric column. It is `int64` only when every cell is present and
    /// came from integer text; otherwise `float64`.
    pub fn numeric(name: &str, values: Vec<Option<f64>>, integer_text: bool) -> Self {
        let complete = !values.is_empty() && values.iter().all(Option::is_some);
        let dtype = if integer_text && complete {
            DType::Int64
        } else {
            DType::Float64
        };
        Column {
            name: name.to_string(),
            dtype,
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: &str, values: Vec<Option<String>>) -> Self {
        Column {
            name: name.to_string(),
            dtype: DType::Object,
            data: ColumnData::Text(values),
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match &self.data {
            ColumnData::Numeric(v) => v[row].is_none(),
            ColumnData::Text(v) => v[row].is_none(),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    pub fn cell(&self, row: usize) -> Cell {
        match &self.data {
            ColumnData::Numeric(v) => v[row].map_or(Cell::Null, Cell::Number),
            ColumnData::Text(v) => v[row].clone().map_or(Cell::Null, Cell::Text),
        }
    }

    /// Render one value the way the preview table shows it.
    pub fn display(&self, row: usize) -> String {
        match &self.data {
            ColumnData::Numeric(v) => match v[row] {
                Some(x) => format_number(x, self.dtype),
                None => "NaN".to_string(),
            },
            ColumnData::Text(v) => v[row].clone().unwrap_or_else(|| "None".to_string()),
        }
    }

    /// Turn a numeric column into a text column, keeping missing cells.
    fn make_text(&mut self) {
        if let ColumnData::Numeric(values) = &self.data {
            let dtype = self.dtype;
            let text = values
                .iter()
                .map(|v| v.map(|x| format_number(x, dtype)))
                .collect();
            self.data = ColumnData::Text(text);
            self.dtype = DType::Object;
        }
    }
}

fn format_number(x: f64, dtype: DType) -> String {
    match dtype {
        DType::Int64 => format!("{}", x as i64),
        _ if x.fract() == 0.0 && x.is_finite() => format!("{x:.1}"),
        _ => format!("{x}"),
    }
}

// ---------------------------------------------------------------------------
// Dataset – ordered named columns aligned by row index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Build a dataset; all columns must have `rows` entries.
    pub fn new(columns: Vec<Column>, rows: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == rows));
        Dataset { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PipelineError::column_not_found(name))
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| PipelineError::column_not_found(name))
    }

    /// Values of a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[Option<f64>]> {
        let column = self.column(name)?;
        match &column.data {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Text(values) => Err(not_numeric(name, values)),
        }
    }

    pub fn numeric_mut(&mut self, name: &str) -> Result<&mut Vec<Option<f64>>> {
        let column = self.column_mut(name)?;
        match &mut column.data {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Text(values) => Err(not_numeric(name, values)),
        }
    }

    /// Values of a column as text. A numeric column is converted in place.
    pub fn text_mut(&mut self, name: &str) -> Result<&mut Vec<Option<String>>> {
        let column = self.column_mut(name)?;
        column.make_text();
        match &mut column.data {
            ColumnData::Text(values) => Ok(values),
            ColumnData::Numeric(_) => unreachable!("column converted to text above"),
        }
    }

    /// Full row as cells, in column order.
    pub fn row(&self, index: usize) -> Vec<Cell> {
        self.columns.iter().map(|c| c.cell(index)).collect()
    }

    /// First `n` rows rendered as strings.
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        (0..n.min(self.rows))
            .map(|i| self.columns.iter().map(|c| c.display(i)).collect())
            .collect()
    }
}

fn not_numeric(column: &str, values: &[Option<String>]) -> PipelineError {
    let present = || values.iter().enumerate().filter_map(|(i, v)| Some((i, v.as_ref()?)));
    let (row, value) = present()
        .find(|(_, s)| s.trim().parse::<f64>().is_err())
        .or_else(|| present().next())
        .map(|(i, s)| (i, s.clone()))
        .unwrap_or((0, String::new()));
    PipelineError::NotNumeric {
        column: column.to_string(),
        row,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_columns(columns: Vec<Column>) -> Dataset {
        let rows = columns.first().map_or(0, Column::len);
        Dataset::new(columns, rows)
    }

    fn sample() -> Dataset {
        from_columns(vec![
            Column::numeric("PM2.5", vec![Some(10.0), None, Some(30.0)], true),
            Column::text("wd", vec![Some("N".into()), None, Some("S".into())]),
        ])
    }

    #[test]
    fn column_lookup() {
        let ds = sample();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.numeric("PM2.5").unwrap()[2], Some(30.0));
        assert!(matches!(
            ds.column("RAIN"),
            Err(PipelineError::ColumnNotFound { column }) if column == "RAIN"
        ));
    }

    #[test]
    fn text_column_is_not_numeric() {
        let ds = from_columns(vec![Column::text(
            "CO",
            vec![None, Some("300".into()), Some("n.d.".into())],
        )]);
        match ds.numeric("CO") {
            Err(PipelineError::NotNumeric { column, row, value }) => {
                assert_eq!(column, "CO");
                assert_eq!(row, 2);
                assert_eq!(value, "n.d.");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn numeric_column_converts_to_text() {
        let mut ds = from_columns(vec![
            Column::numeric("wd", vec![Some(1.0), None], true),
            Column::numeric("hour", vec![Some(0.0), Some(23.0)], true),
        ]);
        let values = ds.text_mut("wd").unwrap();
        assert_eq!(values, &vec![Some("1.0".to_string()), None]);
        let hours = ds.text_mut("hour").unwrap();
        assert_eq!(hours, &vec![Some("0".to_string()), Some("23".to_string())]);
        assert_eq!(ds.column("wd").unwrap().dtype, DType::Object);
    }

    #[test]
    fn missing_cells_are_equal() {
        let ds = sample();
        assert_eq!(Cell::Null, Cell::Null);
        assert_eq!(Cell::Number(0.0), Cell::Number(-0.0));
        assert_ne!(Cell::Number(1.0), Cell::Text("1".into()));
        assert_eq!(ds.row(1), vec![Cell::Null, Cell::Null]);
    }

    #[test]
    fn head_renders_missing() {
        let ds = sample();
        let head = ds.head(5);
        assert_eq!(head.len(), 3);
        assert_eq!(head[1], vec!["NaN".to_string(), "None".to_string()]);
        assert_eq!(head[0][0], "10.0");
    }
}

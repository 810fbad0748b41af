use thiserror::Error;

/// Everything that can abort a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("column '{column}' is not numeric (row {row}: '{value}')")]
    NotNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column '{column}' holds a non-integer key (row {row}: {value})")]
    NotIntegral {
        column: String,
        row: usize,
        value: f64,
    },
}

impl PipelineError {
    pub fn column_not_found(column: &str) -> Self {
        PipelineError::ColumnNotFound {
            column: column.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

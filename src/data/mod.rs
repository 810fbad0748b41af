/// Data layer: core types, loading, diagnostics, cleaning and analysis.
///
/// Architecture:
/// ```text
///   uploaded .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse CSV, infer dtypes → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ diagnostics  │  missing values, duplicates, dtypes (read-only)
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ cleaning  │  interpolate numeric columns, forward-fill `wd` (in place)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ analysis  │  rainfall scatters, PM2.5 time profiles, correlation
///   └──────────┘
/// ```

pub mod analysis;
pub mod cleaning;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod model;
pub mod schema;

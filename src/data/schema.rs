//! Fixed column names of the air-quality dataset.

pub const PM25: &str = "PM2.5";
pub const PM10: &str = "PM10";
pub const SO2: &str = "SO2";
pub const NO2: &str = "NO2";
pub const CO: &str = "CO";
pub const O3: &str = "O3";
pub const TEMP: &str = "TEMP";
pub const PRES: &str = "PRES";
pub const DEWP: &str = "DEWP";
pub const RAIN: &str = "RAIN";
pub const WSPM: &str = "WSPM";

/// Categorical wind direction.
pub const WIND_DIRECTION: &str = "wd";

pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const DAY: &str = "day";
pub const HOUR: &str = "hour";

/// Columns gap-filled by linear interpolation.
pub const NUMERIC_COLUMNS: [&str; 11] = [
    PM25, PM10, SO2, NO2, CO, O3, TEMP, PRES, DEWP, RAIN, WSPM,
];

/// Columns entering the correlation matrix.
pub const POLLUTANTS: [&str; 6] = [PM25, PM10, SO2, NO2, CO, O3];

/// Pollutants plotted against rainfall.
pub const RAINFALL_TARGETS: [&str; 3] = [PM25, NO2, CO];

pub const TEMPORAL: [&str; 4] = [YEAR, MONTH, DAY, HOUR];

/// Tokens read as a missing cell, matching the usual data-frame defaults.
pub const NA_TOKENS: [&str; 19] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None",
    "<NA>", "#N/A", "#NA", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

pub fn is_na_token(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_columns_are_distinct() {
        let mut all: Vec<&str> = NUMERIC_COLUMNS.to_vec();
        all.push(WIND_DIRECTION);
        all.extend(TEMPORAL);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 16);
        assert!(POLLUTANTS.iter().all(|p| NUMERIC_COLUMNS.contains(p)));
    }

    #[test]
    fn na_tokens() {
        assert!(is_na_token(""));
        assert!(is_na_token("NA"));
        assert!(is_na_token("nan"));
        assert!(!is_na_token("0"));
        assert!(!is_na_token("N"));
    }
}

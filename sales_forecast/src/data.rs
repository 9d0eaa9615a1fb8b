//! Weekly sales records and the CSV loader

use crate::error::{Result, SalesError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns the input file must contain, in any order
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Store",
    "Date",
    "Weekly_Sales",
    "Holiday_Flag",
    "Temperature",
    "Fuel_Price",
    "CPI",
    "Unemployment",
];

/// Day-month-year format of the `Date` column
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// One row per (store, week)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    /// Store identifier
    pub store: u32,
    /// Week the sales were recorded for
    pub date: NaiveDate,
    /// Sales for the week (the modelling target)
    pub weekly_sales: f64,
    /// Whether the week contains a holiday
    pub holiday_flag: bool,
    /// Average temperature in the region
    pub temperature: f64,
    /// Fuel price in the region
    pub fuel_price: f64,
    /// Consumer price index
    pub cpi: f64,
    /// Unemployment rate
    pub unemployment: f64,
}

impl SalesRecord {
    /// Identity of the record across features and predictions
    pub fn key(&self) -> RecordKey {
        RecordKey {
            store: self.store,
            date: self.date,
        }
    }
}

/// (store, date) identity of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordKey {
    pub store: u32,
    pub date: NaiveDate,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store {} on {}", self.store, self.date)
    }
}

/// Raw CSV row as written by the data provider
#[derive(Debug, Deserialize)]
struct RawSalesRow {
    #[serde(rename = "Store")]
    store: u32,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Weekly_Sales")]
    weekly_sales: f64,
    #[serde(rename = "Holiday_Flag")]
    holiday_flag: u8,
    #[serde(rename = "Temperature")]
    temperature: f64,
    #[serde(rename = "Fuel_Price")]
    fuel_price: f64,
    #[serde(rename = "CPI")]
    cpi: f64,
    #[serde(rename = "Unemployment")]
    unemployment: f64,
}

impl RawSalesRow {
    fn into_record(self, line: u64) -> Result<SalesRecord> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|e| {
            SalesError::load(
                line,
                format!("cannot parse date '{}' as {}: {}", self.date, DATE_FORMAT, e),
            )
        })?;

        let holiday_flag = match self.holiday_flag {
            0 => false,
            1 => true,
            other => {
                return Err(SalesError::load(
                    line,
                    format!("Holiday_Flag must be 0 or 1, found {}", other),
                ))
            }
        };

        let numeric = [
            ("Weekly_Sales", self.weekly_sales),
            ("Temperature", self.temperature),
            ("Fuel_Price", self.fuel_price),
            ("CPI", self.cpi),
            ("Unemployment", self.unemployment),
        ];
        if let Some((column, _)) = numeric.iter().find(|(_, value)| !value.is_finite()) {
            return Err(SalesError::load(
                line,
                format!("{} must be a finite number", column),
            ));
        }

        Ok(SalesRecord {
            store: self.store,
            date,
            weekly_sales: self.weekly_sales,
            holiday_flag,
            temperature: self.temperature,
            fuel_price: self.fuel_price,
            cpi: self.cpi,
            unemployment: self.unemployment,
        })
    }
}

/// Data loader for weekly sales files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load sales records from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SalesRecord>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let records = Self::from_reader(file)?;

        let stores: BTreeSet<u32> = records.iter().map(|r| r.store).collect();
        info!(
            path = %path.display(),
            rows = records.len(),
            stores = stores.len(),
            "loaded sales data"
        );

        Ok(records)
    }

    /// Load sales records from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<SalesRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| SalesError::load(1, e.to_string()))?
            .clone();
        Self::validate_headers(&headers)?;

        let mut records = Vec::new();
        let mut row = csv::StringRecord::new();
        loop {
            let more = csv_reader.read_record(&mut row).map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                SalesError::load(line, e.to_string())
            })?;
            if !more {
                break;
            }

            let line = row.position().map(|p| p.line()).unwrap_or(0);
            if row.len() != headers.len() {
                return Err(SalesError::load(
                    line,
                    format!(
                        "expected {} columns, found {}",
                        headers.len(),
                        row.len()
                    ),
                ));
            }

            let raw: RawSalesRow = row
                .deserialize(Some(&headers))
                .map_err(|e| SalesError::load(line, e.to_string()))?;
            records.push(raw.into_record(line)?);
        }

        if records.is_empty() {
            return Err(SalesError::load(1, "file contains no data rows"));
        }

        debug!(rows = records.len(), "parsed sales rows");
        Ok(records)
    }

    /// Require exactly the expected columns, in any order
    fn validate_headers(headers: &csv::StringRecord) -> Result<()> {
        let present: Vec<&str> = headers.iter().collect();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|required| !present.contains(required))
            .collect();
        if !missing.is_empty() {
            return Err(SalesError::load(
                1,
                format!("missing columns: {}", missing.join(", ")),
            ));
        }

        let extra: Vec<&str> = present
            .iter()
            .copied()
            .filter(|name| !REQUIRED_COLUMNS.contains(name))
            .collect();
        if !extra.is_empty() {
            return Err(SalesError::load(
                1,
                format!("unexpected columns: {}", extra.join(", ")),
            ));
        }

        if present.len() != REQUIRED_COLUMNS.len() {
            return Err(SalesError::load(1, "duplicate column names in header"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "Store,Date,Weekly_Sales,Holiday_Flag,Temperature,Fuel_Price,CPI,Unemployment";

    fn load(body: &str) -> Result<Vec<SalesRecord>> {
        DataLoader::from_reader(format!("{}\n{}", HEADER, body).as_bytes())
    }

    #[test]
    fn parses_day_month_year_dates() {
        let records = load("1,05-02-2010,1643690.90,0,42.31,2.572,211.0963582,8.106").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2010, 2, 5).unwrap());
        assert!(!records[0].holiday_flag);
        assert_eq!(records[0].key().to_string(), "store 1 on 2010-02-05");
    }

    #[test]
    fn columns_may_be_reordered() {
        let text = "Date,Store,Holiday_Flag,Weekly_Sales,Temperature,Fuel_Price,CPI,Unemployment\n\
                    12-02-2010,3,1,500.5,38.5,2.5,211.2,8.1";
        let records = DataLoader::from_reader(text.as_bytes()).unwrap();
        assert_eq!(records[0].store, 3);
        assert!(records[0].holiday_flag);
        assert_eq!(records[0].weekly_sales, 500.5);
    }

    #[test]
    fn reports_line_of_bad_date() {
        let err = load(
            "1,05-02-2010,100.0,0,42.3,2.5,211.0,8.1\n\
             1,2010-02-12,100.0,0,42.3,2.5,211.0,8.1",
        )
        .unwrap_err();
        match err {
            SalesError::Load { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("2010-02-12"));
            }
            other => panic!("expected load error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_wrong_column_count() {
        let err = load("1,05-02-2010,100.0,0,42.3").unwrap_err();
        assert!(matches!(err, SalesError::Load { line: 2, .. }));
    }

    #[test]
    fn rejects_holiday_flag_outside_zero_one() {
        let err = load("1,05-02-2010,100.0,2,42.3,2.5,211.0,8.1").unwrap_err();
        assert!(matches!(err, SalesError::Load { line: 2, .. }));
    }

    #[test]
    fn rejects_missing_and_extra_columns() {
        let missing = DataLoader::from_reader("Store,Date\n1,05-02-2010".as_bytes()).unwrap_err();
        assert!(missing.to_string().contains("missing columns"));

        let extra = DataLoader::from_reader(
            format!("{},Dept\n1,05-02-2010,1.0,0,1.0,1.0,1.0,1.0,7", HEADER).as_bytes(),
        )
        .unwrap_err();
        assert!(extra.to_string().contains("unexpected columns: Dept"));
    }

    #[test]
    fn rejects_header_only_file() {
        assert!(matches!(
            DataLoader::from_reader(HEADER.as_bytes()),
            Err(SalesError::Load { line: 1, .. })
        ));
    }
}

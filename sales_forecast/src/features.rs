//! Calendar, lag and rolling features derived per store
//!
//! Records are partitioned by store and ordered by date before any lag or
//! rolling value is computed, so a row's derived fields only ever depend on
//! earlier weeks of the same store.

use crate::data::{RecordKey, SalesRecord};
use crate::error::{Result, SalesError};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use sales_math::moving_averages::{lagged, trailing_mean};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Trailing window of the rolling mean, inclusive of the current week
pub const ROLLING_WINDOW: usize = 4;

/// How week-of-year numbers are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekConvention {
    /// ISO-8601 week (weeks start on Monday, week 1 contains the first Thursday)
    #[default]
    Iso8601,
    /// `floor((day_of_year - 1) / 7) + 1`, so 1 January always starts week 1
    DayOfYear,
}

impl WeekConvention {
    /// Week number of `date` under this convention
    pub fn week_of(&self, date: NaiveDate) -> u32 {
        match self {
            WeekConvention::Iso8601 => date.iso_week().week(),
            WeekConvention::DayOfYear => (date.ordinal() - 1) / 7 + 1,
        }
    }
}

/// Two-valued holiday category derived from the holiday flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HolidayIndicator {
    #[serde(rename = "Holiday")]
    Holiday,
    #[serde(rename = "Non-Holiday")]
    NonHoliday,
}

impl From<bool> for HolidayIndicator {
    fn from(flag: bool) -> Self {
        if flag {
            HolidayIndicator::Holiday
        } else {
            HolidayIndicator::NonHoliday
        }
    }
}

impl HolidayIndicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayIndicator::Holiday => "Holiday",
            HolidayIndicator::NonHoliday => "Non-Holiday",
        }
    }
}

impl fmt::Display for HolidayIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sales record plus its derived features
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub record: SalesRecord,
    pub year: i32,
    pub month: u32,
    pub week: u32,
    /// Sales one week earlier for the same store
    pub lag_1: Option<f64>,
    /// Sales two weeks earlier for the same store
    pub lag_2: Option<f64>,
    /// Mean of this week and the three before it
    pub rolling_mean_4: Option<f64>,
    pub holiday: HolidayIndicator,
}

impl EnrichedRecord {
    pub fn key(&self) -> RecordKey {
        self.record.key()
    }

    /// Whether every lag and rolling feature is present
    pub fn is_complete(&self) -> bool {
        self.lag_1.is_some() && self.lag_2.is_some() && self.rolling_mean_4.is_some()
    }
}

/// Builds the enriched feature table from raw records
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    week_convention: WeekConvention,
}

impl FeatureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_week_convention(mut self, convention: WeekConvention) -> Self {
        self.week_convention = convention;
        self
    }

    pub fn week_convention(&self) -> WeekConvention {
        self.week_convention
    }

    /// Derive features for every record.
    ///
    /// Fails with [`SalesError::DataOrder`] if a (store, date) pair repeats.
    pub fn build(&self, records: &[SalesRecord]) -> Result<FeatureTable> {
        let mut partitions: BTreeMap<u32, Vec<&SalesRecord>> = BTreeMap::new();
        for record in records {
            partitions.entry(record.store).or_default().push(record);
        }

        let mut rows = Vec::with_capacity(records.len());
        for (store, mut partition) in partitions {
            partition.sort_by_key(|r| r.date);
            if let Some(pair) = partition.windows(2).find(|w| w[0].date == w[1].date) {
                return Err(SalesError::DataOrder {
                    store,
                    date: pair[0].date,
                });
            }

            let sales: Vec<f64> = partition.iter().map(|r| r.weekly_sales).collect();
            let lag_1 = lagged(&sales, 1);
            let lag_2 = lagged(&sales, 2);
            let rolling = trailing_mean(&sales, ROLLING_WINDOW)?;

            for (i, record) in partition.into_iter().enumerate() {
                rows.push(EnrichedRecord {
                    record: record.clone(),
                    year: record.date.year(),
                    month: record.date.month(),
                    week: self.week_convention.week_of(record.date),
                    lag_1: lag_1[i],
                    lag_2: lag_2[i],
                    rolling_mean_4: rolling[i],
                    holiday: HolidayIndicator::from(record.holiday_flag),
                });
            }
            debug!(store, weeks = sales.len(), "built store features");
        }

        Ok(FeatureTable { rows })
    }
}

/// Immutable enriched rows, ordered by store then date
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    rows: Vec<EnrichedRecord>,
}

impl FeatureTable {
    pub fn rows(&self) -> &[EnrichedRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Store identifiers in ascending order
    pub fn stores(&self) -> Vec<u32> {
        let mut stores: Vec<u32> = self.rows.iter().map(|r| r.record.store).collect();
        stores.dedup();
        stores
    }

    /// Chronological rows of one store
    pub fn store_rows(&self, store: u32) -> &[EnrichedRecord] {
        let start = self.rows.partition_point(|r| r.record.store < store);
        let end = self.rows.partition_point(|r| r.record.store <= store);
        &self.rows[start..end]
    }

    /// Chronological weekly sales of one store
    pub fn store_series(&self, store: u32) -> Vec<f64> {
        self.store_rows(store)
            .iter()
            .map(|r| r.record.weekly_sales)
            .collect()
    }

    /// Rows whose lag and rolling features are all present
    pub fn complete_rows(&self) -> Vec<EnrichedRecord> {
        self.rows.iter().filter(|r| r.is_complete()).cloned().collect()
    }

    /// Columnar view of the table
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = &self.rows;
        let df = DataFrame::new(vec![
            Series::new("Store", rows.iter().map(|r| r.record.store).collect::<Vec<u32>>()),
            Series::new(
                "Date",
                rows.iter()
                    .map(|r| r.record.date.format("%Y-%m-%d").to_string())
                    .collect::<Vec<String>>(),
            ),
            Series::new(
                "Weekly_Sales",
                rows.iter().map(|r| r.record.weekly_sales).collect::<Vec<f64>>(),
            ),
            Series::new(
                "Holiday_Flag",
                rows.iter().map(|r| r.record.holiday_flag).collect::<Vec<bool>>(),
            ),
            Series::new(
                "Temperature",
                rows.iter().map(|r| r.record.temperature).collect::<Vec<f64>>(),
            ),
            Series::new(
                "Fuel_Price",
                rows.iter().map(|r| r.record.fuel_price).collect::<Vec<f64>>(),
            ),
            Series::new("CPI", rows.iter().map(|r| r.record.cpi).collect::<Vec<f64>>()),
            Series::new(
                "Unemployment",
                rows.iter().map(|r| r.record.unemployment).collect::<Vec<f64>>(),
            ),
            Series::new("Year", rows.iter().map(|r| r.year).collect::<Vec<i32>>()),
            Series::new("Month", rows.iter().map(|r| r.month).collect::<Vec<u32>>()),
            Series::new("Week", rows.iter().map(|r| r.week).collect::<Vec<u32>>()),
            Series::new("Lag_1", rows.iter().map(|r| r.lag_1).collect::<Vec<Option<f64>>>()),
            Series::new("Lag_2", rows.iter().map(|r| r.lag_2).collect::<Vec<Option<f64>>>()),
            Series::new(
                "Rolling_Mean_4",
                rows.iter()
                    .map(|r| r.rolling_mean_4)
                    .collect::<Vec<Option<f64>>>(),
            ),
            Series::new(
                "Holiday_Indicator",
                rows.iter()
                    .map(|r| r.holiday.as_str())
                    .collect::<Vec<&str>>(),
            ),
        ])?;

        Ok(df)
    }

    /// Write the table as CSV
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(path.as_ref())?;
        CsvWriter::new(&mut file).has_header(true).finish(&mut df)?;
        debug!(path = %path.as_ref().display(), rows = df.height(), "exported features");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(store: u32, date: (i32, u32, u32), sales: f64, holiday: bool) -> SalesRecord {
        SalesRecord {
            store,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            weekly_sales: sales,
            holiday_flag: holiday,
            temperature: 50.0,
            fuel_price: 3.0,
            cpi: 210.0,
            unemployment: 8.0,
        }
    }

    #[test]
    fn store_five_scenario() {
        let records = vec![
            record(5, (2010, 2, 5), 100.0, false),
            record(5, (2010, 2, 12), 200.0, true),
            record(5, (2010, 2, 19), 150.0, false),
            record(5, (2010, 2, 26), 300.0, false),
        ];
        let table = FeatureBuilder::new().build(&records).unwrap();
        let fourth = &table.rows()[3];

        assert_eq!(fourth.rolling_mean_4, Some(187.5));
        assert_eq!(fourth.lag_1, Some(150.0));
        assert_eq!(fourth.lag_2, Some(200.0));
        assert!(fourth.is_complete());
        assert!(!table.rows()[2].is_complete());
    }

    #[test]
    fn partitions_and_sorts_shuffled_input() {
        let records = vec![
            record(2, (2010, 2, 12), 20.0, false),
            record(1, (2010, 2, 12), 11.0, false),
            record(2, (2010, 2, 5), 10.0, false),
            record(1, (2010, 2, 5), 1.0, false),
        ];
        let table = FeatureBuilder::new().build(&records).unwrap();

        assert_eq!(table.stores(), vec![1, 2]);
        assert_eq!(table.store_series(1), vec![1.0, 11.0]);
        assert_eq!(table.store_series(2), vec![10.0, 20.0]);
        // lags never cross store boundaries
        assert_eq!(table.store_rows(2)[0].lag_1, None);
        assert_eq!(table.store_rows(2)[1].lag_1, Some(10.0));
        assert!(table.store_rows(3).is_empty());
    }

    #[test]
    fn duplicate_store_week_is_rejected() {
        let records = vec![
            record(7, (2010, 2, 5), 1.0, false),
            record(7, (2010, 2, 5), 2.0, false),
        ];
        let err = FeatureBuilder::new().build(&records).unwrap_err();
        assert!(matches!(err, SalesError::DataOrder { store: 7, .. }));
    }

    #[test]
    fn week_conventions_differ_at_year_start() {
        // 1 January 2010 was a Friday and belongs to ISO week 53 of 2009
        let date = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        assert_eq!(WeekConvention::Iso8601.week_of(date), 53);
        assert_eq!(WeekConvention::DayOfYear.week_of(date), 1);

        let date = NaiveDate::from_ymd_opt(2010, 2, 5).unwrap();
        assert_eq!(WeekConvention::Iso8601.week_of(date), 5);
        assert_eq!(WeekConvention::DayOfYear.week_of(date), 6);
    }

    #[test]
    fn holiday_indicator_is_total() {
        assert_eq!(HolidayIndicator::from(true).to_string(), "Holiday");
        assert_eq!(HolidayIndicator::from(false).to_string(), "Non-Holiday");
    }

    #[test]
    fn dataframe_has_one_row_per_record() {
        let records = vec![
            record(1, (2010, 2, 5), 1.0, false),
            record(1, (2010, 2, 12), 2.0, true),
        ];
        let table = FeatureBuilder::new().build(&records).unwrap();
        let df = table.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 15);
    }
}

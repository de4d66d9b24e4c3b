//! Calendar dimension generation
//!
//! One `dim_date` row per day of an inclusive range. Keys are the date itself
//! in `YYYYMMDD` form, so resolving a date never needs a lookup table.

use crate::domain::warehouse::DimDate;
use crate::domain::{DateKey, EtlError, Result};
use chrono::{Datelike, NaiveDate, Weekday};

/// Inclusive range of days covered by the calendar dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl CalendarRange {
    /// # Errors
    ///
    /// Returns a validation error when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(EtlError::Validation(format!(
                "calendar start {start} is after calendar end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range
    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Calendar key for a date, or `None` when the date is outside the range
    pub fn key_of(&self, date: NaiveDate) -> Option<DateKey> {
        self.contains(date).then(|| DateKey::from_date(date))
    }

    /// Generate one row per day, in date order
    pub fn generate(&self) -> Vec<DimDate> {
        self.start
            .iter_days()
            .take_while(|date| *date <= self.end)
            .map(calendar_row)
            .collect()
    }
}

/// Calendar attributes for a single day
pub fn calendar_row(date: NaiveDate) -> DimDate {
    let weekday = date.weekday();
    DimDate {
        date_key: DateKey::from_date(date),
        full_date: date,
        year: date.year(),
        month: date.month(),
        month_name: date.format("%B").to_string(),
        quarter: (date.month() - 1) / 3 + 1,
        day_of_week: weekday.num_days_from_monday(),
        day_name: date.format("%A").to_string(),
        is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_generate_covers_range_without_gaps() {
        let range = CalendarRange::new(date(2020, 1, 1), date(2030, 12, 31)).unwrap();
        let rows = range.generate();

        // 2020, 2024 and 2028 are leap years
        assert_eq!(rows.len(), 11 * 365 + 3);
        assert_eq!(rows.len(), range.len());
        assert_eq!(rows[0].date_key.value(), 20200101);
        assert_eq!(rows[rows.len() - 1].date_key.value(), 20301231);

        for pair in rows.windows(2) {
            assert_eq!(pair[0].full_date.succ_opt(), Some(pair[1].full_date));
            assert!(pair[0].date_key < pair[1].date_key);
        }
    }

    #[test]
    fn test_generate_is_repeatable_with_unique_keys() {
        let range = CalendarRange::new(date(2023, 12, 1), date(2024, 3, 31)).unwrap();
        let first = range.generate();
        assert_eq!(first, range.generate());

        let keys: HashSet<_> = first.iter().map(|row| row.date_key).collect();
        assert_eq!(keys.len(), first.len());
    }

    #[test]
    fn test_single_day_range() {
        let range = CalendarRange::new(date(2024, 2, 29), date(2024, 2, 29)).unwrap();
        let rows = range.generate();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date_key.value(), 20240229);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = CalendarRange::new(date(2025, 1, 1), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, EtlError::Validation(_)));
    }

    #[test_case(date(2024, 1, 1), 1, 0, "Monday", false ; "new year 2024 is a monday")]
    #[test_case(date(2024, 3, 31), 1, 6, "Sunday", true ; "end of q1")]
    #[test_case(date(2024, 4, 1), 2, 0, "Monday", false ; "start of q2")]
    #[test_case(date(2024, 9, 28), 3, 5, "Saturday", true ; "saturday in q3")]
    #[test_case(date(2024, 12, 31), 4, 1, "Tuesday", false ; "last day of year")]
    fn test_calendar_row_attributes(
        day: NaiveDate,
        quarter: u32,
        day_of_week: u32,
        day_name: &str,
        is_weekend: bool,
    ) {
        let row = calendar_row(day);
        assert_eq!(row.quarter, quarter);
        assert_eq!(row.day_of_week, day_of_week);
        assert_eq!(row.day_name, day_name);
        assert_eq!(row.is_weekend, is_weekend);
        assert_eq!(row.year, day.year());
        assert_eq!(row.month, day.month());
    }

    #[test]
    fn test_month_names() {
        assert_eq!(calendar_row(date(2024, 1, 15)).month_name, "January");
        assert_eq!(calendar_row(date(2024, 10, 15)).month_name, "October");
    }

    #[test]
    fn test_key_of_respects_range() {
        let range = CalendarRange::new(date(2020, 1, 1), date(2020, 12, 31)).unwrap();
        assert_eq!(range.key_of(date(2020, 6, 1)).map(|k| k.value()), Some(20200601));
        assert_eq!(range.key_of(date(2021, 1, 1)), None);
        assert_eq!(range.key_of(date(2019, 12, 31)), None);
    }
}

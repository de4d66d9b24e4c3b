//! Warehouse key newtypes
//!
//! Surrogate keys are assigned by the warehouse on insert; date keys are
//! derived from the calendar date itself. Keeping them as distinct types stops
//! a date key from being written into a surrogate-key column and vice versa.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Warehouse-assigned integer identifier for a dimension or fact row
///
/// # Examples
///
/// ```
/// use medstar::domain::ids::SurrogateKey;
///
/// let key = SurrogateKey::new(42);
/// assert_eq!(key.value(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurrogateKey(i64);

impl SurrogateKey {
    /// Wraps a raw key value read back from the warehouse
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw key value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SurrogateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calendar dimension key in `YYYYMMDD` form
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use medstar::domain::ids::DateKey;
///
/// let date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
/// assert_eq!(DateKey::from_date(date).value(), 20240209);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateKey(i32);

impl DateKey {
    /// Derives the key for a calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32)
    }

    /// Returns the raw `YYYYMMDD` value
    pub fn value(&self) -> i32 {
        self.0
    }

    /// Converts the key back into a calendar date, if it encodes a valid one
    pub fn to_date(&self) -> Option<NaiveDate> {
        let year = self.0 / 10_000;
        let month = (self.0 / 100 % 100) as u32;
        let day = (self.0 % 100) as u32;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i32 = s
            .parse()
            .map_err(|_| format!("Invalid date key '{s}': expected YYYYMMDD"))?;
        let key = Self(raw);
        if key.to_date().is_none() {
            return Err(format!("Invalid date key '{s}': not a calendar date"));
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_key_from_date() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(DateKey::from_date(date).value(), 20200101);

        let date = NaiveDate::from_ymd_opt(2030, 12, 31).unwrap();
        assert_eq!(DateKey::from_date(date).value(), 20301231);
    }

    #[test]
    fn test_date_key_to_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(DateKey::from_date(date).to_date(), Some(date));
    }

    #[test]
    fn test_date_key_from_str() {
        assert_eq!(DateKey::from_str("20240105").unwrap().value(), 20240105);
        assert!(DateKey::from_str("20240230").is_err());
        assert!(DateKey::from_str("yesterday").is_err());
    }

    #[test]
    fn test_surrogate_key_ordering() {
        assert!(SurrogateKey::new(1) < SurrogateKey::new(2));
        assert_eq!(SurrogateKey::new(7).to_string(), "7");
    }
}

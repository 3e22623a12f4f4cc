//! Contract dates - normalized futures contract identifiers
//!
//! A contract is identified by its expiry month, optionally with a day:
//! `yyyymm00` for month-only contracts and `yyyymmdd` for contracts that
//! expire on a known day. The normalized 8-character string sorts
//! chronologically, so ordering of contract dates is plain string ordering.

use crate::error::{Result, RollCalendarError};
use crate::types::{timestamp_from_date, Timestamp};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Futures month codes, January to December
pub const MONTH_CODES: [char; 12] = ['F', 'G', 'H', 'J', 'K', 'M', 'N', 'Q', 'U', 'V', 'X', 'Z'];

/// Month number (1-12) for a futures month code
pub fn month_from_code(code: char) -> Option<u32> {
    MONTH_CODES
        .iter()
        .position(|c| *c == code.to_ascii_uppercase())
        .map(|idx| idx as u32 + 1)
}

/// Futures month code for a month number (1-12)
pub fn code_from_month(month: u32) -> Option<char> {
    MONTH_CODES.get(month.checked_sub(1)? as usize).copied()
}

/// Normalized contract identifier (`yyyymmdd`, `dd == 00` for month-only contracts)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractDate {
    date_str: String,
    year: i32,
    month: u32,
    day: u32,
}

impl ContractDate {
    /// Month-only contract
    pub fn new(year: i32, month: u32) -> Result<Self> {
        Self::with_day(year, month, 0)
    }

    /// Contract with a specific expiry day (day 0 means month-only)
    pub fn with_day(year: i32, month: u32, day: u32) -> Result<Self> {
        if !(1000..=9999).contains(&year) {
            return Err(RollCalendarError::InvalidContractDate(format!(
                "year {} out of range",
                year
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(RollCalendarError::InvalidContractDate(format!(
                "month {} out of range for {}",
                month, year
            )));
        }
        if day != 0 && NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(RollCalendarError::InvalidContractDate(format!(
                "day {} invalid for {}-{:02}",
                day, year, month
            )));
        }

        Ok(Self {
            date_str: format!("{:04}{:02}{:02}", year, month, day),
            year,
            month,
            day,
        })
    }

    /// Normalized `yyyymmdd` string
    pub fn as_str(&self) -> &str {
        &self.date_str
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Expiry day, if the contract carries one
    pub fn day(&self) -> Option<u32> {
        if self.day == 0 {
            None
        } else {
            Some(self.day)
        }
    }

    pub fn only_has_month(&self) -> bool {
        self.day == 0
    }

    /// Futures month code, e.g. 'H' for March
    pub fn letter_month(&self) -> char {
        // month is validated to 1..=12 on construction
        MONTH_CODES[(self.month - 1) as usize]
    }

    /// Approximate expiry: the contract day (or the 1st) plus an offset in days
    pub fn expiry_date(&self, approx_expiry_offset: i64) -> Timestamp {
        let day = self.day.max(1);
        let base = NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or_default();
        timestamp_from_date(base) + Duration::days(approx_expiry_offset)
    }
}

impl FromStr for ContractDate {
    type Err = RollCalendarError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        // integer columns sometimes come through as floats
        let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);

        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(RollCalendarError::InvalidContractDate(s.to_string()));
        }

        let (year, month, day) = match trimmed.len() {
            6 => (&trimmed[0..4], &trimmed[4..6], "00"),
            8 => (&trimmed[0..4], &trimmed[4..6], &trimmed[6..8]),
            _ => return Err(RollCalendarError::InvalidContractDate(s.to_string())),
        };

        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| RollCalendarError::InvalidContractDate(s.to_string()))
        };

        Self::with_day(parse(year)? as i32, parse(month)?, parse(day)?)
    }
}

impl TryFrom<String> for ContractDate {
    type Error = RollCalendarError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl TryFrom<&str> for ContractDate {
    type Error = RollCalendarError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl From<ContractDate> for String {
    fn from(value: ContractDate) -> Self {
        value.date_str
    }
}

impl fmt::Display for ContractDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.date_str)
    }
}

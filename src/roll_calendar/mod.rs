//! Roll calendars - when a futures strategy switches contracts
//!
//! A roll calendar is an ordered table of roll events. Each row says that on
//! `roll_date` we stop holding `current_contract` and start holding
//! `next_contract`, with `carry_contract` as the reference contract for the
//! carry signal.
//!
//! Calendars are normally created from individual contract prices:
//! - work out roughly when the rolls would be in an ideal world with prices
//!   always available ([`approximate`])
//! - shift each roll to the closest date on which all the contracts involved
//!   actually have prices ([`adjust`])
//!
//! They can also be backed out of an existing current/forward price series
//! ([`back_out`]), augmented with carry contracts ([`carry`]), checked against
//! prices ([`validation`]) and stored as CSV ([`csv_io`]).

pub mod adjust;
pub mod approximate;
pub mod back_out;
pub mod carry;
pub mod csv_io;
pub mod validation;

pub use adjust::{adjust_to_price_series, AdjustedCalendar, EarlyStop, RowAdjustment};
pub use approximate::generate_approximate_calendar;
pub use back_out::{ForwardSeries, ForwardSeriesRow};
pub use carry::add_carry_calendar;
pub use validation::{ValidationFinding, ValidationReport};

use crate::contract_date::ContractDate;
use crate::error::{Result, RollCalendarError};
use crate::navigator::ContractCycleNavigator;
use crate::prices::PriceSeriesSource;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Name of the date index column in stored calendars
pub const DATE_INDEX_NAME: &str = "DATE_TIME";
pub const CURRENT_CONTRACT: &str = "current_contract";
pub const NEXT_CONTRACT: &str = "next_contract";
pub const CARRY_CONTRACT: &str = "carry_contract";

/// One roll event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollCalendarRow {
    /// Last day we hold the current contract
    pub roll_date: Timestamp,
    pub current_contract: ContractDate,
    pub next_contract: ContractDate,
    pub carry_contract: ContractDate,
}

impl RollCalendarRow {
    pub fn new(
        roll_date: Timestamp,
        current_contract: ContractDate,
        next_contract: ContractDate,
        carry_contract: ContractDate,
    ) -> Self {
        Self {
            roll_date,
            current_contract,
            next_contract,
            carry_contract,
        }
    }

    /// Same contracts, different date
    pub fn with_roll_date(&self, roll_date: Timestamp) -> Self {
        Self {
            roll_date,
            ..self.clone()
        }
    }
}

/// A roll event without a carry contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRoll {
    pub roll_date: Timestamp,
    pub current_contract: ContractDate,
    pub next_contract: ContractDate,
}

impl ContractRoll {
    pub fn new(roll_date: Timestamp, current_contract: ContractDate, next_contract: ContractDate) -> Self {
        Self {
            roll_date,
            current_contract,
            next_contract,
        }
    }
}

impl From<&RollCalendarRow> for ContractRoll {
    fn from(row: &RollCalendarRow) -> Self {
        Self::new(
            row.roll_date,
            row.current_contract.clone(),
            row.next_contract.clone(),
        )
    }
}

/// Ordered sequence of roll events, keyed by roll date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollCalendar {
    rows: Vec<RollCalendarRow>,
}

impl RollCalendar {
    /// Wrap rows in calendar order; ordering is checked by
    /// [`RollCalendar::check_if_date_index_monotonic`], not here
    pub fn new(rows: Vec<RollCalendarRow>) -> Self {
        Self { rows }
    }

    /// Build a calendar from individual contract prices
    ///
    /// Generates the approximate calendar from the roll cycle, then moves each
    /// roll onto a date where the prices actually overlap.
    pub fn create_from_prices(
        prices: &dyn PriceSeriesSource,
        navigator: &dyn ContractCycleNavigator,
    ) -> Result<AdjustedCalendar> {
        let approx_calendar = generate_approximate_calendar(navigator, prices)?;
        let adjusted = adjust_to_price_series(&approx_calendar, prices)?;

        log::info!(
            "Built roll calendar with {} rolls from {} approximate rolls",
            adjusted.calendar.len(),
            approx_calendar.len()
        );

        Ok(adjusted)
    }

    pub fn rows(&self) -> &[RollCalendarRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<RollCalendarRow> {
        self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RollCalendarRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&RollCalendarRow> {
        self.rows.get(idx)
    }

    pub fn first(&self) -> Option<&RollCalendarRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&RollCalendarRow> {
        self.rows.last()
    }

    /// The date index
    pub fn dates(&self) -> Vec<Timestamp> {
        self.rows.iter().map(|r| r.roll_date).collect()
    }

    pub fn current_contracts(&self) -> Vec<&ContractDate> {
        self.rows.iter().map(|r| &r.current_contract).collect()
    }

    pub fn next_contracts(&self) -> Vec<&ContractDate> {
        self.rows.iter().map(|r| &r.next_contract).collect()
    }

    pub fn carry_contracts(&self) -> Vec<&ContractDate> {
        self.rows.iter().map(|r| &r.carry_contract).collect()
    }

    /// Contract column by its stored name
    pub fn column(&self, name: &str) -> Result<Vec<&ContractDate>> {
        match name {
            CURRENT_CONTRACT => Ok(self.current_contracts()),
            NEXT_CONTRACT => Ok(self.next_contracts()),
            CARRY_CONTRACT => Ok(self.carry_contracts()),
            other => Err(RollCalendarError::DataError(format!(
                "Roll calendar has no column '{}'",
                other
            ))),
        }
    }

    /// Rows in a positional range, clamped to the calendar length
    pub fn slice(&self, range: Range<usize>) -> RollCalendar {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        RollCalendar::new(self.rows[start..end].to_vec())
    }

    /// Rows without their carry contracts
    pub fn contract_rolls(&self) -> Vec<ContractRoll> {
        self.rows.iter().map(ContractRoll::from).collect()
    }
}

impl From<Vec<RollCalendarRow>> for RollCalendar {
    fn from(rows: Vec<RollCalendarRow>) -> Self {
        Self::new(rows)
    }
}

impl<'a> IntoIterator for &'a RollCalendar {
    type Item = &'a RollCalendarRow;
    type IntoIter = std::slice::Iter<'a, RollCalendarRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for RollCalendar {
    type Item = RollCalendarRow;
    type IntoIter = std::vec::IntoIter<RollCalendarRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn cd(s: &str) -> ContractDate {
        s.parse().unwrap()
    }

    fn sample_calendar() -> RollCalendar {
        RollCalendar::new(vec![
            RollCalendarRow::new(
                Utc.with_ymd_and_hms(2020, 3, 10, 0, 0, 0).unwrap(),
                cd("20200300"),
                cd("20200600"),
                cd("20200600"),
            ),
            RollCalendarRow::new(
                Utc.with_ymd_and_hms(2020, 6, 10, 0, 0, 0).unwrap(),
                cd("20200600"),
                cd("20200900"),
                cd("20200900"),
            ),
            RollCalendarRow::new(
                Utc.with_ymd_and_hms(2020, 9, 10, 0, 0, 0).unwrap(),
                cd("20200900"),
                cd("20201200"),
                cd("20201200"),
            ),
        ])
    }

    #[test]
    fn test_columns() {
        let calendar = sample_calendar();
        assert_eq!(calendar.len(), 3);
        assert_eq!(calendar.current_contracts()[1], &cd("20200600"));
        assert_eq!(calendar.column(NEXT_CONTRACT).unwrap()[2], &cd("20201200"));
        assert!(calendar.column("volume").is_err());
        assert_eq!(calendar.dates().len(), 3);
    }

    #[test]
    fn test_slice() {
        let calendar = sample_calendar();
        let tail = calendar.slice(1..10);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.first().unwrap().current_contract, cd("20200600"));
        assert!(calendar.slice(5..7).is_empty());
    }

    #[test]
    fn test_with_roll_date_keeps_contracts() {
        let calendar = sample_calendar();
        let row = calendar.first().unwrap();
        let moved = row.with_roll_date(Utc.with_ymd_and_hms(2020, 3, 12, 0, 0, 0).unwrap());
        assert_eq!(moved.current_contract, row.current_contract);
        assert_eq!(moved.carry_contract, row.carry_contract);
        assert_ne!(moved.roll_date, row.roll_date);
    }

    #[test]
    fn test_contract_rolls_drop_carry() {
        let rolls = sample_calendar().contract_rolls();
        assert_eq!(rolls.len(), 3);
        assert_eq!(rolls[2].next_contract, cd("20201200"));
    }
}

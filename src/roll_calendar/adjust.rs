//! Shift approximate roll dates onto dates with real prices
//!
//! For each approximate roll we look for the closest date on which the
//! current, next and (usually) carry contracts all have prices. Each adjusted
//! date must come strictly after the previous one, so we never get a double
//! roll. Running out of matching dates is expected near the end of the data:
//! the adjustment stops there and returns what it has.

use super::{RollCalendar, RollCalendarRow};
use crate::contract_date::ContractDate;
use crate::error::{Result, RollCalendarError};
use crate::prices::{PriceSeries, PriceSeriesSource};
use crate::types::{calendar_days_between, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why adjustment stopped before the end of the approximate calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyStop {
    /// Position of the row that couldn't be matched
    pub row_index: usize,
    pub theoretical_roll_date: Timestamp,
    pub current_contract: ContractDate,
    pub next_contract: ContractDate,
    /// Carry contract whose prices were required, if any
    pub required_carry_contract: Option<ContractDate>,
}

impl fmt::Display for EarlyStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let carry = self
            .required_carry_contract
            .as_ref()
            .map(ContractDate::to_string)
            .unwrap_or_else(|| "NA".to_string());
        write!(
            f,
            "Couldn't find matching roll date for contracts {}, {} and {}",
            self.current_contract, self.next_contract, carry
        )
    }
}

/// Outcome of adjusting a single row
#[derive(Debug, Clone, PartialEq)]
pub enum RowAdjustment {
    /// Row moved onto a date with matching prices
    Continue(RollCalendarRow),
    /// No usable date; stop here
    Stop(EarlyStop),
}

/// Adjusted calendar plus the reason it is shorter than its input, if it is
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedCalendar {
    pub calendar: RollCalendar,
    pub early_stop: Option<EarlyStop>,
}

impl AdjustedCalendar {
    /// True if every approximate row was adjusted
    pub fn is_complete(&self) -> bool {
        self.early_stop.is_none()
    }

    pub fn into_calendar(self) -> RollCalendar {
        self.calendar
    }
}

/// Closest date to `roll_date` on which all the given series have prices
///
/// Only dates strictly after `avoid_date` are considered. Distance is in
/// whole calendar days; ties go to the earliest date.
pub fn find_best_matching_roll_date(
    roll_date: Timestamp,
    current_prices: &PriceSeries,
    next_prices: &PriceSeries,
    carry_prices: Option<&PriceSeries>,
    avoid_date: Option<Timestamp>,
) -> Option<Timestamp> {
    current_prices
        .non_missing_dates()
        .filter(|dt| avoid_date.map_or(true, |avoid| **dt > avoid))
        .filter(|dt| next_prices.price_at(dt).is_some())
        .filter(|dt| carry_prices.map_or(true, |carry| carry.price_at(dt).is_some()))
        .min_by_key(|dt| calendar_days_between(**dt, roll_date).abs())
        .copied()
}

/// Adjust one row of an approximate calendar
///
/// The carry check uses the *following* row's carry contract, and is skipped
/// for the last row and whenever the carry contract comes after the current
/// one (it often has no prices yet).
pub fn adjust_row(
    approx_calendar: &[RollCalendarRow],
    row_index: usize,
    prices: &dyn PriceSeriesSource,
    avoid_date: Option<Timestamp>,
) -> Result<RowAdjustment> {
    let row = approx_calendar.get(row_index).ok_or_else(|| {
        RollCalendarError::DataError(format!(
            "Row {} out of range for approximate calendar of {} rows",
            row_index,
            approx_calendar.len()
        ))
    })?;

    let current_prices = prices.get(&row.current_contract)?;
    let next_prices = prices.get(&row.next_contract)?;

    let last_row_in_data = row_index + 1 == approx_calendar.len();
    let carry_comes_afterwards = row.carry_contract > row.current_contract;

    let required_carry_contract = if last_row_in_data || carry_comes_afterwards {
        None
    } else {
        let next_row = approx_calendar.get(row_index + 1).ok_or_else(|| {
            RollCalendarError::NoNextRowForCarry {
                contract: row.current_contract.to_string(),
            }
        })?;
        Some(next_row.carry_contract.clone())
    };

    let carry_prices = match &required_carry_contract {
        Some(carry) => Some(prices.get(carry)?),
        None => None,
    };

    let adjusted_date = find_best_matching_roll_date(
        row.roll_date,
        current_prices,
        next_prices,
        carry_prices,
        avoid_date,
    );

    Ok(match adjusted_date {
        Some(date) => {
            log::debug!(
                "Roll {} -> {} moved from {} to {}",
                row.current_contract,
                row.next_contract,
                row.roll_date,
                date
            );
            RowAdjustment::Continue(row.with_roll_date(date))
        }
        None => RowAdjustment::Stop(EarlyStop {
            row_index,
            theoretical_roll_date: row.roll_date,
            current_contract: row.current_contract.clone(),
            next_contract: row.next_contract.clone(),
            required_carry_contract,
        }),
    })
}

/// Adjust an approximate calendar so every roll lands on a date with prices
pub fn adjust_to_price_series(
    approx_calendar: &[RollCalendarRow],
    prices: &dyn PriceSeriesSource,
) -> Result<AdjustedCalendar> {
    let mut adjusted_rows: Vec<RollCalendarRow> = Vec::with_capacity(approx_calendar.len());
    let mut early_stop = None;

    for row_index in 0..approx_calendar.len() {
        let avoid_date = adjusted_rows.last().map(|r| r.roll_date);

        match adjust_row(approx_calendar, row_index, prices, avoid_date)? {
            RowAdjustment::Continue(row) => adjusted_rows.push(row),
            RowAdjustment::Stop(stop) => {
                log::warn!("{}", stop);
                log::warn!("OK if happens at the end of a roll calendar, otherwise problematic");
                early_stop = Some(stop);
                break;
            }
        }
    }

    Ok(AdjustedCalendar {
        calendar: RollCalendar::new(adjusted_rows),
        early_stop,
    })
}

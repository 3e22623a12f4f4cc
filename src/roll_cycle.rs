//! Roll cycles and per-instrument roll parameters
//!
//! A roll cycle is the set of contract months an instrument trades in,
//! written with futures month codes (e.g. `"HMUZ"` for quarterly contracts).
//! Each instrument has a *priced* cycle (every month we collect prices for)
//! and a *held* cycle (the months a strategy actually holds).

use crate::contract_date::{code_from_month, month_from_code, ContractDate};
use crate::error::{Result, RollCalendarError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered set of contract months
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RollCycle {
    /// Sorted, deduplicated month numbers (1-12)
    months: Vec<u32>,
}

impl RollCycle {
    /// Build from a string of month codes, e.g. "HMUZ"
    pub fn new(cycle_string: &str) -> Result<Self> {
        let mut months = Vec::with_capacity(cycle_string.len());
        for code in cycle_string.trim().chars() {
            let month = month_from_code(code).ok_or_else(|| {
                RollCalendarError::InvalidRollCycle(format!(
                    "'{}' is not a futures month code in cycle '{}'",
                    code, cycle_string
                ))
            })?;
            months.push(month);
        }

        months.sort_unstable();
        months.dedup();

        if months.is_empty() {
            return Err(RollCalendarError::InvalidRollCycle(
                "Roll cycle has no months".to_string(),
            ));
        }

        Ok(Self { months })
    }

    pub fn months(&self) -> &[u32] {
        &self.months
    }

    pub fn contains_month(&self, month: u32) -> bool {
        self.months.contains(&month)
    }

    /// First cycle month strictly after `month`, with the year increment (0 or 1)
    pub fn next_month(&self, month: u32) -> (u32, i32) {
        match self.months.iter().find(|m| **m > month) {
            Some(next) => (*next, 0),
            None => (self.months[0], 1),
        }
    }

    /// Last cycle month strictly before `month`, with the year increment (0 or -1)
    pub fn previous_month(&self, month: u32) -> (u32, i32) {
        match self.months.iter().rev().find(|m| **m < month) {
            Some(previous) => (*previous, 0),
            None => (self.months[self.months.len() - 1], -1),
        }
    }

    /// Step a contract date through the cycle; the result is always month-only
    pub fn step(&self, contract: &ContractDate, steps: i32) -> Result<ContractDate> {
        let mut year = contract.year();
        let mut month = contract.month();

        for _ in 0..steps.unsigned_abs() {
            let (new_month, year_change) = if steps > 0 {
                self.next_month(month)
            } else {
                self.previous_month(month)
            };
            month = new_month;
            year += year_change;
        }

        ContractDate::new(year, month)
    }
}

impl FromStr for RollCycle {
    type Err = RollCalendarError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for RollCycle {
    type Error = RollCalendarError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<RollCycle> for String {
    fn from(value: RollCycle) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RollCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for month in &self.months {
            if let Some(code) = code_from_month(*month) {
                write!(f, "{}", code)?;
            }
        }
        Ok(())
    }
}

/// Roll parameters for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollParameters {
    /// Months we hold
    pub hold_rollcycle: RollCycle,
    /// Months we have prices for (superset of the held months)
    pub priced_rollcycle: RollCycle,
    /// Days relative to expiry at which we would ideally roll (usually negative)
    pub roll_offset_day: i64,
    /// Steps through the priced cycle to the carry contract (-1 previous, +1 next)
    pub carry_offset: i32,
    /// Days added to the contract date to approximate expiry
    pub approx_expiry_offset: i64,
}

impl RollParameters {
    pub fn new(
        hold_rollcycle: &str,
        priced_rollcycle: &str,
        roll_offset_day: i64,
        carry_offset: i32,
        approx_expiry_offset: i64,
    ) -> Result<Self> {
        let parameters = Self {
            hold_rollcycle: RollCycle::new(hold_rollcycle)?,
            priced_rollcycle: RollCycle::new(priced_rollcycle)?,
            roll_offset_day,
            carry_offset,
            approx_expiry_offset,
        };
        parameters.validate()?;
        Ok(parameters)
    }

    /// Check the parameters are internally consistent
    pub fn validate(&self) -> Result<()> {
        if self.carry_offset == 0 {
            return Err(RollCalendarError::ConfigError(
                "Carry offset can't be zero".to_string(),
            ));
        }

        if let Some(month) = self
            .hold_rollcycle
            .months()
            .iter()
            .find(|m| !self.is_priced_month(**m))
        {
            return Err(RollCalendarError::ConfigError(format!(
                "Held month {} is not in priced cycle {}",
                code_from_month(*month).unwrap_or('?'),
                self.priced_rollcycle
            )));
        }

        Ok(())
    }

    /// True if the carry contract comes before the held contract
    pub fn carry_is_prior(&self) -> bool {
        self.carry_offset < 0
    }

    pub fn is_held_month(&self, month: u32) -> bool {
        self.hold_rollcycle.contains_month(month)
    }

    pub fn is_priced_month(&self, month: u32) -> bool {
        self.priced_rollcycle.contains_month(month)
    }
}

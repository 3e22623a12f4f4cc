//! Back out a roll calendar from an existing current/forward price series
//!
//! Legacy carry data already records which contract was priced on every
//! date. A roll happened wherever the priced contract moved on.

use super::{RollCalendar, RollCalendarRow};
use crate::contract_date::ContractDate;
use crate::error::{Result, RollCalendarError};
use crate::types::{Price, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One observation of a stitched current/forward series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardSeriesRow {
    pub dt: Timestamp,
    pub price: Price,
    pub forward: Price,
    pub forward_contract: ContractDate,
    pub price_contract: ContractDate,
    pub carry_contract: ContractDate,
}

/// Stitched series of current and forward prices with their contracts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwardSeries {
    rows: Vec<ForwardSeriesRow>,
}

impl ForwardSeries {
    pub fn new(rows: Vec<ForwardSeriesRow>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: ForwardSeriesRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ForwardSeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop repeated timestamps, keeping the last occurrence of each
    pub fn deduplicated(&self) -> Vec<&ForwardSeriesRow> {
        let mut last_position: HashMap<Timestamp, usize> = HashMap::with_capacity(self.rows.len());
        for (idx, row) in self.rows.iter().enumerate() {
            last_position.insert(row.dt, idx);
        }

        self.rows
            .iter()
            .enumerate()
            .filter(|(idx, row)| last_position.get(&row.dt) == Some(idx))
            .map(|(_, row)| row)
            .collect()
    }
}

impl From<Vec<ForwardSeriesRow>> for ForwardSeries {
    fn from(rows: Vec<ForwardSeriesRow>) -> Self {
        Self::new(rows)
    }
}

impl RollCalendar {
    /// Infer rolls from the priced contract column of a stitched series
    ///
    /// Every date on which the priced contract increases is a roll, with the
    /// current and carry contracts taken from the day before. A final row for
    /// the last date is always added for the position still open there.
    /// Double rolls are possible and are left for the monotonic check to find.
    pub fn back_out_from_current_and_forward_data(series: &ForwardSeries) -> Result<RollCalendar> {
        let final_row = series.rows().last().ok_or_else(|| {
            RollCalendarError::DataError(
                "Can't back out a roll calendar from an empty series".to_string(),
            )
        })?;

        let unique = series.deduplicated();

        let mut rows: Vec<RollCalendarRow> = unique
            .windows(2)
            .filter(|pair| pair[1].price_contract > pair[0].price_contract)
            .map(|pair| {
                let (day_before, roll_day) = (pair[0], pair[1]);
                RollCalendarRow::new(
                    roll_day.dt,
                    day_before.price_contract.clone(),
                    roll_day.price_contract.clone(),
                    day_before.carry_contract.clone(),
                )
            })
            .collect();

        rows.push(RollCalendarRow::new(
            final_row.dt,
            final_row.price_contract.clone(),
            final_row.forward_contract.clone(),
            final_row.carry_contract.clone(),
        ));

        log::info!(
            "Backed out {} rolls from {} observations",
            rows.len(),
            series.len()
        );

        Ok(RollCalendar::new(rows))
    }
}

//! Approximate roll calendar from roll cycle rules
//!
//! Walks the held contract chain from the earliest contract with prices up to
//! the last contract in the price source. Roll dates are the theoretical
//! ones; nothing here guarantees prices exist on them.

use super::RollCalendarRow;
use crate::error::{Result, RollCalendarError};
use crate::navigator::ContractCycleNavigator;
use crate::prices::PriceSeriesSource;

/// Work out roughly when the rolls should be, in cycle order
pub fn generate_approximate_calendar(
    navigator: &dyn ContractCycleNavigator,
    prices: &dyn PriceSeriesSource,
) -> Result<Vec<RollCalendarRow>> {
    let earliest = navigator
        .earliest_held_contract_with_price(prices)
        .ok_or_else(|| RollCalendarError::NoStartingContract {
            hold_cycle: navigator.hold_cycle_description(),
        })?;

    // a starting contract came from the source, so it can't be empty here
    let final_contract = prices
        .last_contract_date()
        .ok_or_else(|| RollCalendarError::DataError("Price source has no contracts".to_string()))?;

    let mut rows = Vec::new();
    let mut current = earliest;

    // The roll date is the last day we hold the current contract
    while current < final_contract {
        let next = match navigator.next_held_contract_with_price(&current, prices)? {
            Some(next) => next,
            None => {
                // Fine if the only held contracts left are beyond the data
                if navigator.next_held_contract(&current)? > final_contract {
                    log::debug!(
                        "No held contracts with prices after {}, stopping before {}",
                        current,
                        final_contract
                    );
                    break;
                }
                return Err(RollCalendarError::NoNextContract {
                    contract: current.to_string(),
                    hold_cycle: navigator.hold_cycle_description(),
                });
            }
        };

        let carry = navigator
            .best_carry_contract_with_price(&current, prices)?
            .ok_or_else(|| RollCalendarError::NoCarryContract {
                contract: current.to_string(),
                hold_cycle: navigator.hold_cycle_description(),
            })?;

        rows.push(RollCalendarRow::new(
            navigator.desired_roll_date(&current),
            current,
            next.clone(),
            carry,
        ));

        current = next;
    }

    log::debug!("Approximate roll calendar has {} rolls", rows.len());

    Ok(rows)
}

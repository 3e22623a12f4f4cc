//! Add carry contracts to a calendar that only has current/next contracts

use super::{ContractRoll, RollCalendar, RollCalendarRow};
use crate::error::Result;
use crate::navigator::ContractCycleNavigator;
use crate::prices::PriceSeriesSource;

/// Work out the carry contract for every roll
///
/// With a negative carry offset the first roll's carry contract can fall
/// before the start of the price history. If it isn't in the price source
/// the whole first roll is dropped so dates and carry stay aligned.
pub fn add_carry_calendar(
    rolls: &[ContractRoll],
    navigator: &dyn ContractCycleNavigator,
    prices: &dyn PriceSeriesSource,
) -> Result<RollCalendar> {
    let mut rows = rolls
        .iter()
        .map(|roll| {
            let carry = navigator.carry_contract(&roll.current_contract)?;
            Ok(RollCalendarRow::new(
                roll.roll_date,
                roll.current_contract.clone(),
                roll.next_contract.clone(),
                carry,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(first) = rows.first() {
        if !prices.contains(&first.carry_contract) {
            log::info!(
                "First carry contract {} missing from prices, dropping roll on {}",
                first.carry_contract,
                first.roll_date
            );
            rows.remove(0);
        }
    }

    Ok(RollCalendar::new(rows))
}

//! Contract cycle navigation
//!
//! Knows which contracts are held, priced and usable as carry, and how to
//! step forward through a roll cycle. The "with price" lookups also consult
//! a [`PriceSeriesSource`] to skip contracts we have no data for.

use crate::contract_date::ContractDate;
use crate::error::Result;
use crate::prices::PriceSeriesSource;
use crate::roll_cycle::RollParameters;
use crate::types::Timestamp;
use chrono::Duration;

/// Navigation through an instrument's contract cycles
pub trait ContractCycleNavigator: Send + Sync {
    /// Description of the held cycle, used in error messages
    fn hold_cycle_description(&self) -> String;

    /// Ideal roll date for a held contract
    fn desired_roll_date(&self, contract: &ContractDate) -> Timestamp;

    /// Next contract in the held cycle
    fn next_held_contract(&self, contract: &ContractDate) -> Result<ContractDate>;

    /// Next contract in the priced cycle
    fn next_priced_contract(&self, contract: &ContractDate) -> Result<ContractDate>;

    /// Previous contract in the priced cycle
    fn previous_priced_contract(&self, contract: &ContractDate) -> Result<ContractDate>;

    /// Carry contract for a held contract
    fn carry_contract(&self, contract: &ContractDate) -> Result<ContractDate>;

    /// Earliest held contract the source has prices for
    fn earliest_held_contract_with_price(
        &self,
        prices: &dyn PriceSeriesSource,
    ) -> Option<ContractDate>;

    /// Scan forward through the held cycle for the next contract with prices
    fn next_held_contract_with_price(
        &self,
        contract: &ContractDate,
        prices: &dyn PriceSeriesSource,
    ) -> Result<Option<ContractDate>> {
        let final_contract = match prices.last_contract_date() {
            Some(final_contract) => final_contract,
            None => return Ok(None),
        };

        let mut candidate = contract.clone();
        while candidate <= final_contract {
            candidate = self.next_held_contract(&candidate)?;
            if prices.has_price_data(&candidate) {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }

    /// Carry contract, if the source has prices for it
    fn best_carry_contract_with_price(
        &self,
        contract: &ContractDate,
        prices: &dyn PriceSeriesSource,
    ) -> Result<Option<ContractDate>> {
        let carry = self.carry_contract(contract)?;
        if prices.has_price_data(&carry) {
            Ok(Some(carry))
        } else {
            Ok(None)
        }
    }
}

impl ContractCycleNavigator for RollParameters {
    fn hold_cycle_description(&self) -> String {
        self.hold_rollcycle.to_string()
    }

    fn desired_roll_date(&self, contract: &ContractDate) -> Timestamp {
        contract.expiry_date(self.approx_expiry_offset) + Duration::days(self.roll_offset_day)
    }

    fn next_held_contract(&self, contract: &ContractDate) -> Result<ContractDate> {
        self.hold_rollcycle.step(contract, 1)
    }

    fn next_priced_contract(&self, contract: &ContractDate) -> Result<ContractDate> {
        self.priced_rollcycle.step(contract, 1)
    }

    fn previous_priced_contract(&self, contract: &ContractDate) -> Result<ContractDate> {
        self.priced_rollcycle.step(contract, -1)
    }

    fn carry_contract(&self, contract: &ContractDate) -> Result<ContractDate> {
        let mut carry = contract.clone();
        for _ in 0..self.carry_offset.unsigned_abs() {
            carry = if self.carry_is_prior() {
                self.previous_priced_contract(&carry)?
            } else {
                self.next_priced_contract(&carry)?
            };
        }
        Ok(carry)
    }

    fn earliest_held_contract_with_price(
        &self,
        prices: &dyn PriceSeriesSource,
    ) -> Option<ContractDate> {
        let mut candidate = prices
            .sorted_contract_dates()
            .into_iter()
            .find(|contract| self.is_held_month(contract.month()) && prices.has_price_data(contract))?;

        // A prior carry can fall before the start of the data
        loop {
            if let Ok(Some(_)) = self.best_carry_contract_with_price(&candidate, prices) {
                return Some(candidate);
            }
            log::debug!("No carry prices for {}, trying the next held contract", candidate);
            candidate = self.next_held_contract_with_price(&candidate, prices).ok()??;
        }
    }
}

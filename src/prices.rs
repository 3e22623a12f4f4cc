//! Per-contract price series and the sources that hold them

use crate::contract_date::ContractDate;
use crate::error::{Result, RollCalendarError};
use crate::types::{Price, Timestamp};
use std::collections::BTreeMap;

/// Time-indexed final prices for one contract
///
/// Missing observations are stored as `NaN` against their timestamp, so an
/// index entry can exist without a usable price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    prices: BTreeMap<Timestamp, Price>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (timestamp, price) points; later duplicates overwrite earlier ones
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (Timestamp, Price)>,
    {
        Self {
            prices: points.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, dt: Timestamp, price: Price) {
        self.prices.insert(dt, price);
    }

    /// Raw value at `dt`; `None` if there is no index entry, may be `NaN`
    pub fn get(&self, dt: &Timestamp) -> Option<Price> {
        self.prices.get(dt).copied()
    }

    /// Usable (non-NaN) price at `dt`
    pub fn price_at(&self, dt: &Timestamp) -> Option<Price> {
        self.get(dt).filter(|p| !p.is_nan())
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Timestamp, &Price)> {
        self.prices.iter()
    }

    /// Sorted timestamps holding a usable price
    pub fn non_missing_dates(&self) -> impl Iterator<Item = &Timestamp> {
        self.prices
            .iter()
            .filter(|(_, p)| !p.is_nan())
            .map(|(dt, _)| dt)
    }

    /// True if at least one observation is usable
    pub fn has_valid_data(&self) -> bool {
        self.non_missing_dates().next().is_some()
    }

    pub fn first_dt(&self) -> Option<Timestamp> {
        self.prices.keys().next().copied()
    }

    pub fn last_dt(&self) -> Option<Timestamp> {
        self.prices.keys().next_back().copied()
    }
}

/// Source of per-contract price series for one instrument
pub trait PriceSeriesSource: Send + Sync {
    /// Prices for a contract, failing with `ContractNotFound` if absent
    fn get(&self, contract: &ContractDate) -> Result<&PriceSeries>;

    /// All contracts held, oldest first
    fn sorted_contract_dates(&self) -> Vec<ContractDate>;

    /// Whether the contract exists as a key
    fn contains(&self, contract: &ContractDate) -> bool {
        self.get(contract).is_ok()
    }

    /// Whether the contract exists and has at least one usable price
    fn has_price_data(&self, contract: &ContractDate) -> bool {
        self.get(contract)
            .map(|series| series.has_valid_data())
            .unwrap_or(false)
    }

    /// Chronologically last contract held
    fn last_contract_date(&self) -> Option<ContractDate> {
        self.sorted_contract_dates().pop()
    }

    /// Chronologically first contract held
    fn earliest_contract_date(&self) -> Option<ContractDate> {
        self.sorted_contract_dates().into_iter().next()
    }
}

/// In-memory price source keyed by contract date
#[derive(Debug, Clone, Default)]
pub struct ContractPriceMap {
    contracts: BTreeMap<ContractDate, PriceSeries>,
}

impl ContractPriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, contract: ContractDate, series: PriceSeries) {
        self.contracts.insert(contract, series);
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContractDate, &PriceSeries)> {
        self.contracts.iter()
    }

    /// Total observations across all contracts
    pub fn total_points(&self) -> usize {
        self.contracts.values().map(PriceSeries::len).sum()
    }
}

impl FromIterator<(ContractDate, PriceSeries)> for ContractPriceMap {
    fn from_iter<I: IntoIterator<Item = (ContractDate, PriceSeries)>>(iter: I) -> Self {
        Self {
            contracts: iter.into_iter().collect(),
        }
    }
}

impl PriceSeriesSource for ContractPriceMap {
    fn get(&self, contract: &ContractDate) -> Result<&PriceSeries> {
        self.contracts
            .get(contract)
            .ok_or_else(|| RollCalendarError::ContractNotFound(contract.to_string()))
    }

    fn sorted_contract_dates(&self) -> Vec<ContractDate> {
        self.contracts.keys().cloned().collect()
    }

    fn contains(&self, contract: &ContractDate) -> bool {
        self.contracts.contains_key(contract)
    }

    fn last_contract_date(&self) -> Option<ContractDate> {
        self.contracts.keys().next_back().cloned()
    }

    fn earliest_contract_date(&self) -> Option<ContractDate> {
        self.contracts.keys().next().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day(d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2020, 3, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_price_series_missing_values() {
        let series = PriceSeries::from_points(vec![(day(1), 100.0), (day(2), f64::NAN), (day(3), 101.0)]);

        assert_eq!(series.len(), 3);
        assert!(series.get(&day(2)).unwrap().is_nan());
        assert_eq!(series.price_at(&day(2)), None);
        assert_eq!(series.price_at(&day(3)), Some(101.0));
        assert_eq!(series.get(&day(4)), None);

        let dates: Vec<Timestamp> = series.non_missing_dates().copied().collect();
        assert_eq!(dates, vec![day(1), day(3)]);
        assert_eq!(series.first_dt(), Some(day(1)));
        assert_eq!(series.last_dt(), Some(day(3)));
    }

    #[test]
    fn test_all_nan_series_has_no_valid_data() {
        let series = PriceSeries::from_points(vec![(day(1), f64::NAN)]);
        assert!(!series.has_valid_data());
        assert!(!PriceSeries::new().has_valid_data());
    }

    #[test]
    fn test_contract_price_map_lookup() {
        let mut prices = ContractPriceMap::new();
        let june: ContractDate = "20200600".parse().unwrap();
        let march: ContractDate = "20200300".parse().unwrap();
        let empty: ContractDate = "20200900".parse().unwrap();

        prices.insert(june.clone(), PriceSeries::from_points(vec![(day(1), 1.0)]));
        prices.insert(march.clone(), PriceSeries::from_points(vec![(day(1), 2.0)]));
        prices.insert(empty.clone(), PriceSeries::from_points(vec![(day(1), f64::NAN)]));

        assert_eq!(prices.len(), 3);
        assert_eq!(prices.earliest_contract_date(), Some(march.clone()));
        assert_eq!(prices.last_contract_date(), Some(empty.clone()));
        assert!(prices.has_price_data(&june));
        assert!(prices.contains(&empty));
        assert!(!prices.has_price_data(&empty));

        let missing: ContractDate = "20201200".parse().unwrap();
        match prices.get(&missing) {
            Err(RollCalendarError::ContractNotFound(id)) => assert_eq!(id, "20201200"),
            other => panic!("Expected ContractNotFound, got {:?}", other),
        }
    }
}

//! Loading prices, stitched series and roll configuration from CSV

pub mod contract_prices;
pub mod forward_series;
pub mod roll_config;

pub use contract_prices::{load_contract_prices, read_contract_price_series, ContractPriceFormat};
pub use forward_series::{load_forward_series, read_forward_series};
pub use roll_config::RollConfig;

use crate::error::{Result, RollCalendarError};
use crate::types::Price;

/// Find column index by name
pub(crate) fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| RollCalendarError::DataError(format!("Column '{}' not found", name)))
}

/// Field of a record by position, named for error messages
pub(crate) fn field<'a>(record: &'a csv::StringRecord, idx: usize, name: &str) -> Result<&'a str> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| RollCalendarError::DataError(format!("Missing {}", name)))
}

/// Parse a price, treating blanks and "nan" as a missing observation
pub(crate) fn parse_price(s: &str) -> Result<Price> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    s.parse()
        .map_err(|_| RollCalendarError::ParseError(format!("Invalid price '{}'", s)))
}

//! # rusty_rollcal
//!
//! Futures roll calendars: when a strategy stops holding one contract and
//! starts holding the next.
//!
//! A roll calendar is built either from individual contract prices, by
//! projecting the ideal roll schedule of an instrument's roll cycle onto the
//! dates where prices actually overlap, or by backing it out of an existing
//! stitched current/forward series. Finished calendars can be checked against
//! prices and stored as CSV.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rusty_rollcal::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let config = RollConfig::from_csv(Path::new("rollconfig.csv"))?;
//!     let parameters = config.get("AUD")?;
//!     let prices = load_contract_prices(Path::new("prices"), "AUD", &ContractPriceFormat::default())?;
//!
//!     let adjusted = RollCalendar::create_from_prices(&prices, parameters)?;
//!     let calendar = adjusted.into_calendar();
//!
//!     if calendar.validate(&prices).is_ok() {
//!         calendar.to_csv(Path::new("AUD.csv"))?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod contract_date;
pub mod data;
pub mod error;
pub mod navigator;
pub mod prices;
pub mod roll_calendar;
pub mod roll_cycle;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::contract_date::ContractDate;
    pub use crate::data::{load_contract_prices, load_forward_series, ContractPriceFormat, RollConfig};
    pub use crate::error::{Result, RollCalendarError};
    pub use crate::navigator::ContractCycleNavigator;
    pub use crate::prices::{ContractPriceMap, PriceSeries, PriceSeriesSource};
    pub use crate::roll_calendar::{
        AdjustedCalendar, ContractRoll, ForwardSeries, ForwardSeriesRow, RollCalendar, RollCalendarRow,
        ValidationFinding, ValidationReport,
    };
    pub use crate::roll_cycle::{RollCycle, RollParameters};
    pub use crate::types::*;
}

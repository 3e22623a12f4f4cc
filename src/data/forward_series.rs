//! Stitched current/forward price files used to back out roll calendars
//!
//! Columns: `DATETIME,PRICE,FORWARD,FORWARD_CONTRACT,PRICE_CONTRACT,CARRY_CONTRACT`

use super::{field, find_column, parse_price};
use crate::error::{Result, RollCalendarError};
use crate::roll_calendar::{ForwardSeries, ForwardSeriesRow};
use crate::types::parse_timestamp;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const COLUMNS: [&str; 6] = [
    "DATETIME",
    "PRICE",
    "FORWARD",
    "FORWARD_CONTRACT",
    "PRICE_CONTRACT",
    "CARRY_CONTRACT",
];

/// Read a stitched series
pub fn read_forward_series<R: Read>(reader: R) -> Result<ForwardSeries> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(COLUMNS) {
        *slot = find_column(&headers, name)?;
    }

    let mut series = ForwardSeries::default();
    for result in rdr.records() {
        let record = result?;
        series.push(ForwardSeriesRow {
            dt: parse_timestamp(field(&record, idx[0], COLUMNS[0])?)?,
            price: parse_price(field(&record, idx[1], COLUMNS[1])?)?,
            forward: parse_price(field(&record, idx[2], COLUMNS[2])?)?,
            forward_contract: field(&record, idx[3], COLUMNS[3])?.parse()?,
            price_contract: field(&record, idx[4], COLUMNS[4])?.parse()?,
            carry_contract: field(&record, idx[5], COLUMNS[5])?.parse()?,
        });
    }

    Ok(series)
}

/// Load a stitched series from a file
pub fn load_forward_series(path: &Path) -> Result<ForwardSeries> {
    let file = File::open(path).map_err(|e| {
        RollCalendarError::DataError(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let series = read_forward_series(file)?;
    log::info!("Loaded {} forward observations from {}", series.len(), path.display());
    Ok(series)
}

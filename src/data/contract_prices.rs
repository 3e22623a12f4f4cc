//! Per-contract price files
//!
//! One file per contract, named `<INSTRUMENT>_<yyyymmdd>.csv`, with a date
//! column and a final price column. Other columns are ignored.

use super::{field, find_column, parse_price};
use crate::contract_date::ContractDate;
use crate::error::{Result, RollCalendarError};
use crate::prices::{ContractPriceMap, PriceSeries};
use crate::types::parse_timestamp;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Column layout of contract price files
#[derive(Debug, Clone)]
pub struct ContractPriceFormat {
    pub date_column: String,
    pub price_column: String,
}

impl Default for ContractPriceFormat {
    fn default() -> Self {
        Self {
            date_column: "DATETIME".to_string(),
            price_column: "FINAL".to_string(),
        }
    }
}

/// Read one contract's prices
pub fn read_contract_price_series<R: Read>(reader: R, format: &ContractPriceFormat) -> Result<PriceSeries> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let date_idx = find_column(&headers, &format.date_column)?;
    let price_idx = find_column(&headers, &format.price_column)?;

    let mut series = PriceSeries::new();
    for result in rdr.records() {
        let record = result?;
        let dt = parse_timestamp(field(&record, date_idx, &format.date_column)?)?;
        let price = parse_price(field(&record, price_idx, &format.price_column)?)?;
        series.insert(dt, price);
    }

    Ok(series)
}

/// Contract date from a file name like `AUD_20200600.csv`, if it belongs to `instrument`
fn contract_from_file_name(file_name: &str, instrument: &str) -> Option<ContractDate> {
    let stem = file_name.strip_suffix(".csv")?;
    let contract = stem.strip_prefix(instrument)?.strip_prefix('_')?;
    contract.parse().ok()
}

/// Load every contract file for an instrument from a directory
pub fn load_contract_prices(dir: &Path, instrument: &str, format: &ContractPriceFormat) -> Result<ContractPriceMap> {
    if !dir.is_dir() {
        return Err(RollCalendarError::DataError(format!(
            "Price directory {} does not exist",
            dir.display()
        )));
    }

    let mut prices = ContractPriceMap::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };

        let contract = match contract_from_file_name(file_name, instrument) {
            Some(contract) => contract,
            None => continue,
        };

        let series = read_contract_price_series(File::open(&path)?, format).map_err(|e| {
            RollCalendarError::DataError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        log::debug!("Loaded {} prices for {} {}", series.len(), instrument, contract);
        prices.insert(contract, series);
    }

    log::info!(
        "Loaded {} contracts ({} prices) for {} from {}",
        prices.len(),
        prices.total_points(),
        instrument,
        dir.display()
    );

    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prices::PriceSeriesSource;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_read_series_with_gaps() {
        let text = "DATETIME,OPEN,HIGH,LOW,FINAL,VOLUME\n\
                    2020-03-02 00:00:00,0.65,0.66,0.64,0.6512,100\n\
                    2020-03-03 00:00:00,0.65,0.66,0.64,,0\n";

        let series = read_contract_price_series(text.as_bytes(), &ContractPriceFormat::default()).unwrap();

        assert_eq!(series.len(), 2);
        let first = Utc.with_ymd_and_hms(2020, 3, 2, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2020, 3, 3, 0, 0, 0).unwrap();
        assert_relative_eq!(series.price_at(&first).unwrap(), 0.6512);
        assert!(series.get(&second).unwrap().is_nan());
    }

    #[test]
    fn test_contract_from_file_name() {
        assert_eq!(
            contract_from_file_name("AUD_20200600.csv", "AUD"),
            Some("20200600".parse().unwrap())
        );
        assert_eq!(contract_from_file_name("AUD_20200600.csv", "EUR"), None);
        assert_eq!(contract_from_file_name("AUDX_20200600.csv", "AUD"), None);
        assert_eq!(contract_from_file_name("AUD_notes.txt", "AUD"), None);
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        for (name, price) in [("AUD_20200300.csv", "0.65"), ("AUD_20200600.csv", "0.66"), ("EUR_20200300.csv", "1.1")] {
            let mut file = File::create(dir.path().join(name)).unwrap();
            writeln!(file, "DATETIME,FINAL\n2020-03-02 00:00:00,{}", price).unwrap();
        }

        let prices = load_contract_prices(dir.path(), "AUD", &ContractPriceFormat::default()).unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(prices.last_contract_date(), Some("20200600".parse().unwrap()));
    }

    #[test]
    fn test_missing_directory() {
        let result = load_contract_prices(Path::new("/nonexistent/prices"), "AUD", &ContractPriceFormat::default());
        assert!(result.is_err());
    }
}

//! Roll configuration for all instruments
//!
//! ```text
//! Instrument,HoldRollCycle,RollOffsetDays,CarryOffset,PricedRollCycle,ExpiryOffset
//! AUD,HMUZ,-5,1,HMUZ,15
//! ```

use crate::error::{Result, RollCalendarError};
use crate::roll_cycle::RollParameters;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RollConfigRecord {
    #[serde(rename = "Instrument")]
    instrument: String,
    #[serde(rename = "HoldRollCycle")]
    hold_rollcycle: String,
    #[serde(rename = "RollOffsetDays")]
    roll_offset_day: i64,
    #[serde(rename = "CarryOffset")]
    carry_offset: i32,
    #[serde(rename = "PricedRollCycle")]
    priced_rollcycle: String,
    #[serde(rename = "ExpiryOffset", default)]
    approx_expiry_offset: i64,
}

/// Roll parameters by instrument code
#[derive(Debug, Clone, Default)]
pub struct RollConfig {
    instruments: BTreeMap<String, RollParameters>,
}

impl RollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instrument: impl Into<String>, parameters: RollParameters) {
        self.instruments.insert(instrument.into(), parameters);
    }

    /// Parameters for an instrument
    pub fn get(&self, instrument: &str) -> Result<&RollParameters> {
        self.instruments.get(instrument).ok_or_else(|| {
            RollCalendarError::ConfigError(format!("No roll parameters for instrument {}", instrument))
        })
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Read and validate every row
    pub fn read_csv<R: Read>(reader: R) -> Result<RollConfig> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut config = RollConfig::new();

        for result in rdr.deserialize() {
            let record: RollConfigRecord = result?;
            let parameters = RollParameters::new(
                &record.hold_rollcycle,
                &record.priced_rollcycle,
                record.roll_offset_day,
                record.carry_offset,
                record.approx_expiry_offset,
            )
            .map_err(|e| {
                RollCalendarError::ConfigError(format!(
                    "Bad roll parameters for {}: {}",
                    record.instrument, e
                ))
            })?;

            config.insert(record.instrument, parameters);
        }

        Ok(config)
    }

    pub fn from_csv(path: &Path) -> Result<RollConfig> {
        let file = File::open(path).map_err(|e| {
            RollCalendarError::ConfigError(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let config = Self::read_csv(file)?;
        log::info!("Loaded roll parameters for {} instruments", config.len());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Instrument,HoldRollCycle,RollOffsetDays,CarryOffset,PricedRollCycle,ExpiryOffset\n\
                          AUD,HMUZ,-5,1,HMUZ,15\n\
                          CRUDE_W,Z,-20,-1,FGHJKMNQUVXZ,-10\n";

    #[test]
    fn test_read_config() {
        let config = RollConfig::read_csv(SAMPLE.as_bytes()).unwrap();

        assert_eq!(config.len(), 2);
        let crude = config.get("CRUDE_W").unwrap();
        assert_eq!(crude.hold_rollcycle.to_string(), "Z");
        assert_eq!(crude.carry_offset, -1);
        assert_eq!(crude.approx_expiry_offset, -10);
        assert_eq!(config.instruments().collect::<Vec<_>>(), vec!["AUD", "CRUDE_W"]);
    }

    #[test]
    fn test_unknown_instrument() {
        let config = RollConfig::read_csv(SAMPLE.as_bytes()).unwrap();
        assert!(matches!(config.get("GOLD"), Err(RollCalendarError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_row_rejected() {
        let text = "Instrument,HoldRollCycle,RollOffsetDays,CarryOffset,PricedRollCycle,ExpiryOffset\n\
                    BAD,HMUZ,-5,0,HMUZ,0\n";
        match RollConfig::read_csv(text.as_bytes()) {
            Err(RollCalendarError::ConfigError(msg)) => assert!(msg.contains("BAD")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }
}

//! Roll calendar CSV storage
//!
//! Format: one row per roll, date index first.
//!
//! ```text
//! DATE_TIME,current_contract,next_contract,carry_contract
//! 2020-03-18 00:00:00,20200300,20200600,20200900
//! ```

use super::{
    ContractRoll, RollCalendar, RollCalendarRow, CARRY_CONTRACT, CURRENT_CONTRACT, DATE_INDEX_NAME,
    NEXT_CONTRACT,
};
use crate::contract_date::ContractDate;
use crate::data::{field, find_column};
use crate::error::Result;
use crate::types::{format_timestamp, parse_timestamp};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

impl RollCalendar {
    /// Write the calendar as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([DATE_INDEX_NAME, CURRENT_CONTRACT, NEXT_CONTRACT, CARRY_CONTRACT])?;

        for row in self.rows() {
            wtr.write_record([
                format_timestamp(&row.roll_date).as_str(),
                row.current_contract.as_str(),
                row.next_contract.as_str(),
                row.carry_contract.as_str(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write the calendar to a CSV file
    pub fn to_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)?;
        log::info!("Wrote {} rolls to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a calendar with a carry column
    pub fn read_csv<R: Read>(reader: R) -> Result<RollCalendar> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();

        let date_idx = find_column(&headers, DATE_INDEX_NAME)?;
        let current_idx = find_column(&headers, CURRENT_CONTRACT)?;
        let next_idx = find_column(&headers, NEXT_CONTRACT)?;
        let carry_idx = find_column(&headers, CARRY_CONTRACT)?;

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(RollCalendarRow::new(
                parse_timestamp(field(&record, date_idx, DATE_INDEX_NAME)?)?,
                field(&record, current_idx, CURRENT_CONTRACT)?.parse()?,
                field(&record, next_idx, NEXT_CONTRACT)?.parse()?,
                field(&record, carry_idx, CARRY_CONTRACT)?.parse()?,
            ));
        }

        Ok(RollCalendar::new(rows))
    }

    /// Read a calendar from a CSV file
    pub fn from_csv(path: &Path) -> Result<RollCalendar> {
        let calendar = Self::read_csv(File::open(path)?)?;
        log::debug!("Read {} rolls from {}", calendar.len(), path.display());
        Ok(calendar)
    }
}

/// Read current/next contracts only, ignoring any carry column
pub fn read_contract_rolls<R: Read>(reader: R) -> Result<Vec<ContractRoll>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let date_idx = find_column(&headers, DATE_INDEX_NAME)?;
    let current_idx = find_column(&headers, CURRENT_CONTRACT)?;
    let next_idx = find_column(&headers, NEXT_CONTRACT)?;

    let mut rolls = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let current: ContractDate = field(&record, current_idx, CURRENT_CONTRACT)?.parse()?;
        let next: ContractDate = field(&record, next_idx, NEXT_CONTRACT)?.parse()?;
        rolls.push(ContractRoll::new(
            parse_timestamp(field(&record, date_idx, DATE_INDEX_NAME)?)?,
            current,
            next,
        ));
    }

    Ok(rolls)
}

/// Read current/next contracts from a CSV file
pub fn contract_rolls_from_csv(path: &Path) -> Result<Vec<ContractRoll>> {
    read_contract_rolls(File::open(path)?)
}

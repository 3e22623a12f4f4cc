//! Checks on finished roll calendars
//!
//! Neither check stops at the first problem: every finding is logged and
//! collected so the caller can decide whether the calendar is usable.

use super::RollCalendar;
use crate::contract_date::ContractDate;
use crate::prices::PriceSeriesSource;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single problem found in a roll calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFinding {
    /// Date not after the one before it
    NonMonotonicDate { row: usize, roll_date: Timestamp },
    /// Contract has no prices at all
    MissingContract { roll_date: Timestamp, contract: ContractDate },
    /// Contract prices have no entry on the roll date
    MissingPriceOnRollDate { roll_date: Timestamp, contract: ContractDate },
    /// Contract price on the roll date is NaN
    NanPriceOnRollDate { roll_date: Timestamp, contract: ContractDate },
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFinding::NonMonotonicDate { row, roll_date } => write!(
                f,
                "Date index not monotonically increasing at row {} ({})",
                row, roll_date
            ),
            ValidationFinding::MissingContract { roll_date, contract } => write!(
                f,
                "On roll date {} contract {} is missing from futures prices",
                roll_date, contract
            ),
            ValidationFinding::MissingPriceOnRollDate { roll_date, contract } => write!(
                f,
                "Roll date {} missing from prices for {}",
                roll_date, contract
            ),
            ValidationFinding::NanPriceOnRollDate { roll_date, contract } => {
                write!(f, "NAN for price on {} for {}", roll_date, contract)
            }
        }
    }
}

/// Result of a calendar check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    /// True when nothing was found
    pub fn is_ok(&self) -> bool {
        self.findings.is_empty()
    }

    fn record(&mut self, finding: ValidationFinding) {
        log::warn!("{}", finding);
        self.findings.push(finding);
    }

    /// Combine two reports
    pub fn merge(mut self, other: ValidationReport) -> ValidationReport {
        self.findings.extend(other.findings);
        self
    }
}

impl RollCalendar {
    /// Check the roll dates are strictly increasing
    pub fn check_if_date_index_monotonic(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (idx, pair) in self.rows().windows(2).enumerate() {
            if pair[1].roll_date <= pair[0].roll_date {
                report.record(ValidationFinding::NonMonotonicDate {
                    row: idx + 1,
                    roll_date: pair[1].roll_date,
                });
            }
        }

        report
    }

    /// Check every contract exists and current/next have prices on each roll date
    ///
    /// The carry contract is only checked for existence: alignment doesn't
    /// require the row's own carry to be priced on the roll date.
    pub fn check_dates_are_valid_for_prices(&self, prices: &dyn PriceSeriesSource) -> ValidationReport {
        let mut report = ValidationReport::default();

        for row in self.rows() {
            let roll_date = row.roll_date;

            for contract in [&row.current_contract, &row.next_contract] {
                let series = match prices.get(contract) {
                    Ok(series) => series,
                    Err(_) => {
                        report.record(ValidationFinding::MissingContract {
                            roll_date,
                            contract: contract.clone(),
                        });
                        continue;
                    }
                };

                match series.get(&roll_date) {
                    None => report.record(ValidationFinding::MissingPriceOnRollDate {
                        roll_date,
                        contract: contract.clone(),
                    }),
                    Some(price) if price.is_nan() => {
                        report.record(ValidationFinding::NanPriceOnRollDate {
                            roll_date,
                            contract: contract.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }

            if !prices.contains(&row.carry_contract) {
                report.record(ValidationFinding::MissingContract {
                    roll_date,
                    contract: row.carry_contract.clone(),
                });
            }
        }

        report
    }

    /// Both checks together
    pub fn validate(&self, prices: &dyn PriceSeriesSource) -> ValidationReport {
        self.check_if_date_index_monotonic()
            .merge(self.check_dates_are_valid_for_prices(prices))
    }
}

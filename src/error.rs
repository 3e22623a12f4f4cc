//! Error types for rusty_rollcal

use thiserror::Error;

/// Main error type for roll calendar construction
#[derive(Error, Debug)]
pub enum RollCalendarError {
    #[error("Can't find any valid starting contract using hold cycle {hold_cycle}")]
    NoStartingContract { hold_cycle: String },

    #[error(
        "Can't find good next contract after {contract} from data when building roll calendar using hold cycle {hold_cycle}"
    )]
    NoNextContract { contract: String, hold_cycle: String },

    #[error(
        "Can't find good carry contract for {contract} from data when building roll calendar using hold cycle {hold_cycle}"
    )]
    NoCarryContract { contract: String, hold_cycle: String },

    #[error("No following roll to take a carry contract from for {contract}")]
    NoNextRowForCarry { contract: String },

    #[error("Contract not found in prices: {0}")]
    ContractNotFound(String),

    #[error("Invalid contract date: {0}")]
    InvalidContractDate(String),

    #[error("Invalid roll cycle: {0}")]
    InvalidRollCycle(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for roll calendar operations
pub type Result<T> = std::result::Result<T, RollCalendarError>;

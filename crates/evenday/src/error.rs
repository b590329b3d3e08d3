//! Error types for evenday operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvendayError {
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid timetable: {0}")]
    InvalidTimeTable(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

pub type Result<T> = std::result::Result<T, EvendayError>;

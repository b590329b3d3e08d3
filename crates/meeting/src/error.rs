//! Error types for booking operations.

use thiserror::Error;

use evenday::EvendayError;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum MeetingError {
    #[error("Validation error: {0}")]
    Validation(#[from] EvendayError),

    #[error("Interval {length} is not defined ({matches} matching definitions)")]
    IntervalNotDefined { length: i64, matches: usize },

    #[error("Interval does not fit into timetable")]
    OutsideTimeTable,

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Number of timetables is not one: found {count}")]
    TimeTableCount { count: usize },

    #[error("That time is already taken")]
    AlreadyTaken,

    #[error("Can't advise, all day is taken")]
    FullyBooked,

    #[error("Only professionals can save timetables")]
    NotProfessional,

    #[error("Store {operation} on '{collection}' failed: {source}")]
    Store {
        operation: &'static str,
        collection: String,
        #[source]
        source: StoreError,
    },
}

/// Coarse classification of [`MeetingError`] for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed timetable, interval, length, document or configuration.
    Validation,
    /// A professional does not have exactly one timetable.
    Multiplicity,
    /// The requested time is taken or nothing free is left.
    Conflict,
    /// The caller's role does not allow the operation.
    Permission,
    /// The document store failed; retry policy is the caller's.
    Persistence,
}

impl MeetingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeetingError::Validation(_)
            | MeetingError::IntervalNotDefined { .. }
            | MeetingError::OutsideTimeTable
            | MeetingError::MalformedDocument(_)
            | MeetingError::InvalidOptions(_) => ErrorKind::Validation,
            MeetingError::TimeTableCount { .. } => ErrorKind::Multiplicity,
            MeetingError::AlreadyTaken | MeetingError::FullyBooked => ErrorKind::Conflict,
            MeetingError::NotProfessional => ErrorKind::Permission,
            MeetingError::Store { .. } => ErrorKind::Persistence,
        }
    }
}

pub type Result<T> = std::result::Result<T, MeetingError>;

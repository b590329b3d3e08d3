//! # evenday
//!
//! Deterministic appointment-slot computation.
//!
//! `evenday` answers one question with mathematical certainty: given a
//! professional's weekly working hours and the bookings already taken on a
//! day, which slots of a requested length are still free, and which of them
//! is closest to the time the client asked for?
//!
//! ## Modules
//!
//! - [`interval`] — Validated minute-of-day ranges `[start, end)`
//! - [`calendar`] — Timestamp → weekday / minute-of-day / day key in one zone
//! - [`timetable`] — Per-weekday working windows, parsing and containment
//! - [`schedule`] — Already-booked intervals of one professional on one date
//! - [`advisor`] — Free-slot search and proximity ranking
//! - [`error`] — Error types

pub mod advisor;
pub mod calendar;
pub mod error;
pub mod interval;
pub mod schedule;
pub mod timetable;

pub use advisor::{free_segments, Advisor};
pub use calendar::Calendar;
pub use error::EvendayError;
pub use interval::{Interval, MINUTES_PER_DAY};
pub use schedule::DaySchedule;
pub use timetable::{RawTimeTable, TimeTable, WindowSet};

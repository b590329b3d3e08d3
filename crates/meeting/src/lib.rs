//! # meeting
//!
//! Appointment booking between professionals and their clients.
//!
//! Professionals publish a weekly timetable; clients book meetings of one of
//! the professional's allowed lengths. Every booking is checked against the
//! timetable and against the professional's existing bookings, and a client
//! asking for a taken time can be pointed at the closest free slot instead.
//! All state lives in an external [`DocumentStore`]; the slot arithmetic is
//! delegated to [`evenday`].
//!
//! ## Modules
//!
//! - [`entries`] — Booking orchestration: suggest, insert, visibility
//! - [`timetables`] — One timetable document per professional
//! - [`store`] — Document store seam, typed queries, filters
//! - [`memory`] — In-memory document store
//! - [`records`] — Typed documents persisted by this crate
//! - [`context`] — Caller identity and role
//! - [`options`] — Collection names and calendar zone
//! - [`locks`] — Per-professional write serialization
//! - [`error`] — Error types

pub mod context;
pub mod entries;
pub mod error;
pub mod locks;
pub mod memory;
pub mod options;
pub mod records;
pub mod store;
pub mod timetables;

pub use context::{RequestContext, Role};
pub use entries::{BookingRequest, Entries};
pub use error::{ErrorKind, MeetingError};
pub use locks::ProfessionalLocks;
pub use memory::MemoryStore;
pub use options::MeetingOptions;
pub use records::{AllowedLength, Booking, TimeTableDocument, UserId};
pub use store::{Document, DocumentId, DocumentStore, Filter, Predicate, Query, StoreError};
pub use timetables::TimeTables;

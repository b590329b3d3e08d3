//! Booking orchestration.
//!
//! [`Entries`] validates and commits bookings and answers "when is the
//! closest free slot?" queries. A booking request goes through:
//!
//! 1. **Length**: the professional must have exactly one allowed-length
//!    definition matching the requested minutes.
//! 2. **Timetable**: the professional must have exactly one timetable, and the
//!    requested range must sit inside one open window of its weekday.
//! 3. **Conflicts**: no booking of the same professional may overlap it.
//!    Back-to-back bookings that share only a boundary are fine.
//! 4. **Commit**: the booking is stored with its derived end and day key.
//!
//! Steps 3 and 4 run under the professional's lock from [`ProfessionalLocks`],
//! closing the window in which two concurrent requests could both pass the
//! conflict check.
//!
//! Visibility: professionals see the bookings made for them, clients see the
//! bookings they made. A professional booking another professional acts as a
//! client there but still only sees bookings made for themself.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use evenday::{Advisor, Calendar, DaySchedule, EvendayError, Interval};

use crate::context::RequestContext;
use crate::error::{MeetingError, Result};
use crate::locks::ProfessionalLocks;
use crate::options::MeetingOptions;
use crate::records::{fields, Booking, UserId};
use crate::store::{DocumentStore, Filter, Predicate, Query};
use crate::timetables;

/// A client's request for a meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    /// The professional to meet.
    pub professional: UserId,
    /// Requested start, Unix seconds.
    pub from: i64,
    /// Requested length in minutes.
    pub length: i64,
}

impl BookingRequest {
    pub fn new(professional: impl Into<UserId>, from: i64, length: i64) -> Self {
        Self {
            professional: professional.into(),
            from,
            length,
        }
    }

    /// Requested end, Unix seconds.
    pub fn to(&self) -> Result<i64> {
        self.length
            .checked_mul(60)
            .and_then(|secs| self.from.checked_add(secs))
            .ok_or_else(|| {
                EvendayError::InvalidInterval(format!("length {} overflows", self.length)).into()
            })
    }
}

/// Booking operations on behalf of one caller.
pub struct Entries<S: ?Sized> {
    store: Arc<S>,
    ctx: RequestContext,
    options: MeetingOptions,
    calendar: Calendar,
    locks: ProfessionalLocks,
}

impl<S: DocumentStore + ?Sized> Entries<S> {
    /// Booking operations for `resource`, configured from the context's
    /// options document at `nouns.<resource>.options`.
    ///
    /// # Errors
    ///
    /// Fails if the resource's options are malformed or name an unknown timezone.
    pub fn new(
        store: Arc<S>,
        ctx: RequestContext,
        resource: &str,
        locks: ProfessionalLocks,
    ) -> Result<Self> {
        let options = MeetingOptions::from_document(ctx.options(), resource)?;
        let calendar = options.calendar()?;
        Ok(Self {
            store,
            ctx,
            options,
            calendar,
            locks,
        })
    }

    /// Restrict `filter` to the bookings the caller may see.
    pub fn scope(&self, filter: &mut Filter<S>) {
        let field = if self.ctx.is_professional() {
            fields::FOR_PROFESSIONAL
        } else {
            fields::CREATED_BY
        };
        filter.add_query(Predicate::equals(field, self.ctx.user()));
    }

    /// The booking collection, scoped to the caller.
    pub fn filter(&self) -> Filter<S> {
        let mut filter = self.unscoped(Query::new());
        self.scope(&mut filter);
        filter
    }

    /// Every booking visible to the caller.
    pub fn visible(&self) -> Result<Vec<Booking>> {
        self.filter()
            .find()?
            .iter()
            .map(|doc| Booking::from_document(&doc.body))
            .collect()
    }

    /// Up to `count` free slots of the requested length on the requested day,
    /// closest to the requested start first.
    ///
    /// Slots are minute-of-day intervals on the local date of `request.from`.
    #[instrument(skip(self, request), fields(professional = %request.professional, from = request.from, length = request.length))]
    pub fn suggest(&self, request: &BookingRequest, count: usize) -> Result<Vec<Interval>> {
        self.check_length(&request.professional, request.length)?;
        let time_table = timetables::load_for(&self.store, &self.options, &request.professional)?;
        let taken = self.day_schedule(&request.professional, request.from)?;

        let wanted = self.calendar.interval(request.from, request.to()?)?;
        let weekday = self.calendar.weekday(request.from)?;
        let slots = Advisor::new(time_table.day(weekday), &taken)
            .amount(count)
            .advise(&wanted);

        debug!(%wanted, taken = taken.len(), found = slots.len(), "advised");
        Ok(slots)
    }

    /// The single free slot closest to the requested one.
    ///
    /// # Errors
    ///
    /// - [`MeetingError::IntervalNotDefined`] for a length the professional does not offer.
    /// - [`MeetingError::TimeTableCount`] unless the professional has exactly one timetable.
    /// - [`MeetingError::FullyBooked`] if no slot of that length is left on the day.
    pub fn suggest_closest(&self, request: &BookingRequest) -> Result<Interval> {
        self.suggest(request, 1)?
            .into_iter()
            .next()
            .ok_or(MeetingError::FullyBooked)
    }

    /// Validate and commit a booking made by the caller.
    ///
    /// # Errors
    ///
    /// - [`MeetingError::IntervalNotDefined`] for a length the professional does not offer.
    /// - [`MeetingError::TimeTableCount`] unless the professional has exactly one timetable.
    /// - [`MeetingError::OutsideTimeTable`] if the range leaves the working windows.
    /// - [`MeetingError::AlreadyTaken`] if it overlaps another booking.
    /// - [`MeetingError::Store`] if the store fails.
    #[instrument(skip(self, request), fields(professional = %request.professional, from = request.from, length = request.length))]
    pub fn insert(&self, request: &BookingRequest) -> Result<Booking> {
        self.check_length(&request.professional, request.length)?;
        let to = request.to()?;
        self.check_time_table(&request.professional, request.from, to)?;

        let booking = Booking {
            created_by: self.ctx.user().clone(),
            professional: request.professional.clone(),
            from: request.from,
            to,
            length: request.length,
            day: self.calendar.day_key(request.from)?,
        };
        let document = booking.to_document()?;

        self.locks.with(&request.professional, || -> Result<()> {
            self.check_conflicts(&request.professional, request.from, to)?;
            let id = self.filter().insert(document)?;
            info!(%id, day = %booking.day, "booking committed");
            Ok(())
        })?;

        Ok(booking)
    }

    /// Removing bookings is not supported; this acknowledges and does nothing.
    pub fn delete(&self) -> Result<()> {
        debug!("booking removal is not supported, ignoring");
        Ok(())
    }

    fn unscoped(&self, base: Query) -> Filter<S> {
        Filter::new(
            Arc::clone(&self.store),
            self.options.entry_coll.as_str(),
            base,
        )
    }

    fn check_length(&self, professional: &UserId, length: i64) -> Result<()> {
        let matches = Filter::new(
            Arc::clone(&self.store),
            self.options.interval_coll.as_str(),
            Query::new()
                .and(Predicate::equals(fields::PROFESSIONAL, professional))
                .and(Predicate::equals(fields::LENGTH, length)),
        )
        .count()?;
        if matches != 1 {
            warn!(length, matches, "length not offered");
            return Err(MeetingError::IntervalNotDefined { length, matches });
        }
        Ok(())
    }

    fn check_time_table(&self, professional: &UserId, from: i64, to: i64) -> Result<()> {
        let interval = self.calendar.interval(from, to)?;
        let weekday = self.calendar.weekday(from)?;
        let time_table = timetables::load_for(&self.store, &self.options, professional)?;
        if !time_table.contains(weekday, &interval) {
            warn!(%interval, %weekday, "outside timetable");
            return Err(MeetingError::OutsideTimeTable);
        }
        Ok(())
    }

    /// Rejects any booking of `professional` that overlaps `[from, to)`: one
    /// whose start or end falls strictly inside the range, or one that covers
    /// the whole range. Shared boundaries do not count.
    fn check_conflicts(&self, professional: &UserId, from: i64, to: i64) -> Result<()> {
        let overlapping = Predicate::Any(vec![
            Predicate::strictly_between(fields::FROM, from, to),
            Predicate::strictly_between(fields::TO, from, to),
            Predicate::All(vec![
                Predicate::AtMost(fields::FROM.to_string(), from),
                Predicate::AtLeast(fields::TO.to_string(), to),
            ]),
        ]);
        let clashes = self
            .unscoped(Query::new())
            .with(Predicate::equals(fields::FOR_PROFESSIONAL, professional))
            .with(overlapping)
            .count()?;
        if clashes > 0 {
            warn!(clashes, "time already taken");
            return Err(MeetingError::AlreadyTaken);
        }
        Ok(())
    }

    fn day_schedule(&self, professional: &UserId, from: i64) -> Result<DaySchedule> {
        let docs = self
            .unscoped(Query::new())
            .with(Predicate::equals(fields::FOR_PROFESSIONAL, professional))
            .with(Predicate::equals(fields::DAY, self.calendar.day_key(from)?))
            .find()?;
        let ranges = docs
            .iter()
            .map(|doc| Booking::from_document(&doc.body).map(|b| (b.from, b.to)))
            .collect::<Result<Vec<_>>>()?;
        Ok(DaySchedule::from_ranges(&self.calendar, ranges)?)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

//! The timetable manager.
//!
//! Every professional owns exactly one timetable document. Saving restores
//! that invariant whatever state the collection is in: the first save
//! inserts, later saves update in place, and a duplicated timetable (which
//! only a faulty writer could produce) is collapsed back into one document.
//!
//! Timetables are private to their owner: clients cannot read any timetable
//! through the manager, although booking checks still consult it.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use evenday::{RawTimeTable, TimeTable};

use crate::context::RequestContext;
use crate::error::{MeetingError, Result};
use crate::locks::ProfessionalLocks;
use crate::options::MeetingOptions;
use crate::records::{fields, TimeTableDocument, UserId};
use crate::store::{DocumentStore, Filter, Predicate, Query};

/// Timetable operations on behalf of one caller.
pub struct TimeTables<S: ?Sized> {
    store: Arc<S>,
    ctx: RequestContext,
    options: MeetingOptions,
    locks: ProfessionalLocks,
}

impl<S: DocumentStore + ?Sized> TimeTables<S> {
    /// Timetable operations for `resource`, with collection names taken from
    /// the context's options document at `nouns.<resource>.options`.
    ///
    /// # Errors
    ///
    /// [`MeetingError::InvalidOptions`] if the resource's options are malformed.
    pub fn new(
        store: Arc<S>,
        ctx: RequestContext,
        resource: &str,
        locks: ProfessionalLocks,
    ) -> Result<Self> {
        let options = MeetingOptions::from_document(ctx.options(), resource)?;
        Ok(Self {
            store,
            ctx,
            options,
            locks,
        })
    }

    /// Restrict `filter` to what the caller may see: a professional sees their
    /// own timetable, anyone else sees nothing.
    pub fn scope(&self, filter: &mut Filter<S>) {
        if self.ctx.is_professional() {
            filter.add_query(Predicate::equals(fields::CREATED_BY, self.ctx.user()));
        } else {
            filter.add_query(Predicate::Never);
        }
    }

    /// The timetable collection, scoped to the caller.
    pub fn filter(&self) -> Filter<S> {
        let mut filter = Filter::new(
            Arc::clone(&self.store),
            self.options.time_table_coll.as_str(),
            Query::new(),
        );
        self.scope(&mut filter);
        filter
    }

    /// Validate and store the caller's weekly timetable.
    ///
    /// # Errors
    ///
    /// - [`MeetingError::NotProfessional`] if the caller is a client.
    /// - [`MeetingError::Validation`] if the submitted timetable is malformed.
    /// - [`MeetingError::Store`] if the store fails.
    #[instrument(skip(self, raw), fields(professional = %self.ctx.user()))]
    pub fn save(&self, raw: &RawTimeTable) -> Result<TimeTable> {
        if !self.ctx.is_professional() {
            warn!("timetable save refused for non-professional");
            return Err(MeetingError::NotProfessional);
        }
        let time_table = TimeTable::parse(raw)?;
        let record = TimeTableDocument {
            created_by: self.ctx.user().clone(),
            time_table,
        };
        let document = record.to_document()?;

        self.locks.with(self.ctx.user(), || -> Result<()> {
            let filter = self.filter();
            match filter.count()? {
                0 => {
                    filter.insert(document)?;
                    info!("timetable created");
                }
                1 => {
                    let only = filter.select_one()?;
                    filter.update(&only.id, document)?;
                    info!(id = %only.id, "timetable updated");
                }
                count => {
                    warn!(count, "duplicate timetables, replacing");
                    filter.remove_all()?;
                    filter.insert(document)?;
                }
            }
            Ok(())
        })?;

        Ok(record.time_table)
    }

    /// The caller's own timetable.
    ///
    /// # Errors
    ///
    /// [`MeetingError::TimeTableCount`] unless exactly one is visible, which
    /// is always the case for clients.
    pub fn load(&self) -> Result<TimeTable> {
        load_time_table(&self.filter())
    }
}

/// The timetable of `professional`, bypassing caller visibility.
pub(crate) fn load_for<S: DocumentStore + ?Sized>(
    store: &Arc<S>,
    options: &MeetingOptions,
    professional: &UserId,
) -> Result<TimeTable> {
    let filter = Filter::new(
        Arc::clone(store),
        options.time_table_coll.as_str(),
        Query::new().and(Predicate::equals(fields::CREATED_BY, professional)),
    );
    load_time_table(&filter)
}

fn load_time_table<S: DocumentStore + ?Sized>(filter: &Filter<S>) -> Result<TimeTable> {
    let mut docs = filter.find()?;
    if docs.len() != 1 {
        return Err(MeetingError::TimeTableCount { count: docs.len() });
    }
    let doc = docs.remove(0);
    debug!(id = %doc.id, "timetable loaded");
    Ok(TimeTableDocument::from_document(&doc.body)?.time_table)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Role;
    use crate::error::ErrorKind;
    use crate::memory::MemoryStore;
    use chrono::Weekday;
    use evenday::Interval;
    use serde_json::json;

    const PROF: &str = "prof-1";

    fn manager(store: &Arc<MemoryStore>, user: &str, role: Role) -> TimeTables<MemoryStore> {
        TimeTables::new(
            Arc::clone(store),
            RequestContext::new(user, role),
            "meetings",
            ProfessionalLocks::new(),
        )
        .unwrap()
    }

    fn week(entry: &str) -> RawTimeTable {
        RawTimeTable::Days(vec![entry.to_string(); 5])
    }

    fn own_docs(store: &MemoryStore) -> usize {
        store
            .dump("timeTables")
            .iter()
            .filter(|d| d.body["createdBy"] == json!(PROF))
            .count()
    }

    #[test]
    fn test_save_inserts_then_updates() {
        let store = Arc::new(MemoryStore::new());
        let tt = manager(&store, PROF, Role::Professional);

        tt.save(&week("08:00-17:00")).unwrap();
        let first = store.dump("timeTables");
        assert_eq!(first.len(), 1);

        tt.save(&week("09:00-12:00")).unwrap();
        let second = store.dump("timeTables");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, first[0].id);

        let loaded = tt.load().unwrap();
        assert_eq!(
            loaded.day(Weekday::Mon).windows(),
            &[Interval::new(540, 720).unwrap()]
        );
    }

    #[test]
    fn test_save_collapses_duplicates() {
        let store = Arc::new(MemoryStore::new());
        let stale = TimeTableDocument {
            created_by: UserId::new(PROF),
            time_table: TimeTable::new(),
        }
        .to_document()
        .unwrap();
        store.insert("timeTables", stale.clone()).unwrap();
        store.insert("timeTables", stale).unwrap();

        let tt = manager(&store, PROF, Role::Professional);
        assert_eq!(tt.load().unwrap_err().kind(), ErrorKind::Multiplicity);

        tt.save(&week("08:00-17:00")).unwrap();
        assert_eq!(own_docs(&store), 1);
        assert!(tt.load().is_ok());
    }

    #[test]
    fn test_save_leaves_other_professionals_alone() {
        let store = Arc::new(MemoryStore::new());
        manager(&store, "prof-2", Role::Professional)
            .save(&week("10:00-11:00"))
            .unwrap();
        manager(&store, PROF, Role::Professional)
            .save(&week("08:00-17:00"))
            .unwrap();
        assert_eq!(store.dump("timeTables").len(), 2);
    }

    #[test]
    fn test_client_cannot_save() {
        let store = Arc::new(MemoryStore::new());
        let err = manager(&store, "client-1", Role::Client)
            .save(&week("08:00-17:00"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert!(store.dump("timeTables").is_empty());
    }

    #[test]
    fn test_invalid_timetable_is_not_stored() {
        let store = Arc::new(MemoryStore::new());
        let err = manager(&store, PROF, Role::Professional)
            .save(&week("17:00-08:00"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(store.dump("timeTables").is_empty());
    }

    #[test]
    fn test_client_sees_no_timetable() {
        let store = Arc::new(MemoryStore::new());
        manager(&store, PROF, Role::Professional)
            .save(&week("08:00-17:00"))
            .unwrap();
        let client = manager(&store, "client-1", Role::Client);
        assert_eq!(client.filter().count().unwrap(), 0);
        assert!(matches!(
            client.load(),
            Err(MeetingError::TimeTableCount { count: 0 })
        ));
    }

    #[test]
    fn test_professional_sees_only_own_timetable() {
        let store = Arc::new(MemoryStore::new());
        manager(&store, "prof-2", Role::Professional)
            .save(&week("10:00-11:00"))
            .unwrap();
        let own = manager(&store, PROF, Role::Professional);
        assert_eq!(own.filter().count().unwrap(), 0);
        own.save(&week("08:00-17:00")).unwrap();
        assert_eq!(own.filter().count().unwrap(), 1);
    }

    #[test]
    fn test_save_uses_configured_collection() {
        let store = Arc::new(MemoryStore::new());
        let ctx = RequestContext::new(PROF, Role::Professional)
            .with_options(json!({"nouns": {"meetings": {"options": {"timeTableColl": "tt"}}}}));
        let tt = TimeTables::new(Arc::clone(&store), ctx, "meetings", ProfessionalLocks::new()).unwrap();
        tt.save(&week("08:00-17:00")).unwrap();
        tt.save(&week("09:00-12:00")).unwrap();
        assert_eq!(store.dump("tt").len(), 1);
        assert!(store.dump("timeTables").is_empty());
        assert!(tt.load().is_ok());
    }

    #[test]
    fn test_malformed_options_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let ctx = RequestContext::new(PROF, Role::Professional)
            .with_options(json!({"nouns": {"meetings": {"options": {"timeTableColl": 7}}}}));
        let err = TimeTables::new(store, ctx, "meetings", ProfessionalLocks::new())
            .err()
            .unwrap();
        assert!(matches!(err, MeetingError::InvalidOptions(_)), "got: {err}");
    }

    #[test]
    fn test_load_for_ignores_caller() {
        let store = Arc::new(MemoryStore::new());
        manager(&store, PROF, Role::Professional)
            .save(&week("08:00-17:00"))
            .unwrap();
        let tt = load_for(&store, &MeetingOptions::default(), &UserId::new(PROF)).unwrap();
        assert!(!tt.day(Weekday::Fri).is_empty());
        assert!(tt.day(Weekday::Sat).is_empty());
    }
}

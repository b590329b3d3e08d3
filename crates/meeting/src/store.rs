//! The document store seam.
//!
//! Booking state lives in an external, generic document store: collections of
//! schemaless JSON objects that can be counted, found, inserted, patched, and
//! removed by query. This module defines:
//!
//! - [`DocumentStore`], the trait a backend implements;
//! - [`Query`] / [`Predicate`], a small typed query language that replaces
//!   untyped query maps;
//! - [`Filter`], a collection plus an accumulated query, which is what the
//!   booking logic actually passes around. Filters attach the operation and
//!   collection to every store failure and otherwise forward it unchanged.
//!
//! Store calls may block and may fail. Nothing here retries.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{MeetingError, Result};

/// A schemaless stored object.
pub type Document = serde_json::Map<String, Value>;

/// Store-assigned identifier of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document together with its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Document,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("no document matches the query")]
    NoMatch,

    #[error("document {0} does not exist")]
    MissingDocument(DocumentId),

    #[error("backend error: {0}")]
    Backend(String),
}

// ── Queries ─────────────────────────────────────────────────────────────────

/// One condition on a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field == value`.
    Eq(String, Value),
    /// `lower < field < upper` on an integer field.
    StrictlyBetween { field: String, lower: i64, upper: i64 },
    /// `field <= value` on an integer field.
    AtMost(String, i64),
    /// `field >= value` on an integer field.
    AtLeast(String, i64),
    /// At least one of the predicates holds.
    Any(Vec<Predicate>),
    /// Every predicate holds.
    All(Vec<Predicate>),
    /// Matches nothing.
    Never,
}

impl Predicate {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Eq(field.into(), value.into())
    }

    pub fn strictly_between(field: impl Into<String>, lower: i64, upper: i64) -> Self {
        Predicate::StrictlyBetween {
            field: field.into(),
            lower,
            upper,
        }
    }

    /// Reference semantics for backends that evaluate queries in process.
    pub fn matches(&self, doc: &Document) -> bool {
        let int = |field: &str| doc.get(field).and_then(Value::as_i64);
        match self {
            Predicate::Eq(field, value) => doc.get(field) == Some(value),
            Predicate::StrictlyBetween {
                field,
                lower,
                upper,
            } => int(field).is_some_and(|v| *lower < v && v < *upper),
            Predicate::AtMost(field, bound) => int(field).is_some_and(|v| v <= *bound),
            Predicate::AtLeast(field, bound) => int(field).is_some_and(|v| v >= *bound),
            Predicate::Any(preds) => preds.iter().any(|p| p.matches(doc)),
            Predicate::All(preds) => preds.iter().all(|p| p.matches(doc)),
            Predicate::Never => false,
        }
    }
}

/// A conjunction of predicates. The empty query matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    predicates: Vec<Predicate>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.predicates.iter().all(|p| p.matches(doc))
    }
}

// ── Store trait ─────────────────────────────────────────────────────────────

/// A generic, queryable document store.
pub trait DocumentStore: Send + Sync {
    fn count(&self, collection: &str, query: &Query) -> std::result::Result<usize, StoreError>;

    fn find(
        &self,
        collection: &str,
        query: &Query,
    ) -> std::result::Result<Vec<StoredDocument>, StoreError>;

    fn insert(
        &self,
        collection: &str,
        document: Document,
    ) -> std::result::Result<DocumentId, StoreError>;

    /// Overwrite the fields present in `patch`, keeping the others.
    fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: Document,
    ) -> std::result::Result<(), StoreError>;

    /// Remove every matching document, returning how many were removed.
    fn remove_all(&self, collection: &str, query: &Query)
        -> std::result::Result<usize, StoreError>;
}

// ── Filter ──────────────────────────────────────────────────────────────────

/// A collection and the query narrowing it.
pub struct Filter<S: ?Sized> {
    store: Arc<S>,
    collection: String,
    query: Query,
}

impl<S: ?Sized> Clone for Filter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collection: self.collection.clone(),
            query: self.query.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for Filter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("collection", &self.collection)
            .field("query", &self.query)
            .finish()
    }
}

impl<S: DocumentStore + ?Sized> Filter<S> {
    pub fn new(store: Arc<S>, collection: impl Into<String>, base: Query) -> Self {
        Self {
            store,
            collection: collection.into(),
            query: base,
        }
    }

    /// The collection this filter reads and writes.
    pub fn subject(&self) -> &str {
        &self.collection
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Narrow the filter further.
    pub fn add_query(&mut self, predicate: Predicate) -> &mut Self {
        self.query.push(predicate);
        self
    }

    /// Builder form of [`Filter::add_query`].
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.query.push(predicate);
        self
    }

    pub fn count(&self) -> Result<usize> {
        self.store
            .count(&self.collection, &self.query)
            .map_err(self.context("count"))
    }

    pub fn find(&self) -> Result<Vec<StoredDocument>> {
        self.store
            .find(&self.collection, &self.query)
            .map_err(self.context("find"))
    }

    /// The first matching document; [`StoreError::NoMatch`] if there is none.
    pub fn select_one(&self) -> Result<StoredDocument> {
        self.find()?
            .into_iter()
            .next()
            .ok_or_else(|| self.context("select_one")(StoreError::NoMatch))
    }

    pub fn insert(&self, document: Document) -> Result<DocumentId> {
        self.store
            .insert(&self.collection, document)
            .map_err(self.context("insert"))
    }

    pub fn update(&self, id: &DocumentId, patch: Document) -> Result<()> {
        self.store
            .update(&self.collection, id, patch)
            .map_err(self.context("update"))
    }

    pub fn remove_all(&self) -> Result<usize> {
        self.store
            .remove_all(&self.collection, &self.query)
            .map_err(self.context("remove_all"))
    }

    fn context(&self, operation: &'static str) -> impl FnOnce(StoreError) -> MeetingError + '_ {
        move |source| MeetingError::Store {
            operation,
            collection: self.collection.clone(),
            source,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

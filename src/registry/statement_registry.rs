// src/registry/statement_registry.rs
//! Prepared statement to query text association
//!
//! Entries are keyed by statement identity and hold only a weak reference to
//! the statement. A statement dropped by the host is never kept alive here;
//! its entry turns stale and is reclaimed by a later sweep step.
//!
//! # Identity
//!
//! The key is the address of the statement's shared allocation. The stored
//! `Weak` keeps that allocation (not the statement) from being freed, so a
//! stale key cannot be reused by a newer statement until its entry is swept.
//!
//! # Reclamation
//!
//! ```text
//! record() ──► insert-if-absent ──► push key onto backlog
//!                    │
//!                    └── every N inserts ──► sweep_step(2N)
//!                                              │
//!                     pop at most 2N keys, drop dead entries, requeue live ones
//! ```
//!
//! A step touches a bounded number of keys, each under its own shard lock,
//! so no single `record` pays for the whole map. Steps check keys twice as
//! fast as inserts add them, which keeps dead entries bounded by the live
//! set. [`StatementRegistry::sweep`] still walks the whole map on demand.

use crate::interception::host::{HostObject, ObjectId, ObjectRef};
use crate::observability::names;
use crate::utils::config::RegistryConfig;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Display value for a query whose text is not known
pub const UNKNOWN_QUERY: &str = "unknown";

/// Query text associated with a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryText {
    Known(Arc<str>),
    Unknown,
}

impl QueryText {
    /// Normalize a nullable query argument
    pub fn from_option(query: Option<&str>) -> Self {
        match query {
            Some(text) => QueryText::Known(Arc::from(text)),
            None => QueryText::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            QueryText::Known(text) => text,
            QueryText::Unknown => UNKNOWN_QUERY,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, QueryText::Known(_))
    }
}

impl fmt::Display for QueryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Association {
    statement: Weak<dyn HostObject>,
    query: QueryText,
}

impl Association {
    fn is_live(&self) -> bool {
        self.statement.strong_count() > 0
    }
}

/// Concurrent, weakly keyed statement registry
pub struct StatementRegistry {
    entries: DashMap<ObjectId, Association>,
    // Every key in `entries` is queued here at least once
    backlog: Mutex<VecDeque<ObjectId>>,
    sweep_interval: usize,
    inserts: AtomicUsize,
}

impl StatementRegistry {
    /// Create a registry with default tuning
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    /// Create a registry with the given tuning
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            entries: DashMap::with_capacity(config.initial_capacity),
            backlog: Mutex::new(VecDeque::with_capacity(config.initial_capacity)),
            sweep_interval: config.sweep_interval.max(1),
            inserts: AtomicUsize::new(0),
        }
    }

    /// Associate `query` with `statement` unless an association already exists
    ///
    /// First write wins. Returns `true` if this call created the entry.
    pub fn record(&self, statement: &ObjectRef, query: Option<&str>) -> bool {
        let id = ObjectId::of(statement);
        let association = Association {
            statement: Arc::downgrade(statement),
            query: QueryText::from_option(query),
        };

        let inserted = match self.entries.entry(id) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live() {
                    None
                } else {
                    // Key is already queued
                    occupied.insert(association);
                    Some(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(association);
                Some(true)
            }
        };

        let Some(new_key) = inserted else {
            debug!(statement = %id, "Statement already registered, keeping first query");
            return false;
        };

        if new_key {
            self.backlog.lock().push_back(id);
            metrics::gauge!(names::REGISTRY_ENTRIES).increment(1.0);
        }
        metrics::counter!(names::REGISTRY_RECORDS).increment(1);

        let count = self.inserts.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        if count % self.sweep_interval == 0 {
            self.sweep_step(self.sweep_interval.saturating_mul(2));
        }

        true
    }

    /// Query text registered for `statement`, or [`QueryText::Unknown`]
    pub fn lookup(&self, statement: &ObjectRef) -> QueryText {
        let id = ObjectId::of(statement);

        let found = self
            .entries
            .get(&id)
            .filter(|association| association.is_live())
            .map(|association| association.query.clone());

        match found {
            Some(query) => {
                metrics::counter!(names::REGISTRY_LOOKUPS, "result" => "hit").increment(1);
                query
            }
            None => {
                metrics::counter!(names::REGISTRY_LOOKUPS, "result" => "miss").increment(1);
                QueryText::Unknown
            }
        }
    }

    /// Check at most `budget` queued keys, dropping entries whose statement
    /// is gone
    ///
    /// Skips entirely if another thread is already stepping. Returns the
    /// number of entries reclaimed.
    pub fn sweep_step(&self, budget: usize) -> usize {
        let Some(mut backlog) = self.backlog.try_lock() else {
            return 0;
        };

        let mut reclaimed = 0;
        for _ in 0..budget.min(backlog.len()) {
            let Some(id) = backlog.pop_front() else {
                break;
            };

            if self
                .entries
                .remove_if(&id, |_, association| !association.is_live())
                .is_some()
            {
                reclaimed += 1;
            } else if self.entries.contains_key(&id) {
                backlog.push_back(id);
            }
        }
        drop(backlog);

        self.note_reclaimed(reclaimed);
        reclaimed
    }

    /// Drop every entry whose statement is no longer referenced by the host
    ///
    /// Walks the whole map. Returns the number of entries reclaimed.
    pub fn sweep(&self) -> usize {
        let mut reclaimed = 0;

        self.entries.retain(|_, association| {
            let live = association.is_live();
            if !live {
                reclaimed += 1;
            }
            live
        });

        self.note_reclaimed(reclaimed);
        reclaimed
    }

    fn note_reclaimed(&self, reclaimed: usize) {
        if reclaimed == 0 {
            return;
        }

        metrics::counter!(names::REGISTRY_SWEPT).increment(reclaimed as u64);
        metrics::gauge!(names::REGISTRY_ENTRIES).decrement(reclaimed as f64);
        debug!(reclaimed, "Swept dead statement associations");
    }

    /// Number of entries held, including stale ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries whose statement is still alive
    pub fn live_len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_live()).count()
    }
}

impl Default for StatementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StatementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementRegistry")
            .field("entries", &self.entries.len())
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

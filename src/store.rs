//! In-memory suggestion cache with a TTL staleness clock.
//!
//! Owns the current snapshot generation. All mutation (wholesale replace,
//! usage upsert) and all reads serialize through one mutex; ranking runs
//! on a clone taken under the lock, never on the live map.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::aggregate;
use crate::types::{ContactSuggestion, Provenance};

/// Seconds a snapshot stays fresh before the next query forces a rebuild.
pub const DEFAULT_TTL_SECS: u64 = 300;

struct Inner {
    entries: HashMap<String, ContactSuggestion>,
    last_rebuild: Option<DateTime<Utc>>,
}

/// Snapshot owner. Staleness is detected lazily by callers passing `now`;
/// there is no background timer.
pub struct SuggestionCache {
    inner: Mutex<Inner>,
    ttl: Duration,
    preserve_manual: bool,
}

impl SuggestionCache {
    pub fn new(ttl_secs: u64, preserve_manual: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                last_rebuild: None,
            }),
            ttl: Duration::seconds(ttl_secs as i64),
            preserve_manual,
        }
    }

    /// True when the snapshot is empty or older than the TTL.
    ///
    /// Entries inserted only by usage upserts (no rebuild yet) count as
    /// stale: the staleness clock tracks rebuilds, not upserts.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let inner = self.inner.lock();
        if inner.entries.is_empty() {
            return true;
        }
        match inner.last_rebuild {
            Some(at) => now.signed_duration_since(at) > self.ttl,
            None => true,
        }
    }

    /// Clone of the current entries in the default stored order
    /// (frequency desc, last_used desc, email asc).
    pub fn snapshot(&self) -> Vec<ContactSuggestion> {
        let inner = self.inner.lock();
        let mut entries: Vec<ContactSuggestion> = inner.entries.values().cloned().collect();
        entries.sort_by(aggregate::default_order);
        entries
    }

    /// Swap in a new generation and reset the staleness clock.
    ///
    /// With `preserve_manual` set, manually recorded entries whose key is
    /// not re-derivable from the new generation are carried over.
    pub fn replace(&self, new_entries: Vec<ContactSuggestion>, now: DateTime<Utc>) {
        let mut map: HashMap<String, ContactSuggestion> = new_entries
            .into_iter()
            .map(|entry| (entry.email.clone(), entry))
            .collect();

        let mut inner = self.inner.lock();
        if self.preserve_manual {
            let previous = std::mem::take(&mut inner.entries);
            for (email, entry) in previous {
                if entry.source == Provenance::Manual && !map.contains_key(&email) {
                    map.insert(email, entry);
                }
            }
        }
        inner.entries = map;
        inner.last_rebuild = Some(now);
    }

    /// Fold one usage observation into the current generation.
    ///
    /// Existing entry: frequency increments, `last_used` keeps the max,
    /// a missing name is filled (a set name is never overwritten).
    /// Missing entry: inserted with frequency 1 and `Manual` provenance.
    /// Does not touch the staleness clock; an upsert is not a rebuild.
    pub fn upsert(&self, email: &str, name: Option<&str>, at: DateTime<Utc>) {
        if !email.contains('@') {
            log::debug!("Cache: rejected upsert for malformed address {:?}", email);
            return;
        }

        let mut inner = self.inner.lock();
        match inner.entries.get_mut(email) {
            Some(entry) => {
                entry.frequency += 1;
                if at > entry.last_used {
                    entry.last_used = at;
                }
                if entry.name.is_none() {
                    entry.name = name.map(str::to_string);
                }
            }
            None => {
                inner.entries.insert(
                    email.to_string(),
                    ContactSuggestion {
                        email: email.to_string(),
                        name: name.map(str::to_string),
                        frequency: 1,
                        last_used: at,
                        source: Provenance::Manual,
                    },
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

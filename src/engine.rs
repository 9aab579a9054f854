//! Owned composition facade for the suggestion engine.
//!
//! One `SuggestionEngine` instance is constructed by the application's
//! composition root and passed by handle to whoever needs autocomplete.
//! The source of truth (mail and conversation collections) stays with the
//! collaborator behind the `RecordSource` seam; this engine only derives
//! and serves the in-memory index. Consumers observe the engine through
//! watch channels: a `loading` flag held true for the duration of a
//! rebuild, and a generation counter bumped whenever the suggestions
//! change.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use crate::aggregate;
use crate::normalize;
use crate::rank;
use crate::store::SuggestionCache;
use crate::types::{ConversationRecord, MailRecord, SuggestConfig, SuggestionView};

/// Supplies the already-loaded source collections a rebuild folds over.
///
/// Implemented by whoever owns the mail/conversation stores. Returning
/// empty collections is valid and yields an empty snapshot; fetching and
/// refreshing the underlying data is the implementor's concern.
pub trait RecordSource: Send + Sync {
    fn mail_records(&self) -> Vec<MailRecord>;
    fn conversation_records(&self) -> Vec<ConversationRecord>;
}

pub struct SuggestionEngine {
    cache: SuggestionCache,
    source: Arc<dyn RecordSource>,
    config: SuggestConfig,
    loading_tx: watch::Sender<bool>,
    changed_tx: watch::Sender<u64>,
}

impl SuggestionEngine {
    pub fn new(config: SuggestConfig, source: Arc<dyn RecordSource>) -> Self {
        let (loading_tx, _) = watch::channel(false);
        let (changed_tx, _) = watch::channel(0u64);
        Self {
            cache: SuggestionCache::new(config.ttl_secs, config.preserve_manual),
            source,
            config,
            loading_tx,
            changed_tx,
        }
    }

    /// Autocomplete entry point. Rebuilds first when the snapshot is
    /// stale, then ranks against the current generation.
    pub fn search_suggestions(&self, query: &str) -> Vec<SuggestionView> {
        if self.cache.is_stale(Utc::now()) {
            self.rebuild();
        }
        rank::rank_views(query, &self.cache.snapshot(), self.config.max_results)
    }

    /// Record that an address was actually used (picked from the list,
    /// typed into the composer). Bypasses aggregation; malformed
    /// addresses are ignored.
    pub fn record_usage(&self, address: &str, name: Option<&str>) {
        let (email, parsed_name) = normalize::parse_address(address);
        if !email.contains('@') {
            log::debug!("Engine: ignored usage event for malformed address {:?}", address);
            return;
        }

        let name = name.map(str::to_string).or(parsed_name);
        self.cache.upsert(&email, name.as_deref(), Utc::now());
        self.changed_tx.send_modify(|generation| *generation += 1);
    }

    /// Explicit signal from the composition root that the source
    /// collections changed. Rebuilds immediately.
    pub fn notify_records_changed(&self) {
        self.rebuild();
    }

    /// Rebuild unconditionally, regardless of staleness.
    pub fn force_refresh(&self) {
        self.rebuild();
    }

    /// Subscribe to the rebuild-in-progress flag.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading_tx.subscribe()
    }

    /// Subscribe to the suggestions-changed generation counter.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.changed_tx.subscribe()
    }

    /// Number of entries in the current snapshot.
    pub fn suggestion_count(&self) -> usize {
        self.cache.len()
    }

    fn rebuild(&self) {
        self.loading_tx.send_replace(true);

        let mail = self.source.mail_records();
        let conversations = self.source.conversation_records();
        let entries = aggregate::rebuild(&mail, &conversations);
        log::debug!(
            "Engine: rebuilt {} suggestions from {} mail / {} conversation records",
            entries.len(),
            mail.len(),
            conversations.len()
        );
        self.cache.replace(entries, Utc::now());

        self.loading_tx.send_replace(false);
        self.changed_tx.send_modify(|generation| *generation += 1);
    }
}

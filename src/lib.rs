//! Contact suggestion cache and ranking engine.
//!
//! Aggregates identity signals from mail records, conversation
//! participant lists, and manual usage events into a deduplicated
//! in-memory cache, and answers composer autocomplete queries with a
//! deterministic ranked result under a fixed result cap.
//!
//! The engine holds no durable state. The snapshot is a derived index:
//! populated wholesale by a rebuild over the collaborator's mail and
//! conversation collections, mutated in place by usage events, and
//! replaced by the next rebuild. Staleness is detected lazily against a
//! TTL; there is no background timer.

pub mod aggregate;
pub mod engine;
pub mod normalize;
pub mod rank;
pub mod refresher;
pub mod store;
pub mod types;

pub use engine::{RecordSource, SuggestionEngine};
pub use refresher::start_refresher;
pub use store::SuggestionCache;
pub use types::{
    ContactSuggestion, ConversationRecord, MailDirection, MailRecord, Provenance, SuggestConfig,
    SuggestionView,
};

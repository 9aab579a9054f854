use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize;

/// Signal type that first created a suggestion entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Harvested from outbound mail.
    Sent,
    /// Harvested from inbound mail.
    Received,
    /// Harvested from a conversation participant list.
    Conversation,
    /// Recorded by an explicit usage event.
    Manual,
}

/// Direction tag on a mail record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailDirection {
    Inbound,
    Outbound,
}

/// One mail message as supplied by the mail collaborator.
///
/// Addresses may be raw `"Display Name <addr@host>"` strings; the
/// aggregation pass normalizes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRecord {
    pub sender: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    pub direction: MailDirection,
    pub date: DateTime<Utc>,
}

/// One conversation thread as supplied by the conversation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub participants: Vec<String>,
    pub last_activity: DateTime<Utc>,
}

/// A deduplicated contact suggestion. One row per normalized email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSuggestion {
    /// Lowercased, trimmed address; the dedup key.
    pub email: String,
    /// Best-known display name. Never overwritten once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Observation count. Never decreases within a generation; a rebuild
    /// is authoritative and may reset it from the raw sources.
    pub frequency: u32,
    /// Most recent observation time across all merges.
    pub last_used: DateTime<Utc>,
    /// First-observed provenance, fixed on insert.
    pub source: Provenance,
}

impl ContactSuggestion {
    /// Domain part of the address (after the last `@`), empty if none.
    pub fn domain(&self) -> &str {
        normalize::domain_of(&self.email)
    }

    /// `"Name <email>"` when a name is known, bare email otherwise.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }

    /// Two-letter uppercase initials for avatar placeholders.
    pub fn initials(&self) -> String {
        normalize::initials_for(self.name.as_deref(), &self.email)
    }

    /// Serialized shape handed to autocomplete consumers.
    pub fn to_view(&self) -> SuggestionView {
        SuggestionView {
            email: self.email.clone(),
            display_name: self.display_name(),
            domain: self.domain().to_string(),
            initials: self.initials(),
        }
    }
}

/// One autocomplete result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionView {
    pub email: String,
    pub display_name: String,
    pub domain: String,
    pub initials: String,
}

/// Engine tuning. Every field is defaulted so an empty `{}` deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestConfig {
    /// Seconds a snapshot stays fresh before a query forces a rebuild.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Result cap for a single autocomplete query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Carry manually recorded contacts across rebuilds when they are not
    /// re-derivable from the mail/conversation sources. Off by default:
    /// a rebuild is full authority over the snapshot.
    #[serde(default)]
    pub preserve_manual: bool,
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_max_results() -> usize {
    8
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_results: default_max_results(),
            preserve_manual: false,
        }
    }
}

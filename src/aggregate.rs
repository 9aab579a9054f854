//! Rebuild pass: fold the mail and conversation collections into a
//! deduplicated suggestion map.
//!
//! A rebuild is authoritative: it derives the snapshot wholesale from
//! the source collections rather than merging into the previous
//! generation. Merge rules within one pass are first-write-wins for
//! `name` and `source`; `frequency` counts observations and `last_used`
//! keeps the maximum timestamp.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::normalize;
use crate::types::{
    ContactSuggestion, ConversationRecord, MailDirection, MailRecord, Provenance,
};

/// Fold the source collections into deduplicated suggestions.
///
/// Cannot fail: empty sources yield an empty result. The output is
/// sorted by the default stored order (frequency desc, last_used desc,
/// email asc); queries re-sort per ranking criteria anyway.
pub fn rebuild(
    mail: &[MailRecord],
    conversations: &[ConversationRecord],
) -> Vec<ContactSuggestion> {
    let mut map: HashMap<String, ContactSuggestion> = HashMap::new();

    // Pass 1: mail records. The sender carries the record's own
    // directional provenance; outbound records additionally contribute
    // every recipient as an address harvested from sent mail.
    for record in mail {
        let sender_source = match record.direction {
            MailDirection::Inbound => Provenance::Received,
            MailDirection::Outbound => Provenance::Sent,
        };
        observe(&mut map, &record.sender, record.date, sender_source);

        if record.direction == MailDirection::Outbound {
            for recipient in &record.recipients {
                observe(&mut map, recipient, record.date, Provenance::Sent);
            }
        }
    }

    // Pass 2: conversation participants, stamped with the thread's
    // last-activity time.
    for conversation in conversations {
        for participant in &conversation.participants {
            observe(
                &mut map,
                participant,
                conversation.last_activity,
                Provenance::Conversation,
            );
        }
    }

    let mut entries: Vec<ContactSuggestion> = map.into_values().collect();
    entries.sort_by(default_order);
    entries
}

/// Merge one observation into the map.
///
/// Addresses that do not normalize to something containing `@` are
/// dropped silently.
fn observe(
    map: &mut HashMap<String, ContactSuggestion>,
    raw: &str,
    at: DateTime<Utc>,
    source: Provenance,
) {
    let (email, name) = normalize::parse_address(raw);
    if !email.contains('@') {
        log::debug!("Aggregator: dropped malformed address {:?}", raw);
        return;
    }

    match map.entry(email) {
        Entry::Occupied(mut occupied) => {
            let entry = occupied.get_mut();
            entry.frequency += 1;
            if at > entry.last_used {
                entry.last_used = at;
            }
            // name and source stay as first observed
        }
        Entry::Vacant(vacant) => {
            let email = vacant.key().clone();
            vacant.insert(ContactSuggestion {
                email,
                name,
                frequency: 1,
                last_used: at,
                source,
            });
        }
    }
}

/// Default stored order: frequency desc, last_used desc, email asc.
pub(crate) fn default_order(a: &ContactSuggestion, b: &ContactSuggestion) -> Ordering {
    b.frequency
        .cmp(&a.frequency)
        .then_with(|| b.last_used.cmp(&a.last_used))
        .then_with(|| a.email.cmp(&b.email))
}

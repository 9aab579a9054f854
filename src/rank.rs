//! Query-time filtering and ordering of a suggestion snapshot.
//!
//! Pure over its inputs: the snapshot is never mutated and identical
//! inputs produce identically ordered output.

use std::cmp::Ordering;

use crate::types::{ContactSuggestion, SuggestionView};

/// Result cap for a single autocomplete query.
pub const DEFAULT_MAX_RESULTS: usize = 8;

/// Filter `entries` against `query`, order by the tie-break cascade, and
/// cap at `limit`.
///
/// An empty (after trim) query matches nothing. An entry matches when the
/// lowercased query is a substring of its email, its name, or its domain.
pub fn rank(query: &str, entries: &[ContactSuggestion], limit: usize) -> Vec<ContactSuggestion> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<&ContactSuggestion> =
        entries.iter().filter(|e| matches_query(e, &query)).collect();
    matches.sort_by(|a, b| compare(a, b, &query));

    matches.into_iter().take(limit).cloned().collect()
}

/// Convenience wrapper mapping ranked entries to their view shape.
pub fn rank_views(query: &str, entries: &[ContactSuggestion], limit: usize) -> Vec<SuggestionView> {
    rank(query, entries, limit).iter().map(ContactSuggestion::to_view).collect()
}

fn matches_query(entry: &ContactSuggestion, query: &str) -> bool {
    entry.email.contains(query)
        || entry
            .name
            .as_deref()
            .map(|name| name.to_lowercase().contains(query))
            .unwrap_or(false)
        || entry.domain().contains(query)
}

/// Strict tie-break cascade, first decisive criterion wins:
/// name-prefix match, email-prefix match, frequency desc, recency desc.
/// The trailing email compare keeps the order total and deterministic.
fn compare(a: &ContactSuggestion, b: &ContactSuggestion, query: &str) -> Ordering {
    let a_name_prefix = name_starts_with(a, query);
    let b_name_prefix = name_starts_with(b, query);
    let a_email_prefix = a.email.starts_with(query);
    let b_email_prefix = b.email.starts_with(query);

    b_name_prefix
        .cmp(&a_name_prefix)
        .then_with(|| b_email_prefix.cmp(&a_email_prefix))
        .then_with(|| b.frequency.cmp(&a.frequency))
        .then_with(|| b.last_used.cmp(&a.last_used))
        .then_with(|| a.email.cmp(&b.email))
}

/// An entry with no name never holds the name-prefix advantage.
fn name_starts_with(entry: &ContactSuggestion, query: &str) -> bool {
    entry
        .name
        .as_deref()
        .map(|name| name.to_lowercase().starts_with(query))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provenance;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, minute, 0).unwrap()
    }

    fn entry(
        email: &str,
        name: Option<&str>,
        frequency: u32,
        last_used: DateTime<Utc>,
    ) -> ContactSuggestion {
        ContactSuggestion {
            email: email.to_string(),
            name: name.map(str::to_string),
            frequency,
            last_used,
            source: Provenance::Received,
        }
    }

    #[test]
    fn empty_query_matches_nothing() {
        let entries = vec![entry("a@x.com", None, 1, at(0))];
        assert!(rank("", &entries, DEFAULT_MAX_RESULTS).is_empty());
        assert!(rank("   ", &entries, DEFAULT_MAX_RESULTS).is_empty());
    }

    #[test]
    fn result_size_never_exceeds_limit() {
        let entries: Vec<ContactSuggestion> = (0..20)
            .map(|i| entry(&format!("user{}@x.com", i), None, 1, at(0)))
            .collect();

        assert_eq!(rank("user", &entries, DEFAULT_MAX_RESULTS).len(), 8);
        assert_eq!(rank("user", &entries, 3).len(), 3);
    }

    #[test]
    fn matches_email_name_and_domain_substrings() {
        let entries = vec![
            entry("sarah@acme.com", None, 1, at(0)),
            entry("x@y.io", Some("Sarah Chen"), 1, at(0)),
            entry("joe@sarahsoft.dev", None, 1, at(0)),
            entry("nobody@nowhere.net", None, 1, at(0)),
        ];

        assert_eq!(rank("sarah", &entries, DEFAULT_MAX_RESULTS).len(), 3);
        assert_eq!(rank("SARAH", &entries, DEFAULT_MAX_RESULTS).len(), 3);
        assert!(rank("zzz", &entries, DEFAULT_MAX_RESULTS).is_empty());
    }

    #[test]
    fn name_prefix_beats_higher_frequency() {
        let a = entry("john@x.com", Some("John Smith"), 3, at(1));
        let b = entry("johnny@y.com", None, 10, at(2));

        let ranked = rank("john", &[b, a], DEFAULT_MAX_RESULTS);
        let order: Vec<&str> = ranked.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(order, vec!["john@x.com", "johnny@y.com"]);
    }

    #[test]
    fn shared_email_prefix_falls_through_to_frequency() {
        let a = entry("a@x.com", None, 2, at(1));
        let b = entry("ab@x.com", None, 5, at(1));

        let ranked = rank("a", &[a, b], DEFAULT_MAX_RESULTS);
        let order: Vec<&str> = ranked.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(order, vec!["ab@x.com", "a@x.com"]);
    }

    #[test]
    fn email_prefix_beats_substring_match() {
        let prefix = entry("ann@x.com", None, 1, at(0));
        let substring = entry("joann@x.com", None, 9, at(9));

        let ranked = rank("ann", &[substring, prefix], DEFAULT_MAX_RESULTS);
        assert_eq!(ranked[0].email, "ann@x.com");
    }

    #[test]
    fn frequency_tie_falls_through_to_recency() {
        let older = entry("old@x.com", None, 2, at(1));
        let newer = entry("new@x.com", None, 2, at(5));

        let ranked = rank("x.com", &[older, newer], DEFAULT_MAX_RESULTS);
        let order: Vec<&str> = ranked.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(order, vec!["new@x.com", "old@x.com"]);
    }

    #[test]
    fn identical_inputs_rank_identically() {
        let entries = vec![
            entry("b@x.com", None, 2, at(1)),
            entry("a@x.com", Some("Alice"), 1, at(2)),
            entry("c@x.com", None, 2, at(1)),
        ];

        let first = rank("x.com", &entries, DEFAULT_MAX_RESULTS);
        let second = rank("x.com", &entries, DEFAULT_MAX_RESULTS);
        let emails = |r: &[ContactSuggestion]| {
            r.iter().map(|e| e.email.clone()).collect::<Vec<_>>()
        };
        assert_eq!(emails(&first), emails(&second));
    }

    #[test]
    fn snapshot_is_not_mutated() {
        let entries = vec![
            entry("b@x.com", None, 1, at(0)),
            entry("a@x.com", None, 5, at(0)),
        ];
        let _ = rank("x.com", &entries, DEFAULT_MAX_RESULTS);

        // Input order untouched; rank worked on its own copy.
        assert_eq!(entries[0].email, "b@x.com");
    }
}

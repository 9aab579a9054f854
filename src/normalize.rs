//! Address normalization.
//!
//! Canonicalizes raw address strings (possibly in `"Display Name
//! <addr@host>"` form) into a lowercase lookup key plus an optional
//! display name. Pure string work, no failure modes: malformed input
//! yields an empty address, which aggregation then rejects.

/// Split a raw address into `(normalized_email, display_name)`.
///
/// Example: `"Sarah Chen" <Sarah@Acme.com>` → `("sarah@acme.com", Some("Sarah Chen"))`
pub fn parse_address(raw: &str) -> (String, Option<String>) {
    let trimmed = raw.trim();

    let Some(bracket) = trimmed.find('<') else {
        return (trimmed.to_lowercase(), None);
    };

    let candidate = trimmed[..bracket].trim().trim_matches('"').trim();
    let rest = &trimmed[bracket + 1..];
    let address = match rest.find('>') {
        Some(end) => &rest[..end],
        None => rest,
    };

    // A candidate name that is empty, or identical to the whole input,
    // means no real separation occurred.
    let name = if candidate.is_empty() || candidate == trimmed {
        None
    } else {
        Some(candidate.to_string())
    };

    (address.trim().to_lowercase(), name)
}

/// Domain part of an address: the substring after the last `@`.
/// Empty for addresses with no `@`.
pub fn domain_of(email: &str) -> &str {
    match email.rfind('@') {
        Some(at) => &email[at + 1..],
        None => "",
    }
}

/// Two-letter uppercase initials from a display name, falling back to the
/// email local part split on `.`/`_`/`-`/`+`.
///
/// Example: "Sarah Chen" → "SC"; "joe_smith@bigcorp.io" → "JS"
pub fn initials_for(name: Option<&str>, email: &str) -> String {
    let words: Vec<&str> = match name {
        Some(n) if !n.trim().is_empty() => n.split_whitespace().collect(),
        _ => email
            .split('@')
            .next()
            .unwrap_or(email)
            .split(|c: char| c == '.' || c == '_' || c == '-' || c == '+')
            .filter(|s| !s.is_empty())
            .collect(),
    };

    let mut initials = String::new();
    if let Some(first) = words.first().and_then(|w| w.chars().next()) {
        initials.extend(first.to_uppercase());
    }
    if words.len() > 1 {
        if let Some(last) = words.last().and_then(|w| w.chars().next()) {
            initials.extend(last.to_uppercase());
        }
    }
    initials
}

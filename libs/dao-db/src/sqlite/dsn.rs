//! SQLite url parsing and cleaning utilities.

use std::collections::HashMap;

/// Query keys that configure PRAGMAs rather than the sqlx connection.
const SQLITE_PRAGMA_PARAMS: &[&str] = &["wal", "synchronous", "busy_timeout", "journal_mode"];

/// Split PRAGMA parameters out of a SQLite url.
///
/// Returns the url with the whitelisted keys removed and the extracted
/// pairs keyed by lowercase name. Urls that do not parse (plain paths) come
/// back unchanged with no pairs.
pub(crate) fn extract_sqlite_pragmas(dsn: &str) -> (String, HashMap<String, String>) {
    let Ok(mut url) = url::Url::parse(dsn) else {
        return (dsn.to_string(), HashMap::new());
    };

    let mut extracted = HashMap::new();
    let mut remaining = Vec::new();
    for (key, value) in url.query_pairs() {
        let key_lower = key.to_lowercase();
        if SQLITE_PRAGMA_PARAMS.contains(&key_lower.as_str()) {
            extracted.insert(key_lower, value.into_owned());
        } else {
            remaining.push(format!("{key}={value}"));
        }
    }

    if extracted.is_empty() {
        return (dsn.to_string(), extracted);
    }

    url.set_query(None);
    if !remaining.is_empty() {
        url.set_query(Some(&remaining.join("&")));
    }

    (url.to_string(), extracted)
}

/// Check if the url names an in-memory SQLite database.
///
/// True for `sqlite::memory:`, `sqlite://:memory:` and any url carrying
/// `mode=memory`.
pub(crate) fn is_memory_dsn(dsn: &str) -> bool {
    if dsn.starts_with("sqlite::memory:")
        || dsn.starts_with("sqlite://:memory:")
        || dsn.starts_with("sqlite://memory:")
    {
        return true;
    }

    if let Ok(url) = url::Url::parse(dsn) {
        return url.query_pairs().any(|(key, value)| {
            key.eq_ignore_ascii_case("mode") && value.eq_ignore_ascii_case("memory")
        });
    }

    false
}

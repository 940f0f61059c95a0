//! Shared utilities: logging, name normalization, "did you mean" suggestions.

use tracing::Level;

/// Upper bound on suggestions attached to a not-found error.
pub const MAX_SUGGESTIONS: usize = 3;

/// Initialize tracing with env filter. Safe to call once at startup.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Trim a build or weapon name typed by a user.
pub fn normalize_name(s: &str) -> &str {
    s.trim()
}

/// Case-insensitive lookup key (Hangul is unaffected by lowercasing).
pub fn lookup_key(s: &str) -> String {
    normalize_name(s).to_lowercase()
}

/// Returns the edit distance between strings `a` and `b`, counted in chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut cur: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut pre = cur[0];
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let tmp = cur[j + 1];
            cur[j + 1] = (tmp + 1)
                .min(cur[j] + 1)
                .min(pre + usize::from(ca != cb));
            pre = tmp;
        }
    }
    cur[b.len()]
}

/// Candidates close to `query`: substring matches first, then by edit distance
/// within half the query length. Ties keep candidate order.
pub fn suggest<'a, I>(query: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let key = lookup_key(query);
    if key.is_empty() {
        return Vec::new();
    }
    let max_distance = (key.chars().count() / 2).max(1);
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|c| {
            let ck = lookup_key(c);
            if ck.contains(&key) || key.contains(&ck) {
                return Some((0, c));
            }
            let d = edit_distance(&key, &ck);
            (d <= max_distance).then_some((d, c))
        })
        .collect();
    scored.sort_by_key(|(d, _)| *d);
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, c)| c.to_string())
        .collect()
}

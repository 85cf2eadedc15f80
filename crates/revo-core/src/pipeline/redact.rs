//! Best-effort secret redaction and snippet truncation

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker substituted for secret values
pub const REDACTED: &str = "[REDACTED]";

/// Snippet used for files that are never fetched
pub const SENSITIVE_PLACEHOLDER: &str = "[REDACTED - sensitive file]";

static KEY_VALUE_SECRET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(api[_-]?key|apikey|secret|password|token)\s*[:=]\s*["']?[^\s'";,#]+"#,
    )
    .expect("valid key/value secret regex")
});

static SENSITIVE_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(^|/)\.(env|env\.local|secrets|credentials)")
        .expect("valid sensitive file regex")
});

/// Replace values of `key: value` / `key=value` pairs whose key looks secret.
///
/// The key name stays visible. This is textual, not syntax aware.
pub fn redact_secrets(text: &str) -> String {
    KEY_VALUE_SECRET_RE
        .replace_all(text, format!("${{1}}: {}", REDACTED).as_str())
        .into_owned()
}

/// Whether a path names an env/secret/credential dotfile
pub fn is_sensitive_path(path: &str) -> bool {
    SENSITIVE_FILE_RE.is_match(path)
}

/// Keep at most `max_chars` characters, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Redact, then truncate: the snippet form of a fetched file body
pub fn to_snippet(body: &str, max_chars: usize) -> String {
    truncate_chars(&redact_secrets(body), max_chars)
}

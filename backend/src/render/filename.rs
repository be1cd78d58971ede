//! File naming for rendered certificates and uploaded template images.

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Keeps alphanumerics and `_`, after turning spaces into `_`.
pub fn sanitize_component(value: &str) -> String {
    value
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// `{name}_{event}_{participant_id}_{random}.png`. The random suffix keeps
/// repeated renders of the same participant/template pair from colliding.
pub fn certificate_file_name(name: &str, event: &str, participant_id: i64) -> String {
    format!(
        "{}_{}_{}_{}.png",
        sanitize_component(name),
        sanitize_component(event),
        participant_id,
        Uuid::new_v4().simple()
    )
}

/// Reduces a user supplied name to a safe, flat file name: ASCII only, path
/// separators and whitespace collapse to `_`, everything outside
/// `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_` are stripped.
/// May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name.chars().filter(char::is_ascii).collect();
    let flattened = ascii.replace(['/', '\\'], " ");
    let joined = WHITESPACE.replace_all(flattened.trim(), "_");
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

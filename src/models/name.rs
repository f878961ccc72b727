//! Type identity.

/// Separator between path segments of a type name (`app::mail::Mailer`).
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Canonical configuration key for a type name: lowercased, with any leading
/// namespace separator stripped.
pub fn normalize_name(name: &str) -> String {
    name.trim_start_matches(NAMESPACE_SEPARATOR).to_lowercase()
}

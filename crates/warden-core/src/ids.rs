//! ID prefix constants.
//!
//! Warden-owned records use `{prefix}-{8 hex chars}` IDs generated in SQL
//! (see `WardenDb::generate_id`). External entity IDs are opaque strings and
//! never carry these prefixes.

/// Prefix for rule definitions (`rul-a3f8b2c1`).
pub const PREFIX_RULE: &str = "rul";

/// Prefix for violations (`vio-a3f8b2c1`).
pub const PREFIX_VIOLATION: &str = "vio";

/// Every prefix Warden generates.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_RULE, PREFIX_VIOLATION];

/// Normalize a free-form tag (entity type, catalog code) for storage and lookup.
///
/// Tags are case-insensitive: `asset`, `Asset` and `ASSET` name the same thing.
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_uppercase()
}

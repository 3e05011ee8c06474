//! Standard catalog codes.
//!
//! The catalogs are data, not code: operators may add rule types, severities
//! and statuses at runtime. These constants name the baseline entries that the
//! seeding routines install and that the engine refers to by name.

// Severities, most severe first.
pub const SEVERITY_CRITICAL: &str = "CRITICAL";
pub const SEVERITY_HIGH: &str = "HIGH";
pub const SEVERITY_MEDIUM: &str = "MEDIUM";
pub const SEVERITY_LOW: &str = "LOW";
pub const SEVERITY_INFO: &str = "INFO";

// Resolution statuses.
pub const STATUS_COMPLIANT: &str = "COMPLIANT";
pub const STATUS_NON_COMPLIANT: &str = "NON_COMPLIANT";
pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_EXEMPTED: &str = "EXEMPTED";
pub const STATUS_UNDER_REVIEW: &str = "UNDER_REVIEW";

// Rule-type categories.
pub const CATEGORY_DATA_VALIDATION: &str = "DATA_VALIDATION";
pub const CATEGORY_BUSINESS_RULES: &str = "BUSINESS_RULES";
pub const CATEGORY_COMPLIANCE_RULES: &str = "COMPLIANCE_RULES";
pub const CATEGORY_SECURITY_RULES: &str = "SECURITY_RULES";

// Entity-type tags used by the baseline rules and templates.
pub const ENTITY_ASSET: &str = "ASSET";
pub const ENTITY_WARRANTY: &str = "WARRANTY";
pub const ENTITY_AMC: &str = "AMC";
pub const ENTITY_VENDOR: &str = "VENDOR";
pub const ENTITY_OUTLET: &str = "OUTLET";

/// Status code reported when the catalog has no entry to answer with.
pub const UNKNOWN_STATUS: &str = "UNKNOWN";

//! Entity structs for the compliance domain.
//!
//! Catalog entries, rule definitions, and violations map to tables in the
//! libSQL database. Check results, reports, and metrics are computed values.
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! output and schema validation.

mod catalog;
mod check;
mod metrics;
mod rule;
mod violation;

pub use catalog::{CatalogEntry, ResolutionStatus, RuleType, Severity};
pub use check::{CheckResult, ComplianceReport, ValidationResult};
pub use metrics::{ComplianceMetrics, ViolationSummary};
pub use rule::{RuleDefinition, RuleDraft};
pub use violation::{NewViolation, Violation};

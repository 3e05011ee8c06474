//! Catalog kinds, rule kinds, and check outcomes.
//!
//! Catalog kinds and check outcomes serialize as `snake_case`. Rule kinds are
//! identified by their catalog code (`REQUIRED_FIELD`, `WARRANTY_EXPIRY`, ...),
//! which is what rule definitions store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// CatalogKind
// ---------------------------------------------------------------------------

/// The three reference vocabularies held by the master catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    RuleType,
    Severity,
    ResolutionStatus,
}

impl CatalogKind {
    pub const ALL: [Self; 3] = [Self::RuleType, Self::Severity, Self::ResolutionStatus];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RuleType => "rule_type",
            Self::Severity => "severity",
            Self::ResolutionStatus => "resolution_status",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rule_type" | "rule_types" => Ok(Self::RuleType),
            "severity" | "severities" => Ok(Self::Severity),
            "resolution_status" | "resolution_statuses" | "status" | "statuses" => {
                Ok(Self::ResolutionStatus)
            }
            _ => Err(CoreError::UnknownVariant {
                kind: "catalog kind",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// RuleKind
// ---------------------------------------------------------------------------

/// Evaluator families the rule engine knows how to run.
///
/// Rule types present in the catalog but absent here (e.g. `STATUS_TRANSITION`)
/// have no evaluator and pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    RequiredField,
    UniqueField,
    FormatValidation,
    RangeValidation,
    LengthValidation,
    ReferenceIntegrity,
    DateValidation,
    WarrantyExpiry,
    AmcRenewal,
}

impl RuleKind {
    pub const ALL: [Self; 9] = [
        Self::RequiredField,
        Self::UniqueField,
        Self::FormatValidation,
        Self::RangeValidation,
        Self::LengthValidation,
        Self::ReferenceIntegrity,
        Self::DateValidation,
        Self::WarrantyExpiry,
        Self::AmcRenewal,
    ];

    /// Catalog code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RequiredField => "REQUIRED_FIELD",
            Self::UniqueField => "UNIQUE_FIELD",
            Self::FormatValidation => "FORMAT_VALIDATION",
            Self::RangeValidation => "RANGE_VALIDATION",
            Self::LengthValidation => "LENGTH_VALIDATION",
            Self::ReferenceIntegrity => "REFERENCE_INTEGRITY",
            Self::DateValidation => "DATE_VALIDATION",
            Self::WarrantyExpiry => "WARRANTY_EXPIRY",
            Self::AmcRenewal => "AMC_RENEWAL",
        }
    }

    /// Resolve a rule-type code (case-insensitive). `None` for codes without
    /// an evaluator.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// CheckOutcome
// ---------------------------------------------------------------------------

/// How a compliance check ended.
///
/// `NoRules` is deliberately distinct from `Evaluated` with zero violations:
/// the first means nothing was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    NoRules,
    Evaluated,
    EntityNotFound,
    Error,
}

impl CheckOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoRules => "no_rules",
            Self::Evaluated => "evaluated",
            Self::EntityNotFound => "entity_not_found",
            Self::Error => "error",
        }
    }

    /// Whether the check failed to run to completion.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::EntityNotFound | Self::Error)
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::CatalogKind;

/// A rule-type vocabulary entry. `code` doubles as the evaluator selector.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RuleType {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// `DATA_VALIDATION`, `BUSINESS_RULES`, `COMPLIANCE_RULES`, or `SECURITY_RULES`.
    pub category: String,
    pub display_order: i64,
    pub active: bool,
}

/// A severity level. Lower `level` is more severe (CRITICAL = 1).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Severity {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub level: i64,
    /// Default for rules of this severity that do not set their own flag.
    pub blocks_operation: bool,
    pub active: bool,
}

/// A violation resolution status.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResolutionStatus {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_resolved: bool,
    pub active: bool,
}

/// Any catalog entry, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogEntry {
    RuleType(RuleType),
    Severity(Severity),
    ResolutionStatus(ResolutionStatus),
}

impl CatalogEntry {
    #[must_use]
    pub const fn kind(&self) -> CatalogKind {
        match self {
            Self::RuleType(_) => CatalogKind::RuleType,
            Self::Severity(_) => CatalogKind::Severity,
            Self::ResolutionStatus(_) => CatalogKind::ResolutionStatus,
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::RuleType(e) => &e.code,
            Self::Severity(e) => &e.code,
            Self::ResolutionStatus(e) => &e.code,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::RuleType(e) => &e.name,
            Self::Severity(e) => &e.name,
            Self::ResolutionStatus(e) => &e.name,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        match self {
            Self::RuleType(e) => e.active,
            Self::Severity(e) => e.active,
            Self::ResolutionStatus(e) => e.active,
        }
    }
}

impl From<RuleType> for CatalogEntry {
    fn from(value: RuleType) -> Self {
        Self::RuleType(value)
    }
}

impl From<Severity> for CatalogEntry {
    fn from(value: Severity) -> Self {
        Self::Severity(value)
    }
}

impl From<ResolutionStatus> for CatalogEntry {
    fn from(value: ResolutionStatus) -> Self {
        Self::ResolutionStatus(value)
    }
}

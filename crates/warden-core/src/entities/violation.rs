use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A recorded rule failure against one entity.
///
/// `severity` and `blocks_operation` are copied from the rule at detection
/// time; later edits to the rule do not change existing violations.
/// `rule_id` is cleared if the rule row is ever physically removed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Violation {
    pub id: String,
    pub rule_id: Option<String>,
    pub entity_type: String,
    pub entity_id: String,
    pub severity: String,
    pub blocks_operation: bool,
    pub status: String,
    pub violation_message: String,
    pub violated_field: Option<String>,
    pub expected_value: Option<String>,
    pub actual_value: Option<String>,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub resolution_notes: Option<String>,
    pub active: bool,
}

/// Insert payload for a violation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewViolation {
    pub rule_id: Option<String>,
    pub entity_type: String,
    pub entity_id: String,
    pub severity: String,
    pub blocks_operation: bool,
    pub status: String,
    pub violation_message: String,
    pub violated_field: Option<String>,
    pub expected_value: Option<String>,
    pub actual_value: Option<String>,
}

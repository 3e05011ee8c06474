//! Compliance guard for write paths.

use tracing::warn;
use warden_core::entities::CheckResult;

use crate::error::ComplianceError;

/// Fail with [`ComplianceError::Blocked`] when `result` carries blocking
/// violations. Non-blocking violations are logged and let through.
///
/// # Errors
///
/// `ComplianceError::Blocked` with only the blocking violations.
pub fn ensure_not_blocked(result: &CheckResult) -> Result<(), ComplianceError> {
    if result.has_blocking_violations {
        return Err(ComplianceError::Blocked {
            entity_type: result.entity_type.clone(),
            entity_id: result.entity_id.clone(),
            violations: result.blocking_violations().cloned().collect(),
        });
    }
    for v in &result.violations {
        warn!(
            entity_type = %result.entity_type,
            entity_id = %result.entity_id,
            severity = %v.severity,
            message = %v.violation_message,
            "non-blocking compliance violation"
        );
    }
    Ok(())
}

//! Shared test utilities for warden-db unit tests.

use warden_core::entities::{RuleDefinition, RuleDraft};

use crate::WardenDb;
use crate::service::WardenService;

/// In-memory service with an empty catalog.
pub async fn test_service() -> WardenService {
    let db = WardenDb::open_local(":memory:").await.unwrap();
    WardenService::from_db(db)
}

/// In-memory service with the standard catalog installed.
pub async fn seeded_service() -> WardenService {
    let svc = test_service().await;
    svc.seed_catalog().await.unwrap();
    svc
}

/// Create a REQUIRED_FIELD rule on `field` for `entity_type`.
pub async fn required_rule(
    svc: &WardenService,
    code: &str,
    entity_type: &str,
    field: &str,
    priority: i32,
) -> RuleDefinition {
    let draft = RuleDraft::new(
        code,
        &format!("{field} required"),
        entity_type,
        "REQUIRED_FIELD",
        "CRITICAL",
        format!(r#"{{"field":"{field}"}}"#),
    )
    .priority(priority);
    svc.create_rule(&draft, "tester").await.unwrap()
}

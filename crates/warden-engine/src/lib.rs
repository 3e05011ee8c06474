//! # warden-engine
//!
//! Rule evaluation and compliance orchestration.
//!
//! - [`catalog::CatalogStore`]: in-memory catalog with copy-and-swap refresh
//!   and read-through backfill
//! - [`registry::EntityRegistry`]: entity-type tag to [`registry::EntitySource`]
//! - [`rule_engine::RuleEngine`]: one evaluator per rule kind
//! - [`agent::ComplianceAgent`]: validate, persist violations, resolve, report
//! - [`guard::ensure_not_blocked`]: turn blocking violations into an error
//! - [`metrics::MetricsAggregator`]: rollups over the unresolved set
//! - [`templates`]: pre-built rule drafts

pub mod agent;
pub mod catalog;
pub mod dates;
pub mod error;
pub mod guard;
pub mod metrics;
pub mod records;
pub mod registry;
pub mod rule_engine;
pub mod templates;

pub use agent::ComplianceAgent;
pub use catalog::{CatalogBackend, CatalogStore};
pub use error::{ComplianceError, EngineError, SourceError};
pub use guard::ensure_not_blocked;
pub use metrics::MetricsAggregator;
pub use records::{EntityRecord, FieldTable, JsonRecord};
pub use registry::{EntityRegistry, EntitySource, InMemorySource};
pub use rule_engine::RuleEngine;

//! # warden-core
//!
//! Core types, catalog vocabularies, and error types for Warden.
//!
//! This crate provides the foundational types shared across all Warden crates:
//! - Entity structs for catalog entries, rule definitions, and violations
//! - Result types produced by compliance checks, reports, and metrics
//! - Rule-kind and catalog-kind enums
//! - `ruleExpression` document schemas, one per evaluator family
//! - `FieldValue`, the value model for generic field access on entity records
//! - ID prefix constants and standard catalog codes
//! - Cross-cutting error types

pub mod codes;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod expression;
pub mod field;
pub mod ids;

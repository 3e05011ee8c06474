//! Repository modules implementing persistence for catalogs, rules, and
//! violations.
//!
//! Each module adds methods to `WardenService` via `impl WardenService` blocks.

pub mod catalog;
pub mod rule;
pub mod violation;

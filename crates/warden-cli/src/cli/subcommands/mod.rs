mod catalog;
mod rule;
mod violation;

pub use catalog::CatalogCommands;
pub use rule::{RuleCommands, RuleFields};
pub use violation::ViolationCommands;

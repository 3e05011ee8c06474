use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::{CatalogCommands, RuleCommands, ViolationCommands};

/// Top-level commands.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create a .warden project, seed the catalogs and the baseline rules
    Init(InitArgs),
    /// Inspect and seed the rule-type, severity, and resolution-status catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },
    /// Manage compliance rules
    Rule {
        #[command(subcommand)]
        action: RuleCommands,
    },
    /// Validate entities from a fixtures file and record violations
    Validate(ValidateArgs),
    /// List, inspect, and resolve violations
    Violation {
        #[command(subcommand)]
        action: ViolationCommands,
    },
    /// Compliance report for one entity
    Report(ReportArgs),
    /// Compliance metrics, overall or for one entity type
    Metrics(MetricsArgs),
    /// Unresolved violation summary with the recent-detection window
    Summary,
}

/// Arguments for `wdn init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Seed the catalogs only, without the baseline rules
    #[arg(long)]
    pub skip_default_rules: bool,
}

/// Arguments for `wdn validate`.
#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// Entity type tag (e.g. ASSET)
    pub entity_type: String,

    /// Entity ids to validate, in order
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// JSON fixtures file mapping entity types to records
    /// (defaults to .warden/entities.json)
    #[arg(long)]
    pub entities: Option<PathBuf>,

    /// Exit with an error when any result carries blocking violations
    #[arg(long)]
    pub enforce: bool,
}

/// Arguments for `wdn report`.
#[derive(Clone, Debug, Args)]
pub struct ReportArgs {
    pub entity_type: String,
    pub entity_id: String,
}

/// Arguments for `wdn metrics`.
#[derive(Clone, Debug, Args)]
pub struct MetricsArgs {
    /// Restrict the rollup to one entity type
    #[arg(long)]
    pub entity_type: Option<String>,

    /// JSON fixtures file used for entity counts
    /// (defaults to .warden/entities.json)
    #[arg(long)]
    pub entities: Option<PathBuf>,
}

use clap::{Args, Subcommand};

#[derive(Clone, Debug, Subcommand)]
pub enum RuleCommands {
    /// List active rules, optionally for one entity type in priority order
    List {
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one rule by id
    Get { id: String },
    /// Create a rule
    Create {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        entity_type: String,
        #[arg(long)]
        rule_type: String,
        #[arg(long)]
        severity: String,
        /// JSON expression, e.g. '{"field":"assetName"}'
        #[arg(long)]
        expression: String,
        #[command(flatten)]
        fields: RuleFields,
    },
    /// Change fields of an existing rule
    Update {
        id: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long)]
        rule_type: Option<String>,
        #[arg(long)]
        severity: Option<String>,
        #[arg(long)]
        expression: Option<String>,
        #[command(flatten)]
        fields: RuleFields,
    },
    /// Deactivate a rule
    Delete { id: String },
    /// List the built-in rule templates
    Templates,
    /// Create a rule from a template key or code
    InstallTemplate { key: String },
    /// Install the baseline rules that are missing
    Seed,
}

/// Optional rule fields shared by create and update.
#[derive(Clone, Debug, Default, Args)]
pub struct RuleFields {
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub error_message: Option<String>,
    /// Whether violations of this rule block the operation
    #[arg(long)]
    pub blocking: Option<bool>,
    /// Lower runs first
    #[arg(long)]
    pub priority: Option<i32>,
}

use clap::Subcommand;

#[derive(Clone, Debug, Subcommand)]
pub enum ViolationCommands {
    /// List unresolved violations, or every active violation of one entity
    List {
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long)]
        entity_id: Option<String>,
        #[arg(long)]
        severity: Option<String>,
        /// Include resolved violations (requires --entity-type and --entity-id)
        #[arg(long, requires_all = ["entity_type", "entity_id"])]
        all: bool,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one violation by id
    Get { id: String },
    /// Move a violation into a resolved status
    Resolve {
        id: String,
        /// Who resolved it (defaults to the configured system actor)
        #[arg(long)]
        by: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Resolved status code, e.g. EXEMPTED
        #[arg(long, default_value = "COMPLIANT")]
        status: String,
    },
}

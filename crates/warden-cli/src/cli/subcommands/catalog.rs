use clap::Subcommand;

#[derive(Clone, Debug, Subcommand)]
pub enum CatalogCommands {
    /// List entries of one catalog, or all three
    List {
        /// rule_type, severity, or resolution_status
        kind: Option<String>,
    },
    /// Look up one entry by code (case-insensitive)
    Get { kind: String, code: String },
    /// Install the standard entries that are missing
    Seed,
}

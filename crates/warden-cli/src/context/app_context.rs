use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use warden_config::{PROJECT_DIR, WardenConfig};
use warden_db::service::WardenService;
use warden_engine::registry::EntityRegistry;
use warden_engine::{CatalogStore, ComplianceAgent, MetricsAggregator};

use super::fixtures::{DEFAULT_FIXTURES_FILE, load_registry};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: Arc<WardenService>,
    pub catalog: Arc<CatalogStore>,
    pub config: WardenConfig,
    pub project_root: PathBuf,
}

impl AppContext {
    /// Open the project database, seed the catalogs when configured to, and
    /// load the catalog cache.
    pub async fn init(project_root: PathBuf, config: WardenConfig) -> anyhow::Result<Self> {
        let db_path = config.database.resolve(&project_root);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let service = WardenService::new_local(&db_path.to_string_lossy())
            .await
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;
        let service = Arc::new(service);

        if config.engine.seed_on_startup {
            let report = service
                .seed_catalog()
                .await
                .context("failed to seed catalogs")?;
            tracing::debug!(inserted = report.total(), "catalog seed on startup");
        }

        let catalog = CatalogStore::load(service.clone(), &config.engine.default_severity)
            .await
            .context("failed to load catalogs")?;

        Ok(Self {
            service,
            catalog: Arc::new(catalog),
            config,
            project_root,
        })
    }

    /// Default location of the entity fixtures file.
    #[must_use]
    pub fn default_fixtures_path(&self) -> PathBuf {
        self.project_root
            .join(PROJECT_DIR)
            .join(DEFAULT_FIXTURES_FILE)
    }

    /// Entity registry from `explicit`, or from the default fixtures file if
    /// it exists.
    pub fn registry(&self, explicit: Option<&Path>) -> anyhow::Result<EntityRegistry> {
        match explicit {
            Some(path) => load_registry(path, true),
            None => load_registry(&self.default_fixtures_path(), false),
        }
    }

    #[must_use]
    pub fn agent(&self, registry: EntityRegistry) -> ComplianceAgent {
        ComplianceAgent::new(
            self.service.clone(),
            self.catalog.clone(),
            registry,
            &self.config.engine,
        )
    }

    #[must_use]
    pub fn metrics(&self, registry: EntityRegistry) -> MetricsAggregator {
        MetricsAggregator::new(self.service.clone(), registry, &self.config.engine)
    }

    /// Actor recorded on rule writes and default resolutions.
    #[must_use]
    pub fn actor(&self) -> &str {
        &self.config.engine.system_actor
    }
}

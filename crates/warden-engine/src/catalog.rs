//! Master catalog cache.
//!
//! Each catalog kind lives behind its own `RwLock<Arc<KindSnapshot>>`. Readers
//! clone the `Arc` and drop the lock immediately; refresh builds a complete
//! replacement snapshot off-lock and swaps the pointer. A lookup therefore
//! sees either the old catalog or the new one, never a half-filled map, and
//! never waits on the backing store while another task refreshes.
//!
//! Misses fall through to the backing store and are back-filled into a copy
//! of the current snapshot, which is then swapped in the same way.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, info, warn};
use warden_core::codes::{STATUS_COMPLIANT, STATUS_NON_COMPLIANT};
use warden_core::entities::{CatalogEntry, ResolutionStatus, RuleType, Severity};
use warden_core::enums::CatalogKind;
use warden_core::ids::normalize_tag;
use warden_db::error::DatabaseError;
use warden_db::service::WardenService;

/// Storage the catalog cache reads through to.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// All active entries of `kind`, in display order.
    async fn load(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, DatabaseError>;

    /// One active entry by normalized code.
    async fn find(&self, kind: CatalogKind, code: &str)
    -> Result<Option<CatalogEntry>, DatabaseError>;
}

#[async_trait]
impl CatalogBackend for WardenService {
    async fn load(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, DatabaseError> {
        self.load_catalog(kind).await
    }

    async fn find(
        &self,
        kind: CatalogKind,
        code: &str,
    ) -> Result<Option<CatalogEntry>, DatabaseError> {
        self.find_catalog_entry(kind, code).await
    }
}

#[derive(Debug, Default)]
struct KindSnapshot {
    entries: Vec<CatalogEntry>,
    by_code: HashMap<String, usize>,
}

impl KindSnapshot {
    fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let by_code = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (normalize_tag(entry.code()), i))
            .collect();
        Self { entries, by_code }
    }

    fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.by_code.get(code).map(|&i| &self.entries[i])
    }

    /// Copy of this snapshot with `entry` appended.
    fn with_entry(&self, entry: CatalogEntry) -> Self {
        let mut entries = self.entries.clone();
        entries.push(entry);
        Self::from_entries(entries)
    }
}

/// In-memory view of the three catalog vocabularies.
pub struct CatalogStore {
    backend: Arc<dyn CatalogBackend>,
    default_severity: String,
    rule_types: RwLock<Arc<KindSnapshot>>,
    severities: RwLock<Arc<KindSnapshot>>,
    statuses: RwLock<Arc<KindSnapshot>>,
}

impl CatalogStore {
    /// Empty cache; nothing is read until [`refresh`](Self::refresh) or the
    /// first lookup.
    #[must_use]
    pub fn new(backend: Arc<dyn CatalogBackend>, default_severity: &str) -> Self {
        Self {
            backend,
            default_severity: normalize_tag(default_severity),
            rule_types: RwLock::default(),
            severities: RwLock::default(),
            statuses: RwLock::default(),
        }
    }

    /// Build the cache and load every kind.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the backing store cannot be read.
    pub async fn load(
        backend: Arc<dyn CatalogBackend>,
        default_severity: &str,
    ) -> Result<Self, DatabaseError> {
        let store = Self::new(backend, default_severity);
        store.refresh().await?;
        Ok(store)
    }

    /// Reload all kinds from the backing store.
    ///
    /// All three kinds are read before any is swapped, so a failed read
    /// leaves the whole cache untouched.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any kind cannot be read.
    pub async fn refresh(&self) -> Result<(), DatabaseError> {
        let mut fresh = Vec::with_capacity(CatalogKind::ALL.len());
        for kind in CatalogKind::ALL {
            fresh.push((kind, self.backend.load(kind).await?));
        }
        for (kind, entries) in fresh {
            let count = entries.len();
            self.swap(kind, KindSnapshot::from_entries(entries));
            debug!(%kind, count, "catalog kind refreshed");
        }
        info!("catalog refreshed");
        Ok(())
    }

    /// Entry by kind and code, case-insensitive.
    ///
    /// Fails soft: a code unknown to the backing store, or a backing-store
    /// error, yields `None` with a warning.
    pub async fn lookup(&self, kind: CatalogKind, code: &str) -> Option<CatalogEntry> {
        let code = normalize_tag(code);
        if code.is_empty() {
            return None;
        }
        if let Some(entry) = self.snapshot(kind).get(&code) {
            return Some(entry.clone());
        }

        match self.backend.find(kind, &code).await {
            Ok(Some(entry)) => {
                self.backfill(kind, &code, entry.clone());
                Some(entry)
            }
            Ok(None) => {
                warn!(%kind, code, "catalog entry not found");
                None
            }
            Err(e) => {
                warn!(%kind, code, error = %e, "catalog lookup failed");
                None
            }
        }
    }

    /// Cached entries of one kind in display order.
    #[must_use]
    pub fn list_all(&self, kind: CatalogKind) -> Vec<CatalogEntry> {
        self.snapshot(kind).entries.clone()
    }

    pub async fn rule_type(&self, code: &str) -> Option<RuleType> {
        match self.lookup(CatalogKind::RuleType, code).await {
            Some(CatalogEntry::RuleType(entry)) => Some(entry),
            _ => None,
        }
    }

    pub async fn severity(&self, code: &str) -> Option<Severity> {
        match self.lookup(CatalogKind::Severity, code).await {
            Some(CatalogEntry::Severity(entry)) => Some(entry),
            _ => None,
        }
    }

    pub async fn resolution_status(&self, code: &str) -> Option<ResolutionStatus> {
        match self.lookup(CatalogKind::ResolutionStatus, code).await {
            Some(CatalogEntry::ResolutionStatus(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Cached severities ordered most severe first.
    #[must_use]
    pub fn severities(&self) -> Vec<Severity> {
        self.list_all(CatalogKind::Severity)
            .into_iter()
            .filter_map(|entry| match entry {
                CatalogEntry::Severity(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// The configured default severity.
    pub async fn default_severity(&self) -> Option<Severity> {
        self.severity(&self.default_severity).await
    }

    pub async fn compliant_status(&self) -> Option<ResolutionStatus> {
        self.resolution_status(STATUS_COMPLIANT).await
    }

    pub async fn non_compliant_status(&self) -> Option<ResolutionStatus> {
        self.resolution_status(STATUS_NON_COMPLIANT).await
    }

    /// Whether `status` is a resolved status. Unknown statuses are unresolved.
    pub async fn is_resolved(&self, status: &str) -> bool {
        self.resolution_status(status)
            .await
            .is_some_and(|s| s.is_resolved)
    }

    fn slot(&self, kind: CatalogKind) -> &RwLock<Arc<KindSnapshot>> {
        match kind {
            CatalogKind::RuleType => &self.rule_types,
            CatalogKind::Severity => &self.severities,
            CatalogKind::ResolutionStatus => &self.statuses,
        }
    }

    fn snapshot(&self, kind: CatalogKind) -> Arc<KindSnapshot> {
        Arc::clone(
            &self
                .slot(kind)
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    fn swap(&self, kind: CatalogKind, snapshot: KindSnapshot) {
        *self
            .slot(kind)
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }

    fn backfill(&self, kind: CatalogKind, code: &str, entry: CatalogEntry) {
        let mut slot = self
            .slot(kind)
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // A concurrent refresh or backfill may have added it already.
        if slot.get(code).is_none() {
            *slot = Arc::new(slot.with_entry(entry));
            debug!(%kind, code, "catalog entry back-filled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn severity(code: &str, level: i64, blocks: bool) -> CatalogEntry {
        CatalogEntry::Severity(Severity {
            code: code.into(),
            name: code.into(),
            description: None,
            level,
            blocks_operation: blocks,
            active: true,
        })
    }

    fn status(code: &str, resolved: bool) -> CatalogEntry {
        CatalogEntry::ResolutionStatus(ResolutionStatus {
            code: code.into(),
            name: code.into(),
            description: None,
            is_resolved: resolved,
            active: true,
        })
    }

    /// Backend whose `load` sees only `listed` while `find` sees `listed`
    /// plus `hidden`, so back-fill is observable.
    #[derive(Default)]
    struct FakeBackend {
        listed: std::sync::Mutex<Vec<CatalogEntry>>,
        hidden: Vec<CatalogEntry>,
        finds: AtomicUsize,
        fail_loads: bool,
    }

    #[async_trait]
    impl CatalogBackend for FakeBackend {
        async fn load(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>, DatabaseError> {
            if self.fail_loads {
                return Err(DatabaseError::Query("backend down".into()));
            }
            Ok(self
                .listed
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.kind() == kind)
                .cloned()
                .collect())
        }

        async fn find(
            &self,
            kind: CatalogKind,
            code: &str,
        ) -> Result<Option<CatalogEntry>, DatabaseError> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            let listed = self.listed.lock().unwrap().clone();
            Ok(listed
                .into_iter()
                .chain(self.hidden.iter().cloned())
                .find(|e| e.kind() == kind && e.code() == code))
        }
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let backend = Arc::new(FakeBackend {
            listed: vec![severity("CRITICAL", 1, true)].into(),
            ..FakeBackend::default()
        });
        let store = CatalogStore::load(backend.clone(), "MEDIUM").await.unwrap();
        let entry = store.lookup(CatalogKind::Severity, " critical ").await;
        assert_eq!(entry.map(|e| e.code().to_string()), Some("CRITICAL".into()));
        assert_eq!(backend.finds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn miss_backfills_from_backend() {
        let backend = Arc::new(FakeBackend {
            listed: vec![severity("CRITICAL", 1, true)].into(),
            hidden: vec![severity("LOW", 4, false)],
            ..FakeBackend::default()
        });
        let store = CatalogStore::load(backend.clone(), "MEDIUM").await.unwrap();
        assert_eq!(store.list_all(CatalogKind::Severity).len(), 1);

        assert!(store.severity("low").await.is_some());
        assert_eq!(backend.finds.load(Ordering::SeqCst), 1);
        assert_eq!(store.list_all(CatalogKind::Severity).len(), 2);

        // Second lookup is served from the cache.
        assert!(store.severity("LOW").await.is_some());
        assert_eq!(backend.finds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_code_fails_soft() {
        let store = CatalogStore::load(Arc::new(FakeBackend::default()), "MEDIUM")
            .await
            .unwrap();
        assert!(store.lookup(CatalogKind::RuleType, "NOPE").await.is_none());
        assert!(store.lookup(CatalogKind::RuleType, "  ").await.is_none());
        assert!(store.default_severity().await.is_none());
    }

    #[tokio::test]
    async fn refresh_replaces_whole_kind() {
        let backend = Arc::new(FakeBackend {
            listed: vec![severity("CRITICAL", 1, true), status("COMPLIANT", true)].into(),
            ..FakeBackend::default()
        });
        let store = CatalogStore::load(backend.clone(), "MEDIUM").await.unwrap();
        assert_eq!(store.list_all(CatalogKind::Severity).len(), 1);

        *backend.listed.lock().unwrap() = vec![
            severity("HIGH", 2, true),
            severity("MEDIUM", 3, false),
            status("COMPLIANT", true),
            status("NON_COMPLIANT", false),
        ];
        store.refresh().await.unwrap();

        let codes: Vec<String> = store
            .severities()
            .into_iter()
            .map(|s| s.code)
            .collect();
        assert_eq!(codes, ["HIGH", "MEDIUM"]);
        assert_eq!(store.default_severity().await.map(|s| s.level), Some(3));
        assert!(store.compliant_status().await.is_some_and(|s| s.is_resolved));
        assert!(store.non_compliant_status().await.is_some_and(|s| !s.is_resolved));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_view() {
        let good = Arc::new(FakeBackend {
            listed: vec![severity("CRITICAL", 1, true)].into(),
            ..FakeBackend::default()
        });
        let store = CatalogStore::load(good, "MEDIUM").await.unwrap();
        let failing = CatalogStore {
            backend: Arc::new(FakeBackend {
                fail_loads: true,
                ..FakeBackend::default()
            }),
            ..store
        };
        assert!(failing.refresh().await.is_err());
        assert_eq!(failing.list_all(CatalogKind::Severity).len(), 1);
    }

    #[tokio::test]
    async fn unknown_status_is_unresolved() {
        let backend = Arc::new(FakeBackend {
            listed: vec![status("EXEMPTED", true), status("PENDING", false)].into(),
            ..FakeBackend::default()
        });
        let store = CatalogStore::load(backend, "MEDIUM").await.unwrap();
        assert!(store.is_resolved("exempted").await);
        assert!(!store.is_resolved("PENDING").await);
        assert!(!store.is_resolved("ARCHIVED").await);
    }

    #[tokio::test]
    async fn concurrent_lookups_during_refresh_see_full_catalog() {
        let backend = Arc::new(FakeBackend {
            listed: vec![
                severity("CRITICAL", 1, true),
                severity("HIGH", 2, true),
                severity("MEDIUM", 3, false),
            ]
            .into(),
            ..FakeBackend::default()
        });
        let store = Arc::new(CatalogStore::load(backend, "MEDIUM").await.unwrap());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    assert_eq!(store.list_all(CatalogKind::Severity).len(), 3);
                    tokio::task::yield_now().await;
                }
            }));
        }
        for _ in 0..20 {
            store.refresh().await.unwrap();
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}

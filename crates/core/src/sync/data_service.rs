//! Reconciliation engine: picks one authoritative value per key at startup and
//! mirrors every later mutation into the local cache and the remote store.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::persist_queue::{PersistQueue, Targets};
use super::photo_id_repair::repair_duplicate_photo_ids;
use super::stores::{LegacyStoreTrait, LocalCacheTrait, RemoteStoreTrait, SeedSourceTrait};
use super::sync_model::{load_order, DataKey, Document, DocumentKind, KeyDescriptor};
use crate::errors::{Error, Result};
use crate::portfolio::{
    default_about_info, placeholder_collections, AboutInfo, AnimationConfig, GeoInfo, HeroImage,
    Photo, PhotoCollection,
};

/// Everything consumers can read, as one consistent copy.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub collections: Vec<PhotoCollection>,
    pub about_info: AboutInfo,
    pub lit_cities: Vec<GeoInfo>,
    pub hero_images: Vec<HeroImage>,
    pub animation_config: AnimationConfig,
    pub is_loaded: bool,
}

impl Default for PortfolioSnapshot {
    fn default() -> Self {
        Self {
            collections: Vec::new(),
            about_info: default_about_info(),
            lit_cities: Vec::new(),
            hero_images: Vec::new(),
            animation_config: AnimationConfig::default(),
            is_loaded: false,
        }
    }
}

impl PortfolioSnapshot {
    fn apply(&mut self, document: Document) {
        match document {
            Document::Collections(v) => self.collections = v,
            Document::AboutInfo(v) => self.about_info = v,
            Document::LitCities(v) => self.lit_cities = v,
            Document::HeroImages(v) => self.hero_images = v,
            Document::AnimationConfig(v) => self.animation_config = v,
        }
    }
}

/// Tier a published value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    Remote,
    LocalCache,
    Legacy,
    Seed,
    Placeholder,
    /// No tier had a value; the built-in default stays in place.
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { fields: usize },
    /// Seed fetch failed; built-in placeholders were published instead.
    Placeholder,
}

/// A stored value that could not be decoded and was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct CorruptEntry {
    pub key: DataKey,
    pub source: DocumentSource,
    pub message: String,
}

/// Outcome of the startup reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub sources: Vec<(DataKey, DocumentSource)>,
    pub remote_reachable: bool,
    pub seed: Option<SeedOutcome>,
    pub repaired_photo_ids: usize,
    pub corrupt: Vec<CorruptEntry>,
    pub cancelled: bool,
}

impl LoadReport {
    pub fn source_of(&self, key: DataKey) -> DocumentSource {
        self.sources
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, source)| *source)
            .unwrap_or(DocumentSource::Default)
    }

    fn record(&mut self, key: DataKey, source: DocumentSource) {
        self.sources.push((key, source));
    }

    fn corrupt(&mut self, key: DataKey, source: DocumentSource, err: &Error) {
        warn!("Skipping unreadable '{}' from {:?}: {}", key, source, err);
        self.corrupt.push(CorruptEntry {
            key,
            source,
            message: err.to_string(),
        });
    }
}

/// Result of the remote-vs-local decision for one key.
#[derive(Debug, PartialEq)]
enum Resolution {
    Remote(Document),
    /// `stale_remote` is set when remote held an empty list while the local tier did not.
    Local {
        document: Document,
        stale_remote: bool,
    },
    Absent,
}

fn resolve(kind: DocumentKind, remote: Option<Document>, local: Option<Document>) -> Resolution {
    match (remote, local) {
        (Some(remote), Some(local))
            if kind == DocumentKind::Sequence
                && remote.sequence_len() == Some(0)
                && local.sequence_len().unwrap_or(0) > 0 =>
        {
            Resolution::Local {
                document: local,
                stale_remote: true,
            }
        }
        (Some(remote), _) => Resolution::Remote(remote),
        (None, Some(local)) => Resolution::Local {
            document: local,
            stale_remote: false,
        },
        (None, None) => Resolution::Absent,
    }
}

/// Read and write surface used by pages and the admin panel.
#[async_trait]
pub trait PortfolioDataServiceTrait: Send + Sync {
    fn collections(&self) -> Vec<PhotoCollection>;
    fn about_info(&self) -> AboutInfo;
    fn lit_cities(&self) -> Vec<GeoInfo>;
    fn hero_images(&self) -> Vec<HeroImage>;
    fn animation_config(&self) -> AnimationConfig;
    /// False until startup reconciliation has finished, even if data is empty.
    fn is_loaded(&self) -> bool;
    fn snapshot(&self) -> PortfolioSnapshot;

    async fn update_collections(&self, collections: Vec<PhotoCollection>) -> Result<()>;
    async fn update_about_info(&self, about_info: AboutInfo) -> Result<()>;
    async fn update_lit_cities(&self, cities: Vec<GeoInfo>) -> Result<()>;
    async fn update_hero_images(&self, images: Vec<HeroImage>) -> Result<()>;
    async fn update_animation_config(&self, config: AnimationConfig) -> Result<()>;

    /// Appends a photo; persistence is best-effort. Returns false if no collection matched.
    fn add_photo(&self, collection_id: &str, photo: Photo) -> bool;
    /// Removes a photo; persistence is best-effort. Returns false if nothing was removed.
    fn remove_photo(&self, collection_id: &str, photo_id: &str) -> bool;
}

pub struct PortfolioDataService {
    local: Arc<dyn LocalCacheTrait>,
    legacy: Arc<dyn LegacyStoreTrait>,
    remote: Option<Arc<dyn RemoteStoreTrait>>,
    seed: Arc<dyn SeedSourceTrait>,
    state: RwLock<PortfolioSnapshot>,
    persist: PersistQueue,
    load_started: AtomicBool,
    closed: AtomicBool,
}

impl PortfolioDataService {
    /// Creates the service. `remote == None` means the remote store is not configured.
    ///
    /// Must be called inside a Tokio runtime: it spawns the persistence worker.
    pub fn new(
        local: Arc<dyn LocalCacheTrait>,
        legacy: Arc<dyn LegacyStoreTrait>,
        remote: Option<Arc<dyn RemoteStoreTrait>>,
        seed: Arc<dyn SeedSourceTrait>,
    ) -> Self {
        let persist = PersistQueue::spawn(local.clone(), remote.clone());
        Self {
            local,
            legacy,
            remote,
            seed,
            state: RwLock::new(PortfolioSnapshot::default()),
            persist,
            load_started: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    /// Stops publishing startup results. Storage calls already in flight finish
    /// in the background and their results are dropped.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Waits until every persistence job queued so far has completed.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }

    fn read_state(&self) -> RwLockReadGuard<'_, PortfolioSnapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, PortfolioSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs the startup reconciliation pass. Allowed once per service.
    pub async fn load(&self) -> Result<LoadReport> {
        if self.load_started.swap(true, Ordering::SeqCst) {
            return Err(Error::InvalidState(
                "Portfolio data has already been loaded for this session".to_string(),
            ));
        }

        let mut report = LoadReport::default();
        for descriptor in load_order() {
            if self.is_closed() {
                report.cancelled = true;
                return Ok(report);
            }
            let source = self.load_key(&descriptor, &mut report).await;
            report.record(descriptor.key, source);
        }

        let nothing_found = report.source_of(DataKey::PhotoCollections) == DocumentSource::Default
            && report.source_of(DataKey::AboutInfo) == DocumentSource::Default;
        if nothing_found && !report.remote_reachable {
            let outcome = self.apply_seed(&mut report).await;
            report.seed = Some(outcome);
        }

        if self.is_closed() {
            report.cancelled = true;
            return Ok(report);
        }
        self.write_state().is_loaded = true;
        info!(
            "Portfolio data loaded (remote reachable: {}, seed: {:?})",
            report.remote_reachable, report.seed
        );
        Ok(report)
    }

    async fn load_key(&self, descriptor: &KeyDescriptor, report: &mut LoadReport) -> DocumentSource {
        let key = descriptor.key;
        let remote = self.read_remote(key, report).await;

        let (local, local_source) = match self.read_local(key, report).await {
            Some(document) => (Some(document), DocumentSource::LocalCache),
            None => (self.migrate_legacy(key, report).await, DocumentSource::Legacy),
        };

        let (document, source) = match resolve(descriptor.kind, remote, local) {
            Resolution::Absent => {
                debug!("No stored value for '{}'", key);
                return DocumentSource::Default;
            }
            Resolution::Remote(document) => (document, DocumentSource::Remote),
            Resolution::Local {
                document,
                stale_remote,
            } => {
                if stale_remote && !self.is_closed() {
                    info!("Remote '{}' is empty but local is not; pushing local back", key);
                    self.enqueue(&document, Targets::REMOTE_ONLY);
                }
                (document, local_source)
            }
        };

        let mut document = document;
        let mut cache_locally = source == DocumentSource::Legacy;
        if let Document::Collections(collections) = &mut document {
            let repaired = repair_duplicate_photo_ids(collections);
            if repaired > 0 {
                report.repaired_photo_ids += repaired;
                cache_locally = true;
            }
        }

        if self.is_closed() {
            return source;
        }
        if cache_locally {
            self.enqueue(&document, Targets::LOCAL_ONLY);
        }
        self.write_state().apply(document);
        debug!("Published '{}' from {:?}", key, source);
        source
    }

    async fn read_remote(&self, key: DataKey, report: &mut LoadReport) -> Option<Document> {
        let remote = self.remote.as_ref()?;
        let Some(value) = remote.get(key.as_str()).await else {
            debug!("Remote has no value for '{}'", key);
            return None;
        };
        report.remote_reachable = true;
        match Document::decode(key, value) {
            Ok(document) => Some(document),
            Err(err) => {
                report.corrupt(key, DocumentSource::Remote, &err);
                None
            }
        }
    }

    async fn read_local(&self, key: DataKey, report: &mut LoadReport) -> Option<Document> {
        let value = match self.local.get(key.as_str()).await {
            Ok(value) => value?,
            Err(err @ Error::CorruptData { .. }) => {
                report.corrupt(key, DocumentSource::LocalCache, &err);
                return None;
            }
            Err(err) => {
                warn!("Local cache read failed for '{}': {}", key, err);
                return None;
            }
        };
        match Document::decode(key, value) {
            Ok(document) => Some(document),
            Err(err) => {
                report.corrupt(key, DocumentSource::LocalCache, &err);
                None
            }
        }
    }

    /// One-time migration out of the legacy flat store.
    ///
    /// Unreadable entries are left in place so they can be recovered by hand.
    async fn migrate_legacy(&self, key: DataKey, report: &mut LoadReport) -> Option<Document> {
        let raw = match self.legacy.get_raw(key.as_str()).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("Legacy storage read failed for '{}': {}", key, err);
                return None;
            }
        };

        let decoded = serde_json::from_str(&raw)
            .map_err(|err| Error::corrupt(key.as_str(), err.to_string()))
            .and_then(|value| Document::decode(key, value));
        let document = match decoded {
            Ok(document) => document,
            Err(err) => {
                report.corrupt(key, DocumentSource::Legacy, &err);
                return None;
            }
        };

        if let Err(err) = self.legacy.remove(key.as_str()).await {
            warn!("Failed to remove migrated legacy entry '{}': {}", key, err);
        }
        info!("Migrated '{}' out of legacy storage", key);
        Some(document)
    }

    async fn apply_seed(&self, report: &mut LoadReport) -> SeedOutcome {
        match self.seed.fetch().await {
            Ok(seed) => {
                let documents = seed.into_documents();
                let fields = documents.len();
                info!("Seeding portfolio data with {} field(s)", fields);
                for document in documents {
                    self.publish_and_write_through(document, DocumentSource::Seed, report);
                }
                SeedOutcome::Seeded { fields }
            }
            Err(err) => {
                warn!("Seed data unavailable, using placeholders: {}", err);
                let documents = [
                    Document::Collections(placeholder_collections()),
                    Document::AboutInfo(default_about_info()),
                ];
                for document in documents {
                    self.publish_and_write_through(document, DocumentSource::Placeholder, report);
                }
                SeedOutcome::Placeholder
            }
        }
    }

    fn publish_and_write_through(
        &self,
        document: Document,
        source: DocumentSource,
        report: &mut LoadReport,
    ) {
        if self.is_closed() {
            return;
        }
        let key = document.key();
        self.enqueue(&document, Targets::ALL);
        self.write_state().apply(document);
        report.record(key, source);
    }

    fn enqueue(&self, document: &Document, targets: Targets) {
        match document.to_value() {
            Ok(value) => self.persist.enqueue(document.key(), value, targets),
            Err(err) => warn!("Could not encode '{}' for persistence: {}", document.key(), err),
        }
    }

    /// Applies the document in memory, then waits for the remote outcome.
    async fn update_strict(&self, document: Document) -> Result<()> {
        let key = document.key();
        let value = document.to_value()?;
        let pending = {
            let mut state = self.write_state();
            state.apply(document);
            self.persist.submit_strict(key, value, Targets::ALL)
        };
        pending.wait().await
    }

    /// Read-modify-write on collections with best-effort persistence.
    fn mutate_collections<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut Vec<PhotoCollection>) -> bool,
    {
        let mut state = self.write_state();
        if !mutate(&mut state.collections) {
            return false;
        }
        match serde_json::to_value(&state.collections) {
            Ok(value) => self
                .persist
                .enqueue(DataKey::PhotoCollections, value, Targets::ALL),
            Err(err) => warn!("Could not encode collections for persistence: {}", err),
        }
        true
    }
}

#[async_trait]
impl PortfolioDataServiceTrait for PortfolioDataService {
    fn collections(&self) -> Vec<PhotoCollection> {
        self.read_state().collections.clone()
    }

    fn about_info(&self) -> AboutInfo {
        self.read_state().about_info.clone()
    }

    fn lit_cities(&self) -> Vec<GeoInfo> {
        self.read_state().lit_cities.clone()
    }

    fn hero_images(&self) -> Vec<HeroImage> {
        self.read_state().hero_images.clone()
    }

    fn animation_config(&self) -> AnimationConfig {
        self.read_state().animation_config
    }

    fn is_loaded(&self) -> bool {
        self.read_state().is_loaded
    }

    fn snapshot(&self) -> PortfolioSnapshot {
        self.read_state().clone()
    }

    async fn update_collections(&self, collections: Vec<PhotoCollection>) -> Result<()> {
        self.update_strict(Document::Collections(collections)).await
    }

    async fn update_about_info(&self, about_info: AboutInfo) -> Result<()> {
        self.update_strict(Document::AboutInfo(about_info)).await
    }

    async fn update_lit_cities(&self, cities: Vec<GeoInfo>) -> Result<()> {
        self.update_strict(Document::LitCities(cities)).await
    }

    async fn update_hero_images(&self, images: Vec<HeroImage>) -> Result<()> {
        self.update_strict(Document::HeroImages(images)).await
    }

    async fn update_animation_config(&self, config: AnimationConfig) -> Result<()> {
        self.update_strict(Document::AnimationConfig(config)).await
    }

    fn add_photo(&self, collection_id: &str, photo: Photo) -> bool {
        self.mutate_collections(|collections| {
            match collections.iter_mut().find(|c| c.id == collection_id) {
                Some(collection) => {
                    collection.photos.push(photo);
                    true
                }
                None => {
                    debug!("add_photo: no collection '{}'", collection_id);
                    false
                }
            }
        })
    }

    fn remove_photo(&self, collection_id: &str, photo_id: &str) -> bool {
        self.mutate_collections(|collections| {
            let Some(collection) = collections.iter_mut().find(|c| c.id == collection_id) else {
                debug!("remove_photo: no collection '{}'", collection_id);
                return false;
            };
            let before = collection.photos.len();
            collection.photos.retain(|p| p.id != photo_id);
            collection.photos.len() != before
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Continent;

    fn cities(n: usize) -> Document {
        Document::LitCities(
            (0..n)
                .map(|i| GeoInfo {
                    continent: Continent::Asia,
                    country: "Japan".to_string(),
                    country_code: "JP".to_string(),
                    city: format!("City {i}"),
                    lat: 0.0,
                    lng: 0.0,
                })
                .collect(),
        )
    }

    #[test]
    fn remote_wins_when_both_present() {
        let resolution = resolve(DocumentKind::Sequence, Some(cities(1)), Some(cities(2)));
        assert_eq!(resolution, Resolution::Remote(cities(1)));
    }

    #[test]
    fn empty_remote_list_yields_to_non_empty_local() {
        let resolution = resolve(DocumentKind::Sequence, Some(cities(0)), Some(cities(3)));
        assert_eq!(
            resolution,
            Resolution::Local {
                document: cities(3),
                stale_remote: true
            }
        );
    }

    #[test]
    fn empty_remote_list_wins_over_empty_or_missing_local() {
        assert_eq!(
            resolve(DocumentKind::Sequence, Some(cities(0)), Some(cities(0))),
            Resolution::Remote(cities(0))
        );
        assert_eq!(
            resolve(DocumentKind::Sequence, Some(cities(0)), None),
            Resolution::Remote(cities(0))
        );
    }

    #[test]
    fn records_never_trigger_the_conflict_rule() {
        let remote = Document::AboutInfo(default_about_info());
        let local = Document::AboutInfo(AboutInfo {
            name: "Local".to_string(),
            ..default_about_info()
        });
        assert_eq!(
            resolve(DocumentKind::Record, Some(remote.clone()), Some(local)),
            Resolution::Remote(remote)
        );
    }

    #[test]
    fn local_used_when_remote_absent() {
        assert_eq!(
            resolve(DocumentKind::Sequence, None, Some(cities(0))),
            Resolution::Local {
                document: cities(0),
                stale_remote: false
            }
        );
        assert_eq!(resolve(DocumentKind::Record, None, None), Resolution::Absent);
    }
}

//! Process-wide model cache with single-flight loading

use crate::config::RegistryConfig;
use crate::error::{LoadError, RegistryError, Result};
use crate::loader::GraphLoader;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sgraph_core::{Graph, Model, ModelId, ModelSummary};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// `None` while the load is running, then the shared outcome.
type LoadOutcome = Option<std::result::Result<ModelId, LoadError>>;

enum Role {
    Cached(ModelId),
    Leader(watch::Sender<LoadOutcome>),
    Follower(watch::Receiver<LoadOutcome>),
}

/// Removes the in-flight marker when the leading load finishes or is
/// dropped mid-parse.
struct InFlightGuard<'a> {
    in_flight: &'a DashMap<String, watch::Receiver<LoadOutcome>>,
    key: &'a str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(self.key);
    }
}

/// Maps model ids to loaded, immutable models.
///
/// Only the maps below are mutable; models themselves are shared as
/// `Arc<Model>`, so queries never lock and an evicted or replaced model stays
/// valid for whoever still holds it.
pub struct ModelRegistry {
    loader: Arc<dyn GraphLoader>,
    config: RegistryConfig,
    models: DashMap<ModelId, Arc<Model>>,
    by_source: DashMap<String, ModelId>,
    in_flight: DashMap<String, watch::Receiver<LoadOutcome>>,
    default_model: RwLock<Option<ModelId>>,
}

impl ModelRegistry {
    pub fn new(loader: Arc<dyn GraphLoader>, config: RegistryConfig) -> Self {
        ModelRegistry {
            loader,
            config,
            models: DashMap::new(),
            by_source: DashMap::new(),
            in_flight: DashMap::new(),
            default_model: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Load `source`, returning the cached id when the same source is
    /// already loaded. Concurrent loads of one source share a single parse.
    pub async fn load(&self, source: &str) -> Result<ModelId> {
        let key = self.loader.normalize(source);
        self.load_key(key, false).await
    }

    /// Parse `source` again even if cached. The new model replaces the old
    /// one for this source; the old id is retired from the registry.
    pub async fn reload(&self, source: &str) -> Result<ModelId> {
        let key = self.loader.normalize(source);
        self.load_key(key, true).await
    }

    async fn load_key(&self, key: String, force: bool) -> Result<ModelId> {
        if !force {
            if let Some(id) = self.cached(&key) {
                debug!("Model cache hit for {}: {}", key, id);
                return Ok(id);
            }
        }

        let role = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => Role::Follower(entry.get().clone()),
            Entry::Vacant(entry) => match self.cached(&key).filter(|_| !force) {
                // Published between the first check and taking the marker.
                Some(id) => Role::Cached(id),
                None => {
                    let (sender, receiver) = watch::channel(None);
                    entry.insert(receiver);
                    Role::Leader(sender)
                }
            },
        };

        match role {
            Role::Cached(id) => Ok(id),
            Role::Follower(receiver) => {
                debug!("Joining in-flight load of {}", key);
                Self::join(receiver, &key).await
            }
            Role::Leader(sender) => {
                let guard = InFlightGuard {
                    in_flight: &self.in_flight,
                    key: &key,
                };
                let outcome = self.parse_and_publish(&key).await;
                drop(guard);
                sender.send_replace(Some(outcome.clone()));
                outcome.map_err(RegistryError::from)
            }
        }
    }

    async fn join(mut receiver: watch::Receiver<LoadOutcome>, key: &str) -> Result<ModelId> {
        loop {
            let current = receiver.borrow_and_update().clone();
            if let Some(outcome) = current {
                return outcome.map_err(RegistryError::from);
            }
            if receiver.changed().await.is_err() {
                let last = receiver.borrow().clone();
                return match last {
                    Some(outcome) => outcome.map_err(RegistryError::from),
                    None => Err(LoadError::Abandoned {
                        source_location: key.to_string(),
                    }
                    .into()),
                };
            }
        }
    }

    async fn parse_and_publish(&self, key: &str) -> std::result::Result<ModelId, LoadError> {
        let timeout = self.config.load_timeout();
        let started = Instant::now();
        info!("Loading model from {} ({})", key, self.loader.name());

        let graph = match tokio::time::timeout(timeout, self.loader.load(key)).await {
            Ok(Ok(graph)) => graph,
            Ok(Err(e)) => {
                warn!("Failed to load {}: {:#}", key, e);
                return Err(LoadError::Failed {
                    source_location: key.to_string(),
                    reason: format!("{e:#}"),
                });
            }
            Err(_) => {
                warn!("Loading {} timed out after {:?}", key, timeout);
                return Err(LoadError::TimedOut {
                    source_location: key.to_string(),
                    timeout,
                });
            }
        };

        let id = self.publish(key, graph);
        info!(
            "Loaded model {} from {} in {:?}",
            id,
            key,
            started.elapsed()
        );
        Ok(id)
    }

    /// Make a built graph visible under a fresh id. The model is inserted
    /// before the source mapping so a cache hit always finds it.
    fn publish(&self, key: &str, graph: Graph) -> ModelId {
        let id = ModelId::new(uuid::Uuid::new_v4().simple().to_string());
        let model = Arc::new(Model::new(id.clone(), key, graph));
        self.models.insert(id.clone(), model);
        if let Some(previous) = self.by_source.insert(key.to_string(), id.clone()) {
            if previous != id {
                self.retire(&previous, &id);
            }
        }
        id
    }

    fn retire(&self, previous: &ModelId, replacement: &ModelId) {
        self.models.remove(previous);
        let mut default = self
            .default_model
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if default.as_ref() == Some(previous) {
            *default = Some(replacement.clone());
        }
        info!("Model {} replaced by {}", previous, replacement);
    }

    fn cached(&self, key: &str) -> Option<ModelId> {
        let id = self.by_source.get(key).map(|r| r.value().clone())?;
        self.models.contains_key(&id).then_some(id)
    }

    /// Register an already-built graph under `source_location`, bypassing
    /// the loader. Replaces any model cached for the same location.
    pub fn insert(&self, source_location: &str, graph: Graph) -> ModelId {
        let key = self.loader.normalize(source_location);
        let id = self.publish(&key, graph);
        info!("Registered model {} for {}", id, key);
        id
    }

    /// Look up a loaded model. Never waits on in-flight loads.
    pub fn get(&self, id: &ModelId) -> Result<Arc<Model>> {
        self.models
            .get(id)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| RegistryError::ModelNotFound {
                model_id: id.clone(),
            })
    }

    /// `id` when given, else the designated default.
    pub fn get_or_default(&self, id: Option<&ModelId>) -> Result<Arc<Model>> {
        match id {
            Some(id) => self.get(id),
            None => self.default_model(),
        }
    }

    /// Id currently cached for `source`, if any.
    pub fn lookup(&self, source: &str) -> Option<ModelId> {
        self.cached(&self.loader.normalize(source))
    }

    /// Drop a model from the registry. Holders of the `Arc<Model>` are
    /// unaffected.
    pub fn evict(&self, id: &ModelId) -> Option<Arc<Model>> {
        let (_, model) = self.models.remove(id)?;
        self.by_source
            .remove_if(model.source_location(), |_, mapped| mapped == id);
        let mut default = self
            .default_model
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if default.as_ref() == Some(id) {
            *default = None;
        }
        info!("Evicted model {} ({})", id, model.source_location());
        Some(model)
    }

    /// Designate the model callers get when they omit an id.
    pub fn set_default(&self, id: &ModelId) -> Result<()> {
        if !self.models.contains_key(id) {
            return Err(RegistryError::ModelNotFound {
                model_id: id.clone(),
            });
        }
        *self
            .default_model
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(id.clone());
        debug!("Default model set to {}", id);
        Ok(())
    }

    pub fn default_id(&self) -> Option<ModelId> {
        self.default_model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn default_model(&self) -> Result<Arc<Model>> {
        let id = self.default_id().ok_or(RegistryError::NoDefaultModel)?;
        self.get(&id)
    }

    /// Summaries of every loaded model, oldest first.
    pub fn models(&self) -> Vec<ModelSummary> {
        let mut summaries: Vec<ModelSummary> =
            self.models.iter().map(|r| r.value().summary()).collect();
        summaries.sort_by(|a, b| a.loaded_at.cmp(&b.loaded_at).then(a.id.cmp(&b.id)));
        summaries
    }

    pub fn ids(&self) -> Vec<ModelId> {
        let mut ids: Vec<ModelId> = self.models.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Number of loads currently running.
    pub fn loads_in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

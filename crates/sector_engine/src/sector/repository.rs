//! MetadataRepository - fetches and caches sector trees by model identifier.
//!
//! One scene fetch per model: concurrent `load` calls for the same
//! identifier join the in-flight load and share its result. Successful
//! trees are cached; failures are not, so a later call retries.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};

use tracing::{debug, info};

use crate::error::MetadataError;
use crate::provider::ModelDataProvider;
use crate::types::ModelIdentifier;

use super::scene::parse_scene;
use super::tree::SectorTree;

/// File name of the scene description under a model's base path.
pub const SCENE_FILE_NAME: &str = "scene.json";

impl ModelIdentifier {
  /// Base path of this model's files at the provider.
  pub fn base_path(&self) -> String {
    format!("models/{}/{}", self.model_id, self.revision_id)
  }
}

/// Shared slot the first loader publishes its result into.
struct LoadGate {
  result: Mutex<Option<Result<Arc<SectorTree>, MetadataError>>>,
  ready: Condvar,
}

impl LoadGate {
  fn new() -> Self {
    Self {
      result: Mutex::new(None),
      ready: Condvar::new(),
    }
  }

  fn publish(&self, result: Result<Arc<SectorTree>, MetadataError>) {
    let mut slot = self.result.lock().unwrap();
    *slot = Some(result);
    self.ready.notify_all();
  }

  fn wait(&self) -> Result<Arc<SectorTree>, MetadataError> {
    let mut slot = self.result.lock().unwrap();
    loop {
      if let Some(result) = slot.as_ref() {
        return result.clone();
      }
      slot = self.ready.wait(slot).unwrap();
    }
  }
}

enum CacheEntry {
  Loading(Arc<LoadGate>),
  Ready(Arc<SectorTree>),
}

/// Caching repository of sector trees.
pub struct MetadataRepository {
  provider: Arc<dyn ModelDataProvider>,
  cache: Mutex<HashMap<ModelIdentifier, CacheEntry>>,
}

impl MetadataRepository {
  pub fn new(provider: Arc<dyn ModelDataProvider>) -> Self {
    Self {
      provider,
      cache: Mutex::new(HashMap::new()),
    }
  }

  /// Load the sector tree for a model, fetching at most once.
  ///
  /// Blocks until the tree is available. No automatic retry: a failed load
  /// is reported to every caller that joined it, and the next call starts
  /// fresh.
  pub fn load(&self, model: ModelIdentifier) -> Result<Arc<SectorTree>, MetadataError> {
    enum Action {
      Load(Arc<LoadGate>),
      Wait(Arc<LoadGate>),
    }

    let action = {
      let mut cache = self.cache.lock().unwrap();
      match cache.get(&model) {
        Some(CacheEntry::Ready(tree)) => return Ok(Arc::clone(tree)),
        Some(CacheEntry::Loading(gate)) => Action::Wait(Arc::clone(gate)),
        None => {
          let gate = Arc::new(LoadGate::new());
          cache.insert(model, CacheEntry::Loading(Arc::clone(&gate)));
          Action::Load(gate)
        }
      }
    };

    match action {
      Action::Wait(gate) => {
        debug!(%model, "joining in-flight metadata load");
        gate.wait()
      }
      Action::Load(gate) => {
        let result = self.fetch_and_parse(model);

        let mut cache = self.cache.lock().unwrap();
        match &result {
          Ok(tree) => {
            cache.insert(model, CacheEntry::Ready(Arc::clone(tree)));
          }
          Err(_) => {
            cache.remove(&model);
          }
        }
        drop(cache);

        gate.publish(result.clone());
        result
      }
    }
  }

  /// The cached tree, if a load already completed.
  pub fn cached(&self, model: ModelIdentifier) -> Option<Arc<SectorTree>> {
    let cache = self.cache.lock().unwrap();
    match cache.get(&model) {
      Some(CacheEntry::Ready(tree)) => Some(Arc::clone(tree)),
      _ => None,
    }
  }

  /// Drop a cached tree, e.g. when the model is unloaded.
  ///
  /// An in-flight load is left alone; its result still lands in the cache.
  pub fn evict(&self, model: ModelIdentifier) -> bool {
    let mut cache = self.cache.lock().unwrap();
    match cache.get(&model) {
      Some(CacheEntry::Ready(_)) => cache.remove(&model).is_some(),
      _ => false,
    }
  }

  fn fetch_and_parse(&self, model: ModelIdentifier) -> Result<Arc<SectorTree>, MetadataError> {
    let json = self
      .provider
      .get_json_file(&model.base_path(), SCENE_FILE_NAME)?;
    let tree = parse_scene(model, &json)?;
    info!(%model, sectors = tree.len(), "loaded sector metadata");
    Ok(Arc::new(tree))
  }
}

#[cfg(test)]
#[path = "repository_test.rs"]
mod repository_test;

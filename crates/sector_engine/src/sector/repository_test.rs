//! Tests for the metadata repository: caching, in-flight sharing, retry.

use std::sync::Arc;

use crossbeam_channel as channel;

use crate::error::{MetadataError, ProviderError};
use crate::provider::{MemoryProvider, ModelDataProvider};
use crate::sector::test_fixtures::scene_json;
use crate::types::ModelIdentifier;

use super::*;

fn model() -> ModelIdentifier {
  ModelIdentifier::new(7, 3)
}

fn provider_with_scene() -> Arc<MemoryProvider> {
  let provider = Arc::new(MemoryProvider::new());
  provider.insert(
    &model().base_path(),
    SCENE_FILE_NAME,
    scene_json(model()).to_string().into_bytes(),
  );
  provider
}

#[test]
fn test_load_caches_by_identifier() {
  let provider = provider_with_scene();
  let repo = MetadataRepository::new(provider.clone());

  let first = repo.load(model()).unwrap();
  let second = repo.load(model()).unwrap();

  assert!(Arc::ptr_eq(&first, &second));
  assert_eq!(provider.fetch_count(), 1);
  assert!(repo.cached(model()).is_some());
}

#[test]
fn test_failure_is_not_cached() {
  let provider = Arc::new(MemoryProvider::new());
  let repo = MetadataRepository::new(provider.clone());

  let err = repo.load(model()).unwrap_err();
  assert!(matches!(err, MetadataError::Fetch(ProviderError::NotFound(_))));
  assert!(repo.cached(model()).is_none());

  // The caller may retry once the scene exists.
  provider.insert(
    &model().base_path(),
    SCENE_FILE_NAME,
    scene_json(model()).to_string().into_bytes(),
  );
  assert!(repo.load(model()).is_ok());
}

#[test]
fn test_evict_drops_cached_tree() {
  let provider = provider_with_scene();
  let repo = MetadataRepository::new(provider.clone());

  repo.load(model()).unwrap();
  assert!(repo.evict(model()));
  assert!(repo.cached(model()).is_none());
  assert!(!repo.evict(model()));

  repo.load(model()).unwrap();
  assert_eq!(provider.fetch_count(), 2);
}

/// Provider that parks every fetch until released, so tests can hold a load
/// in flight deterministically.
struct GatedProvider {
  inner: Arc<MemoryProvider>,
  gate: channel::Receiver<()>,
}

impl ModelDataProvider for GatedProvider {
  fn get_binary_file(&self, base_path: &str, file_name: &str) -> Result<Vec<u8>, ProviderError> {
    self.gate.recv().ok();
    self.inner.get_binary_file(base_path, file_name)
  }
}

#[test]
fn test_concurrent_loads_share_one_fetch() {
  let inner = provider_with_scene();
  let (release, gate) = channel::unbounded();
  let provider = Arc::new(GatedProvider {
    inner: inner.clone(),
    gate,
  });
  let repo = Arc::new(MetadataRepository::new(provider));

  let threads: Vec<_> = (0..4)
    .map(|_| {
      let repo = Arc::clone(&repo);
      std::thread::spawn(move || repo.load(model()))
    })
    .collect();

  // Let the fetch start on some thread, then release it once. Only one
  // fetch should ever reach the provider.
  std::thread::sleep(std::time::Duration::from_millis(20));
  release.send(()).unwrap();

  for handle in threads {
    assert!(handle.join().unwrap().is_ok());
  }
  assert_eq!(inner.fetch_count(), 1);
}

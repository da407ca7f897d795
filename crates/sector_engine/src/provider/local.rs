//! Offline providers: static files on disk, and an in-memory map.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::ProviderError;

use super::ModelDataProvider;

/// Provider backed by a directory of static files.
///
/// Files live at `<root>/<base_path>/<file_name>`.
pub struct LocalFileProvider {
  root: PathBuf,
}

impl LocalFileProvider {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl ModelDataProvider for LocalFileProvider {
  fn get_binary_file(&self, base_path: &str, file_name: &str) -> Result<Vec<u8>, ProviderError> {
    let path = self.root.join(base_path).join(file_name);
    Ok(std::fs::read(&path)?)
  }
}

/// In-memory provider for tests and demos.
///
/// Counts fetches so callers can assert request de-duplication.
#[derive(Default)]
pub struct MemoryProvider {
  files: Mutex<HashMap<(String, String), Vec<u8>>>,
  fetches: AtomicUsize,
}

impl MemoryProvider {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a file under `base_path`/`file_name`.
  pub fn insert(&self, base_path: &str, file_name: &str, bytes: Vec<u8>) {
    self
      .files
      .lock()
      .unwrap()
      .insert((base_path.to_owned(), file_name.to_owned()), bytes);
  }

  /// Total number of `get_binary_file` calls served or failed.
  pub fn fetch_count(&self) -> usize {
    self.fetches.load(Ordering::Relaxed)
  }
}

impl ModelDataProvider for MemoryProvider {
  fn get_binary_file(&self, base_path: &str, file_name: &str) -> Result<Vec<u8>, ProviderError> {
    self.fetches.fetch_add(1, Ordering::Relaxed);
    self
      .files
      .lock()
      .unwrap()
      .get(&(base_path.to_owned(), file_name.to_owned()))
      .cloned()
      .ok_or_else(|| ProviderError::NotFound(format!("{base_path}/{file_name}")))
  }
}

//! Model data providers.
//!
//! A provider hands out the raw files a model is made of: one JSON scene
//! description per model plus one binary payload per sector. Two
//! implementations ship here: [`LocalFileProvider`] for static files on disk
//! and [`MemoryProvider`] for tests and demos. [`RetryingProvider`] wraps an
//! authenticated transport with bounded retry and token refresh.

use crate::error::ProviderError;

mod local;
mod retry;

pub use local::{LocalFileProvider, MemoryProvider};
pub use retry::{AuthenticatedTransport, RetryingProvider, TokenSource, MAX_FETCH_RETRIES};

/// Source of model files, addressed by a per-model base path and a file name.
///
/// Implementations are shared across worker threads; calls may block.
pub trait ModelDataProvider: Send + Sync {
  /// Fetch a binary file.
  fn get_binary_file(&self, base_path: &str, file_name: &str) -> Result<Vec<u8>, ProviderError>;

  /// Fetch and parse a JSON file.
  ///
  /// The default implementation fetches the raw bytes and parses them;
  /// transports with native JSON responses may override.
  fn get_json_file(
    &self,
    base_path: &str,
    file_name: &str,
  ) -> Result<serde_json::Value, ProviderError> {
    let bytes = self.get_binary_file(base_path, file_name)?;
    serde_json::from_slice(&bytes)
      .map_err(|err| ProviderError::Transport(format!("invalid JSON in {file_name}: {err}")))
  }
}

impl<P: ModelDataProvider + ?Sized> ModelDataProvider for std::sync::Arc<P> {
  fn get_binary_file(&self, base_path: &str, file_name: &str) -> Result<Vec<u8>, ProviderError> {
    (**self).get_binary_file(base_path, file_name)
  }

  fn get_json_file(
    &self,
    base_path: &str,
    file_name: &str,
  ) -> Result<serde_json::Value, ProviderError> {
    (**self).get_json_file(base_path, file_name)
  }
}

//! Error types, one enum per concern.
//!
//! Provider and metadata errors are `Clone` so that one in-flight metadata
//! load can report its failure to every waiter that joined it.

use std::sync::Arc;

use thiserror::Error;

/// Errors from a model data provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
  #[error("file not found: {0}")]
  NotFound(String),

  /// Authentication rejected. The retrying provider refreshes its token
  /// and retries on this variant.
  #[error("unauthorized")]
  Unauthorized,

  #[error("transport error: {0}")]
  Transport(String),

  #[error("i/o error: {0}")]
  Io(#[source] Arc<std::io::Error>),
}

impl From<std::io::Error> for ProviderError {
  fn from(err: std::io::Error) -> Self {
    if err.kind() == std::io::ErrorKind::NotFound {
      ProviderError::NotFound(err.to_string())
    } else {
      ProviderError::Io(Arc::new(err))
    }
  }
}

/// Errors from loading and parsing a model's scene description.
///
/// Not retried at the repository layer; the caller decides.
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
  #[error("scene fetch failed: {0}")]
  Fetch(#[from] ProviderError),

  #[error("scene description is not valid JSON: {0}")]
  Json(String),

  #[error("invalid scene description: {0}")]
  InvalidScene(String),
}

/// Errors from decoding a binary sector payload.
#[derive(Debug, Error)]
pub enum ParseError {
  #[error("bad magic {0:02x?}")]
  BadMagic([u8; 4]),

  #[error("unsupported payload version {0}")]
  UnsupportedVersion(u16),

  #[error("unknown payload kind {0}")]
  UnknownKind(u8),

  #[error("payload kind mismatch: header says {header:?}, metadata says {expected:?}")]
  KindMismatch {
    header: crate::types::PayloadKind,
    expected: crate::types::PayloadKind,
  },

  #[error("truncated payload: needed {needed} more bytes at offset {offset}")]
  Truncated { offset: usize, needed: usize },

  #[error("vertex index {index} out of range (vertex count {vertex_count})")]
  IndexOutOfRange { index: u32, vertex_count: u32 },

  #[error("index count {0} is not a multiple of 3")]
  IndexCountNotTriangles(u32),
}

/// Errors from one sector load job (fetch or decode).
///
/// A failing job fails only itself; the pool keeps serving.
#[derive(Debug, Error)]
pub enum StreamError {
  #[error("sector fetch failed: {0}")]
  Fetch(#[from] ProviderError),

  #[error("sector decode failed: {0}")]
  Decode(#[from] ParseError),
}

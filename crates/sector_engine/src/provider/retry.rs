//! Retrying provider with bearer-token re-authentication.
//!
//! Wraps a transport that authenticates each request with a bearer token.
//! A rejected token triggers a refresh and a retry, up to a fixed count;
//! any other failure is returned to the caller as-is.

use std::sync::Arc;

use tracing::debug;

use crate::error::ProviderError;

use super::ModelDataProvider;

/// Maximum number of re-authentication retries per fetch.
pub const MAX_FETCH_RETRIES: usize = 3;

/// Supplies bearer tokens for an authenticated transport.
pub trait TokenSource: Send + Sync {
  /// The current token. Cheap; called once per request.
  fn token(&self) -> String;

  /// Re-authenticate and return a fresh token.
  fn refresh(&self) -> Result<String, ProviderError>;
}

/// Transport that authenticates each request with a bearer token.
///
/// The concrete network stack lives behind this seam; it reports a rejected
/// token as [`ProviderError::Unauthorized`].
pub trait AuthenticatedTransport: Send + Sync {
  fn fetch(&self, token: &str, base_path: &str, file_name: &str)
    -> Result<Vec<u8>, ProviderError>;
}

/// Networked provider: authenticated transport + bounded retry.
pub struct RetryingProvider<T: AuthenticatedTransport> {
  transport: T,
  tokens: Arc<dyn TokenSource>,
  max_retries: usize,
}

impl<T: AuthenticatedTransport> RetryingProvider<T> {
  pub fn new(transport: T, tokens: Arc<dyn TokenSource>) -> Self {
    Self {
      transport,
      tokens,
      max_retries: MAX_FETCH_RETRIES,
    }
  }

  pub fn with_max_retries(mut self, max_retries: usize) -> Self {
    self.max_retries = max_retries;
    self
  }
}

impl<T: AuthenticatedTransport> ModelDataProvider for RetryingProvider<T> {
  fn get_binary_file(&self, base_path: &str, file_name: &str) -> Result<Vec<u8>, ProviderError> {
    let mut token = self.tokens.token();
    let mut attempt = 0;

    loop {
      match self.transport.fetch(&token, base_path, file_name) {
        Ok(bytes) => return Ok(bytes),
        Err(ProviderError::Unauthorized) if attempt < self.max_retries => {
          debug!(file_name, attempt, "token rejected, re-authenticating");
          attempt += 1;
          token = self.tokens.refresh()?;
        }
        Err(err) => return Err(err),
      }
    }
  }
}

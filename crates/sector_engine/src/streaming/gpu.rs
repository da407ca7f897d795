//! GPU resource seam.
//!
//! Geometry buffers are owned explicitly, not left to garbage collection:
//! the streaming manager disposes them through the allocator when a sector
//! is evicted or the model torn down. Disposing twice is a defensive no-op.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use crate::parse::SectorGeometry;

/// Handle to uploaded GPU buffers for one sector.
#[derive(Debug)]
pub struct GeometryBuffers {
  id: u64,
  size_bytes: u64,
  disposed: bool,
}

impl GeometryBuffers {
  pub fn id(&self) -> u64 {
    self.id
  }

  pub fn size_bytes(&self) -> u64 {
    self.size_bytes
  }

  pub fn is_disposed(&self) -> bool {
    self.disposed
  }
}

/// Uploads decoded geometry to the GPU and releases it again.
///
/// Mutated only from the polling thread.
pub trait GeometryAllocator: Send + Sync {
  fn upload(&self, geometry: &SectorGeometry) -> GeometryBuffers;

  /// Release a buffer. Must tolerate an already-disposed handle.
  fn dispose(&self, buffers: &mut GeometryBuffers);
}

/// Allocator that tracks sizes and counts without a GPU.
///
/// The default for headless use; tests use the counters to assert the
/// dispose-exactly-once law.
#[derive(Default)]
pub struct TrackingAllocator {
  next_id: AtomicU64,
  uploads: AtomicU64,
  disposals: AtomicU64,
  double_disposals: AtomicU64,
  live_bytes: AtomicU64,
}

impl TrackingAllocator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn uploads(&self) -> u64 {
    self.uploads.load(Ordering::Relaxed)
  }

  pub fn disposals(&self) -> u64 {
    self.disposals.load(Ordering::Relaxed)
  }

  /// Dispose calls that hit an already-disposed buffer.
  pub fn double_disposals(&self) -> u64 {
    self.double_disposals.load(Ordering::Relaxed)
  }

  /// Buffers currently uploaded and not yet disposed.
  pub fn live_buffers(&self) -> u64 {
    self.uploads() - self.disposals()
  }

  pub fn live_bytes(&self) -> u64 {
    self.live_bytes.load(Ordering::Relaxed)
  }
}

impl GeometryAllocator for TrackingAllocator {
  fn upload(&self, geometry: &SectorGeometry) -> GeometryBuffers {
    let size_bytes = geometry.gpu_size_bytes();
    self.uploads.fetch_add(1, Ordering::Relaxed);
    self.live_bytes.fetch_add(size_bytes, Ordering::Relaxed);
    GeometryBuffers {
      id: self.next_id.fetch_add(1, Ordering::Relaxed),
      size_bytes,
      disposed: false,
    }
  }

  fn dispose(&self, buffers: &mut GeometryBuffers) {
    if buffers.disposed {
      warn!(buffer = buffers.id, "dispose of already-disposed buffers ignored");
      self.double_disposals.fetch_add(1, Ordering::Relaxed);
      return;
    }
    buffers.disposed = true;
    self.disposals.fetch_add(1, Ordering::Relaxed);
    self.live_bytes.fetch_sub(buffers.size_bytes, Ordering::Relaxed);
  }
}

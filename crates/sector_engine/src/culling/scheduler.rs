//! Async culling with supersede-and-cancel semantics.
//!
//! A pass runs on rayon's pool and reports over a bounded(1) channel.
//! Submitting a newer camera state bumps the generation: the older pass
//! aborts at its next cancellation check, and a stale result that still
//! arrives is discarded, never merged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{self as channel, Receiver, TryRecvError};
use tracing::debug;

use crate::sector::SectorTree;

use super::budget::StreamingBudget;
use super::camera::CameraState;
use super::coverage::CoverageEstimator;
use super::pass::{determine_sectors_cancellable, CullingPass};

/// Runs culling passes off-thread; newest submission wins.
pub struct CullingScheduler {
  generation: Arc<AtomicU64>,
  receiver: Option<Receiver<(u64, CullingPass)>>,
}

impl CullingScheduler {
  pub fn new() -> Self {
    Self {
      generation: Arc::new(AtomicU64::new(0)),
      receiver: None,
    }
  }

  /// True while a pass is in flight.
  pub fn is_busy(&self) -> bool {
    self.receiver.is_some()
  }

  /// Start a pass for this camera state (non-blocking).
  ///
  /// Supersedes any in-flight pass: the older computation aborts early and
  /// its result is dropped.
  pub fn submit(
    &mut self,
    camera: CameraState,
    tree: Arc<SectorTree>,
    budget: StreamingBudget,
    estimator: Arc<dyn CoverageEstimator>,
  ) {
    let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
    let (sender, receiver) = channel::bounded(1);
    self.receiver = Some(receiver);

    let current = Arc::clone(&self.generation);
    rayon::spawn(move || {
      let keep_going = || current.load(Ordering::Relaxed) == generation;
      match determine_sectors_cancellable(&camera, &tree, &budget, estimator.as_ref(), keep_going)
      {
        Some(pass) => {
          // Ignore send error (receiver dropped = cancelled).
          let _ = sender.send((generation, pass));
        }
        None => debug!(generation, "culling pass superseded mid-computation"),
      }
    });
  }

  /// Poll for a completed pass (non-blocking).
  ///
  /// Stale results from superseded generations are discarded here.
  pub fn poll(&mut self) -> Option<CullingPass> {
    let receiver = self.receiver.as_ref()?;

    match receiver.try_recv() {
      Ok((generation, pass)) => {
        self.receiver = None;
        if generation == self.generation.load(Ordering::Relaxed) {
          Some(pass)
        } else {
          debug!(generation, "discarding stale culling result");
          None
        }
      }
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Disconnected) => {
        // Worker aborted without sending (cancelled pass).
        self.receiver = None;
        None
      }
    }
  }

  /// Cancel any in-flight pass.
  pub fn cancel(&mut self) {
    self.generation.fetch_add(1, Ordering::Relaxed);
    self.receiver = None;
  }
}

impl Default for CullingScheduler {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::culling::ScreenAreaEstimator;
  use crate::sector::test_fixtures::strip_tree;
  use crate::types::ModelIdentifier;
  use glam::DVec3;

  fn tree() -> Arc<SectorTree> {
    Arc::new(strip_tree(ModelIdentifier::new(1, 1), 9, 100))
  }

  fn poll_until_complete(scheduler: &mut CullingScheduler) -> Option<CullingPass> {
    for _ in 0..1000 {
      if let Some(pass) = scheduler.poll() {
        return Some(pass);
      }
      if !scheduler.is_busy() {
        return None;
      }
      std::thread::sleep(std::time::Duration::from_millis(1));
    }
    None
  }

  #[test]
  fn test_submit_and_poll() {
    let mut scheduler = CullingScheduler::new();
    assert!(!scheduler.is_busy());

    let camera = CameraState::looking_at(DVec3::new(45.0, 5.0, 30.0), DVec3::new(45.0, 5.0, 5.0));
    scheduler.submit(
      camera,
      tree(),
      StreamingBudget::UNLIMITED,
      Arc::new(ScreenAreaEstimator),
    );
    assert!(scheduler.is_busy());

    let pass = poll_until_complete(&mut scheduler).expect("pass should complete");
    assert!(!pass.wanted.is_empty());
    assert!(!scheduler.is_busy());
  }

  #[test]
  fn test_cancel_discards_pass() {
    let mut scheduler = CullingScheduler::new();

    let camera = CameraState::looking_at(DVec3::new(45.0, 5.0, 30.0), DVec3::new(45.0, 5.0, 5.0));
    scheduler.submit(
      camera,
      tree(),
      StreamingBudget::UNLIMITED,
      Arc::new(ScreenAreaEstimator),
    );
    scheduler.cancel();

    assert!(poll_until_complete(&mut scheduler).is_none());
  }

  #[test]
  fn test_newer_submission_supersedes_older() {
    let mut scheduler = CullingScheduler::new();
    let estimator = Arc::new(ScreenAreaEstimator);

    // First pass would accept sectors; the superseding pass has a zero
    // budget and a far camera, so its wanted set is empty.
    let near = CameraState::looking_at(DVec3::new(45.0, 5.0, 30.0), DVec3::new(45.0, 5.0, 5.0));
    scheduler.submit(near, tree(), StreamingBudget::UNLIMITED, estimator.clone());

    let far = CameraState::looking_at(DVec3::splat(1.0e6), DVec3::ZERO);
    let zero = StreamingBudget {
      high_detail_proximity_threshold: 1.0,
      geometry_download_size_bytes: 0,
    };
    scheduler.submit(far, tree(), zero, estimator);

    let pass = poll_until_complete(&mut scheduler).expect("newest pass should complete");
    assert!(pass.wanted.is_empty(), "result must come from the newest pass");
  }
}

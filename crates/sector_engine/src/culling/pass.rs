//! The culling pass: score, sort, greedy-accept under budget.

use web_time::Instant;

use crate::sector::{SectorId, SectorTree};

use super::budget::StreamingBudget;
use super::camera::{CameraState, Frustum};
use super::coverage::CoverageEstimator;

/// How many sectors are scored between cancellation checks.
const CANCEL_CHECK_INTERVAL: usize = 64;

/// A sector the current camera frame wants loaded.
///
/// Transient: recomputed every culling pass.
#[derive(Clone, Copy, Debug)]
pub struct WantedSector {
  pub sector: SectorId,
  /// Coverage score; higher loads sooner. 0 for sectors scored non-finite.
  pub priority: f32,
  pub depth: u32,
  /// Download size estimate counted against the byte budget.
  pub cost_bytes: u64,
  /// Within the proximity threshold: always included, budget-exempt.
  pub forced: bool,
}

/// What one culling pass spent and skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Spendage {
  /// Bytes accepted against the budget.
  pub accepted_bytes: u64,
  /// Bytes of proximity-forced sectors (budget-exempt).
  pub forced_bytes: u64,
  pub accepted: usize,
  pub forced: usize,
  /// Frustum-culled plus over-budget sectors.
  pub rejected: usize,
  pub elapsed_us: u64,
}

/// Result of one culling pass: the ordered wanted set plus statistics.
#[derive(Debug, Default)]
pub struct CullingPass {
  /// Forced sectors first (nearest first), then budgeted sectors by
  /// descending priority. Deterministic for a given camera state.
  pub wanted: Vec<WantedSector>,
  pub spendage: Spendage,
}

/// Run a culling pass for one camera state.
///
/// Deterministic: two calls with an identical camera, tree and budget yield
/// an identical ordered wanted set.
#[tracing::instrument(skip_all, name = "culling::determine_sectors")]
pub fn determine_sectors(
  camera: &CameraState,
  tree: &SectorTree,
  budget: &StreamingBudget,
  estimator: &dyn CoverageEstimator,
) -> CullingPass {
  determine_sectors_cancellable(camera, tree, budget, estimator, || true).unwrap_or_default()
}

/// Culling pass with a cancellation hook.
///
/// `keep_going` is checked between scoring batches; returning false aborts
/// the pass and yields `None`. Used by the scheduler to drop passes
/// superseded by a newer camera state.
pub fn determine_sectors_cancellable<F: Fn() -> bool>(
  camera: &CameraState,
  tree: &SectorTree,
  budget: &StreamingBudget,
  estimator: &dyn CoverageEstimator,
  keep_going: F,
) -> Option<CullingPass> {
  let start = Instant::now();
  let frustum = Frustum::from_camera(camera);

  // Phase 1: classify and score.
  let mut forced: Vec<(f64, WantedSector)> = Vec::new();
  let mut candidates: Vec<WantedSector> = Vec::new();
  let mut rejected = 0usize;

  for (index, sector) in tree.iter().enumerate() {
    if index % CANCEL_CHECK_INTERVAL == 0 && !keep_going() {
      return None;
    }

    let distance = sector.bounds.distance_to_point(camera.position);
    let wanted = WantedSector {
      sector: sector.id,
      priority: sanitize_score(estimator.score(camera, &sector.bounds)),
      depth: sector.depth,
      cost_bytes: sector.estimated_size_bytes,
      forced: false,
    };

    if distance <= budget.high_detail_proximity_threshold {
      // Nearby geometry is never starved, whatever its score.
      forced.push((
        distance,
        WantedSector {
          forced: true,
          ..wanted
        },
      ));
    } else if !frustum.intersects_aabb(&sector.bounds) {
      rejected += 1;
    } else {
      candidates.push(wanted);
    }
  }

  // Phase 2: deterministic ordering. Forced nearest-first; candidates by
  // score descending, then shallower depth, then id.
  forced.sort_by(|(da, a), (db, b)| {
    da.partial_cmp(db)
      .unwrap_or(std::cmp::Ordering::Equal)
      .then(a.sector.cmp(&b.sector))
  });
  candidates.sort_by(|a, b| {
    b.priority
      .partial_cmp(&a.priority)
      .unwrap_or(std::cmp::Ordering::Equal)
      .then(a.depth.cmp(&b.depth))
      .then(a.sector.cmp(&b.sector))
  });

  if !keep_going() {
    return None;
  }

  // Phase 3: greedy accept under the byte budget.
  let mut spendage = Spendage {
    forced: forced.len(),
    rejected,
    ..Spendage::default()
  };

  let mut wanted: Vec<WantedSector> = Vec::with_capacity(forced.len());
  for (_, sector) in forced {
    spendage.forced_bytes += sector.cost_bytes;
    wanted.push(sector);
  }

  for (index, candidate) in candidates.iter().enumerate() {
    if !budget.can_accept(spendage.accepted_bytes, candidate.cost_bytes) {
      spendage.rejected += candidates.len() - index;
      break;
    }
    spendage.accepted_bytes += candidate.cost_bytes;
    spendage.accepted += 1;
    wanted.push(*candidate);
  }

  spendage.elapsed_us = start.elapsed().as_micros() as u64;
  tracing::debug!(
    forced = spendage.forced,
    accepted = spendage.accepted,
    rejected = spendage.rejected,
    accepted_bytes = spendage.accepted_bytes,
    "culling pass complete"
  );

  Some(CullingPass { wanted, spendage })
}

/// Estimation is best-effort: non-finite scores participate as 0.
#[inline]
fn sanitize_score(score: f32) -> f32 {
  if score.is_finite() {
    score
  } else if score == f32::INFINITY {
    f32::MAX
  } else {
    0.0
  }
}

#[cfg(test)]
#[path = "pass_test.rs"]
mod pass_test;

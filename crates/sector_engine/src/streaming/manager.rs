//! StreamingManager - loads wanted sectors, evicts superseded ones.
//!
//! One manager per loaded model. `request` reconciles the resident set with
//! a culling pass's wanted set; `poll_completed` merges finished loads.
//! A generation counter marks every job: results arriving after `clear`
//! belong to an older generation and are discarded, never merged.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::culling::WantedSector;
use crate::parse::{decode_expected, ParserPool, SectorGeometry};
use crate::provider::ModelDataProvider;
use crate::sector::{SectorId, SectorTree};

use super::gpu::{GeometryAllocator, GeometryBuffers};

/// A sector with its decoded geometry and uploaded buffers.
pub struct ConsumedSector {
  pub sector: SectorId,
  pub geometry: SectorGeometry,
  pub buffers: GeometryBuffers,
}

/// Change to the resident sector set.
#[derive(Debug)]
pub enum StreamEvent {
  SectorLoaded(SectorId),
  SectorEvicted(SectorId),
  SectorFailed(SectorId, crate::error::StreamError),
}

/// Streams one model's sectors against the latest wanted set.
pub struct StreamingManager {
  provider: Arc<dyn ModelDataProvider>,
  allocator: Arc<dyn GeometryAllocator>,
  tree: Arc<SectorTree>,
  base_path: String,
  pool: ParserPool,
  generation: u64,
  wanted: HashSet<SectorId>,
  /// Sector -> generation of its in-flight job. At most one live entry per
  /// sector id (request de-duplication).
  in_flight: HashMap<SectorId, u64>,
  resident: HashMap<SectorId, ConsumedSector>,
}

impl StreamingManager {
  pub fn new(
    provider: Arc<dyn ModelDataProvider>,
    allocator: Arc<dyn GeometryAllocator>,
    tree: Arc<SectorTree>,
  ) -> Self {
    let base_path = tree.model().base_path();
    Self {
      provider,
      allocator,
      tree,
      base_path,
      pool: ParserPool::new(),
      generation: 0,
      wanted: HashSet::new(),
      in_flight: HashMap::new(),
      resident: HashMap::new(),
    }
  }

  /// Reconcile with a new wanted set.
  ///
  /// Evicts resident sectors that are no longer wanted (disposing their
  /// buffers) and issues one fetch+decode job per newly wanted sector that
  /// is neither resident nor already in flight. Jobs are issued in wanted
  /// order, so proximity-forced sectors start first.
  #[tracing::instrument(skip_all, name = "streaming::request")]
  pub fn request(&mut self, wanted: &[WantedSector]) -> Vec<StreamEvent> {
    self.wanted = wanted.iter().map(|w| w.sector).collect();

    // Evict superseded sectors; their buffers are disposed here, exactly
    // once per load cycle.
    let evicted: Vec<SectorId> = self
      .resident
      .keys()
      .copied()
      .filter(|id| !self.wanted.contains(id))
      .collect();

    let mut events = Vec::with_capacity(evicted.len());
    for id in evicted {
      if let Some(mut consumed) = self.resident.remove(&id) {
        self.allocator.dispose(&mut consumed.buffers);
        debug!(sector = %id, "evicted sector");
        events.push(StreamEvent::SectorEvicted(id));
      }
    }

    for sector in wanted {
      let id = sector.sector;
      if self.resident.contains_key(&id) || self.in_flight.contains_key(&id) {
        continue;
      }
      let Some(metadata) = self.tree.get(id) else {
        warn!(sector = %id, "wanted sector missing from tree, skipping");
        continue;
      };

      self.in_flight.insert(id, self.generation);

      let provider = Arc::clone(&self.provider);
      let base_path = self.base_path.clone();
      let file_name = metadata.file_name.clone();
      let kind = metadata.kind;
      self.pool.submit(self.generation, id, move || {
        let bytes = provider.get_binary_file(&base_path, &file_name)?;
        Ok(decode_expected(&bytes, kind)?)
      });
    }

    events
  }

  /// Merge finished loads (non-blocking).
  ///
  /// Results from an older generation, or for sectors no longer wanted,
  /// are discarded before upload, so nothing needs disposing for them.
  pub fn poll_completed(&mut self) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    for completion in self.pool.drain_completions() {
      if completion.generation != self.generation {
        debug!(sector = %completion.sector, "discarding result from cleared generation");
        continue;
      }

      self.in_flight.remove(&completion.sector);

      if !self.wanted.contains(&completion.sector) {
        debug!(sector = %completion.sector, "discarding result for superseded sector");
        continue;
      }

      match completion.result {
        Ok(geometry) => {
          let buffers = self.allocator.upload(&geometry);
          debug!(
            sector = %completion.sector,
            bytes = buffers.size_bytes(),
            elapsed_us = completion.elapsed_us,
            "sector loaded"
          );
          self.resident.insert(
            completion.sector,
            ConsumedSector {
              sector: completion.sector,
              geometry,
              buffers,
            },
          );
          events.push(StreamEvent::SectorLoaded(completion.sector));
        }
        Err(err) => {
          warn!(sector = %completion.sector, error = %err, "sector load failed");
          events.push(StreamEvent::SectorFailed(completion.sector, err));
        }
      }
    }

    events
  }

  /// Drop all streaming state and dispose every resident buffer.
  ///
  /// In-flight jobs run to completion on their workers, but their results
  /// arrive under an older generation and are discarded.
  pub fn clear(&mut self) {
    self.generation += 1;
    self.wanted.clear();
    self.in_flight.clear();

    for (_, mut consumed) in self.resident.drain() {
      self.allocator.dispose(&mut consumed.buffers);
    }
  }

  pub fn get(&self, id: SectorId) -> Option<&ConsumedSector> {
    self.resident.get(&id)
  }

  /// Resident sector ids in ascending order.
  pub fn resident_sectors(&self) -> Vec<SectorId> {
    let mut ids: Vec<_> = self.resident.keys().copied().collect();
    ids.sort();
    ids
  }

  pub fn resident_bytes(&self) -> u64 {
    self.resident.values().map(|c| c.buffers.size_bytes()).sum()
  }

  pub fn in_flight_count(&self) -> usize {
    self.in_flight.len()
  }

  pub fn is_idle(&self) -> bool {
    self.in_flight.is_empty()
  }

  pub fn tree(&self) -> &Arc<SectorTree> {
    &self.tree
  }
}

impl Drop for StreamingManager {
  fn drop(&mut self) {
    // Teardown path of the dispose-exactly-once law.
    self.clear();
  }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

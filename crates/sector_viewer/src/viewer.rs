//! Viewer - the registry a hosting application constructs and drives.
//!
//! ```text
//! host                         Viewer                       workers
//! ┌───────────┐  add_model   ┌─────────────────┐
//! │           ├─────────────►│ repository.load │
//! │ set_camera│              ├─────────────────┤  submit
//! │           ├─────────────►│ per-model:      ├──────────► culling pass
//! │ update()  │   each frame │  scheduler      │◄────────── wanted set
//! │           ├─────────────►│  streaming mgr  ├──────────► fetch+decode
//! │ events()  │◄─────────────┤  scene graph    │◄────────── consumed sectors
//! └───────────┘              └─────────────────┘
//! ```
//!
//! Everything here runs on the host's polling thread; the registry owns
//! its collaborators explicitly and tears them down on removal/drop.

use std::sync::Arc;

use crossbeam_channel::{self as channel, Receiver, Sender};
use tracing::info;

use sector_engine::culling::{
  CameraState, CoverageEstimator, CullingScheduler, ScreenAreaEstimator, StreamingBudget,
};
use sector_engine::error::MetadataError;
use sector_engine::materials::{Appearance, MaterialManager, RenderMode};
use sector_engine::provider::ModelDataProvider;
use sector_engine::sector::{MetadataRepository, SectorId, SectorTree};
use sector_engine::streaming::{
  ConsumedSector, GeometryAllocator, StreamEvent, StreamingManager,
};
use sector_engine::types::ModelIdentifier;

use crate::scene::SceneGraph;

/// Handle to a model loaded into one viewer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ModelHandle(u64);

/// Notifications a host can subscribe to.
#[derive(Debug)]
pub enum ViewerEvent {
  ModelLoaded {
    handle: ModelHandle,
    model: ModelIdentifier,
  },
  ModelRemoved {
    handle: ModelHandle,
    model: ModelIdentifier,
  },
  /// The resident sector set of a model changed this update.
  SectorsChanged {
    handle: ModelHandle,
    loaded: Vec<SectorId>,
    evicted: Vec<SectorId>,
  },
}

struct ModelEntry {
  handle: ModelHandle,
  model: ModelIdentifier,
  tree: Arc<SectorTree>,
  manager: StreamingManager,
  scheduler: CullingScheduler,
  /// Camera of the most recently submitted culling pass; culling restarts
  /// when the current camera differs (or after `invalidate`).
  last_pass_camera: Option<CameraState>,
}

/// The viewer: model lifecycle, camera, render mode, per-frame update.
pub struct Viewer {
  provider: Arc<dyn ModelDataProvider>,
  allocator: Arc<dyn GeometryAllocator>,
  repository: MetadataRepository,
  estimator: Arc<dyn CoverageEstimator>,
  materials: MaterialManager,
  scene: SceneGraph,
  budget: StreamingBudget,
  camera: Option<CameraState>,
  models: Vec<ModelEntry>,
  next_handle: u64,
  events_tx: Sender<ViewerEvent>,
  /// Kept so the channel stays connected while no host is subscribed.
  events_rx: Receiver<ViewerEvent>,
}

impl Viewer {
  pub fn new(
    provider: Arc<dyn ModelDataProvider>,
    allocator: Arc<dyn GeometryAllocator>,
  ) -> Self {
    let (events_tx, events_rx) = channel::unbounded();
    Self {
      repository: MetadataRepository::new(Arc::clone(&provider)),
      provider,
      allocator,
      estimator: Arc::new(ScreenAreaEstimator),
      materials: MaterialManager::new(),
      scene: SceneGraph::new(),
      budget: StreamingBudget::DEFAULT,
      camera: None,
      models: Vec::new(),
      next_handle: 0,
      events_tx,
      events_rx,
    }
  }

  /// Replace the coverage strategy (e.g. with a GPU readback estimator).
  pub fn with_estimator(mut self, estimator: Arc<dyn CoverageEstimator>) -> Self {
    self.estimator = estimator;
    self
  }

  /// Event queue handle for one consumer.
  pub fn events(&self) -> Receiver<ViewerEvent> {
    self.events_rx.clone()
  }

  /// Load a model's metadata and register it with the viewer.
  pub fn add_model(&mut self, model: ModelIdentifier) -> Result<ModelHandle, MetadataError> {
    let tree = self.repository.load(model)?;

    let handle = ModelHandle(self.next_handle);
    self.next_handle += 1;

    self
      .materials
      .add_model_materials(model, tree.max_tree_index(), Appearance::default());
    self.scene.add_node(handle, model);
    self.models.push(ModelEntry {
      handle,
      model,
      tree: Arc::clone(&tree),
      manager: StreamingManager::new(
        Arc::clone(&self.provider),
        Arc::clone(&self.allocator),
        tree,
      ),
      scheduler: CullingScheduler::new(),
      last_pass_camera: None,
    });

    info!(%model, ?handle, "model added");
    let _ = self.events_tx.send(ViewerEvent::ModelLoaded { handle, model });
    Ok(handle)
  }

  /// Unload a model: streaming state cleared, buffers disposed, scene node
  /// and materials dropped. In-flight loads are discarded on arrival.
  pub fn remove_model(&mut self, handle: ModelHandle) -> bool {
    let Some(index) = self.models.iter().position(|e| e.handle == handle) else {
      return false;
    };

    let mut entry = self.models.remove(index);
    entry.scheduler.cancel();
    entry.manager.clear();
    self.materials.remove_model_materials(entry.model);
    self.scene.remove_node(handle);

    info!(model = %entry.model, ?handle, "model removed");
    let _ = self.events_tx.send(ViewerEvent::ModelRemoved {
      handle,
      model: entry.model,
    });
    true
  }

  /// Loaded models in insertion order.
  pub fn models(&self) -> Vec<(ModelHandle, ModelIdentifier)> {
    self.models.iter().map(|e| (e.handle, e.model)).collect()
  }

  pub fn set_camera(&mut self, camera: CameraState) {
    self.camera = Some(camera);
  }

  pub fn camera(&self) -> Option<CameraState> {
    self.camera
  }

  /// Force culling to re-run on the next update even with a stationary
  /// camera.
  pub fn invalidate(&mut self) {
    for entry in &mut self.models {
      entry.last_pass_camera = None;
    }
  }

  pub fn set_budget(&mut self, budget: StreamingBudget) {
    self.budget = budget;
    self.invalidate();
  }

  pub fn budget(&self) -> StreamingBudget {
    self.budget
  }

  pub fn set_render_mode(&mut self, mode: RenderMode) {
    self.materials.set_render_mode(mode);
  }

  pub fn render_mode(&self) -> RenderMode {
    self.materials.mode()
  }

  pub fn materials(&self) -> &MaterialManager {
    &self.materials
  }

  pub fn materials_mut(&mut self) -> &mut MaterialManager {
    &mut self.materials
  }

  pub fn scene(&self) -> &SceneGraph {
    &self.scene
  }

  pub fn sector_tree(&self, handle: ModelHandle) -> Option<&Arc<SectorTree>> {
    self.entry(handle).map(|e| &e.tree)
  }

  /// A resident sector's decoded geometry and buffers.
  pub fn consumed_sector(&self, handle: ModelHandle, id: SectorId) -> Option<&ConsumedSector> {
    self.entry(handle)?.manager.get(id)
  }

  /// Advance culling and streaming for every model. Call once per frame.
  #[tracing::instrument(skip_all, name = "viewer::update")]
  pub fn update(&mut self) {
    let Some(camera) = self.camera else {
      return;
    };

    for entry in &mut self.models {
      // Re-run culling when the camera moved since the submitted pass;
      // a newer submission supersedes and cancels the older one.
      if entry.last_pass_camera.map_or(true, |prev| prev != camera) {
        entry.scheduler.submit(
          camera,
          Arc::clone(&entry.tree),
          self.budget,
          Arc::clone(&self.estimator),
        );
        entry.last_pass_camera = Some(camera);
      }

      let mut loaded = Vec::new();
      let mut evicted = Vec::new();

      // Apply a completed pass: evict superseded, start wanted loads.
      if let Some(pass) = entry.scheduler.poll() {
        for event in entry.manager.request(&pass.wanted) {
          if let StreamEvent::SectorEvicted(id) = event {
            self.scene.detach(entry.handle, id);
            evicted.push(id);
          }
        }
      }

      // Merge finished loads into the scene graph.
      for event in entry.manager.poll_completed() {
        match event {
          StreamEvent::SectorLoaded(id) => {
            self.scene.attach(entry.handle, id);
            loaded.push(id);
          }
          StreamEvent::SectorEvicted(id) => {
            self.scene.detach(entry.handle, id);
            evicted.push(id);
          }
          StreamEvent::SectorFailed(_, _) => {}
        }
      }

      if !loaded.is_empty() || !evicted.is_empty() {
        let _ = self.events_tx.send(ViewerEvent::SectorsChanged {
          handle: entry.handle,
          loaded,
          evicted,
        });
      }
    }
  }

  /// Tear down every model. Also runs on drop.
  pub fn dispose(&mut self) {
    let handles: Vec<ModelHandle> = self.models.iter().map(|e| e.handle).collect();
    for handle in handles {
      self.remove_model(handle);
    }
  }

  fn entry(&self, handle: ModelHandle) -> Option<&ModelEntry> {
    self.models.iter().find(|e| e.handle == handle)
  }
}

impl Drop for Viewer {
  fn drop(&mut self) {
    self.dispose();
  }
}

#[cfg(test)]
#[path = "viewer_test.rs"]
mod viewer_test;

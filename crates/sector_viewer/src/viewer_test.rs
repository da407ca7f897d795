//! End-to-end viewer tests over an in-memory provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel as channel;
use glam::DVec3;

use sector_engine::error::ProviderError;
use sector_engine::parse::{
  encode_mesh, encode_points, encode_quads, PointCloud, QuadInstance, QuadInstances, TriangleMesh,
};
use sector_engine::provider::{MemoryProvider, ModelDataProvider};
use sector_engine::sector::SectorId;
use sector_engine::streaming::TrackingAllocator;

use crate::{Appearance, CameraState, ModelIdentifier, RenderMode, StreamingBudget};

use super::*;

fn model() -> ModelIdentifier {
  ModelIdentifier::new(5, 2)
}

fn scene_json() -> serde_json::Value {
  serde_json::json!({
    "model_id": 5,
    "revision_id": 2,
    "unit_scale": 1.0,
    "max_tree_index": 100,
    "sectors": [
      {
        "id": 0,
        "parent_id": null,
        "depth": 0,
        "bounds": { "min": [0.0, 0.0, 0.0], "max": [20.0, 10.0, 10.0] },
        "estimated_size_bytes": 50,
        "file_name": "sector_0.bin",
        "kind": "quads"
      },
      {
        "id": 1,
        "parent_id": 0,
        "depth": 1,
        "bounds": { "min": [0.0, 0.0, 0.0], "max": [10.0, 10.0, 10.0] },
        "estimated_size_bytes": 100,
        "file_name": "sector_1.bin",
        "kind": "mesh"
      },
      {
        "id": 2,
        "parent_id": 0,
        "depth": 1,
        "bounds": { "min": [10.0, 0.0, 0.0], "max": [20.0, 10.0, 10.0] },
        "estimated_size_bytes": 100,
        "file_name": "sector_2.bin",
        "kind": "points"
      }
    ]
  })
}

fn provider_with_model() -> Arc<MemoryProvider> {
  let provider = Arc::new(MemoryProvider::new());
  let base = model().base_path();

  provider.insert(&base, "scene.json", scene_json().to_string().into_bytes());
  provider.insert(
    &base,
    "sector_0.bin",
    encode_quads(&QuadInstances {
      instances: vec![QuadInstance {
        center: [10.0, 5.0, 5.0],
        half_extent: 5.0,
      }],
    }),
  );
  provider.insert(
    &base,
    "sector_1.bin",
    encode_mesh(&TriangleMesh {
      positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
      tree_indices: vec![3, 3, 3],
      indices: vec![0, 1, 2],
    }),
  );
  provider.insert(
    &base,
    "sector_2.bin",
    encode_points(&PointCloud {
      positions: vec![[12.0, 1.0, 1.0], [15.0, 2.0, 2.0]],
      colors: None,
    }),
  );
  provider
}

/// Camera that sees the whole model from outside the proximity threshold.
fn overview_camera() -> CameraState {
  CameraState::looking_at(DVec3::new(10.0, 5.0, 40.0), DVec3::new(10.0, 5.0, 5.0))
}

/// Run updates until `done` returns true or the wait times out.
fn update_until(viewer: &mut Viewer, mut done: impl FnMut(&Viewer) -> bool) -> bool {
  for _ in 0..1000 {
    viewer.update();
    if done(viewer) {
      return true;
    }
    std::thread::sleep(std::time::Duration::from_millis(1));
  }
  false
}

fn attached_count(viewer: &Viewer, handle: ModelHandle) -> usize {
  viewer
    .scene()
    .node(handle)
    .map_or(0, |node| node.attached_count())
}

#[test]
fn test_add_model_registers_everything() {
  let allocator = Arc::new(TrackingAllocator::new());
  let mut viewer = Viewer::new(provider_with_model(), allocator);
  let events = viewer.events();

  let handle = viewer.add_model(model()).unwrap();

  assert_eq!(viewer.models(), vec![(handle, model())]);
  assert_eq!(viewer.scene().len(), 1);
  assert!(viewer.materials().uniforms(model()).is_some());
  assert_eq!(viewer.sector_tree(handle).unwrap().len(), 3);
  assert!(matches!(
    events.try_recv(),
    Ok(ViewerEvent::ModelLoaded { model: m, .. }) if m == model()
  ));
}

#[test]
fn test_add_model_surfaces_metadata_failure() {
  let allocator = Arc::new(TrackingAllocator::new());
  let mut viewer = Viewer::new(Arc::new(MemoryProvider::new()), allocator);

  let err = viewer.add_model(model()).unwrap_err();
  assert!(matches!(err, sector_engine::error::MetadataError::Fetch(_)));
  assert!(viewer.models().is_empty());
  assert!(viewer.scene().is_empty());
}

#[test]
fn test_update_streams_visible_sectors() {
  let allocator = Arc::new(TrackingAllocator::new());
  let mut viewer = Viewer::new(provider_with_model(), allocator.clone());
  let events = viewer.events();

  let handle = viewer.add_model(model()).unwrap();
  viewer.set_camera(overview_camera());

  let done = update_until(&mut viewer, |v| attached_count(v, handle) == 3);
  assert!(done, "all three sectors should stream in");

  assert_eq!(allocator.uploads(), 3);
  assert!(viewer.consumed_sector(handle, SectorId(1)).is_some());

  let mut loaded = Vec::new();
  while let Ok(event) = events.try_recv() {
    if let ViewerEvent::SectorsChanged { loaded: ids, .. } = event {
      loaded.extend(ids);
    }
  }
  loaded.sort();
  assert_eq!(loaded, vec![SectorId(0), SectorId(1), SectorId(2)]);
}

#[test]
fn test_remove_model_disposes_and_clears_scene() {
  let allocator = Arc::new(TrackingAllocator::new());
  let mut viewer = Viewer::new(provider_with_model(), allocator.clone());

  let handle = viewer.add_model(model()).unwrap();
  viewer.set_camera(overview_camera());
  update_until(&mut viewer, |v| attached_count(v, handle) == 3);

  let events = viewer.events();
  while events.try_recv().is_ok() {} // drain load-time events

  assert!(viewer.remove_model(handle));

  assert_eq!(allocator.live_buffers(), 0);
  assert!(viewer.models().is_empty());
  assert!(viewer.scene().is_empty());
  assert!(viewer.materials().uniforms(model()).is_none());
  assert!(matches!(
    events.try_recv(),
    Ok(ViewerEvent::ModelRemoved { .. })
  ));

  assert!(!viewer.remove_model(handle));
}

/// Provider that parks sector payload fetches (but not the scene file)
/// until released.
struct GatedProvider {
  inner: Arc<MemoryProvider>,
  gate: channel::Receiver<()>,
  payload_fetches: AtomicUsize,
}

impl ModelDataProvider for GatedProvider {
  fn get_binary_file(&self, base_path: &str, file_name: &str) -> Result<Vec<u8>, ProviderError> {
    if file_name != "scene.json" {
      self.payload_fetches.fetch_add(1, Ordering::SeqCst);
      self.gate.recv().ok();
    }
    self.inner.get_binary_file(base_path, file_name)
  }
}

#[test]
fn test_unload_discards_in_flight_loads_without_leaking() {
  let (release, gate) = channel::unbounded();
  let provider = Arc::new(GatedProvider {
    inner: provider_with_model(),
    gate,
    payload_fetches: AtomicUsize::new(0),
  });
  let allocator = Arc::new(TrackingAllocator::new());
  let mut viewer = Viewer::new(provider.clone(), allocator.clone());

  let handle = viewer.add_model(model()).unwrap();
  viewer.set_camera(overview_camera());

  // Wait until the culling pass has been applied: all three sector loads
  // are submitted in one request, and at least one is parked in fetch.
  let started = update_until(&mut viewer, |_| {
    provider.payload_fetches.load(Ordering::SeqCst) >= 1
  });
  assert!(started, "sector loads should be in flight");

  // Unload while the loads are parked, then let them finish.
  assert!(viewer.remove_model(handle));
  for _ in 0..3 {
    release.send(()).unwrap();
  }

  for _ in 0..50 {
    viewer.update();
    std::thread::sleep(std::time::Duration::from_millis(1));
  }

  // Nothing was merged into the (now absent) scene graph and no GPU
  // buffer was uploaded or leaked.
  assert!(viewer.scene().is_empty());
  assert_eq!(allocator.uploads(), 0);
  assert_eq!(allocator.live_buffers(), 0);
}

#[test]
fn test_zero_budget_far_camera_loads_nothing() {
  let allocator = Arc::new(TrackingAllocator::new());
  let mut viewer = Viewer::new(provider_with_model(), allocator.clone());

  let handle = viewer.add_model(model()).unwrap();
  viewer.set_budget(StreamingBudget {
    high_detail_proximity_threshold: 0.5,
    geometry_download_size_bytes: 0,
  });
  viewer.set_camera(CameraState::looking_at(DVec3::splat(5_000.0), DVec3::ZERO));

  for _ in 0..100 {
    viewer.update();
    std::thread::sleep(std::time::Duration::from_millis(1));
  }

  assert_eq!(attached_count(&viewer, handle), 0);
  assert_eq!(allocator.uploads(), 0);
}

#[test]
fn test_render_mode_applies_to_model_materials() {
  let allocator = Arc::new(TrackingAllocator::new());
  let mut viewer = Viewer::new(provider_with_model(), allocator);

  viewer.add_model(model()).unwrap();
  viewer.set_render_mode(RenderMode::Ghost);

  assert_eq!(viewer.render_mode(), RenderMode::Ghost);
  let uniforms = viewer.materials().uniforms(model()).unwrap();
  assert_eq!(uniforms.opacity, Appearance::default().ghost_opacity);
}

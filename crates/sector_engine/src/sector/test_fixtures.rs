//! Shared sector-tree fixtures for unit tests.

use glam::DVec3;
use smallvec::SmallVec;

use crate::types::{Aabb, ModelIdentifier, PayloadKind};

use super::tree::{SectorId, SectorMetadata, SectorTree};

/// A raw metadata entry without child links (filled in by `SectorTree::build`).
pub fn entry(
  id: u32,
  parent: Option<u32>,
  depth: u32,
  bounds: Aabb,
  estimated_size_bytes: u64,
) -> SectorMetadata {
  SectorMetadata {
    id: SectorId(id),
    parent: parent.map(SectorId),
    children: SmallVec::new(),
    depth,
    bounds,
    estimated_size_bytes,
    file_name: format!("sector_{id}.bin"),
    kind: PayloadKind::Mesh,
  }
}

/// Root spanning `children` unit cells of 10 world units along +X, with one
/// child sector per cell at depth 1.
///
/// Child `i` covers `[i*10, (i+1)*10]` on X and `[0, 10]` on Y/Z and costs
/// `cost_bytes` each; the root costs 50.
pub fn strip_tree(model: ModelIdentifier, children: u32, cost_bytes: u64) -> SectorTree {
  let span = children as f64 * 10.0;
  let mut sectors = vec![entry(
    0,
    None,
    0,
    Aabb::new(DVec3::ZERO, DVec3::new(span, 10.0, 10.0)),
    50,
  )];

  for i in 0..children {
    let min_x = i as f64 * 10.0;
    sectors.push(entry(
      i + 1,
      Some(0),
      1,
      Aabb::new(
        DVec3::new(min_x, 0.0, 0.0),
        DVec3::new(min_x + 10.0, 10.0, 10.0),
      ),
      cost_bytes,
    ));
  }

  SectorTree::build(model, 1.0, 100, sectors).unwrap()
}

/// JSON scene description matching `strip_tree(model, 2, 100)`.
pub fn scene_json(model: ModelIdentifier) -> serde_json::Value {
  serde_json::json!({
    "model_id": model.model_id,
    "revision_id": model.revision_id,
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

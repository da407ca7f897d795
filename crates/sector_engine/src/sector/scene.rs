//! Scene description parsing.
//!
//! The scene description is a lightweight JSON file listing every sector of
//! a model revision: spatial bounds, depth, payload file and size estimate.
//! It mirrors the JSON structure exactly; geometry is not included.

use glam::DVec3;
use serde::Deserialize;
use smallvec::SmallVec;

use crate::error::MetadataError;
use crate::types::{Aabb, ModelIdentifier, PayloadKind};

use super::tree::{SectorId, SectorMetadata, SectorTree};

#[derive(Deserialize)]
struct SceneDescription {
  model_id: u64,
  revision_id: u64,
  #[serde(default = "default_unit_scale")]
  unit_scale: f64,
  /// Highest per-vertex tree index in the model's mesh payloads.
  /// Missing in older scene files; fall back to "no known bound".
  #[serde(default = "default_max_tree_index")]
  max_tree_index: u32,
  sectors: Vec<SceneSector>,
}

fn default_unit_scale() -> f64 {
  1.0
}

fn default_max_tree_index() -> u32 {
  u32::MAX
}

#[derive(Deserialize)]
struct SceneSector {
  id: u32,
  parent_id: Option<u32>,
  depth: u32,
  bounds: SceneBounds,
  estimated_size_bytes: u64,
  file_name: String,
  kind: SceneKind,
}

#[derive(Deserialize)]
struct SceneBounds {
  min: [f64; 3],
  max: [f64; 3],
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum SceneKind {
  Quads,
  Mesh,
  Points,
}

impl From<SceneKind> for PayloadKind {
  fn from(kind: SceneKind) -> Self {
    match kind {
      SceneKind::Quads => PayloadKind::Quads,
      SceneKind::Mesh => PayloadKind::Mesh,
      SceneKind::Points => PayloadKind::Points,
    }
  }
}

/// Parse a scene description into a validated [`SectorTree`].
///
/// The description's model/revision ids must match `model`.
pub fn parse_scene(
  model: ModelIdentifier,
  json: &serde_json::Value,
) -> Result<SectorTree, MetadataError> {
  let desc: SceneDescription =
    serde_json::from_value(json.clone()).map_err(|err| MetadataError::Json(err.to_string()))?;

  if desc.model_id != model.model_id || desc.revision_id != model.revision_id {
    return Err(MetadataError::InvalidScene(format!(
      "scene describes model {}/{}, expected {model}",
      desc.model_id, desc.revision_id
    )));
  }

  let sectors = desc
    .sectors
    .into_iter()
    .map(|s| SectorMetadata {
      id: SectorId(s.id),
      parent: s.parent_id.map(SectorId),
      children: SmallVec::new(),
      depth: s.depth,
      bounds: Aabb::new(DVec3::from_array(s.bounds.min), DVec3::from_array(s.bounds.max)),
      estimated_size_bytes: s.estimated_size_bytes,
      file_name: s.file_name,
      kind: s.kind.into(),
    })
    .collect();

  SectorTree::build(model, desc.unit_scale, desc.max_tree_index, sectors)
}

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

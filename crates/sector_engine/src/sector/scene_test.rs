//! Tests for scene description parsing.

use crate::error::MetadataError;
use crate::sector::test_fixtures::scene_json;
use crate::sector::SectorId;
use crate::types::{ModelIdentifier, PayloadKind};

use super::*;

fn model() -> ModelIdentifier {
  ModelIdentifier::new(7, 3)
}

#[test]
fn test_parse_scene_builds_tree() {
  let tree = parse_scene(model(), &scene_json(model())).unwrap();

  assert_eq!(tree.len(), 3);
  assert_eq!(tree.model(), model());
  assert_eq!(tree.unit_scale(), 1.0);
  assert_eq!(tree.root().kind, PayloadKind::Quads);
  assert_eq!(tree.root().file_name, "sector_0.bin");

  let child = tree.get(SectorId(2)).unwrap();
  assert_eq!(child.kind, PayloadKind::Points);
  assert_eq!(child.depth, 1);
  assert_eq!(child.bounds.min.x, 10.0);
}

#[test]
fn test_parse_scene_defaults_unit_scale() {
  let mut json = scene_json(model());
  json.as_object_mut().unwrap().remove("unit_scale");

  let tree = parse_scene(model(), &json).unwrap();
  assert_eq!(tree.unit_scale(), 1.0);
}

#[test]
fn test_parse_scene_defaults_max_tree_index() {
  let mut json = scene_json(model());
  json.as_object_mut().unwrap().remove("max_tree_index");

  let tree = parse_scene(model(), &json).unwrap();
  assert_eq!(tree.max_tree_index(), u32::MAX);
}

#[test]
fn test_parse_scene_rejects_model_mismatch() {
  let err = parse_scene(ModelIdentifier::new(99, 3), &scene_json(model())).unwrap_err();
  assert!(matches!(err, MetadataError::InvalidScene(_)));
}

#[test]
fn test_parse_scene_rejects_malformed_json() {
  let json = serde_json::json!({ "model_id": 7 });
  let err = parse_scene(model(), &json).unwrap_err();
  assert!(matches!(err, MetadataError::Json(_)));
}

#[test]
fn test_parse_scene_rejects_unknown_kind() {
  let mut json = scene_json(model());
  json["sectors"][0]["kind"] = serde_json::json!("nurbs");

  let err = parse_scene(model(), &json).unwrap_err();
  assert!(matches!(err, MetadataError::Json(_)));
}

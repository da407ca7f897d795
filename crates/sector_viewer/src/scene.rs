//! SceneGraph - which sectors of which models are attached for rendering.
//!
//! Mirrors the streaming managers' resident sets on the polling thread;
//! the renderer walks this to draw.

use std::collections::{BTreeSet, HashMap};

use sector_engine::sector::SectorId;
use sector_engine::types::ModelIdentifier;

use crate::viewer::ModelHandle;

/// One loaded model's node in the scene.
pub struct ModelNode {
  pub model: ModelIdentifier,
  attached: BTreeSet<SectorId>,
}

impl ModelNode {
  fn new(model: ModelIdentifier) -> Self {
    Self {
      model,
      attached: BTreeSet::new(),
    }
  }

  /// Attached sector ids in ascending order.
  pub fn attached(&self) -> impl Iterator<Item = SectorId> + '_ {
    self.attached.iter().copied()
  }

  pub fn is_attached(&self, id: SectorId) -> bool {
    self.attached.contains(&id)
  }

  pub fn attached_count(&self) -> usize {
    self.attached.len()
  }
}

/// Per-model scene nodes, keyed by viewer handle.
#[derive(Default)]
pub struct SceneGraph {
  nodes: HashMap<ModelHandle, ModelNode>,
}

impl SceneGraph {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn add_node(&mut self, handle: ModelHandle, model: ModelIdentifier) {
    self.nodes.insert(handle, ModelNode::new(model));
  }

  pub(crate) fn remove_node(&mut self, handle: ModelHandle) -> bool {
    self.nodes.remove(&handle).is_some()
  }

  pub(crate) fn attach(&mut self, handle: ModelHandle, id: SectorId) {
    if let Some(node) = self.nodes.get_mut(&handle) {
      node.attached.insert(id);
    }
  }

  pub(crate) fn detach(&mut self, handle: ModelHandle, id: SectorId) {
    if let Some(node) = self.nodes.get_mut(&handle) {
      node.attached.remove(&id);
    }
  }

  pub fn node(&self, handle: ModelHandle) -> Option<&ModelNode> {
    self.nodes.get(&handle)
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}

//! SectorTree - arena-backed spatial hierarchy of one model.
//!
//! Sectors are stored in a flat `Vec` indexed by [`SectorId`]; parent and
//! child links are indices into the arena, so the structure is acyclic by
//! construction.

use smallvec::SmallVec;

use crate::error::MetadataError;
use crate::types::{Aabb, ModelIdentifier, PayloadKind};

/// Index of a sector within one model's tree.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SectorId(pub u32);

impl SectorId {
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl std::fmt::Display for SectorId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Per-sector metadata: spatial placement and payload description.
///
/// Created when the model's scene description is parsed; geometry is not
/// attached here.
#[derive(Clone, Debug)]
pub struct SectorMetadata {
  pub id: SectorId,
  pub parent: Option<SectorId>,
  pub children: SmallVec<[SectorId; 8]>,
  /// Tree depth; the root is 0. Deeper sectors carry finer detail.
  pub depth: u32,
  pub bounds: Aabb,
  /// Download size estimate used by the byte budget.
  pub estimated_size_bytes: u64,
  /// Payload file name under the model's base path.
  pub file_name: String,
  pub kind: PayloadKind,
}

/// Spatial hierarchy of one model, without geometry payloads.
#[derive(Debug)]
pub struct SectorTree {
  model: ModelIdentifier,
  unit_scale: f64,
  max_tree_index: u32,
  root: SectorId,
  sectors: Vec<SectorMetadata>,
}

impl SectorTree {
  /// Build and validate a tree from parsed sector entries.
  ///
  /// Entries must form a single-rooted tree: ids are the arena indices
  /// `0..n`, exactly one entry has no parent, and every child is one level
  /// deeper than its parent. Child links are derived from the parent links.
  pub fn build(
    model: ModelIdentifier,
    unit_scale: f64,
    max_tree_index: u32,
    mut sectors: Vec<SectorMetadata>,
  ) -> Result<Self, MetadataError> {
    if sectors.is_empty() {
      return Err(MetadataError::InvalidScene("scene has no sectors".into()));
    }

    sectors.sort_by_key(|s| s.id);
    let count = sectors.len() as u32;

    let mut root = None;
    for (index, sector) in sectors.iter().enumerate() {
      if sector.id.0 != index as u32 {
        return Err(MetadataError::InvalidScene(format!(
          "sector ids must be contiguous from 0, found {} at position {index}",
          sector.id
        )));
      }
      if !sector.bounds.is_valid() {
        return Err(MetadataError::InvalidScene(format!(
          "sector {} has inverted bounds",
          sector.id
        )));
      }
      match sector.parent {
        None => {
          if root.replace(sector.id).is_some() {
            return Err(MetadataError::InvalidScene("multiple root sectors".into()));
          }
          if sector.depth != 0 {
            return Err(MetadataError::InvalidScene(format!(
              "root sector {} has depth {}",
              sector.id, sector.depth
            )));
          }
        }
        Some(parent) => {
          if parent.0 >= count {
            return Err(MetadataError::InvalidScene(format!(
              "sector {} references missing parent {parent}",
              sector.id
            )));
          }
        }
      }
    }

    let root = match root {
      Some(root) => root,
      None => return Err(MetadataError::InvalidScene("scene has no root sector".into())),
    };

    // Derive child links, checking the depth invariant against the parent.
    let parents: Vec<(SectorId, Option<SectorId>, u32)> = sectors
      .iter()
      .map(|s| (s.id, s.parent, s.depth))
      .collect();
    for (id, parent, depth) in parents {
      if let Some(parent) = parent {
        let parent_depth = sectors[parent.index()].depth;
        if depth != parent_depth + 1 {
          return Err(MetadataError::InvalidScene(format!(
            "sector {id} has depth {depth}, parent {parent} has depth {parent_depth}"
          )));
        }
        sectors[parent.index()].children.push(id);
      }
    }

    Ok(Self {
      model,
      unit_scale,
      max_tree_index,
      root,
      sectors,
    })
  }

  pub fn model(&self) -> ModelIdentifier {
    self.model
  }

  /// World units per stored unit.
  pub fn unit_scale(&self) -> f64 {
    self.unit_scale
  }

  /// Highest per-vertex tree index across the model's mesh payloads, used
  /// to bound picking and highlight ranges.
  pub fn max_tree_index(&self) -> u32 {
    self.max_tree_index
  }

  pub fn len(&self) -> usize {
    self.sectors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sectors.is_empty()
  }

  /// The root sector (depth 0).
  pub fn root(&self) -> &SectorMetadata {
    &self.sectors[self.root.index()]
  }

  pub fn get(&self, id: SectorId) -> Option<&SectorMetadata> {
    self.sectors.get(id.index())
  }

  pub fn iter(&self) -> impl Iterator<Item = &SectorMetadata> {
    self.sectors.iter()
  }

  /// Bounds of the whole model (the root sector's bounds).
  pub fn bounds(&self) -> &Aabb {
    &self.root().bounds
  }

  /// Sum of all sectors' download size estimates.
  pub fn total_size_bytes(&self) -> u64 {
    self.sectors.iter().map(|s| s.estimated_size_bytes).sum()
  }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;

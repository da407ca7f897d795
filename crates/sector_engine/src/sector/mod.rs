//! Sector metadata: the spatial hierarchy of a model, without geometry.
//!
//! A model's scene description is fetched once, parsed into a [`SectorTree`]
//! and cached by the [`MetadataRepository`]. Geometry payloads are streamed
//! separately (see [`crate::streaming`]).

mod repository;
mod scene;
mod tree;

#[cfg(test)]
pub mod test_fixtures;

pub use repository::{MetadataRepository, SCENE_FILE_NAME};
pub use scene::parse_scene;
pub use tree::{SectorId, SectorMetadata, SectorTree};

//! sector_engine - engine-independent CAD/point-cloud sector streaming
//!
//! This crate is the streaming core of a 3D model viewer: it decides which
//! sectors of a model are worth loading for the current camera (budgeted,
//! priority-ordered culling), fetches and decodes their binary payloads on
//! a worker pool, and tracks the resident set so GPU resources are
//! disposed exactly once. No windowing, no GPU API: the renderer plugs in
//! behind the [`streaming::GeometryAllocator`] seam and the host drives a
//! poll-based main loop.
//!
//! # Example
//!
//! ```ignore
//! use sector_engine::culling::{determine_sectors, ScreenAreaEstimator, StreamingBudget};
//!
//! let tree = repository.load(model)?;
//! let pass = determine_sectors(&camera, &tree, &StreamingBudget::DEFAULT, &ScreenAreaEstimator);
//! manager.request(&pass.wanted);
//! // each frame:
//! for event in manager.poll_completed() {
//!     // attach loaded sectors to the scene graph
//! }
//! ```

pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{MetadataError, ParseError, ProviderError, StreamError};
pub use types::{Aabb, ModelIdentifier, PayloadKind};

// Model data providers (local files, in-memory, retrying network seam)
pub mod provider;

// Sector metadata: tree, scene description, caching repository
pub mod sector;
pub use sector::{SectorId, SectorTree};

// Camera-driven culling with byte/proximity budgets
pub mod culling;

// Binary payload decoding on the worker pool
pub mod parse;

// Streaming manager and the GPU resource seam
pub mod streaming;

// Spatial index over decoded point clouds
pub mod point_octree;
pub use point_octree::PointOctree;

// Per-model material state and render modes
pub mod materials;
pub use materials::{MaterialManager, RenderMode};

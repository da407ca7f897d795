//! sector_viewer - host-facing API over the sector streaming engine.
//!
//! A [`Viewer`] is the explicitly constructed registry a hosting
//! application drives: add/remove models by `{model_id, revision_id}`, set
//! the camera, switch render modes, subscribe to events, and call
//! [`Viewer::update`] once per frame to advance culling and streaming.

mod scene;
mod viewer;

pub use scene::{ModelNode, SceneGraph};
pub use viewer::{ModelHandle, Viewer, ViewerEvent};

// The engine types a host needs alongside the viewer.
pub use sector_engine::culling::{CameraState, StreamingBudget};
pub use sector_engine::materials::{Appearance, RenderMode};
pub use sector_engine::types::ModelIdentifier;

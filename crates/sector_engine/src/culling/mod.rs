//! Camera-driven sector culling.
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │ CameraState  ├────►│ determine_    ├────►│ CullingPass      │
//! │ + SectorTree │     │ sectors()     │     │ wanted + spendage│
//! │ + Budget     │     │ (score, sort, │     └──────────────────┘
//! └──────────────┘     │  greedy)      │
//!                      └───────────────┘
//! ```
//!
//! A pass scores every sector against the camera (frustum + pluggable
//! coverage estimator), force-includes sectors close to the camera, and
//! greedily accepts the rest under the byte budget. [`CullingScheduler`]
//! runs passes off-thread and cancels superseded ones.

mod budget;
mod camera;
mod coverage;
mod pass;
mod scheduler;

pub use budget::StreamingBudget;
pub use camera::{CameraState, Frustum};
pub use coverage::{CoverageEstimator, ScreenAreaEstimator};
pub use pass::{determine_sectors, determine_sectors_cancellable, CullingPass, Spendage, WantedSector};
pub use scheduler::CullingScheduler;

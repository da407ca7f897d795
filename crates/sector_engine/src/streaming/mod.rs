//! Sector streaming: fetch, decode, upload, evict.
//!
//! ```text
//! Polling thread                    Workers (rayon)
//! ┌──────────────┐  request()
//! │ Streaming    ├────────────────► fetch payload ──► decode
//! │ Manager      │                        │
//! │  - wanted    │  poll_completed()      │ completion channel
//! │  - in-flight │◄───────────────────────┘
//! │  - resident  │
//! └──────┬───────┘
//!        │ upload / dispose
//!        ▼
//! ┌──────────────┐
//! │ Geometry     │
//! │ Allocator    │
//! └──────────────┘
//! ```
//!
//! The manager owns the disposal invariant: every accepted sector's GPU
//! buffers are disposed exactly once, whether by eviction, by `clear`, or
//! by manager teardown.

mod gpu;
mod manager;

pub use gpu::{GeometryAllocator, GeometryBuffers, TrackingAllocator};
pub use manager::{ConsumedSector, StreamEvent, StreamingManager};

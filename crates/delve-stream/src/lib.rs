//! Chunk windowing, dirty tracking and render-grid assembly for a streamed tile
//! world. [`Pipeline`] ties the pieces together behind one per-tick entry point.
#![forbid(unsafe_code)]

pub mod compositor;
pub mod config;
pub mod dirty;
pub mod grid;
pub mod pipeline;
pub mod upstream;
pub mod window;

pub use compositor::{
    CompositeStats, Compositor, DrawSubmission, RenderLayer, RenderSurface, Style, Visibility,
};
pub use config::StreamConfig;
pub use dirty::{DirtyChunk, DirtyTracker};
pub use grid::{ChunkGrid, ChunkSlot};
pub use pipeline::{Pipeline, TickStats};
pub use upstream::UpstreamSource;
pub use window::{ChunkWindow, Ranges, ViewUpdate, Viewpoint, WindowIter, WindowTracker};

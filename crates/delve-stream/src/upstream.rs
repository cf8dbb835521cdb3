use delve_world::{ChunkPayload, WorldExtent};

use crate::window::{ChunkWindow, ViewUpdate};

/// The remote world feed. Implementations queue whatever has arrived; the
/// pipeline drains it once per tick.
pub trait UpstreamSource {
    /// Size of the world, read once on connect.
    fn world_extent(&self) -> WorldExtent;
    fn pop_view_update(&mut self) -> Option<ViewUpdate>;
    fn pop_chunk_update(&mut self) -> Option<ChunkPayload>;
    /// Tell the source which chunks are wanted. The window follows the view and may
    /// reach past the world extent. Payloads outside it may still arrive.
    fn set_request_window(&mut self, window: ChunkWindow);
}

use delve_geom::Vec3;
use delve_world::mapper::render_to_world;
use delve_world::{CHUNK_EDGE, ChunkCoord, WorldExtent};

/// View report from the upstream source: the tile rectangle on screen and the
/// layer it sits on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    pub view_pos_x: i32,
    pub view_pos_y: i32,
    pub view_pos_z: i32,
    pub view_size_x: i32,
    pub view_size_y: i32,
}

impl ViewUpdate {
    /// Saturates at the `i32` bounds.
    #[inline]
    pub fn center(&self) -> (i32, i32) {
        (
            self.view_pos_x.saturating_add(self.view_size_x / 2),
            self.view_pos_y.saturating_add(self.view_size_y / 2),
        )
    }

    /// The layer the viewer stands on sits one above the reported one.
    #[inline]
    pub fn layer(&self) -> i32 {
        self.view_pos_z.saturating_add(1)
    }
}

/// Horizontal center in tiles plus the active layer.
///
/// `dirty` means the layer split moved or new geometry landed, so whatever was
/// drawn last must be re-sorted before the next composite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewpoint {
    pub x: i32,
    pub y: i32,
    pub layer: i32,
    pub dirty: bool,
}

impl Viewpoint {
    #[inline]
    pub fn chunk(&self) -> ChunkCoord {
        ChunkCoord::new(
            self.x.div_euclid(CHUNK_EDGE),
            self.y.div_euclid(CHUNK_EDGE),
            self.layer,
        )
    }
}

/// Window radii in chunks (x, y) and layers (z).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ranges {
    pub range_x: i32,
    pub range_y: i32,
    pub range_z_up: i32,
    pub range_z_down: i32,
}

impl Default for Ranges {
    fn default() -> Self {
        Self {
            range_x: 4,
            range_y: 4,
            range_z_up: 0,
            range_z_down: 5,
        }
    }
}

/// Inclusive box of chunk coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkWindow {
    pub min: ChunkCoord,
    pub max: ChunkCoord,
}

impl ChunkWindow {
    #[inline]
    pub const fn new(min: ChunkCoord, max: ChunkCoord) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min.cx > self.max.cx || self.min.cy > self.max.cy || self.min.cz > self.max.cz
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let span = |a: i32, b: i32| (i64::from(b) - i64::from(a) + 1) as usize;
        span(self.min.cx, self.max.cx) * span(self.min.cy, self.max.cy) * span(self.min.cz, self.max.cz)
    }

    #[inline]
    pub fn contains(&self, c: ChunkCoord) -> bool {
        c.cx >= self.min.cx
            && c.cx <= self.max.cx
            && c.cy >= self.min.cy
            && c.cy <= self.max.cy
            && c.cz >= self.min.cz
            && c.cz <= self.max.cz
    }

    /// Intersect with `[0, extent)` on every axis. `None` if nothing is left.
    pub fn clamp(&self, extent: WorldExtent) -> Option<ChunkWindow> {
        if extent.is_empty() {
            return None;
        }
        let w = ChunkWindow {
            min: ChunkCoord::new(self.min.cx.max(0), self.min.cy.max(0), self.min.cz.max(0)),
            max: ChunkCoord::new(
                self.max.cx.min(extent.chunks_x as i32 - 1),
                self.max.cy.min(extent.chunks_y as i32 - 1),
                self.max.cz.min(extent.layers as i32 - 1),
            ),
        };
        if w.is_empty() { None } else { Some(w) }
    }

    /// Coordinates in z, then y, then x order.
    pub fn iter(&self) -> WindowIter {
        WindowIter {
            window: *self,
            next: (!self.is_empty()).then_some(self.min),
        }
    }
}

impl IntoIterator for ChunkWindow {
    type Item = ChunkCoord;
    type IntoIter = WindowIter;

    fn into_iter(self) -> WindowIter {
        self.iter()
    }
}

#[derive(Clone, Debug)]
pub struct WindowIter {
    window: ChunkWindow,
    next: Option<ChunkCoord>,
}

impl Iterator for WindowIter {
    type Item = ChunkCoord;

    fn next(&mut self) -> Option<ChunkCoord> {
        let cur = self.next?;
        let (min, max) = (self.window.min, self.window.max);
        let mut n = cur;
        if n.cx < max.cx {
            n.cx += 1;
        } else if n.cy < max.cy {
            n.cx = min.cx;
            n.cy += 1;
        } else if n.cz < max.cz {
            n.cx = min.cx;
            n.cy = min.cy;
            n.cz += 1;
        } else {
            self.next = None;
            return Some(cur);
        }
        self.next = Some(n);
        Some(cur)
    }
}

/// Owns the viewpoint and turns it into the resident window.
#[derive(Clone, Debug, Default)]
pub struct WindowTracker {
    view: Viewpoint,
    ranges: Ranges,
    last_upstream_layer: Option<i32>,
    last_pushed: Option<ChunkWindow>,
}

impl WindowTracker {
    pub fn new(ranges: Ranges) -> Self {
        Self {
            ranges,
            ..Default::default()
        }
    }

    #[inline]
    pub fn viewpoint(&self) -> Viewpoint {
        self.view
    }

    #[inline]
    pub fn viewpoint_mut(&mut self) -> &mut Viewpoint {
        &mut self.view
    }

    #[inline]
    pub fn ranges(&self) -> Ranges {
        self.ranges
    }

    pub fn set_ranges(&mut self, ranges: Ranges) {
        self.ranges = ranges;
    }

    pub fn mark_viewpoint_dirty(&mut self) {
        self.view.dirty = true;
    }

    pub fn set_viewpoint_from_upstream(&mut self, update: &ViewUpdate) {
        if self.last_upstream_layer != Some(update.view_pos_z) {
            self.view.dirty = true;
        }
        self.last_upstream_layer = Some(update.view_pos_z);
        let (x, y) = update.center();
        self.view.x = x;
        self.view.y = y;
        self.view.layer = update.layer();
    }

    pub fn set_viewpoint_from_position(&mut self, p: Vec3) {
        let t = render_to_world(p);
        self.view.x = t.x;
        self.view.y = t.y;
        let layer = t.z.saturating_add(1);
        if layer != self.view.layer {
            self.view.layer = layer;
            self.view.dirty = true;
        }
    }

    /// Viewpoint ± radii, unclamped and saturating. Derived fresh on every call.
    pub fn current_window(&self) -> ChunkWindow {
        let c = self.view.chunk();
        let r = self.ranges;
        ChunkWindow {
            min: ChunkCoord::new(
                c.cx.saturating_sub(r.range_x),
                c.cy.saturating_sub(r.range_y),
                c.cz.saturating_sub(r.range_z_down),
            ),
            max: ChunkCoord::new(
                c.cx.saturating_add(r.range_x),
                c.cy.saturating_add(r.range_y),
                c.cz.saturating_add(r.range_z_up),
            ),
        }
    }

    /// Record `window` as the one sent upstream; true if it differs from the last.
    pub fn note_pushed(&mut self, window: ChunkWindow) -> bool {
        if self.last_pushed == Some(window) {
            return false;
        }
        self.last_pushed = Some(window);
        true
    }

    /// Next window is pushed unconditionally.
    pub fn forget_pushed(&mut self) {
        self.last_pushed = None;
    }
}

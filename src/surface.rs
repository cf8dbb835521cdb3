use delve_mesh::{BufferClass, GlowLight};
use delve_stream::{DrawSubmission, RenderSurface, Visibility};
use hashbrown::HashMap;

/// Render surface for headless runs: counts what would have been drawn.
#[derive(Default)]
pub struct TallySurface {
    pub draws: HashMap<(BufferClass, Visibility), usize>,
    pub triangles: usize,
    pub lights: usize,
    pub visibility_changes: usize,
    pub last_layer: Option<i32>,
}

impl TallySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the per-frame counts; keeps `visibility_changes`.
    pub fn begin_frame(&mut self) {
        self.draws.clear();
        self.triangles = 0;
        self.lights = 0;
    }

    pub fn count(&self, class: BufferClass, vis: Visibility) -> usize {
        self.draws.get(&(class, vis)).copied().unwrap_or(0)
    }
}

impl RenderSurface for TallySurface {
    fn submit(&mut self, draw: DrawSubmission<'_>) {
        *self
            .draws
            .entry((draw.style.class, draw.style.visibility))
            .or_insert(0) += 1;
        self.triangles += draw.buffer.triangle_count();
    }

    fn place_light(&mut self, _light: &GlowLight) {
        self.lights += 1;
    }

    fn visibility_changed(&mut self, layer: i32) {
        self.visibility_changes += 1;
        self.last_layer = Some(layer);
        log::debug!(target: "stream", "visibility split moved to layer {}", layer);
    }
}

use serde::Deserialize;
use std::error::Error;

use crate::window::Ranges;

/// Streaming and meshing knobs, loaded from TOML. Every field is optional.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StreamConfig {
    #[serde(default = "default_range_xy")]
    pub range_x: i32,
    #[serde(default = "default_range_xy")]
    pub range_y: i32,
    #[serde(default)]
    pub range_z_up: i32,
    #[serde(default = "default_range_z_down")]
    pub range_z_down: i32,
    /// Layers drawn below (normal) and above (suppressed) the active one.
    #[serde(default = "default_camera_view_dist")]
    pub camera_view_dist: i32,
    /// Zero builds meshes on the driver thread.
    #[serde(default)]
    pub meshing_threads: usize,
    /// Jobs per poll for the inline runtime.
    #[serde(default = "default_blocks_to_process")]
    pub blocks_to_process: usize,
    #[serde(default = "default_true")]
    pub overhead_shadows: bool,
    #[serde(default = "default_job_queue_capacity")]
    pub job_queue_capacity: usize,
}

fn default_range_xy() -> i32 {
    4
}
fn default_range_z_down() -> i32 {
    5
}
fn default_camera_view_dist() -> i32 {
    25
}
fn default_blocks_to_process() -> usize {
    1
}
fn default_true() -> bool {
    true
}
fn default_job_queue_capacity() -> usize {
    256
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            range_x: default_range_xy(),
            range_y: default_range_xy(),
            range_z_up: 0,
            range_z_down: default_range_z_down(),
            camera_view_dist: default_camera_view_dist(),
            meshing_threads: 0,
            blocks_to_process: default_blocks_to_process(),
            overhead_shadows: true,
            job_queue_capacity: default_job_queue_capacity(),
        }
    }
}

impl StreamConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: StreamConfig = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    pub fn ranges(&self) -> Ranges {
        Ranges {
            range_x: self.range_x,
            range_y: self.range_y,
            range_z_up: self.range_z_up,
            range_z_down: self.range_z_down,
        }
    }

    /// Clamp fields into their usable range. Negative radii would invert the window.
    pub fn sanitized(mut self) -> Self {
        self.range_x = self.range_x.max(0);
        self.range_y = self.range_y.max(0);
        self.range_z_up = self.range_z_up.max(0);
        self.range_z_down = self.range_z_down.max(0);
        self.camera_view_dist = self.camera_view_dist.max(0);
        self.blocks_to_process = self.blocks_to_process.max(1);
        self.job_queue_capacity = self.job_queue_capacity.max(1);
        self
    }
}

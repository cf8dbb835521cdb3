use delve_geom::Mat4;
use delve_mesh::{BufferClass, GlowLight, MeshBuffer};
use delve_world::ChunkCoord;

use crate::grid::ChunkGrid;
use crate::window::Viewpoint;

/// Render queue a submission goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RenderLayer {
    Terrain = 0,
    Stencil = 1,
    Liquid = 4,
}

impl RenderLayer {
    #[inline]
    pub fn for_class(class: BufferClass) -> Self {
        match class {
            BufferClass::Terrain => RenderLayer::Terrain,
            BufferClass::Stencil => RenderLayer::Stencil,
            BufferClass::Water | BufferClass::Magma => RenderLayer::Liquid,
        }
    }

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// `Suppressed` geometry casts shadows and occludes but is not itself visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Normal,
    Suppressed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Style {
    pub class: BufferClass,
    pub visibility: Visibility,
}

#[derive(Clone, Copy, Debug)]
pub struct DrawSubmission<'a> {
    pub coord: ChunkCoord,
    pub buffer: &'a MeshBuffer,
    pub transform: Mat4,
    pub style: Style,
    pub layer: RenderLayer,
}

pub trait RenderSurface {
    fn submit(&mut self, draw: DrawSubmission<'_>);

    fn place_light(&mut self, _light: &GlowLight) {}

    /// The active layer moved or new geometry landed; previously drawn chunks
    /// may need to be re-sorted between the normal and suppressed sets.
    fn visibility_changed(&mut self, _layer: i32) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositeStats {
    pub normal: usize,
    pub suppressed: usize,
    pub lights: usize,
    pub triangles: usize,
}

impl CompositeStats {
    #[inline]
    pub fn submissions(&self) -> usize {
        self.normal + self.suppressed
    }
}

const NORMAL_CLASSES: [BufferClass; 4] = BufferClass::ALL;
const SUPPRESSED_CLASSES: [BufferClass; 2] = [BufferClass::Terrain, BufferClass::Stencil];

/// Issues draws for the chunk grid around the active layer.
///
/// Layers at or below the viewpoint draw normally. Layers above it draw terrain
/// and stencil geometry suppressed, so overhead rock still shades what is below
/// without hiding it.
#[derive(Clone, Debug)]
pub struct Compositor {
    pub transform: Mat4,
    pub camera_view_dist: i32,
    pub overhead_shadows: bool,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            camera_view_dist: 25,
            overhead_shadows: true,
        }
    }
}

impl Compositor {
    pub fn new(camera_view_dist: i32, overhead_shadows: bool) -> Self {
        Self {
            camera_view_dist,
            overhead_shadows,
            ..Default::default()
        }
    }

    pub fn composite<R: RenderSurface + ?Sized>(
        &self,
        grid: &ChunkGrid,
        view: &mut Viewpoint,
        surface: &mut R,
    ) -> CompositeStats {
        if view.dirty {
            surface.visibility_changed(view.layer);
            view.dirty = false;
        }
        let mut stats = CompositeStats::default();
        let dist = self.camera_view_dist.max(0);
        self.pass(
            grid,
            view.layer - dist,
            view.layer,
            &NORMAL_CLASSES,
            Visibility::Normal,
            surface,
            &mut stats,
        );
        if self.overhead_shadows {
            self.pass(
                grid,
                view.layer + 1,
                view.layer + dist,
                &SUPPRESSED_CLASSES,
                Visibility::Suppressed,
                surface,
                &mut stats,
            );
        }
        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn pass<R: RenderSurface + ?Sized>(
        &self,
        grid: &ChunkGrid,
        z_lo: i32,
        z_hi: i32,
        classes: &[BufferClass],
        visibility: Visibility,
        surface: &mut R,
        stats: &mut CompositeStats,
    ) {
        let e = grid.extent();
        if e.is_empty() {
            return;
        }
        let z_lo = z_lo.max(0);
        let z_hi = z_hi.min(e.layers as i32 - 1);
        for cz in z_lo..=z_hi {
            for cy in 0..e.chunks_y as i32 {
                for cx in 0..e.chunks_x as i32 {
                    let coord = ChunkCoord::new(cx, cy, cz);
                    let Some(slot) = grid.slot(coord) else {
                        continue;
                    };
                    for &class in classes {
                        let Some(buffer) = slot.buffer(class) else {
                            continue;
                        };
                        if buffer.is_empty() {
                            continue;
                        }
                        stats.triangles += buffer.triangle_count();
                        match visibility {
                            Visibility::Normal => stats.normal += 1,
                            Visibility::Suppressed => stats.suppressed += 1,
                        }
                        surface.submit(DrawSubmission {
                            coord,
                            buffer,
                            transform: self.transform,
                            style: Style { class, visibility },
                            layer: RenderLayer::for_class(class),
                        });
                    }
                    if visibility == Visibility::Normal {
                        for light in slot.lights() {
                            surface.place_light(light);
                            stats.lights += 1;
                        }
                    }
                }
            }
        }
    }
}

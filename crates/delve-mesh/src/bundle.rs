use delve_geom::Vec3;
use delve_world::{ChunkCoord, TileCoord};

use crate::buffer::MeshData;

/// The four geometry categories a chunk slot can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferClass {
    Terrain,
    Stencil,
    Water,
    Magma,
}

impl BufferClass {
    pub const ALL: [BufferClass; 4] = [
        BufferClass::Terrain,
        BufferClass::Stencil,
        BufferClass::Water,
        BufferClass::Magma,
    ];

    #[inline]
    pub fn is_liquid(self) -> bool {
        matches!(self, BufferClass::Water | BufferClass::Magma)
    }
}

/// Point light for one glowing tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowLight {
    pub tile: TileCoord,
    pub position: Vec3,
    pub intensity: f32,
}

/// Output of one mesh job. A `None` payload means that category was not rebuilt;
/// `Some` with empty data means it was rebuilt and is now empty.
#[derive(Clone, Debug, Default)]
pub struct MeshBundle {
    pub origin: TileCoord,
    pub terrain: Option<MeshData>,
    pub stencil: Option<MeshData>,
    pub water: Option<MeshData>,
    pub magma: Option<MeshData>,
    pub glow: Option<Vec<GlowLight>>,
}

impl MeshBundle {
    pub fn new(origin: TileCoord) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }

    #[inline]
    pub fn chunk(&self) -> ChunkCoord {
        self.origin.chunk()
    }

    #[inline]
    pub fn payload(&self, class: BufferClass) -> Option<&MeshData> {
        match class {
            BufferClass::Terrain => self.terrain.as_ref(),
            BufferClass::Stencil => self.stencil.as_ref(),
            BufferClass::Water => self.water.as_ref(),
            BufferClass::Magma => self.magma.as_ref(),
        }
    }

    pub fn set_payload(&mut self, class: BufferClass, data: MeshData) {
        let slot = match class {
            BufferClass::Terrain => &mut self.terrain,
            BufferClass::Stencil => &mut self.stencil,
            BufferClass::Water => &mut self.water,
            BufferClass::Magma => &mut self.magma,
        };
        *slot = Some(data);
    }

    /// True if no category carries a payload.
    pub fn is_empty(&self) -> bool {
        BufferClass::ALL.iter().all(|c| self.payload(*c).is_none())
    }
}

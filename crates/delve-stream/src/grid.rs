use delve_mesh::{BufferClass, GlowLight, MeshBuffer, MeshBundle};
use delve_world::{ChunkCoord, Grid3, WorldExtent};

/// Render-ready state for one chunk. Buffers are allocated on first use and
/// refilled in place afterwards.
#[derive(Clone, Debug, Default)]
pub struct ChunkSlot {
    terrain: Option<MeshBuffer>,
    stencil: Option<MeshBuffer>,
    water: Option<MeshBuffer>,
    magma: Option<MeshBuffer>,
    lights: Vec<GlowLight>,
}

impl ChunkSlot {
    #[inline]
    pub fn buffer(&self, class: BufferClass) -> Option<&MeshBuffer> {
        match class {
            BufferClass::Terrain => self.terrain.as_ref(),
            BufferClass::Stencil => self.stencil.as_ref(),
            BufferClass::Water => self.water.as_ref(),
            BufferClass::Magma => self.magma.as_ref(),
        }
    }

    fn buffer_or_alloc(&mut self, class: BufferClass) -> &mut MeshBuffer {
        let slot = match class {
            BufferClass::Terrain => &mut self.terrain,
            BufferClass::Stencil => &mut self.stencil,
            BufferClass::Water => &mut self.water,
            BufferClass::Magma => &mut self.magma,
        };
        slot.get_or_insert_with(MeshBuffer::new)
    }

    #[inline]
    pub fn lights(&self) -> &[GlowLight] {
        &self.lights
    }

    /// True when nothing here would draw.
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
            && BufferClass::ALL
                .iter()
                .all(|c| self.buffer(*c).is_none_or(|b| b.is_empty()))
    }

    fn clear(&mut self) {
        for class in BufferClass::ALL {
            if let Some(b) = match class {
                BufferClass::Terrain => self.terrain.as_mut(),
                BufferClass::Stencil => self.stencil.as_mut(),
                BufferClass::Water => self.water.as_mut(),
                BufferClass::Magma => self.magma.as_mut(),
            } {
                b.clear();
            }
        }
        self.lights.clear();
    }
}

/// Dense grid of [`ChunkSlot`]s over the world extent. Mutated only by
/// [`ChunkGrid::apply`] on the driver thread.
#[derive(Clone, Debug)]
pub struct ChunkGrid {
    slots: Grid3<ChunkSlot>,
}

impl ChunkGrid {
    pub fn new(extent: WorldExtent) -> Self {
        Self {
            slots: Grid3::new(extent),
        }
    }

    #[inline]
    pub fn extent(&self) -> WorldExtent {
        self.slots.extent()
    }

    #[inline]
    pub fn slot(&self, c: ChunkCoord) -> Option<&ChunkSlot> {
        self.slots.get(c)
    }

    /// Copy a finished bundle into its slot. Returns true if any geometry payload
    /// was written; bundles outside the extent are dropped.
    pub fn apply(&mut self, bundle: &MeshBundle) -> bool {
        let coord = bundle.chunk();
        let Some(slot) = self.slots.get_mut(coord) else {
            log::trace!(target: "stream", "apply: {:?} outside grid, dropped", coord);
            return false;
        };
        let mut changed = false;
        for class in BufferClass::ALL {
            if let Some(data) = bundle.payload(class) {
                slot.buffer_or_alloc(class).copy_from(data);
                changed = true;
            }
        }
        if let Some(lights) = &bundle.glow {
            slot.lights.clear();
            slot.lights.extend_from_slice(lights);
        }
        changed
    }

    /// Empty every slot but keep buffer allocations.
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.clear();
        }
    }

    /// Rebuild for a new extent, dropping all buffers.
    pub fn resize(&mut self, extent: WorldExtent) {
        self.slots.resize(extent);
    }

    /// Slots holding anything drawable.
    pub fn resident_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }
}

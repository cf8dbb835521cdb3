use delve_geom::Vec3;

use crate::face::Face;

/// Vertex streams for one chunk/category, as produced by a mesh worker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub col: Vec<u8>,
    pub idx: Vec<u32>,
}

impl MeshData {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    /// Append a quad `a b c d`, flipping the winding so its front side faces `n`.
    pub fn add_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, n: Vec3, rgba: [u8; 4]) {
        let base = self.vertex_count() as u32;
        let mut vs = [a, b, c, d];
        let mut uvs = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let e1 = vs[1] - vs[0];
        let e2 = vs[2] - vs[0];
        let cross = Vec3::new(
            e1.y * e2.z - e1.z * e2.y,
            e1.z * e2.x - e1.x * e2.z,
            e1.x * e2.y - e1.y * e2.x,
        );
        if cross.dot(n) < 0.0 {
            vs.swap(1, 3);
            uvs.swap(1, 3);
        }
        for (v, uv) in vs.iter().zip(uvs) {
            self.pos.extend_from_slice(&v.to_array());
            self.norm.extend_from_slice(&n.to_array());
            self.uv.extend_from_slice(&[uv.0, uv.1]);
            self.col.extend_from_slice(&rgba);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn add_face_rect(&mut self, face: Face, origin: Vec3, u: f32, v: f32, rgba: [u8; 4]) {
        let [a, b, c, d] = face.rect(origin, u, v);
        self.add_quad(a, b, c, d, face.normal(), rgba);
    }
}

/// Render-ready geometry owned by a chunk slot.
///
/// Allocated once per slot and category, then cleared and refilled on every
/// update so the backing allocations are reused.
#[derive(Clone, Debug, Default)]
pub struct MeshBuffer {
    data: MeshData,
    revision: u64,
}

impl MeshBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        let d = &mut self.data;
        d.pos.clear();
        d.norm.clear();
        d.uv.clear();
        d.col.clear();
        d.idx.clear();
    }

    /// Replace the contents with `src`, keeping existing capacity.
    pub fn copy_from(&mut self, src: &MeshData) {
        self.clear();
        let d = &mut self.data;
        d.pos.extend_from_slice(&src.pos);
        d.norm.extend_from_slice(&src.norm);
        d.uv.extend_from_slice(&src.uv);
        d.col.extend_from_slice(&src.col);
        d.idx.extend_from_slice(&src.idx);
        self.revision = self.revision.wrapping_add(1);
    }

    #[inline]
    pub fn data(&self) -> &MeshData {
        &self.data
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.data.vertex_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.data.idx.len() / 3
    }

    /// Bumped on every `copy_from`; lets a renderer tell when to re-upload.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

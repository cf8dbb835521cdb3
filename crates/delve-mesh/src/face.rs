use delve_geom::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    PosY,
    NegY,
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    #[inline]
    pub fn normal(self) -> Vec3 {
        match self {
            Face::PosY => Vec3::new(0.0, 1.0, 0.0),
            Face::NegY => Vec3::new(0.0, -1.0, 0.0),
            Face::PosX => Vec3::new(1.0, 0.0, 0.0),
            Face::NegX => Vec3::new(-1.0, 0.0, 0.0),
            Face::PosZ => Vec3::new(0.0, 0.0, 1.0),
            Face::NegZ => Vec3::new(0.0, 0.0, -1.0),
        }
    }

    /// Corners of an axis-aligned `u x v` rectangle anchored at `origin`, in the
    /// plane of this face.
    pub(crate) fn rect(self, origin: Vec3, u: f32, v: f32) -> [Vec3; 4] {
        let o = origin;
        match self {
            Face::PosY | Face::NegY => [
                o,
                o + Vec3::new(u, 0.0, 0.0),
                o + Vec3::new(u, 0.0, v),
                o + Vec3::new(0.0, 0.0, v),
            ],
            Face::PosX | Face::NegX => [
                o,
                o + Vec3::new(0.0, 0.0, u),
                o + Vec3::new(0.0, v, u),
                o + Vec3::new(0.0, v, 0.0),
            ],
            Face::PosZ | Face::NegZ => [
                o,
                o + Vec3::new(u, 0.0, 0.0),
                o + Vec3::new(u, v, 0.0),
                o + Vec3::new(0.0, v, 0.0),
            ],
        }
    }
}

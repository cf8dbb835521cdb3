use delve_geom::Vec3;
use delve_mesh::{BufferClass, Face, MeshBuffer, MeshBundle, MeshData};
use delve_world::{ChunkCoord, TileCoord};

fn quad_data(n: usize) -> MeshData {
    let mut d = MeshData::default();
    for i in 0..n {
        d.add_face_rect(
            Face::PosY,
            Vec3::new(i as f32 * 2.0, 0.0, 0.0),
            2.0,
            2.0,
            [255, 255, 255, 255],
        );
    }
    d
}

#[test]
fn quads_have_four_vertices_two_triangles() {
    let d = quad_data(3);
    assert_eq!(d.vertex_count(), 12);
    assert_eq!(d.idx.len(), 18);
    assert_eq!(d.norm.len(), d.pos.len());
    assert_eq!(d.uv.len(), 24);
    assert_eq!(d.col.len(), 48);
    assert!(d.idx.iter().all(|&i| (i as usize) < d.vertex_count()));
}

#[test]
fn winding_faces_the_normal() {
    for face in Face::ALL {
        let mut d = MeshData::default();
        d.add_face_rect(face, Vec3::ZERO, 1.0, 1.0, [0, 0, 0, 255]);
        let v = |i: u32| {
            let i = i as usize * 3;
            Vec3::new(d.pos[i], d.pos[i + 1], d.pos[i + 2])
        };
        let (a, b, c) = (v(d.idx[0]), v(d.idx[1]), v(d.idx[2]));
        let e1 = b - a;
        let e2 = c - a;
        let cross = Vec3::new(
            e1.y * e2.z - e1.z * e2.y,
            e1.z * e2.x - e1.x * e2.z,
            e1.x * e2.y - e1.y * e2.x,
        );
        assert!(cross.dot(face.normal()) > 0.0, "{face:?}");
    }
}

#[test]
fn buffer_reuses_allocation_across_updates() {
    let mut buf = MeshBuffer::new();
    buf.copy_from(&quad_data(8));
    let ptr = buf.data().pos.as_ptr();
    let rev = buf.revision();
    buf.copy_from(&quad_data(4));
    assert_eq!(buf.data().pos.as_ptr(), ptr);
    assert_eq!(buf.vertex_count(), 16);
    assert_eq!(buf.triangle_count(), 8);
    assert_eq!(buf.revision(), rev + 1);
    buf.clear();
    assert!(buf.is_empty());
}

#[test]
fn bundle_payload_accessors() {
    let mut b = MeshBundle::new(TileCoord::new(48, 16, 3));
    assert!(b.is_empty());
    assert_eq!(b.chunk(), ChunkCoord::new(3, 1, 3));
    b.set_payload(BufferClass::Water, MeshData::default());
    assert!(!b.is_empty());
    assert!(b.payload(BufferClass::Water).is_some());
    assert!(b.payload(BufferClass::Terrain).is_none());
    assert!(BufferClass::Magma.is_liquid());
    assert!(!BufferClass::Stencil.is_liquid());
}

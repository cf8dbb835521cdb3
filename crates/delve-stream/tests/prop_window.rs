use delve_stream::{ChunkWindow, DirtyTracker, Ranges, ViewUpdate, WindowTracker};
use delve_world::{ChunkCoord, WorldExtent};
use proptest::prelude::*;

fn arb_ranges() -> impl Strategy<Value = Ranges> {
    (0i32..8, 0i32..8, 0i32..4, 0i32..8).prop_map(|(x, y, up, down)| Ranges {
        range_x: x,
        range_y: y,
        range_z_up: up,
        range_z_down: down,
    })
}

fn arb_update() -> impl Strategy<Value = ViewUpdate> {
    (-200i32..400, -200i32..400, -5i32..40, 0i32..64, 0i32..64).prop_map(
        |(x, y, z, sx, sy)| ViewUpdate {
            view_pos_x: x,
            view_pos_y: y,
            view_pos_z: z,
            view_size_x: sx,
            view_size_y: sy,
        },
    )
}

fn arb_extent() -> impl Strategy<Value = WorldExtent> {
    (1usize..12, 1usize..12, 1usize..24).prop_map(|(x, y, z)| WorldExtent::new(x, y, z))
}

proptest! {
    #[test]
    fn window_is_center_plus_minus_ranges(r in arb_ranges(), u in arb_update()) {
        let mut t = WindowTracker::new(r);
        t.set_viewpoint_from_upstream(&u);
        let w = t.current_window();
        let (cx, cy) = u.center();
        let layer = u.view_pos_z + 1;
        prop_assert_eq!(w.min, ChunkCoord::new(cx.div_euclid(16) - r.range_x, cy.div_euclid(16) - r.range_y, layer - r.range_z_down));
        prop_assert_eq!(w.max, ChunkCoord::new(cx.div_euclid(16) + r.range_x, cy.div_euclid(16) + r.range_y, layer + r.range_z_up));
        // Pure function of the inputs.
        prop_assert_eq!(w, t.current_window());
    }

    #[test]
    fn clamped_window_stays_in_extent(r in arb_ranges(), u in arb_update(), e in arb_extent()) {
        let mut t = WindowTracker::new(r);
        t.set_viewpoint_from_upstream(&u);
        let w = t.current_window();
        if let Some(c) = w.clamp(e) {
            for coord in c.iter() {
                prop_assert!(e.contains(coord));
                prop_assert!(w.contains(coord));
            }
        } else {
            prop_assert!(w.iter().all(|c| !e.contains(c)));
        }
    }

    #[test]
    fn every_mark_drains_exactly_once(
        e in arb_extent(),
        marks in prop::collection::vec((0i32..12, 0i32..12, 0i32..24, any::<bool>()), 0..64),
    ) {
        let mut d = DirtyTracker::new(e);
        let mut expected = std::collections::HashSet::new();
        for (x, y, z, liquid) in marks {
            let c = ChunkCoord::new(x, y, z);
            let ok = if liquid { d.mark_liquid_dirty(c) } else { d.mark_terrain_dirty(c) };
            prop_assert_eq!(ok, e.contains(c));
            if ok {
                expected.insert(c);
            }
        }
        prop_assert_eq!(d.pending_count(), expected.len());
        let all = ChunkWindow::new(ChunkCoord::new(0, 0, 0), ChunkCoord::new(11, 11, 23));
        let drained: Vec<_> = d.drain_dirty(all).map(|c| c.coord).collect();
        prop_assert_eq!(drained.len(), expected.len());
        for c in &drained {
            prop_assert!(expected.contains(c));
        }
        prop_assert_eq!(d.drain_dirty(all).count(), 0);
    }
}

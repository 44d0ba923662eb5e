use eframe::egui::{Rect, pos2, vec2};
use proptest::prelude::*;

use noteboard::graph::{ForceSimulator, Graph, NewVertex, PhysicsParams, VertexKind};
use noteboard::{Viewport, ZoomRange};

#[derive(Clone, Debug)]
enum ZoomOp {
    In,
    Out,
    Pinch(f32, f32, f32),
    Fit,
}

fn zoom_op() -> impl Strategy<Value = ZoomOp> {
    prop_oneof![
        Just(ZoomOp::In),
        Just(ZoomOp::Out),
        Just(ZoomOp::Fit),
        (0.0f32..800.0, 0.0f32..600.0, 0.01f32..20.0).prop_map(|(x, y, d)| ZoomOp::Pinch(x, y, d)),
    ]
}

proptest! {
    #[test]
    fn viewport_scale_stays_in_range(ops in prop::collection::vec(zoom_op(), 1..40)) {
        let mut viewport = Viewport::new(ZoomRange::GRAPH);
        for op in ops {
            match op {
                ZoomOp::In => viewport.zoom_in(),
                ZoomOp::Out => viewport.zoom_out(),
                ZoomOp::Pinch(x, y, d) => viewport.pinch_zoom(pos2(x, y), d),
                ZoomOp::Fit => viewport.fit_to_screen(),
            }
            let scale = viewport.scale();
            prop_assert!((ZoomRange::GRAPH.min..=ZoomRange::GRAPH.max).contains(&scale));
            let t = viewport.translation();
            prop_assert!(t.x.is_finite() && t.y.is_finite());
        }
    }

    #[test]
    fn focal_point_stays_fixed_when_unclamped(
        x in 0.0f32..800.0,
        y in 0.0f32..600.0,
        d in 0.5f32..2.0,
    ) {
        let mut viewport = Viewport::new(ZoomRange::CANVAS);
        let focal = pos2(x, y);
        let before = viewport.to_world(focal);
        viewport.pinch_zoom(focal, d);
        let after = viewport.to_world(focal);
        prop_assert!((before - after).length() < 1e-2);
    }

    #[test]
    fn physics_stays_finite_and_inside_the_area(
        points in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0), 2..12),
        links in prop::collection::vec((0usize..12, 0usize..12), 0..20),
        steps in 1usize..60,
    ) {
        let mut graph = Graph::new();
        let mut ids = Vec::new();
        for (x, y) in &points {
            let id = graph
                .add_vertex(NewVertex::new("v", VertexKind::Note).at(pos2(*x, *y)).radius(20.0))
                .unwrap();
            ids.push(id);
        }
        for (a, b) in links {
            if a < ids.len() && b < ids.len() {
                let _ = graph.connect_vertices(&ids[a], &ids[b], "link", 1);
            }
        }
        let sim = ForceSimulator::new(PhysicsParams::default());
        let area = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        for _ in 0..steps {
            sim.step(&mut graph, area);
        }
        for v in graph.vertices() {
            prop_assert!(v.position.x.is_finite() && v.position.y.is_finite());
            prop_assert!(v.velocity.length() <= PhysicsParams::default().max_speed + 1e-3);
            prop_assert!(area.contains(v.position), "{:?} escaped", v.position);
        }
    }

    #[test]
    fn at_most_one_edge_per_pair(links in prop::collection::vec((0usize..5, 0usize..5), 0..40)) {
        let mut graph = Graph::new();
        let ids: Vec<_> = (0..5)
            .map(|_| graph.add_vertex(NewVertex::new("v", VertexKind::Tag)).unwrap())
            .collect();
        for (a, b) in links {
            let _ = graph.connect_vertices(&ids[a], &ids[b], "link", 1);
        }
        let edges = graph.edges();
        for (i, e) in edges.iter().enumerate() {
            prop_assert!(e.source != e.target);
            for other in &edges[i + 1..] {
                prop_assert!(!other.joins(&e.source, &e.target));
            }
        }
    }
}

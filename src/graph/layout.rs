use eframe::egui::{Pos2, Rect, pos2};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::{Graph, VertexState};

/// Inset used by the grid and tree layouts.
const MARGIN: f32 = 100.0;
const TREE_LEVEL_SPACING: f32 = 150.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Force,
    Circular,
    Tree,
    Grid,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 4] = [
        LayoutMode::Force,
        LayoutMode::Circular,
        LayoutMode::Tree,
        LayoutMode::Grid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::Force => "force",
            LayoutMode::Circular => "circular",
            LayoutMode::Tree => "tree",
            LayoutMode::Grid => "grid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|m| m.as_str().eq_ignore_ascii_case(s))
    }
}

/// Repositions every vertex for `mode` inside `area`. Discrete layouts leave
/// vertices at rest; `Force` changes nothing and lets the simulator work.
/// A vertex held by a gesture keeps its position and its `Dragging` state.
pub fn apply_layout(graph: &mut Graph, mode: LayoutMode, area: Rect) {
    let (vertices, _) = graph.parts_mut();
    let n = vertices.len();
    let place: Box<dyn Fn(usize) -> Pos2> = match mode {
        LayoutMode::Force => return,
        LayoutMode::Circular => Box::new(circular(n, area)),
        LayoutMode::Grid => Box::new(grid(n, area)),
        LayoutMode::Tree => Box::new(tree(n, area)),
    };
    for (i, vertex) in vertices.iter_mut().enumerate() {
        if vertex.state == VertexState::Dragging {
            continue;
        }
        vertex.position = place(i);
        vertex.settle();
    }
    log::debug!("layout: placed {n} vertices as {}", mode.as_str());
}

fn circular(n: usize, area: Rect) -> impl Fn(usize) -> Pos2 {
    let center = area.center();
    let radius = area.width().min(area.height()) * 0.5 * 0.8;
    let count = n.max(1) as f32;
    move |i| {
        let angle = TAU * i as f32 / count;
        pos2(center.x + radius * angle.cos(), center.y + radius * angle.sin())
    }
}

fn grid(n: usize, area: Rect) -> impl Fn(usize) -> Pos2 {
    let cols = (n as f32).sqrt().ceil().max(1.0) as usize;
    let rows = n.div_ceil(cols).max(1);
    let cell_w = (area.width() - 2.0 * MARGIN) / (cols.saturating_sub(1).max(1)) as f32;
    let cell_h = (area.height() - 2.0 * MARGIN) / (rows.saturating_sub(1).max(1)) as f32;
    let origin = area.min;
    move |i| {
        let (row, col) = (i / cols, i % cols);
        pos2(
            origin.x + MARGIN + col as f32 * cell_w,
            origin.y + MARGIN + row as f32 * cell_h,
        )
    }
}

/// Chunks vertices into levels of `ceil(sqrt(n))` in list order. Edges are
/// not consulted.
fn tree(n: usize, area: Rect) -> impl Fn(usize) -> Pos2 {
    let per_level = (n as f32).sqrt().ceil().max(1.0) as usize;
    let spacing = (area.width() - 2.0 * MARGIN) / (per_level.saturating_sub(1).max(1)) as f32;
    let origin = area.min;
    move |i| {
        let (level, slot) = (i / per_level, i % per_level);
        pos2(
            origin.x + MARGIN + slot as f32 * spacing,
            origin.y + MARGIN + level as f32 * TREE_LEVEL_SPACING,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NewVertex, VertexKind, VertexState};
    use eframe::egui::vec2;

    fn graph(n: usize) -> Graph {
        let mut g = Graph::new();
        for i in 0..n {
            g.add_vertex(NewVertex::new(format!("v{i}"), VertexKind::Note)).unwrap();
        }
        g
    }

    fn area() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0))
    }

    #[test]
    fn parses_names() {
        assert_eq!(LayoutMode::parse("grid"), Some(LayoutMode::Grid));
        assert_eq!(LayoutMode::parse(" Circular "), Some(LayoutMode::Circular));
        assert_eq!(LayoutMode::parse("radial"), None);
    }

    #[test]
    fn circular_places_on_ring() {
        let mut g = graph(4);
        apply_layout(&mut g, LayoutMode::Circular, area());
        let center = pos2(400.0, 300.0);
        for v in g.vertices() {
            assert!((v.position.distance(center) - 240.0).abs() < 1e-3);
            assert_eq!(v.state, VertexState::Free);
        }
        assert!((g.vertices()[0].position.x - 640.0).abs() < 1e-3);
    }

    #[test]
    fn grid_spans_margins() {
        let mut g = graph(5);
        apply_layout(&mut g, LayoutMode::Grid, area());
        let p: Vec<_> = g.vertices().iter().map(|v| v.position).collect();
        assert_eq!(p[0], pos2(100.0, 100.0));
        assert_eq!(p[2], pos2(700.0, 100.0));
        assert_eq!(p[3], pos2(100.0, 500.0));
    }

    #[test]
    fn tree_stacks_levels() {
        let mut g = graph(5);
        apply_layout(&mut g, LayoutMode::Tree, area());
        let p: Vec<_> = g.vertices().iter().map(|v| v.position).collect();
        assert_eq!(p[0], pos2(100.0, 100.0));
        assert_eq!(p[2], pos2(700.0, 100.0));
        assert_eq!(p[3], pos2(100.0, 250.0));
        assert_eq!(p[4], pos2(400.0, 250.0));
    }

    #[test]
    fn single_vertex_and_force_are_harmless() {
        let mut g = graph(1);
        let before = g.vertices()[0].position;
        apply_layout(&mut g, LayoutMode::Force, area());
        assert_eq!(g.vertices()[0].position, before);
        apply_layout(&mut g, LayoutMode::Grid, area());
        assert_eq!(g.vertices()[0].position, pos2(100.0, 100.0));
        apply_layout(&mut Graph::new(), LayoutMode::Tree, area());
    }

    #[test]
    fn held_vertex_is_left_in_place() {
        use crate::gesture::Scene;

        let mut g = graph(3);
        let held = g.vertices()[1].id.clone();
        let before = g.vertices()[1].position;
        g.begin_drag(&held);
        apply_layout(&mut g, LayoutMode::Grid, area());
        let v = g.vertex(&held).unwrap();
        assert_eq!(v.position, before);
        assert_eq!(v.state, VertexState::Dragging);
        assert_eq!(g.vertices()[0].position, pos2(100.0, 100.0));
        assert!(g.is_dragging());
    }
}

use eframe::egui::{Vec2, pos2};

use super::{
    GraphEdge, GraphFilter, GraphSnapshot, GraphVertex, LayoutMode, VertexId, VertexKind,
    VertexState,
};
use crate::viewport::ViewportState;

/// Graph shown when no stored state is available or the stored state is unreadable.
pub fn demo_graph() -> GraphSnapshot {
    let vertex = |id: &str,
                  label: &str,
                  kind: VertexKind,
                  radius: f32,
                  x: f32,
                  y: f32,
                  color: &str| GraphVertex {
        id: VertexId::from(id),
        label: label.to_string(),
        kind,
        color: color.to_string(),
        radius,
        position: pos2(x, y),
        velocity: Vec2::ZERO,
        force: Vec2::ZERO,
        state: VertexState::Free,
    };
    let edge = |source: &str, target: &str, label: &str, weight: u32| GraphEdge {
        source: VertexId::from(source),
        target: VertexId::from(target),
        label: label.to_string(),
        weight,
    };

    let vertices = vec![
        vertex("main", "Main idea", VertexKind::Note, 50.0, 400.0, 300.0, "#00ffff"),
        vertex("idea1", "Idea 1", VertexKind::Note, 40.0, 200.0, 150.0, "#ff0080"),
        vertex("idea2", "Idea 2", VertexKind::Note, 40.0, 600.0, 150.0, "#00ff41"),
        vertex("detail1", "Detail 1", VertexKind::Note, 35.0, 150.0, 450.0, "#ff8000"),
        vertex("detail2", "Detail 2", VertexKind::Note, 35.0, 650.0, 450.0, "#8000ff"),
        vertex("cat1", "Work", VertexKind::Category, 25.0, 100.0, 100.0, "#ff0080"),
        vertex("cat2", "Study", VertexKind::Category, 25.0, 700.0, 100.0, "#00ff41"),
        vertex("tag1", "important", VertexKind::Tag, 20.0, 350.0, 100.0, "#00ffff"),
        vertex("tag2", "todo", VertexKind::Tag, 20.0, 450.0, 100.0, "#ff8000"),
    ];
    let edges = vec![
        edge("main", "idea1", "link", 2),
        edge("main", "idea2", "link", 2),
        edge("idea1", "detail1", "detail", 1),
        edge("idea2", "detail2", "example", 1),
        edge("idea1", "cat1", "category", 1),
        edge("idea2", "cat2", "category", 1),
        edge("main", "tag1", "tag", 1),
        edge("main", "tag2", "tag", 1),
    ];
    GraphSnapshot {
        viewport: ViewportState::default(),
        vertices,
        edges,
        layout: LayoutMode::Force,
        filter: GraphFilter::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_is_consistent() {
        let demo = demo_graph();
        let (_, graph, layout, _) = demo.clone().into_graph();
        assert_eq!(layout, LayoutMode::Force);
        assert_eq!(graph.len(), demo.vertices.len());
        assert_eq!(graph.edges().len(), 8);
        assert_eq!(graph.neighbors(&VertexId::from("main")).count(), 4);
    }
}

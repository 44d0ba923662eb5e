use eframe::egui::{Pos2, Vec2, vec2};
use std::collections::HashSet;

use super::{
    GraphEdge, GraphVertex, NewVertex, VertexEdit, VertexId, VertexState, default_position,
};
use crate::error::EditError;
use crate::gesture::Scene;
use crate::model::{self, VERTEX_PALETTE};

const DUPLICATE_OFFSET: Vec2 = vec2(100.0, 100.0);
const MIN_RADIUS: f32 = 5.0;

#[derive(Clone, Debug)]
pub struct Graph {
    vertices: Vec<GraphVertex>,
    edges: Vec<GraphEdge>,
    next_serial: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            next_serial: 1,
        }
    }

    /// Builds a graph from decoded parts. Later duplicates of a vertex id are
    /// discarded, as are edges with a missing endpoint or repeating an
    /// existing vertex pair.
    pub fn from_parts(vertices: Vec<GraphVertex>, edges: Vec<GraphEdge>) -> Self {
        let mut seen = HashSet::new();
        let vertices: Vec<GraphVertex> = vertices
            .into_iter()
            .filter(|v| seen.insert(v.id.clone()))
            .collect();

        let mut kept: Vec<GraphEdge> = Vec::with_capacity(edges.len());
        let total = edges.len();
        for edge in edges {
            let known = seen.contains(&edge.source) && seen.contains(&edge.target);
            if known && !kept.iter().any(|e| e.joins(&edge.source, &edge.target)) {
                kept.push(edge);
            }
        }
        if kept.len() != total {
            log::debug!("graph: dropped {} dangling or repeated edges", total - kept.len());
        }
        Self {
            next_serial: vertices.len() as u64 + 1,
            vertices,
            edges: kept,
        }
    }

    pub fn vertices(&self) -> &[GraphVertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn vertex(&self, id: &VertexId) -> Option<&GraphVertex> {
        self.vertices.iter().find(|v| &v.id == id)
    }

    fn vertex_mut(&mut self, id: &VertexId) -> Result<&mut GraphVertex, EditError> {
        self.vertices
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| EditError::UnknownVertex(id.clone()))
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [GraphVertex], &[GraphEdge]) {
        (&mut self.vertices, &self.edges)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, id: &VertexId) -> bool {
        self.vertex(id).is_some()
    }

    /// Whether a gesture currently holds any vertex.
    pub fn is_dragging(&self) -> bool {
        self.vertices.iter().any(|v| v.state == VertexState::Dragging)
    }

    fn generate_id(&mut self, prefix: &str) -> VertexId {
        loop {
            let id = VertexId(format!("{prefix}_{}", self.next_serial));
            self.next_serial += 1;
            if !self.contains(&id) {
                return id;
            }
        }
    }

    pub fn add_vertex(&mut self, new: NewVertex) -> Result<VertexId, EditError> {
        let id = match new.id {
            Some(id) if self.contains(&id) => return Err(EditError::DuplicateVertexId(id)),
            Some(id) if !id.0.is_empty() => id,
            _ => self.generate_id("node"),
        };
        let index = self.vertices.len();
        let position = match new.position {
            Some(p) if model::finite_pos(p) => p,
            _ => default_position(index),
        };
        let radius = new
            .radius
            .filter(|r| r.is_finite())
            .map(|r| r.max(MIN_RADIUS))
            .unwrap_or_else(|| new.kind.default_radius());
        let label = if new.label.trim().is_empty() {
            "node".to_string()
        } else {
            new.label
        };
        self.vertices.push(GraphVertex {
            id: id.clone(),
            label,
            kind: new.kind,
            color: new
                .color
                .unwrap_or_else(|| model::palette_color(&VERTEX_PALETTE, index)),
            radius,
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            state: VertexState::Free,
        });
        log::debug!("graph: added {} vertex {id}", new.kind.as_str());
        Ok(id)
    }

    pub fn edit_vertex(&mut self, id: &VertexId, edit: VertexEdit) -> Result<(), EditError> {
        let vertex = self.vertex_mut(id)?;
        if let Some(label) = edit.label {
            vertex.label = if label.trim().is_empty() {
                "node".to_string()
            } else {
                label
            };
        }
        if let Some(kind) = edit.kind {
            vertex.kind = kind;
        }
        if let Some(color) = edit.color {
            vertex.color = color;
        }
        if let Some(radius) = edit.radius.filter(|r| r.is_finite()) {
            vertex.radius = radius.max(MIN_RADIUS);
        }
        Ok(())
    }

    /// Removes the vertex and every edge that touches it.
    pub fn delete_vertex(&mut self, id: &VertexId) -> Result<GraphVertex, EditError> {
        let idx = self
            .vertices
            .iter()
            .position(|v| &v.id == id)
            .ok_or_else(|| EditError::UnknownVertex(id.clone()))?;
        let removed = self.vertices.remove(idx);
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        log::debug!(
            "graph: deleted vertex {id} and {} edges",
            before - self.edges.len()
        );
        Ok(removed)
    }

    /// Copies the vertex (not its edges) under `{id}_copy`, `{id}_copy_2`, ...
    pub fn duplicate_vertex(&mut self, id: &VertexId) -> Result<VertexId, EditError> {
        let original = self
            .vertex(id)
            .ok_or_else(|| EditError::UnknownVertex(id.clone()))?
            .clone();
        let mut copy_id = VertexId(format!("{id}_copy"));
        let mut n = 2;
        while self.contains(&copy_id) {
            copy_id = VertexId(format!("{id}_copy_{n}"));
            n += 1;
        }
        self.vertices.push(GraphVertex {
            id: copy_id.clone(),
            label: format!("{} (copy)", original.label),
            position: original.position + DUPLICATE_OFFSET,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            state: VertexState::Free,
            ..original
        });
        Ok(copy_id)
    }

    pub fn has_edge(&self, a: &VertexId, b: &VertexId) -> bool {
        self.edges.iter().any(|e| e.joins(a, b))
    }

    /// Adds an undirected edge. At most one edge joins any pair of vertices.
    pub fn connect_vertices(
        &mut self,
        a: &VertexId,
        b: &VertexId,
        label: impl Into<String>,
        weight: u32,
    ) -> Result<(), EditError> {
        if a == b {
            return Err(EditError::SelfConnection);
        }
        for id in [a, b] {
            if !self.contains(id) {
                return Err(EditError::UnknownVertex(id.clone()));
            }
        }
        if self.has_edge(a, b) {
            return Err(EditError::DuplicateEdge);
        }
        self.edges.push(GraphEdge {
            source: a.clone(),
            target: b.clone(),
            label: label.into(),
            weight: weight.max(1),
        });
        Ok(())
    }

    pub fn incident_edges<'a>(&'a self, id: &'a VertexId) -> impl Iterator<Item = &'a GraphEdge> {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    pub fn neighbors<'a>(&'a self, id: &'a VertexId) -> impl Iterator<Item = &'a VertexId> {
        self.edges.iter().filter_map(move |e| e.other(id))
    }

    /// Topmost vertex whose disc contains `world`; later vertices win.
    pub fn hit_test(&self, world: Pos2) -> Option<VertexId> {
        self.vertices
            .iter()
            .rev()
            .find(|v| v.contains(world))
            .map(|v| v.id.clone())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for Graph {
    type Id = VertexId;

    fn hit_test(&self, world: Pos2) -> Option<VertexId> {
        Graph::hit_test(self, world)
    }

    fn begin_drag(&mut self, id: &VertexId) {
        if let Ok(vertex) = self.vertex_mut(id) {
            vertex.velocity = Vec2::ZERO;
            vertex.force = Vec2::ZERO;
            vertex.state = VertexState::Dragging;
        }
    }

    fn drag_by(&mut self, id: &VertexId, delta: Vec2) {
        if let Ok(vertex) = self.vertex_mut(id) {
            vertex.position += delta;
            vertex.velocity = Vec2::ZERO;
            vertex.force = Vec2::ZERO;
        }
    }

    fn end_drag(&mut self, id: &VertexId) {
        if let Ok(vertex) = self.vertex_mut(id) {
            vertex.settle();
        }
    }
}

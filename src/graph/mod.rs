//! Knowledge graph: circular vertices joined by weighted, undirected edges.

pub mod codec;
pub mod demo;
pub mod filter;
pub mod layout;
pub mod physics;
pub mod picker;
mod store;

pub use filter::GraphFilter;
pub use layout::{LayoutMode, apply_layout};
pub use physics::{ForceSimulator, PhysicsParams, StepReport};
pub use store::Graph;

use eframe::egui::{Pos2, Vec2, pos2};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Rgba;
use crate::viewport::ViewportState;

/// Radius presets offered by the size menu.
pub const SIZE_PRESETS: [f32; 4] = [20.0, 35.0, 50.0, 70.0];

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub String);

impl VertexId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexKind {
    #[default]
    Note,
    Category,
    Tag,
    Person,
    Date,
}

impl VertexKind {
    pub const ALL: [VertexKind; 5] = [
        VertexKind::Note,
        VertexKind::Category,
        VertexKind::Tag,
        VertexKind::Person,
        VertexKind::Date,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VertexKind::Note => "note",
            VertexKind::Category => "category",
            VertexKind::Tag => "tag",
            VertexKind::Person => "person",
            VertexKind::Date => "date",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn default_radius(self) -> f32 {
        match self {
            VertexKind::Note => 45.0,
            VertexKind::Category => 35.0,
            VertexKind::Tag => 25.0,
            VertexKind::Person => 40.0,
            VertexKind::Date => 30.0,
        }
    }
}

/// Who currently owns a vertex's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VertexState {
    /// At rest: placed by a layout, a drag, or decode. Velocity and force are zero.
    #[default]
    Free,
    /// Held by a gesture; the simulator does not run while any vertex is in this state.
    Dragging,
    /// Last moved by a physics step.
    Simulated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphVertex {
    pub id: VertexId,
    pub label: String,
    pub kind: VertexKind,
    pub color: String,
    pub radius: f32,
    pub position: Pos2,
    pub velocity: Vec2,
    pub force: Vec2,
    pub state: VertexState,
}

impl GraphVertex {
    pub fn contains(&self, world: Pos2) -> bool {
        self.position.distance(world) <= self.radius
    }

    pub fn rgba(&self) -> Rgba {
        Rgba::resolve(&self.color)
    }

    /// Drops any accumulated motion and marks the vertex as placed.
    pub fn settle(&mut self) {
        self.velocity = Vec2::ZERO;
        self.force = Vec2::ZERO;
        self.state = VertexState::Free;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    pub source: VertexId,
    pub target: VertexId,
    pub label: String,
    pub weight: u32,
}

impl GraphEdge {
    pub fn touches(&self, id: &VertexId) -> bool {
        &self.source == id || &self.target == id
    }

    /// Edges are undirected: `(a, b)` and `(b, a)` are the same edge.
    pub fn joins(&self, a: &VertexId, b: &VertexId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }

    pub fn other(&self, id: &VertexId) -> Option<&VertexId> {
        if &self.source == id {
            Some(&self.target)
        } else if &self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

/// Parameters for [`Graph::add_vertex`]; unset fields take the kind's defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewVertex {
    pub id: Option<VertexId>,
    pub label: String,
    pub kind: VertexKind,
    pub color: Option<String>,
    pub radius: Option<f32>,
    pub position: Option<Pos2>,
}

impl NewVertex {
    pub fn new(label: impl Into<String>, kind: VertexKind) -> Self {
        Self {
            label: label.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(VertexId(id.into()));
        self
    }

    pub fn at(mut self, position: Pos2) -> Self {
        self.position = Some(position);
        self
    }

    pub fn colored(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }
}

/// Partial update applied by [`Graph::edit_vertex`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexEdit {
    pub label: Option<String>,
    pub kind: Option<VertexKind>,
    pub color: Option<String>,
    pub radius: Option<f32>,
}

/// Everything needed to persist or restore a graph, detached from any session.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphSnapshot {
    pub viewport: ViewportState,
    pub vertices: Vec<GraphVertex>,
    pub edges: Vec<GraphEdge>,
    pub layout: LayoutMode,
    pub filter: GraphFilter,
}

impl GraphSnapshot {
    pub fn into_graph(self) -> (ViewportState, Graph, LayoutMode, GraphFilter) {
        (
            self.viewport,
            Graph::from_parts(self.vertices, self.edges),
            self.layout,
            self.filter,
        )
    }
}

/// Placement for vertices that arrive without a position: rows of six inside
/// the default 800x600 area.
pub(crate) fn default_position(index: usize) -> Pos2 {
    let col = (index % 6) as f32;
    let row = ((index / 6) % 5) as f32;
    pos2(100.0 + col * 120.0, 100.0 + row * 100.0)
}

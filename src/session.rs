//! Per-view state owners. A session holds one model with its viewport and
//! gesture controller, and is the only thing the UI mutates.

use eframe::egui::{Pos2, Vec2};

use crate::canvas::codec::CanvasStateRecord;
use crate::canvas::demo::demo_canvas;
use crate::canvas::{self, Board, CanvasSnapshot, ItemEdit, ItemId, NewItem};
use crate::error::{DecodeError, EditError};
use crate::gesture::{GestureController, GestureOutcome, PointerId};
use crate::graph::codec::GraphStateRecord;
use crate::graph::demo::demo_graph;
use crate::graph::picker::{Candidate, connect_candidates};
use crate::graph::{
    self, ForceSimulator, Graph, GraphFilter, GraphSnapshot, GraphVertex, LayoutMode, NewVertex,
    StepReport, VertexEdit, VertexId, apply_layout,
};
use crate::settings::EngineSettings;
use crate::viewport::Viewport;

/// Result of loading stored state into a session.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded,
    /// The payload could not be decoded; the demo dataset was loaded instead.
    DemoFallback(DecodeError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

pub const DEFAULT_CONNECTION_LABEL: &str = "relates";
pub const DEFAULT_EDGE_LABEL: &str = "link";

pub struct CanvasSession {
    board: Board,
    viewport: Viewport,
    gesture: GestureController<ItemId>,
    selected: Option<ItemId>,
    pending_connection: Option<ItemId>,
}

impl CanvasSession {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            board: Board::new(),
            viewport: Viewport::new(settings.canvas_zoom).with_zoom_step(settings.zoom_step),
            gesture: GestureController::new(settings.gesture.clone()),
            selected: None,
            pending_connection: None,
        }
    }

    pub fn with_demo(settings: &EngineSettings) -> Self {
        let mut session = Self::new(settings);
        session.restore(demo_canvas());
        session
    }

    /// Replaces the board. A gesture in progress is released on the old board
    /// first, since its target id may name a different item afterwards.
    fn restore(&mut self, snapshot: CanvasSnapshot) {
        self.gesture.pointer_cancel(&mut self.board);
        let (viewport, board) = snapshot.into_board();
        self.viewport.restore(viewport);
        self.board = board;
        self.selected = None;
        self.pending_connection = None;
    }

    pub fn load_canvas_from_json(&mut self, text: &str) -> LoadOutcome {
        match canvas::codec::decode(text) {
            Ok(snapshot) => {
                log::info!(
                    "canvas: loaded {} items, {} connections",
                    snapshot.items.len(),
                    snapshot.connections.len()
                );
                self.restore(snapshot);
                LoadOutcome::Loaded
            }
            Err(err) => {
                log::warn!("canvas: {err}; showing demo board");
                self.restore(demo_canvas());
                LoadOutcome::DemoFallback(err)
            }
        }
    }

    pub fn canvas_snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            viewport: self.viewport.state(),
            items: self.board.items().to_vec(),
            connections: self.board.connections().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        canvas::codec::to_json(&self.canvas_snapshot())
    }

    pub fn state_record(&self, id: u64) -> Result<CanvasStateRecord, serde_json::Error> {
        CanvasStateRecord::from_snapshot(id, &self.canvas_snapshot())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn gesture(&self) -> &GestureController<ItemId> {
        &self.gesture
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<ItemId>) {
        self.selected = id.filter(|id| self.board.item(*id).is_some());
    }

    pub fn add_item(&mut self, new: NewItem) -> ItemId {
        let id = self.board.add_item(new);
        self.selected = Some(id);
        id
    }

    pub fn edit_item(&mut self, id: ItemId, edit: ItemEdit) -> Result<(), EditError> {
        self.board.edit_item(id, edit)
    }

    pub fn delete_item(&mut self, id: ItemId) -> Result<(), EditError> {
        self.board.delete_item(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.pending_connection == Some(id) {
            self.pending_connection = None;
        }
        Ok(())
    }

    pub fn duplicate_item(&mut self, id: ItemId) -> Result<ItemId, EditError> {
        let copy = self.board.duplicate_item(id)?;
        self.selected = Some(copy);
        Ok(copy)
    }

    pub fn connect_items(
        &mut self,
        from: ItemId,
        to: ItemId,
        label: impl Into<String>,
    ) -> Result<(), EditError> {
        self.board.connect_items(from, to, label)
    }

    /// First half of the two-step connect: the next tapped item becomes the target.
    pub fn begin_connection(&mut self, from: ItemId) -> Result<(), EditError> {
        if self.board.item(from).is_none() {
            return Err(EditError::UnknownItem(from));
        }
        self.pending_connection = Some(from);
        Ok(())
    }

    pub fn pending_connection(&self) -> Option<ItemId> {
        self.pending_connection
    }

    pub fn cancel_connection(&mut self) {
        self.pending_connection = None;
    }

    pub fn complete_connection(&mut self, to: ItemId) -> Result<(), EditError> {
        let from = self.pending_connection.take().ok_or(EditError::NoPendingConnection)?;
        self.board.connect_items(from, to, DEFAULT_CONNECTION_LABEL)
    }

    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        screen: Pos2,
        now_ms: u64,
    ) -> GestureOutcome<ItemId> {
        self.gesture
            .pointer_down(pointer, screen, now_ms, &mut self.board, &mut self.viewport)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, screen: Pos2) {
        self.gesture
            .pointer_move(pointer, screen, &mut self.board, &mut self.viewport);
    }

    /// Ends the gesture. A tap selects the item under it, or completes a
    /// pending connection when one was started.
    pub fn pointer_up(&mut self, pointer: PointerId) -> GestureOutcome<ItemId> {
        let outcome = self.gesture.pointer_up(pointer, &mut self.board);
        match &outcome {
            GestureOutcome::Tap(Some(id)) if self.pending_connection.is_some() => {
                if let Err(err) = self.complete_connection(*id) {
                    log::warn!("canvas: connection not created: {err}");
                }
            }
            GestureOutcome::Tap(hit) => self.selected = *hit,
            _ => {}
        }
        outcome
    }

    pub fn pointer_cancel(&mut self) {
        self.gesture.pointer_cancel(&mut self.board);
    }

    pub fn poll(&mut self, now_ms: u64) -> GestureOutcome<ItemId> {
        let outcome = self.gesture.poll(now_ms);
        if let GestureOutcome::LongPress(id) = &outcome {
            self.selected = Some(*id);
        }
        outcome
    }

    pub fn set_screen_size(&mut self, size: Vec2) {
        self.viewport.set_screen_size(size);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn fit(&mut self) {
        self.viewport.fit_to_screen();
    }
}

pub struct GraphSession {
    graph: Graph,
    viewport: Viewport,
    gesture: GestureController<VertexId>,
    simulator: ForceSimulator,
    layout: LayoutMode,
    filter: GraphFilter,
    name: String,
    record_id: Option<u64>,
    selected: Option<VertexId>,
    pending_connection: Option<VertexId>,
}

impl GraphSession {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            graph: Graph::new(),
            viewport: Viewport::new(settings.graph_zoom).with_zoom_step(settings.zoom_step),
            gesture: GestureController::new(settings.gesture.clone()),
            simulator: ForceSimulator::new(settings.physics.clone()),
            layout: LayoutMode::Force,
            filter: GraphFilter::default(),
            name: settings.graph_name.clone(),
            record_id: None,
            selected: None,
            pending_connection: None,
        }
    }

    pub fn with_demo(settings: &EngineSettings) -> Self {
        let mut session = Self::new(settings);
        session.restore(demo_graph());
        session
    }

    fn restore(&mut self, snapshot: GraphSnapshot) {
        self.gesture.pointer_cancel(&mut self.graph);
        let (viewport, graph, layout, filter) = snapshot.into_graph();
        self.viewport.restore(viewport);
        self.graph = graph;
        self.layout = layout;
        self.filter = filter;
        self.selected = None;
        self.pending_connection = None;
    }

    pub fn load_graph_from_json(&mut self, text: &str) -> LoadOutcome {
        match graph::codec::decode(text) {
            Ok(snapshot) => {
                log::info!(
                    "graph: loaded {} vertices, {} edges ({} layout)",
                    snapshot.vertices.len(),
                    snapshot.edges.len(),
                    snapshot.layout.as_str()
                );
                self.restore(snapshot);
                LoadOutcome::Loaded
            }
            Err(err) => {
                log::warn!("graph: {err}; showing demo graph");
                self.restore(demo_graph());
                LoadOutcome::DemoFallback(err)
            }
        }
    }

    pub fn graph_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            viewport: self.viewport.state(),
            vertices: self.graph.vertices().to_vec(),
            edges: self.graph.edges().to_vec(),
            layout: self.layout,
            filter: self.filter.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        graph::codec::to_json(&self.graph_snapshot())
    }

    pub fn state_record(&self) -> Result<GraphStateRecord, serde_json::Error> {
        GraphStateRecord::from_snapshot(self.record_id, self.name.clone(), &self.graph_snapshot())
    }

    /// Remembers the id a store assigned to this graph, so later saves update it.
    pub fn set_record_id(&mut self, id: u64) {
        self.record_id = Some(id);
    }

    pub fn record_id(&self) -> Option<u64> {
        self.record_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn gesture(&self) -> &GestureController<VertexId> {
        &self.gesture
    }

    pub fn selected(&self) -> Option<&VertexId> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, id: Option<VertexId>) {
        self.selected = id.filter(|id| self.graph.contains(id));
    }

    pub fn add_vertex(&mut self, new: NewVertex) -> Result<VertexId, EditError> {
        let id = self.graph.add_vertex(new)?;
        self.selected = Some(id.clone());
        Ok(id)
    }

    pub fn edit_vertex(&mut self, id: &VertexId, edit: VertexEdit) -> Result<(), EditError> {
        self.graph.edit_vertex(id, edit)
    }

    pub fn delete_vertex(&mut self, id: &VertexId) -> Result<(), EditError> {
        self.graph.delete_vertex(id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        if self.pending_connection.as_ref() == Some(id) {
            self.pending_connection = None;
        }
        Ok(())
    }

    pub fn duplicate_vertex(&mut self, id: &VertexId) -> Result<VertexId, EditError> {
        let copy = self.graph.duplicate_vertex(id)?;
        self.selected = Some(copy.clone());
        Ok(copy)
    }

    pub fn connect_vertices(
        &mut self,
        a: &VertexId,
        b: &VertexId,
        label: impl Into<String>,
        weight: u32,
    ) -> Result<(), EditError> {
        self.graph.connect_vertices(a, b, label, weight)
    }

    pub fn begin_connection(&mut self, from: &VertexId) -> Result<(), EditError> {
        if !self.graph.contains(from) {
            return Err(EditError::UnknownVertex(from.clone()));
        }
        self.pending_connection = Some(from.clone());
        Ok(())
    }

    pub fn pending_connection(&self) -> Option<&VertexId> {
        self.pending_connection.as_ref()
    }

    pub fn cancel_connection(&mut self) {
        self.pending_connection = None;
    }

    pub fn complete_connection(&mut self, to: &VertexId) -> Result<(), EditError> {
        let from = self
            .pending_connection
            .take()
            .ok_or(EditError::NoPendingConnection)?;
        self.graph.connect_vertices(&from, to, DEFAULT_EDGE_LABEL, 1)
    }

    /// Targets for the pending connection ranked against `query`.
    pub fn connection_candidates(&self, query: &str) -> Vec<Candidate> {
        match &self.pending_connection {
            Some(source) => connect_candidates(&self.graph, source, query),
            None => Vec::new(),
        }
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    /// Switches layout and applies it once over the current screen area.
    pub fn set_layout(&mut self, mode: LayoutMode) {
        self.layout = mode;
        apply_layout(&mut self.graph, mode, self.viewport.layout_area());
        log::info!("graph: layout set to {}", mode.as_str());
    }

    pub fn filter(&self) -> &GraphFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: GraphFilter) {
        self.filter = filter;
    }

    pub fn visible_vertices(&self) -> impl Iterator<Item = &GraphVertex> {
        self.graph.vertices().iter().filter(move |v| self.filter.visible(v))
    }

    pub fn physics_enabled(&self) -> bool {
        self.simulator.is_enabled()
    }

    pub fn set_physics_enabled(&mut self, enabled: bool) {
        self.simulator.set_enabled(enabled);
    }

    /// One simulation step; call once per rendered frame.
    pub fn tick(&mut self) -> StepReport {
        self.simulator.step(&mut self.graph, self.viewport.layout_area())
    }

    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        screen: Pos2,
        now_ms: u64,
    ) -> GestureOutcome<VertexId> {
        self.gesture
            .pointer_down(pointer, screen, now_ms, &mut self.graph, &mut self.viewport)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, screen: Pos2) {
        self.gesture
            .pointer_move(pointer, screen, &mut self.graph, &mut self.viewport);
    }

    pub fn pointer_up(&mut self, pointer: PointerId) -> GestureOutcome<VertexId> {
        let outcome = self.gesture.pointer_up(pointer, &mut self.graph);
        match &outcome {
            GestureOutcome::Tap(Some(id)) if self.pending_connection.is_some() => {
                if let Err(err) = self.complete_connection(id) {
                    log::warn!("graph: edge not created: {err}");
                }
            }
            GestureOutcome::Tap(hit) => self.selected = hit.clone(),
            _ => {}
        }
        outcome
    }

    pub fn pointer_cancel(&mut self) {
        self.gesture.pointer_cancel(&mut self.graph);
    }

    pub fn poll(&mut self, now_ms: u64) -> GestureOutcome<VertexId> {
        let outcome = self.gesture.poll(now_ms);
        if let GestureOutcome::LongPress(id) = &outcome {
            self.selected = Some(id.clone());
        }
        outcome
    }

    pub fn set_screen_size(&mut self, size: Vec2) {
        self.viewport.set_screen_size(size);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn fit(&mut self) {
        self.viewport.fit_to_screen();
    }
}

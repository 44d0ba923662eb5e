use eframe::egui;
use std::time::Instant;

use noteboard::canvas::{ItemKind, NewItem};
use noteboard::graph::{GraphFilter, LayoutMode, NewVertex, StepReport, VertexKind};
use noteboard::persistence::{PersistenceWorker, Request, Response};
use noteboard::{
    CanvasSession, EngineSettings, GestureMode, GestureOutcome, GraphSession, StoreError,
};

mod dialogs;
mod input;
mod render;
mod store;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
    Canvas,
    Graph,
}

pub struct ViewerApp {
    settings: EngineSettings,
    tab: Tab,
    canvas: CanvasSession,
    graph: GraphSession,
    worker: PersistenceWorker,
    clock: Instant,
    touches: input::TouchMap,
    edit: Option<dialogs::EditDialog>,
    connect_query: String,
    filter_text: String,
    status: Option<String>,
}

impl ViewerApp {
    pub fn new(settings: EngineSettings) -> Self {
        let worker = PersistenceWorker::spawn(store::FileStore::new(&settings.state_dir));
        for request in [
            Request::LoadCanvas(settings.canvas_id),
            Request::LoadGraph(settings.graph_id),
        ] {
            if let Err(err) = worker.request(request) {
                log::error!("cannot queue initial load: {err}");
            }
        }
        Self {
            tab: Tab::Canvas,
            canvas: CanvasSession::new(&settings),
            graph: GraphSession::new(&settings),
            worker,
            clock: Instant::now(),
            touches: input::TouchMap::default(),
            edit: None,
            connect_query: String::new(),
            filter_text: String::new(),
            status: Some("Loading…".to_string()),
            settings,
        }
    }

    fn now_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    fn handle_responses(&mut self) {
        for response in self.worker.drain() {
            match response {
                Response::CanvasLoaded { id, result } => {
                    self.status = Some(match result {
                        Ok(text) => match self.canvas.load_canvas_from_json(&text) {
                            noteboard::LoadOutcome::Loaded => format!("Loaded canvas {id}"),
                            noteboard::LoadOutcome::DemoFallback(err) => {
                                format!("Canvas {id} unreadable ({err}), showing demo")
                            }
                        },
                        Err(err) => {
                            self.canvas = CanvasSession::with_demo(&self.settings);
                            match err {
                                StoreError::NotFound(_) => {
                                    "No saved canvas, showing demo".to_string()
                                }
                                err => format!("Canvas load failed ({err}), showing demo"),
                            }
                        }
                    });
                }
                Response::GraphLoaded { id, result } => {
                    self.status = Some(match result {
                        Ok(text) => {
                            let outcome = self.graph.load_graph_from_json(&text);
                            self.graph.set_record_id(id);
                            match outcome {
                                noteboard::LoadOutcome::Loaded => format!("Loaded graph {id}"),
                                noteboard::LoadOutcome::DemoFallback(err) => {
                                    format!("Graph {id} unreadable ({err}), showing demo")
                                }
                            }
                        }
                        Err(err) => {
                            self.graph = GraphSession::with_demo(&self.settings);
                            match err {
                                StoreError::NotFound(_) => {
                                    "No saved graph, showing demo".to_string()
                                }
                                err => format!("Graph load failed ({err}), showing demo"),
                            }
                        }
                    });
                    self.filter_text = self.graph.filter().to_string();
                }
                Response::CanvasSaved { id, result } => {
                    self.status = Some(match result {
                        Ok(()) => format!("Saved canvas {id}"),
                        Err(err) => format!("Canvas save failed: {err}"),
                    });
                }
                Response::GraphSaved { result } => {
                    self.status = Some(match result {
                        Ok(id) => {
                            self.graph.set_record_id(id);
                            format!("Saved graph {id}")
                        }
                        Err(err) => format!("Graph save failed: {err}"),
                    });
                }
            }
        }
    }

    fn save_current(&mut self) {
        let request = match self.tab {
            Tab::Canvas => self
                .canvas
                .state_record(self.settings.canvas_id)
                .map(Request::SaveCanvas),
            Tab::Graph => self.graph.state_record().map(Request::SaveGraph),
        };
        match request {
            Ok(request) => {
                if let Err(err) = self.worker.request(request) {
                    self.status = Some(err.to_string());
                }
            }
            Err(err) => self.status = Some(format!("Serialize failed: {err}")),
        }
    }

    fn export_json_dialog(&mut self) {
        let (default_name, json) = match self.tab {
            Tab::Canvas => ("canvas.json", self.canvas.to_json()),
            Tab::Graph => ("graph.json", self.graph.to_json()),
        };
        let json = match json {
            Ok(json) => json,
            Err(e) => {
                self.status = Some(format!("Serialize failed: {e}"));
                return;
            }
        };
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(default_name)
            .add_filter("JSON", &["json"])
            .save_file()
        {
            match std::fs::write(&path, json) {
                Ok(()) => self.status = Some(format!("Exported {}", path.display())),
                Err(e) => self.status = Some(format!("Export failed: {e}")),
            }
        }
    }

    fn import_json_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).pick_file() else {
            return;
        };
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                self.status = Some(format!("Read failed: {e}"));
                return;
            }
        };
        let outcome = match self.tab {
            Tab::Canvas => self.canvas.load_canvas_from_json(&text),
            Tab::Graph => {
                let outcome = self.graph.load_graph_from_json(&text);
                self.filter_text = self.graph.filter().to_string();
                outcome
            }
        };
        self.status = Some(match outcome {
            noteboard::LoadOutcome::Loaded => format!("Imported {}", path.display()),
            noteboard::LoadOutcome::DemoFallback(err) => {
                format!("Parse failed ({err}), showing demo")
            }
        });
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tab, Tab::Canvas, "Canvas");
            ui.selectable_value(&mut self.tab, Tab::Graph, "Graph");
            ui.separator();
            if ui.button("−").clicked() {
                self.zoom_out();
            }
            if ui.button("+").clicked() {
                self.zoom_in();
            }
            if ui.button("Fit").clicked() {
                self.fit();
            }
            ui.separator();
            match self.tab {
                Tab::Canvas => {
                    for kind in ItemKind::ALL {
                        if ui.button(format!("+ {}", kind.as_str())).clicked() {
                            let new = match kind {
                                ItemKind::Note => NewItem::note("New note", ""),
                                ItemKind::Text => NewItem::text("Text"),
                                ItemKind::Group => NewItem::group(),
                                ItemKind::Image => NewItem::image("Image"),
                            };
                            self.canvas.add_item(new);
                        }
                    }
                }
                Tab::Graph => {
                    if ui.button("+ vertex").clicked() {
                        let new = NewVertex::new("", VertexKind::Note);
                        if let Err(err) = self.graph.add_vertex(new) {
                            self.status = Some(err.to_string());
                        }
                    }
                    let mut layout = self.graph.layout();
                    egui::ComboBox::from_id_salt("layout")
                        .selected_text(layout.as_str())
                        .show_ui(ui, |ui| {
                            for mode in LayoutMode::ALL {
                                ui.selectable_value(&mut layout, mode, mode.as_str());
                            }
                        });
                    if layout != self.graph.layout() {
                        self.graph.set_layout(layout);
                    }
                    let mut physics = self.graph.physics_enabled();
                    if ui.checkbox(&mut physics, "Physics").changed() {
                        self.graph.set_physics_enabled(physics);
                    }
                    ui.label("Filter");
                    if ui
                        .add(egui::TextEdit::singleline(&mut self.filter_text).desired_width(120.0))
                        .changed()
                    {
                        self.graph.set_filter(GraphFilter::parse(&self.filter_text));
                    }
                }
            }
            ui.separator();
            if ui.button("Save").clicked() {
                self.save_current();
            }
            if ui.button("Import…").clicked() {
                self.import_json_dialog();
            }
            if ui.button("Export…").clicked() {
                self.export_json_dialog();
            }
        });
    }

    fn zoom_in(&mut self) {
        match self.tab {
            Tab::Canvas => self.canvas.zoom_in(),
            Tab::Graph => self.graph.zoom_in(),
        }
    }

    fn zoom_out(&mut self) {
        match self.tab {
            Tab::Canvas => self.canvas.zoom_out(),
            Tab::Graph => self.graph.zoom_out(),
        }
    }

    fn fit(&mut self) {
        match self.tab {
            Tab::Canvas => self.canvas.fit(),
            Tab::Graph => self.graph.fit(),
        }
    }

    fn keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.edit.is_some() {
            return;
        }
        ctx.input_mut(|i| {
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::S) {
                self.save_current();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Escape) {
                self.canvas.cancel_connection();
                self.graph.cancel_connection();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Plus)
                || i.consume_key(egui::Modifiers::NONE, egui::Key::Equals)
            {
                self.zoom_in();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Minus) {
                self.zoom_out();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Num0) {
                self.fit();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Delete) {
                let result = match self.tab {
                    Tab::Canvas => self.canvas.selected().map(|id| self.canvas.delete_item(id)),
                    Tab::Graph => self
                        .graph
                        .selected()
                        .cloned()
                        .map(|id| self.graph.delete_vertex(&id)),
                };
                if let Some(Err(err)) = result {
                    self.status = Some(err.to_string());
                }
            }
        });
    }

    fn surface(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let now = self.now_ms();
        let accept_down = response.hovered() && self.edit.is_none();
        let events = ctx.input(|i| self.touches.collect(&i.events, rect, accept_down));
        let (zoom_delta, scroll_y, hover) =
            ctx.input(|i| (i.zoom_delta(), i.raw_scroll_delta.y, i.pointer.hover_pos()));
        let hover = hover
            .filter(|p| rect.contains(*p))
            .map(|p| (p - rect.min).to_pos2());

        let painter = ui.painter_at(rect);
        match self.tab {
            Tab::Canvas => {
                let s = &mut self.canvas;
                s.set_screen_size(rect.size());
                for event in events {
                    match event {
                        input::PointerEvent::Down(id, p) => {
                            s.pointer_down(id, p, now);
                        }
                        input::PointerEvent::Move(id, p) => s.pointer_move(id, p),
                        input::PointerEvent::Up(id) => {
                            s.pointer_up(id);
                        }
                        input::PointerEvent::Cancel => s.pointer_cancel(),
                    }
                }
                if let Some(focal) = hover {
                    wheel_zoom(s.viewport_mut(), focal, zoom_delta, scroll_y);
                }
                if let GestureOutcome::LongPress(id) = s.poll(now) {
                    self.open_item_dialog(id);
                }
                render::draw_background(&painter, rect, &self.canvas.viewport().transform());
                render::draw_board(&painter, rect.min, &self.canvas);
                if self.canvas.gesture().long_press_pending() {
                    ctx.request_repaint();
                }
            }
            Tab::Graph => {
                let s = &mut self.graph;
                s.set_screen_size(rect.size());
                for event in events {
                    match event {
                        input::PointerEvent::Down(id, p) => {
                            s.pointer_down(id, p, now);
                        }
                        input::PointerEvent::Move(id, p) => s.pointer_move(id, p),
                        input::PointerEvent::Up(id) => {
                            s.pointer_up(id);
                        }
                        input::PointerEvent::Cancel => s.pointer_cancel(),
                    }
                }
                if let Some(focal) = hover {
                    wheel_zoom(s.viewport_mut(), focal, zoom_delta, scroll_y);
                }
                let long_press = s.poll(now);
                let step = s.tick();
                let busy = s.gesture().mode() != GestureMode::Idle;
                if let GestureOutcome::LongPress(id) = long_press {
                    self.open_vertex_dialog(id);
                }
                render::draw_background(&painter, rect, &self.graph.viewport().transform());
                render::draw_graph(&painter, rect.min, &self.graph);
                if busy || !matches!(step, StepReport::Disabled) {
                    ctx.request_repaint();
                }
            }
        }
    }
}

fn wheel_zoom(
    viewport: &mut noteboard::Viewport,
    focal: egui::Pos2,
    zoom_delta: f32,
    scroll_y: f32,
) {
    if zoom_delta != 1.0 {
        viewport.pinch_zoom(focal, zoom_delta);
    } else if scroll_y.abs() > 0.0 {
        viewport.pinch_zoom(focal, (1.0 + scroll_y * 0.001).clamp(0.8, 1.25));
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_responses();
        self.keyboard(ctx);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| self.top_bar(ui));

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.status.as_deref().unwrap_or("Ready"));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (scale, count) = match self.tab {
                        Tab::Canvas => (self.canvas.viewport().scale(), self.canvas.board().len()),
                        Tab::Graph => (self.graph.viewport().scale(), self.graph.graph().len()),
                    };
                    ui.label(format!("Zoom: {:.0}%", scale * 100.0));
                    ui.separator();
                    ui.label(format!("Objects: {count}"));
                });
            });
        });

        self.edit_window(ctx);
        self.connect_window(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.surface(ctx, ui));
    }
}

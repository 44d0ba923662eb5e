use eframe::egui;
use noteboard::canvas::{ItemEdit, ItemId};
use noteboard::graph::{SIZE_PRESETS, VertexEdit, VertexId, VertexKind};
use noteboard::model::{ITEM_PALETTE, VERTEX_PALETTE};

use super::ViewerApp;
use super::render::color_row;

#[derive(Clone, Debug)]
pub(super) enum EditTarget {
    Item(ItemId),
    Vertex(VertexId),
}

/// Edit window opened by a long press.
pub(super) struct EditDialog {
    pub target: EditTarget,
    pub title: String,
    pub body: String,
    pub kind: VertexKind,
}

enum EditAction {
    Apply,
    Recolor(String),
    Resize(f32),
    Duplicate,
    Connect,
    Delete,
    Close,
}

impl ViewerApp {
    pub(super) fn open_item_dialog(&mut self, id: ItemId) {
        if let Some(item) = self.canvas.board().item(id) {
            self.edit = Some(EditDialog {
                target: EditTarget::Item(id),
                title: item.title.clone(),
                body: item.body.clone(),
                kind: VertexKind::Note,
            });
        }
    }

    pub(super) fn open_vertex_dialog(&mut self, id: VertexId) {
        if let Some(v) = self.graph.graph().vertex(&id) {
            self.edit = Some(EditDialog {
                title: v.label.clone(),
                body: String::new(),
                kind: v.kind,
                target: EditTarget::Vertex(id),
            });
        }
    }

    pub(super) fn edit_window(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &mut self.edit else {
            return;
        };
        let mut action = None;
        let (heading, current_color) = match &dialog.target {
            EditTarget::Item(id) => (
                "Edit item",
                self.canvas.board().item(*id).map(|i| i.color.clone()),
            ),
            EditTarget::Vertex(id) => (
                "Edit vertex",
                self.graph.graph().vertex(id).map(|v| v.color.clone()),
            ),
        };
        let Some(current_color) = current_color else {
            self.edit = None;
            return;
        };

        egui::Window::new(heading)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                match &dialog.target {
                    EditTarget::Item(_) => {
                        ui.label("Title");
                        ui.text_edit_singleline(&mut dialog.title);
                        ui.label("Text");
                        ui.text_edit_multiline(&mut dialog.body);
                        if let Some(hex) = color_row(ui, &ITEM_PALETTE, &current_color) {
                            action = Some(EditAction::Recolor(hex));
                        }
                    }
                    EditTarget::Vertex(_) => {
                        ui.label("Label");
                        ui.text_edit_singleline(&mut dialog.title);
                        egui::ComboBox::from_label("Type")
                            .selected_text(dialog.kind.as_str())
                            .show_ui(ui, |ui| {
                                for kind in VertexKind::ALL {
                                    ui.selectable_value(&mut dialog.kind, kind, kind.as_str());
                                }
                            });
                        if let Some(hex) = color_row(ui, &VERTEX_PALETTE, &current_color) {
                            action = Some(EditAction::Recolor(hex));
                        }
                        ui.horizontal(|ui| {
                            ui.label("Size");
                            for radius in SIZE_PRESETS {
                                if ui.button(format!("{radius:.0}")).clicked() {
                                    action = Some(EditAction::Resize(radius));
                                }
                            }
                        });
                    }
                }
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        action = Some(EditAction::Apply);
                    }
                    if ui.button("Duplicate").clicked() {
                        action = Some(EditAction::Duplicate);
                    }
                    if ui.button("Connect…").clicked() {
                        action = Some(EditAction::Connect);
                    }
                    if ui.button("Delete").clicked() {
                        action = Some(EditAction::Delete);
                    }
                    if ui.button("Close").clicked() {
                        action = Some(EditAction::Close);
                    }
                });
            });

        if let Some(action) = action {
            self.run_edit_action(action);
        }
    }

    fn run_edit_action(&mut self, action: EditAction) {
        let Some(dialog) = self.edit.take() else {
            return;
        };
        let mut keep_open = false;
        let result = match (&dialog.target, action) {
            (_, EditAction::Close) => Ok(()),
            (EditTarget::Item(id), EditAction::Apply) => self.canvas.edit_item(
                *id,
                ItemEdit {
                    title: Some(dialog.title.clone()),
                    body: Some(dialog.body.clone()),
                    ..Default::default()
                },
            ),
            (EditTarget::Vertex(id), EditAction::Apply) => self.graph.edit_vertex(
                id,
                VertexEdit {
                    label: Some(dialog.title.clone()),
                    kind: Some(dialog.kind),
                    ..Default::default()
                },
            ),
            (EditTarget::Item(id), EditAction::Recolor(color)) => {
                keep_open = true;
                self.canvas.edit_item(
                    *id,
                    ItemEdit {
                        color: Some(color),
                        ..Default::default()
                    },
                )
            }
            (EditTarget::Vertex(id), EditAction::Recolor(color)) => {
                keep_open = true;
                self.graph.edit_vertex(
                    id,
                    VertexEdit {
                        color: Some(color),
                        ..Default::default()
                    },
                )
            }
            (EditTarget::Vertex(id), EditAction::Resize(radius)) => {
                keep_open = true;
                self.graph.edit_vertex(
                    id,
                    VertexEdit {
                        radius: Some(radius),
                        ..Default::default()
                    },
                )
            }
            (EditTarget::Item(_), EditAction::Resize(_)) => Ok(()),
            (EditTarget::Item(id), EditAction::Duplicate) => {
                self.canvas.duplicate_item(*id).map(|_| ())
            }
            (EditTarget::Vertex(id), EditAction::Duplicate) => {
                self.graph.duplicate_vertex(id).map(|_| ())
            }
            (EditTarget::Item(id), EditAction::Connect) => {
                self.status = Some("Tap the item to connect to".to_string());
                self.canvas.begin_connection(*id)
            }
            (EditTarget::Vertex(id), EditAction::Connect) => {
                self.connect_query.clear();
                self.graph.begin_connection(id)
            }
            (EditTarget::Item(id), EditAction::Delete) => self.canvas.delete_item(*id),
            (EditTarget::Vertex(id), EditAction::Delete) => self.graph.delete_vertex(id),
        };
        if let Err(err) = result {
            self.status = Some(err.to_string());
        }
        if keep_open {
            self.edit = Some(dialog);
        }
    }

    /// Target picker for a graph connection started from the edit window.
    pub(super) fn connect_window(&mut self, ctx: &egui::Context) {
        let Some(source) = self.graph.pending_connection().cloned() else {
            return;
        };
        let mut chosen: Option<VertexId> = None;
        let mut cancel = false;
        let candidates = self.graph.connection_candidates(&self.connect_query);
        egui::Window::new(format!("Connect {source} to…"))
            .collapsible(false)
            .show(ctx, |ui| {
                ui.text_edit_singleline(&mut self.connect_query).request_focus();
                egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                    for c in &candidates {
                        let label = if c.connected {
                            format!("{} (connected)", c.display)
                        } else {
                            c.display.clone()
                        };
                        if ui.add_enabled(!c.connected, egui::Button::new(label)).clicked() {
                            chosen = Some(c.id.clone());
                        }
                    }
                });
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
            });
        if cancel || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.graph.cancel_connection();
        } else if let Some(target) = chosen {
            match self.graph.complete_connection(&target) {
                Ok(()) => self.status = Some(format!("Connected {source} to {target}")),
                Err(err) => self.status = Some(err.to_string()),
            }
        }
    }
}

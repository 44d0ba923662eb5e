use eframe::egui;
use noteboard::canvas::ItemKind;
use noteboard::model::Rgba;
use noteboard::{CanvasSession, GraphSession, Transform};

fn to_abs(origin: egui::Pos2, transform: &Transform, world: egui::Pos2) -> egui::Pos2 {
    transform.to_screen(world) + origin.to_vec2()
}

pub(super) fn draw_background(painter: &egui::Painter, rect: egui::Rect, transform: &Transform) {
    let bg = painter.ctx().style().visuals.extreme_bg_color;
    painter.rect_filled(rect, 0.0, bg);
    let grid_color = egui::Color32::from_gray(45);
    let spacing_screen = 64.0 * transform.scale;
    if spacing_screen < 24.0 {
        return;
    }
    let start = rect.min + transform.translate;
    let x0 = ((rect.min.x - start.x) / spacing_screen).floor() * spacing_screen + start.x;
    let y0 = ((rect.min.y - start.y) / spacing_screen).floor() * spacing_screen + start.y;
    let stroke = egui::Stroke::new(1.0, grid_color);
    let mut x = x0;
    while x < rect.max.x {
        painter.line_segment([egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)], stroke);
        x += spacing_screen;
    }
    let mut y = y0;
    while y < rect.max.y {
        painter.line_segment([egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)], stroke);
        y += spacing_screen;
    }
}

pub(super) fn draw_board(painter: &egui::Painter, origin: egui::Pos2, session: &CanvasSession) {
    let t = session.viewport().transform();
    let board = session.board();
    let text_color = painter.ctx().style().visuals.strong_text_color();

    for c in board.connections() {
        let (Some(from), Some(to)) = (board.item(c.from), board.item(c.to)) else {
            continue;
        };
        let a = to_abs(origin, &t, from.center());
        let b = to_abs(origin, &t, to.center());
        let color = from.rgba().with_alpha(160).to_color32();
        painter.line_segment([a, b], egui::Stroke::new(2.0 * t.scale.max(0.5), color));
        if !c.label.is_empty() {
            painter.text(
                a + (b - a) * 0.5,
                egui::Align2::CENTER_BOTTOM,
                &c.label,
                egui::FontId::proportional(11.0 * t.scale),
                color,
            );
        }
    }

    for item in board.items() {
        let rect = egui::Rect::from_min_max(
            to_abs(origin, &t, item.rect().min),
            to_abs(origin, &t, item.rect().max),
        );
        let accent = item.rgba();
        let selected = session.selected() == Some(item.id);
        let pending = session.pending_connection() == Some(item.id);
        let (fill, stroke_width) = match item.kind {
            ItemKind::Group => (accent.with_alpha(30), 1.5),
            ItemKind::Text => (Rgba::default(), 1.0),
            _ => (accent.with_alpha(60), 2.0),
        };
        let stroke_color = if pending {
            egui::Color32::YELLOW
        } else {
            accent.to_color32()
        };
        let width = if selected { stroke_width + 2.0 } else { stroke_width };
        painter.rect(
            rect,
            6.0 * t.scale,
            fill.to_color32(),
            egui::Stroke::new(width, stroke_color),
            egui::StrokeKind::Middle,
        );

        let pad = 8.0 * t.scale;
        let mut cursor = rect.min + egui::vec2(pad, pad);
        if !item.title.is_empty() {
            let galley = painter.layout(
                item.title.clone(),
                egui::FontId::proportional(15.0 * t.scale),
                accent.to_color32(),
                (rect.width() - 2.0 * pad).max(1.0),
            );
            cursor.y += galley.size().y + 4.0 * t.scale;
            painter.galley(rect.min + egui::vec2(pad, pad), galley, accent.to_color32());
        }
        if !item.body.is_empty() {
            let galley = painter.layout(
                item.body.clone(),
                egui::FontId::proportional(12.0 * t.scale),
                text_color,
                (rect.width() - 2.0 * pad).max(1.0),
            );
            painter.with_clip_rect(rect).galley(cursor, galley, text_color);
        }
        if item.kind == ItemKind::Image {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "image",
                egui::FontId::monospace(12.0 * t.scale),
                accent.with_alpha(140).to_color32(),
            );
        }
    }
}

pub(super) fn draw_graph(painter: &egui::Painter, origin: egui::Pos2, session: &GraphSession) {
    let t = session.viewport().transform();
    let graph = session.graph();
    let filter = session.filter();
    let text_color = painter.ctx().style().visuals.strong_text_color();

    for edge in graph.edges() {
        if !filter.edge_visible(edge, graph.vertices()) {
            continue;
        }
        let (Some(s), Some(e)) = (graph.vertex(&edge.source), graph.vertex(&edge.target)) else {
            continue;
        };
        let a = to_abs(origin, &t, s.position);
        let b = to_abs(origin, &t, e.position);
        let width = (1.0 + edge.weight as f32) * t.scale.max(0.5);
        painter.line_segment(
            [a, b],
            egui::Stroke::new(width, egui::Color32::from_gray(130)),
        );
        if !edge.label.is_empty() && t.scale >= 0.6 {
            painter.text(
                a + (b - a) * 0.5,
                egui::Align2::CENTER_BOTTOM,
                &edge.label,
                egui::FontId::proportional(10.0 * t.scale),
                egui::Color32::from_gray(160),
            );
        }
    }

    for v in session.visible_vertices() {
        let center = to_abs(origin, &t, v.position);
        let radius = v.radius * t.scale;
        let color = v.rgba();
        let selected = session.selected() == Some(&v.id);
        let pending = session.pending_connection() == Some(&v.id);
        let stroke = if pending {
            egui::Stroke::new(3.0, egui::Color32::YELLOW)
        } else if selected {
            egui::Stroke::new(3.0, text_color)
        } else {
            egui::Stroke::new(1.5, color.to_color32())
        };
        painter.circle(center, radius, color.with_alpha(90).to_color32(), stroke);
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            &v.label,
            egui::FontId::proportional((radius * 0.35).clamp(6.0, 24.0)),
            text_color,
        );
    }
}

/// Palette swatches; returns the picked hex color.
pub(super) fn color_row(ui: &mut egui::Ui, palette: &[&str], current: &str) -> Option<String> {
    let mut picked = None;
    ui.horizontal(|ui| {
        for hex in palette {
            let c = Rgba::resolve(hex).to_color32();
            let mut button = egui::Button::new("").fill(c);
            if hex.eq_ignore_ascii_case(current) {
                button = button.stroke(egui::Stroke::new(2.0, ui.visuals().strong_text_color()));
            }
            if ui.add_sized([18.0, 18.0], button).clicked() {
                picked = Some(hex.to_string());
            }
        }
    });
    picked
}

use eframe::egui::{pos2, vec2};

use super::{BoardConnection, BoardItem, CanvasSnapshot, ItemId, ItemKind};
use crate::viewport::ViewportState;

/// Board shown when no stored state is available or the stored state is unreadable.
pub fn demo_canvas() -> CanvasSnapshot {
    let item = |id: u64,
                kind: ItemKind,
                (x, y): (f32, f32),
                (w, h): (f32, f32),
                title: &str,
                body: &str,
                color: &str| {
        BoardItem {
            id: ItemId(id),
            kind,
            position: pos2(x, y),
            size: vec2(w, h),
            title: title.to_string(),
            body: body.to_string(),
            color: color.to_string(),
            linked_note_id: None,
        }
    };
    let items = vec![
        item(
            1,
            ItemKind::Note,
            (300.0, 200.0),
            (220.0, 160.0),
            "Main idea",
            "Central note\nof the canvas",
            "#00ffff",
        ),
        item(
            2,
            ItemKind::Note,
            (600.0, 100.0),
            (180.0, 120.0),
            "Details",
            "Implementation\ndetails",
            "#ff0080",
        ),
        item(
            3,
            ItemKind::Text,
            (100.0, 350.0),
            (160.0, 80.0),
            "",
            "Important remark",
            "#00ff41",
        ),
    ];
    let connections = vec![
        BoardConnection {
            from: ItemId(1),
            to: ItemId(2),
            label: "relates".to_string(),
        },
        BoardConnection {
            from: ItemId(1),
            to: ItemId(3),
            label: "note".to_string(),
        },
    ];
    CanvasSnapshot {
        viewport: ViewportState::default(),
        items,
        connections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_is_consistent() {
        let demo = demo_canvas();
        assert_eq!(demo.items.len(), 3);
        let (_, board) = demo.into_board();
        assert_eq!(board.connections().len(), 2);
        assert_eq!(board.hit_test(pos2(310.0, 210.0)), Some(ItemId(1)));
    }
}

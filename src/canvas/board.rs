use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EditError;
use crate::gesture::Scene;
use crate::model::{self, Rgba};

/// Stable identity of a board item for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Note,
    Text,
    Group,
    Image,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Note,
        ItemKind::Text,
        ItemKind::Group,
        ItemKind::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Note => "note",
            ItemKind::Text => "text",
            ItemKind::Group => "group",
            ItemKind::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn default_size(self) -> Vec2 {
        match self {
            ItemKind::Note => vec2(200.0, 140.0),
            ItemKind::Text => vec2(160.0, 80.0),
            ItemKind::Group => vec2(300.0, 200.0),
            ItemKind::Image => vec2(240.0, 180.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoardItem {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Top-left corner in world space.
    pub position: Pos2,
    pub size: Vec2,
    pub title: String,
    pub body: String,
    pub color: String,
    pub linked_note_id: Option<u64>,
}

impl BoardItem {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    pub fn center(&self) -> Pos2 {
        self.rect().center()
    }

    pub fn rgba(&self) -> Rgba {
        Rgba::resolve(&self.color)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoardConnection {
    pub from: ItemId,
    pub to: ItemId,
    pub label: String,
}

impl BoardConnection {
    pub fn touches(&self, id: ItemId) -> bool {
        self.from == id || self.to == id
    }
}

/// Parameters for [`Board::add_item`]; unset fields take the kind's defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewItem {
    pub kind: ItemKind,
    pub position: Option<Pos2>,
    pub size: Option<Vec2>,
    pub title: String,
    pub body: String,
    pub color: Option<String>,
    pub linked_note_id: Option<u64>,
}

impl NewItem {
    pub fn note(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Note,
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Text,
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn group() -> Self {
        Self {
            kind: ItemKind::Group,
            title: "group".to_string(),
            color: Some("#333333".to_string()),
            ..Default::default()
        }
    }

    pub fn image(title: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Image,
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn at(mut self, position: Pos2) -> Self {
        self.position = Some(position);
        self
    }

    pub fn sized(mut self, size: Vec2) -> Self {
        self.size = Some(size);
        self
    }

    pub fn colored(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn linked_to(mut self, note_id: u64) -> Self {
        self.linked_note_id = Some(note_id);
        self
    }
}

/// Partial update applied by [`Board::edit_item`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub color: Option<String>,
    pub size: Option<Vec2>,
    pub linked_note_id: Option<Option<u64>>,
}

/// Where the `n`th unplaced item lands: a diagonal cascade that wraps after ten.
pub(crate) fn cascade_slot(n: usize) -> Pos2 {
    let k = (n % 10) as f32;
    pos2(150.0 + 40.0 * k, 150.0 + 30.0 * k)
}

/// Items in paint order (last is topmost) plus the connections between them.
#[derive(Clone, Debug)]
pub struct Board {
    items: Vec<BoardItem>,
    connections: Vec<BoardConnection>,
    next_id: u64,
    placements: usize,
    dragging: Option<ItemId>,
}

const DUPLICATE_OFFSET: Vec2 = vec2(50.0, 50.0);
const MIN_ITEM_SIZE: f32 = 8.0;

impl Board {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            connections: Vec::new(),
            next_id: 1,
            placements: 0,
            dragging: None,
        }
    }

    /// Builds a board from decoded parts, dropping connections whose endpoints are missing.
    pub fn from_parts(items: Vec<BoardItem>, connections: Vec<BoardConnection>) -> Self {
        let next_id = items.iter().map(|i| i.id.0).max().unwrap_or(0) + 1;
        let total = connections.len();
        let connections: Vec<_> = connections
            .into_iter()
            .filter(|c| {
                c.from != c.to
                    && items.iter().any(|i| i.id == c.from)
                    && items.iter().any(|i| i.id == c.to)
            })
            .collect();
        if connections.len() != total {
            log::debug!("board: dropped {} dangling connections", total - connections.len());
        }
        Self {
            placements: items.len(),
            items,
            connections,
            next_id,
            dragging: None,
        }
    }

    pub fn items(&self) -> &[BoardItem] {
        &self.items
    }

    pub fn connections(&self) -> &[BoardConnection] {
        &self.connections
    }

    pub fn item(&self, id: ItemId) -> Option<&BoardItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut BoardItem, EditError> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(EditError::UnknownItem(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item currently held by a gesture.
    pub fn dragging(&self) -> Option<ItemId> {
        self.dragging
    }

    fn allocate_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    fn next_placement(&mut self) -> Pos2 {
        cascade_slot(self.placements)
    }

    pub fn add_item(&mut self, new: NewItem) -> ItemId {
        let id = self.allocate_id();
        let position = match new.position {
            Some(p) if model::finite_pos(p) => p,
            _ => self.next_placement(),
        };
        let size = new
            .size
            .filter(|s| s.x.is_finite() && s.y.is_finite())
            .map(|s| s.max(Vec2::splat(MIN_ITEM_SIZE)))
            .unwrap_or_else(|| new.kind.default_size());
        let color = new
            .color
            .unwrap_or_else(|| model::palette_color(&model::ITEM_PALETTE, self.placements));
        self.placements += 1;
        self.items.push(BoardItem {
            id,
            kind: new.kind,
            position,
            size,
            title: new.title,
            body: new.body,
            color,
            linked_note_id: new.linked_note_id,
        });
        log::debug!("board: added {} item {id}", new.kind.as_str());
        id
    }

    pub fn edit_item(&mut self, id: ItemId, edit: ItemEdit) -> Result<(), EditError> {
        let item = self.item_mut(id)?;
        if let Some(title) = edit.title {
            item.title = title;
        }
        if let Some(body) = edit.body {
            item.body = body;
        }
        if let Some(color) = edit.color {
            item.color = color;
        }
        if let Some(size) = edit.size.filter(|s| s.x.is_finite() && s.y.is_finite()) {
            item.size = size.max(Vec2::splat(MIN_ITEM_SIZE));
        }
        if let Some(linked) = edit.linked_note_id {
            item.linked_note_id = linked;
        }
        Ok(())
    }

    pub fn move_item(&mut self, id: ItemId, delta: Vec2) -> Result<(), EditError> {
        let item = self.item_mut(id)?;
        item.position += delta;
        Ok(())
    }

    /// Removes the item and every connection that touches it.
    pub fn delete_item(&mut self, id: ItemId) -> Result<BoardItem, EditError> {
        let idx = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(EditError::UnknownItem(id))?;
        let removed = self.items.remove(idx);
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        if self.dragging == Some(id) {
            self.dragging = None;
        }
        log::debug!(
            "board: deleted item {id} and {} connections",
            before - self.connections.len()
        );
        Ok(removed)
    }

    pub fn duplicate_item(&mut self, id: ItemId) -> Result<ItemId, EditError> {
        let original = self.item(id).ok_or(EditError::UnknownItem(id))?.clone();
        let copy_id = self.allocate_id();
        self.items.push(BoardItem {
            id: copy_id,
            position: original.position + DUPLICATE_OFFSET,
            title: format!("{} (copy)", original.title),
            linked_note_id: None,
            ..original
        });
        Ok(copy_id)
    }

    pub fn connect_items(
        &mut self,
        from: ItemId,
        to: ItemId,
        label: impl Into<String>,
    ) -> Result<(), EditError> {
        if from == to {
            return Err(EditError::SelfConnection);
        }
        for id in [from, to] {
            if self.item(id).is_none() {
                return Err(EditError::UnknownItem(id));
            }
        }
        self.connections.push(BoardConnection {
            from,
            to,
            label: label.into(),
        });
        Ok(())
    }

    pub fn incident_connections(&self, id: ItemId) -> impl Iterator<Item = &BoardConnection> {
        self.connections.iter().filter(move |c| c.touches(id))
    }

    /// Topmost item containing `world`; later items win over earlier ones.
    pub fn hit_test(&self, world: Pos2) -> Option<ItemId> {
        self.items
            .iter()
            .rev()
            .find(|i| i.rect().contains(world))
            .map(|i| i.id)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for Board {
    type Id = ItemId;

    fn hit_test(&self, world: Pos2) -> Option<ItemId> {
        Board::hit_test(self, world)
    }

    fn begin_drag(&mut self, id: &ItemId) {
        self.dragging = Some(*id);
    }

    fn drag_by(&mut self, id: &ItemId, delta: Vec2) {
        if let Err(err) = self.move_item(*id, delta) {
            log::debug!("board: drag ignored: {err}");
        }
    }

    fn end_drag(&mut self, id: &ItemId) {
        if self.dragging == Some(*id) {
            self.dragging = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> (Board, ItemId, ItemId, ItemId) {
        let mut board = Board::new();
        let a = board.add_item(NewItem::note("a", "").at(pos2(0.0, 0.0)));
        let b = board.add_item(NewItem::note("b", "").at(pos2(300.0, 0.0)));
        let c = board.add_item(NewItem::text("c").at(pos2(0.0, 300.0)));
        board.connect_items(a, b, "relates").unwrap();
        board.connect_items(b, c, "relates").unwrap();
        board.connect_items(c, a, "relates").unwrap();
        (board, a, b, c)
    }

    #[test]
    fn add_uses_kind_defaults() {
        let mut board = Board::new();
        let id = board.add_item(NewItem::group());
        let item = board.item(id).unwrap();
        assert_eq!(item.size, vec2(300.0, 200.0));
        assert_eq!(item.title, "group");
        assert_eq!(item.color, "#333333");
        assert_eq!(item.position, pos2(150.0, 150.0));

        let next = board.add_item(NewItem::note("n", ""));
        assert_eq!(board.item(next).unwrap().position, pos2(190.0, 180.0));
        assert_eq!(board.item(next).unwrap().color, "#ff0080");
    }

    #[test]
    fn delete_cascades_only_incident_connections() {
        let (mut board, a, b, c) = abc();
        board.delete_item(b).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board.connections().len(), 1);
        assert_eq!(board.connections()[0].from, c);
        assert_eq!(board.connections()[0].to, a);
        assert_eq!(board.delete_item(b), Err(EditError::UnknownItem(b)));
    }

    #[test]
    fn duplicate_offsets_and_gets_fresh_id() {
        let (mut board, a, ..) = abc();
        board
            .edit_item(
                a,
                ItemEdit {
                    linked_note_id: Some(Some(7)),
                    ..Default::default()
                },
            )
            .unwrap();
        let copy = board.duplicate_item(a).unwrap();
        assert_ne!(copy, a);
        let item = board.item(copy).unwrap();
        assert_eq!(item.position, pos2(50.0, 50.0));
        assert_eq!(item.title, "a (copy)");
        assert_eq!(item.linked_note_id, None);
        assert_eq!(board.incident_connections(copy).count(), 0);
    }

    #[test]
    fn edit_changes_only_given_fields() {
        let (mut board, a, ..) = abc();
        board
            .edit_item(
                a,
                ItemEdit {
                    body: Some("new body".into()),
                    color: Some("#ffff00".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let item = board.item(a).unwrap();
        assert_eq!(item.title, "a");
        assert_eq!(item.body, "new body");
        assert_eq!(item.color, "#ffff00");
    }

    #[test]
    fn connect_rejects_self_and_unknown() {
        let (mut board, a, ..) = abc();
        assert_eq!(board.connect_items(a, a, "x"), Err(EditError::SelfConnection));
        assert_eq!(
            board.connect_items(a, ItemId(99), "x"),
            Err(EditError::UnknownItem(ItemId(99)))
        );
    }

    #[test]
    fn from_parts_drops_dangling_connections() {
        let (board, a, b, _) = abc();
        let mut connections = board.connections().to_vec();
        connections.push(BoardConnection {
            from: a,
            to: ItemId(42),
            label: String::new(),
        });
        let rebuilt = Board::from_parts(board.items().to_vec(), connections);
        assert_eq!(rebuilt.connections().len(), 3);
        let next = Board::from_parts(rebuilt.items().to_vec(), vec![]).allocate_id();
        assert!(next.0 > a.0.max(b.0));
    }
}

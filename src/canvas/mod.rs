//! Free-form board of rectangular items joined by labelled connections.

mod board;
pub mod codec;
pub mod demo;

pub use board::{Board, BoardConnection, BoardItem, ItemEdit, ItemId, ItemKind, NewItem};

use crate::viewport::ViewportState;

/// Everything needed to persist or restore a board, detached from any session.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasSnapshot {
    pub viewport: ViewportState,
    pub items: Vec<BoardItem>,
    pub connections: Vec<BoardConnection>,
}

impl CanvasSnapshot {
    pub fn into_board(self) -> (ViewportState, Board) {
        (self.viewport, Board::from_parts(self.items, self.connections))
    }
}

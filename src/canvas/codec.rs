//! Canvas wire format.
//!
//! ```json
//! {"zoom":1.0,"pan_x":0,"pan_y":0,
//!  "nodes":[{"type":"note","x":..,"y":..,"width":..,"height":..,
//!            "title":"","content":"","color":"#00ffff","note_id":3}],
//!  "connections":[{"from_node_id":0,"to_node_id":1,"type":"relates"}]}
//! ```
//!
//! Connections reference nodes by their index in `nodes`. Decoded items get
//! fresh ids `1..=n` in array order.

use eframe::egui::{pos2, vec2};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::board::cascade_slot;
use super::{BoardConnection, BoardItem, CanvasSnapshot, ItemId, ItemKind};
use crate::error::DecodeError;
use crate::model::{ITEM_PALETTE, finite_or, palette_color};
use crate::viewport::ViewportState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct CanvasDoc {
    zoom: f32,
    pan_x: f32,
    pan_y: f32,
    nodes: Vec<NodeWire>,
    connections: Vec<ConnectionWire>,
}

impl Default for CanvasDoc {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct NodeWire {
    #[serde(rename = "type")]
    kind: String,
    x: Option<f32>,
    y: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    title: String,
    content: String,
    color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note_id: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConnectionWire {
    from_node_id: Option<Number>,
    to_node_id: Option<Number>,
    #[serde(rename = "type")]
    label: String,
}

/// Accepts `3` and `3.0`; anything negative, fractional or out of range is `None`.
fn index(raw: Option<Number>, len: usize) -> Option<usize> {
    let raw = raw?;
    let i = raw.as_u64().or_else(|| {
        raw.as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })?;
    (i < len as u64).then_some(i as usize)
}

/// Save request for one stored canvas: its id and the encoded board.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasStateRecord {
    pub id: u64,
    pub json: String,
}

impl CanvasStateRecord {
    pub fn from_snapshot(id: u64, snapshot: &CanvasSnapshot) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id,
            json: to_json(snapshot)?,
        })
    }
}

pub fn to_json(snapshot: &CanvasSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(&encode(snapshot))
}

fn encode(snapshot: &CanvasSnapshot) -> CanvasDoc {
    let position_of = |id: ItemId| snapshot.items.iter().position(|i| i.id == id);
    let nodes = snapshot
        .items
        .iter()
        .map(|item| NodeWire {
            kind: item.kind.as_str().to_string(),
            x: Some(item.position.x),
            y: Some(item.position.y),
            width: Some(item.size.x),
            height: Some(item.size.y),
            title: item.title.clone(),
            content: item.body.clone(),
            color: Some(item.color.clone()),
            note_id: item.linked_note_id,
        })
        .collect();
    let connections = snapshot
        .connections
        .iter()
        .filter_map(|c| {
            Some(ConnectionWire {
                from_node_id: Some(Number::from(position_of(c.from)?)),
                to_node_id: Some(Number::from(position_of(c.to)?)),
                label: c.label.clone(),
            })
        })
        .collect();
    CanvasDoc {
        zoom: snapshot.viewport.zoom,
        pan_x: snapshot.viewport.pan_x,
        pan_y: snapshot.viewport.pan_y,
        nodes,
        connections,
    }
}

/// Parses a canvas payload. Missing fields take defaults; connections whose
/// indices fall outside `nodes` are dropped.
pub fn decode(text: &str) -> Result<CanvasSnapshot, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject);
    }
    let doc: CanvasDoc = serde_json::from_value(value)?;

    let items: Vec<BoardItem> = doc
        .nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let kind = ItemKind::parse(&node.kind).unwrap_or_default();
            let defaults = kind.default_size();
            let cascade = cascade_slot(i);
            BoardItem {
                id: ItemId(i as u64 + 1),
                kind,
                position: pos2(
                    node.x.map_or(cascade.x, |x| finite_or(x, cascade.x)),
                    node.y.map_or(cascade.y, |y| finite_or(y, cascade.y)),
                ),
                size: vec2(
                    node.width.filter(|w| w.is_finite() && *w > 0.0).unwrap_or(defaults.x),
                    node.height.filter(|h| h.is_finite() && *h > 0.0).unwrap_or(defaults.y),
                ),
                title: node.title,
                body: node.content,
                color: node.color.unwrap_or_else(|| palette_color(&ITEM_PALETTE, i)),
                linked_note_id: node.note_id.filter(|id| *id != 0),
            }
        })
        .collect();

    let len = items.len();
    let total = doc.connections.len();
    let connections: Vec<BoardConnection> = doc
        .connections
        .into_iter()
        .filter_map(|c| {
            let from = index(c.from_node_id, len)?;
            let to = index(c.to_node_id, len)?;
            Some(BoardConnection {
                from: items[from].id,
                to: items[to].id,
                label: c.label,
            })
        })
        .collect();
    if connections.len() != total {
        log::warn!(
            "canvas decode: dropped {} connections with out-of-range indices",
            total - connections.len()
        );
    }

    Ok(CanvasSnapshot {
        viewport: ViewportState {
            zoom: doc.zoom,
            pan_x: doc.pan_x,
            pan_y: doc.pan_y,
        },
        items,
        connections,
    })
}

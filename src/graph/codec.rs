//! Graph wire format.
//!
//! The plain form is
//! `{zoom, pan_x, pan_y, layout, filter, nodes:[{id,label,type,color,size,x,y}],
//! edges:[{source,target,type,weight}]}`. Stored graph states wrap
//! `nodes`/`edges` in a `data` field holding either an object or a JSON string;
//! both shapes decode to the same snapshot.

use eframe::egui::{Vec2, pos2};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::{
    GraphEdge, GraphFilter, GraphSnapshot, GraphVertex, LayoutMode, VertexId, VertexKind,
    VertexState, default_position,
};
use crate::error::DecodeError;
use crate::model::{VERTEX_PALETTE, palette_color};
use crate::viewport::ViewportState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct GraphDoc {
    zoom: f32,
    pan_x: f32,
    pan_y: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
    nodes: Vec<VertexWire>,
    edges: Vec<EdgeWire>,
    #[serde(skip_serializing)]
    data: Option<Value>,
}

impl Default for GraphDoc {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            layout: None,
            filter: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            data: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct GraphData {
    nodes: Vec<VertexWire>,
    edges: Vec<EdgeWire>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct VertexWire {
    id: String,
    label: String,
    #[serde(rename = "type")]
    kind: String,
    color: Option<String>,
    size: Option<f32>,
    x: Option<f32>,
    y: Option<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct EdgeWire {
    source: String,
    target: String,
    #[serde(rename = "type")]
    label: String,
    weight: Option<f64>,
}

/// Stored graph state as exchanged with a state store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStateRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    /// `{"nodes":[..],"edges":[..]}` as a JSON string.
    pub data: String,
    pub layout: String,
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
    pub filter: String,
}

impl Default for GraphStateRecord {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            data: r#"{"nodes":[],"edges":[]}"#.to_string(),
            layout: LayoutMode::Force.as_str().to_string(),
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            filter: String::new(),
        }
    }
}

impl GraphStateRecord {
    pub fn from_snapshot(
        id: Option<u64>,
        name: impl Into<String>,
        snapshot: &GraphSnapshot,
    ) -> Result<Self, serde_json::Error> {
        let data = GraphData {
            nodes: snapshot.vertices.iter().map(vertex_wire).collect(),
            edges: snapshot.edges.iter().map(edge_wire).collect(),
        };
        Ok(Self {
            id,
            name: name.into(),
            data: serde_json::to_string(&data)?,
            layout: snapshot.layout.as_str().to_string(),
            zoom: snapshot.viewport.zoom,
            pan_x: snapshot.viewport.pan_x,
            pan_y: snapshot.viewport.pan_y,
            filter: snapshot.filter.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn vertex_wire(v: &GraphVertex) -> VertexWire {
    VertexWire {
        id: v.id.0.clone(),
        label: v.label.clone(),
        kind: v.kind.as_str().to_string(),
        color: Some(v.color.clone()),
        size: Some(v.radius),
        x: Some(v.position.x),
        y: Some(v.position.y),
    }
}

fn edge_wire(e: &GraphEdge) -> EdgeWire {
    EdgeWire {
        source: e.source.0.clone(),
        target: e.target.0.clone(),
        label: e.label.clone(),
        weight: Some(f64::from(e.weight)),
    }
}

pub fn to_json(snapshot: &GraphSnapshot) -> Result<String, serde_json::Error> {
    let doc = GraphDoc {
        zoom: snapshot.viewport.zoom,
        pan_x: snapshot.viewport.pan_x,
        pan_y: snapshot.viewport.pan_y,
        layout: Some(snapshot.layout.as_str().to_string()),
        filter: Some(snapshot.filter.to_string()),
        nodes: snapshot.vertices.iter().map(vertex_wire).collect(),
        edges: snapshot.edges.iter().map(edge_wire).collect(),
        data: None,
    };
    serde_json::to_string(&doc)
}

/// Rounded, at least 1. Anything non-numeric becomes 1.
fn weight(raw: Option<f64>) -> u32 {
    match raw {
        Some(w) if w.is_finite() => w.round().clamp(1.0, f64::from(u32::MAX)) as u32,
        _ => 1,
    }
}

/// Parses either the plain graph form or a stored state record.
pub fn decode(text: &str) -> Result<GraphSnapshot, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject);
    }
    let mut doc: GraphDoc = serde_json::from_value(value)?;

    let data = match doc.data.take() {
        Some(Value::String(s)) if !s.trim().is_empty() => {
            serde_json::from_str::<GraphData>(&s).map_err(DecodeError::NestedData)?
        }
        Some(Value::Object(map)) => {
            serde_json::from_value::<GraphData>(Value::Object(map))
                .map_err(DecodeError::NestedData)?
        }
        _ => GraphData {
            nodes: std::mem::take(&mut doc.nodes),
            edges: std::mem::take(&mut doc.edges),
        },
    };

    let explicit: HashSet<String> = data
        .nodes
        .iter()
        .filter(|n| !n.id.is_empty())
        .map(|n| n.id.clone())
        .collect();
    let mut vertices: Vec<GraphVertex> = Vec::with_capacity(data.nodes.len());
    for (i, node) in data.nodes.into_iter().enumerate() {
        let kind = VertexKind::parse(&node.kind).unwrap_or_default();
        let fallback = default_position(i);
        let position = match (node.x, node.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => pos2(x, y),
            _ => fallback,
        };
        let id = if node.id.is_empty() {
            let mut n = i + 1;
            let taken =
                |name: &str| explicit.contains(name) || vertices.iter().any(|v| v.id.0 == name);
            while taken(&format!("node_{n}")) {
                n += 1;
            }
            VertexId(format!("node_{n}"))
        } else {
            VertexId(node.id)
        };
        if vertices.iter().any(|v| v.id == id) {
            log::warn!("graph decode: duplicate vertex id {id}, keeping the first");
            continue;
        }
        vertices.push(GraphVertex {
            id,
            label: if node.label.is_empty() {
                "node".to_string()
            } else {
                node.label
            },
            kind,
            color: node.color.unwrap_or_else(|| palette_color(&VERTEX_PALETTE, i)),
            radius: node
                .size
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or_else(|| kind.default_radius()),
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            state: VertexState::Free,
        });
    }

    let total = data.edges.len();
    let edges: Vec<GraphEdge> = data
        .edges
        .into_iter()
        .filter(|e| {
            let known = |id: &str| vertices.iter().any(|v| v.id.0 == id);
            known(&e.source) && known(&e.target)
        })
        .map(|e| GraphEdge {
            source: VertexId(e.source),
            target: VertexId(e.target),
            label: e.label,
            weight: weight(e.weight),
        })
        .collect();
    if edges.len() != total {
        log::warn!(
            "graph decode: dropped {} edges with unknown endpoints",
            total - edges.len()
        );
    }

    let layout = match doc.layout.as_deref() {
        None | Some("") => LayoutMode::default(),
        Some(s) => LayoutMode::parse(s).unwrap_or_else(|| {
            log::warn!("graph decode: unknown layout {s:?}, using force");
            LayoutMode::default()
        }),
    };

    Ok(GraphSnapshot {
        viewport: ViewportState {
            zoom: doc.zoom,
            pan_x: doc.pan_x,
            pan_y: doc.pan_y,
        },
        vertices,
        edges,
        layout,
        filter: doc.filter.as_deref().map(GraphFilter::parse).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PLAIN: &str = r##"{
        "zoom": 2.0, "pan_x": 5, "pan_y": 6, "layout": "grid", "filter": "type=tag",
        "nodes": [
            {"id":"a","label":"Alpha","type":"note","color":"#00ffff","size":50,"x":10,"y":20},
            {"id":"b","label":"Beta","type":"tag","color":"#ff0080","size":25,"x":30,"y":40}
        ],
        "edges": [{"source":"a","target":"b","type":"link","weight":2}]
    }"##;

    #[test]
    fn decodes_plain_form() {
        let snap = decode(PLAIN).unwrap();
        assert_eq!(snap.viewport.zoom, 2.0);
        assert_eq!(snap.layout, LayoutMode::Grid);
        assert_eq!(snap.filter.kind, Some(VertexKind::Tag));
        assert_eq!(snap.vertices[1].radius, 25.0);
        assert_eq!(snap.edges[0].weight, 2);
    }

    #[test]
    fn envelope_with_string_or_object_data() {
        let plain = decode(PLAIN).unwrap();
        let record = GraphStateRecord::from_snapshot(Some(3), "mine", &plain).unwrap();
        let from_string = decode(&record.to_json().unwrap()).unwrap();
        assert_eq!(from_string, plain);

        let object = format!(
            r#"{{"zoom":2.0,"pan_x":5,"pan_y":6,"layout":"grid","filter":"type=tag","data":{}}}"#,
            record.data
        );
        assert_eq!(decode(&object).unwrap(), plain);
    }

    #[test]
    fn tolerant_fields() {
        let snap = decode(
            r#"{"nodes":[
                    {"id":"a","type":"planet"},
                    {"id":"a","label":"dup"},
                    {"label":"no id"}
                ],
                "edges":[
                    {"source":"a","target":"ghost"},
                    {"source":"a","target":"node_3","weight":0.4},
                    {"source":"node_3","target":"a","weight":"heavy"}
                ]}"#,
        );
        assert!(matches!(snap, Err(DecodeError::Json(_))));

        let snap = decode(
            r#"{"nodes":[
                    {"id":"a","type":"planet"},
                    {"id":"a","label":"dup"},
                    {"label":"no id"}
                ],
                "edges":[
                    {"source":"a","target":"ghost"},
                    {"source":"a","target":"node_3","weight":2.6}
                ]}"#,
        )
        .unwrap();
        assert_eq!(snap.vertices[0].kind, VertexKind::Note);
        assert_eq!(snap.vertices[0].label, "node");
        assert_eq!(snap.vertices[0].position, default_position(0));
        assert_eq!(snap.vertices.len(), 2);
        assert_eq!(snap.vertices[1].id, VertexId::from("node_3"));
        assert_eq!(snap.vertices[1].label, "no id");
        assert_eq!(snap.edges.len(), 1);
        assert_eq!(snap.edges[0].weight, 3);
    }

    #[test]
    fn generated_ids_avoid_later_explicit_ids() {
        let snap = decode(
            r#"{"nodes":[{"label":"anon"},{"id":"node_1","label":"explicit"}],
                "edges":[{"source":"node_1","target":"node_2"}]}"#,
        )
        .unwrap();
        let ids: Vec<_> = snap.vertices.iter().map(|v| (v.id.as_str(), v.label.as_str())).collect();
        assert_eq!(ids, vec![("node_2", "anon"), ("node_1", "explicit")]);
        assert_eq!(snap.edges.len(), 1);
        assert_eq!(snap.edges[0].source, VertexId::from("node_1"));
        assert_eq!(snap.edges[0].target, VertexId::from("node_2"));
    }

    #[test]
    fn weights_round_and_floor_at_one() {
        assert_eq!(weight(Some(0.2)), 1);
        assert_eq!(weight(Some(-4.0)), 1);
        assert_eq!(weight(Some(1.5)), 2);
        assert_eq!(weight(Some(f64::NAN)), 1);
        assert_eq!(weight(None), 1);
    }

    #[test]
    fn bad_nested_data_is_an_error() {
        assert!(matches!(
            decode(r#"{"data":"{not json"}"#),
            Err(DecodeError::NestedData(_))
        ));
        assert!(matches!(decode("42"), Err(DecodeError::NotAnObject)));
    }

    #[test]
    fn plain_round_trip() {
        let snap = decode(PLAIN).unwrap();
        assert_eq!(decode(&to_json(&snap).unwrap()).unwrap(), snap);
    }
}

use std::fmt;

use super::{GraphEdge, GraphVertex, VertexId, VertexKind};

/// Visibility filter persisted with the graph state as a short query string:
/// `""` shows everything, `"type=note"` or `"type=tag,label=rust"` narrow it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphFilter {
    pub kind: Option<VertexKind>,
    /// Case-insensitive substring of the label.
    pub label: Option<String>,
}

impl GraphFilter {
    pub fn parse(s: &str) -> Self {
        let mut filter = GraphFilter::default();
        for clause in s.split([',', '&']).map(str::trim).filter(|c| !c.is_empty()) {
            let Some((key, value)) = clause.split_once('=') else {
                log::debug!("filter: ignoring clause {clause:?}");
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "type" | "kind" => match VertexKind::parse(value) {
                    Some(kind) => filter.kind = Some(kind),
                    None => log::debug!("filter: unknown vertex type {value:?}"),
                },
                "label" if !value.is_empty() => filter.label = Some(value.to_lowercase()),
                other => log::debug!("filter: ignoring key {other:?}"),
            }
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.label.is_none()
    }

    pub fn visible(&self, vertex: &GraphVertex) -> bool {
        if self.kind.is_some_and(|k| k != vertex.kind) {
            return false;
        }
        match &self.label {
            Some(needle) => vertex.label.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }

    /// An edge is shown only when both of its endpoints are.
    pub fn edge_visible(&self, edge: &GraphEdge, vertices: &[GraphVertex]) -> bool {
        if self.is_empty() {
            return true;
        }
        let shown = |id: &VertexId| vertices.iter().any(|v| &v.id == id && self.visible(v));
        shown(&edge.source) && shown(&edge.target)
    }
}

impl fmt::Display for GraphFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(kind) = self.kind {
            write!(f, "type={}", kind.as_str())?;
            sep = ",";
        }
        if let Some(label) = &self.label {
            write!(f, "{sep}label={label}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, NewVertex};

    #[test]
    fn parses_and_prints_queries() {
        assert!(GraphFilter::parse("").is_empty());
        let f = GraphFilter::parse("type=tag, label=Rust");
        assert_eq!(f.kind, Some(VertexKind::Tag));
        assert_eq!(f.label.as_deref(), Some("rust"));
        assert_eq!(f.to_string(), "type=tag,label=rust");
        assert_eq!(GraphFilter::parse(&f.to_string()), f);
        assert!(GraphFilter::parse("type=planet&bogus").is_empty());
    }

    #[test]
    fn filters_vertices_and_edges() {
        let mut g = Graph::new();
        let a = g.add_vertex(NewVertex::new("Rust notes", VertexKind::Note)).unwrap();
        let b = g.add_vertex(NewVertex::new("todo", VertexKind::Tag)).unwrap();
        g.connect_vertices(&a, &b, "tag", 1).unwrap();
        let by_kind = GraphFilter::parse("type=note");
        let shown: Vec<&VertexId> = g
            .vertices()
            .iter()
            .filter(|v| by_kind.visible(v))
            .map(|v| &v.id)
            .collect();
        assert_eq!(shown, vec![&a]);
        assert!(!by_kind.edge_visible(&g.edges()[0], g.vertices()));
        assert!(GraphFilter::default().edge_visible(&g.edges()[0], g.vertices()));
        assert!(GraphFilter::parse("label=rust").visible(g.vertex(&a).unwrap()));
    }
}

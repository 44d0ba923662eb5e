//! Ranked target list for the "connect to..." dialog.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::{Graph, VertexId};

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub id: VertexId,
    /// `"label (kind)"`, the text matched against.
    pub display: String,
    pub score: i64,
    /// An edge to the source already exists; connecting again would be refused.
    pub connected: bool,
}

/// Every vertex except `source`, best match first. An empty query keeps
/// vertex order.
pub fn connect_candidates(graph: &Graph, source: &VertexId, query: &str) -> Vec<Candidate> {
    let matcher = SkimMatcherV2::default();
    let q = query.trim();
    let mut out: Vec<Candidate> = graph
        .vertices()
        .iter()
        .filter(|v| &v.id != source)
        .filter_map(|v| {
            let display = format!("{} ({})", v.label, v.kind.as_str());
            let score = if q.is_empty() {
                0
            } else {
                matcher.fuzzy_match(&display, q)?
            };
            Some(Candidate {
                connected: graph.has_edge(source, &v.id),
                id: v.id.clone(),
                display,
                score,
            })
        })
        .collect();
    out.sort_by(|a, b| b.score.cmp(&a.score));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NewVertex, VertexKind};

    #[test]
    fn ranks_matches_and_flags_existing_edges() {
        let mut g = Graph::new();
        let main = g.add_vertex(NewVertex::new("main", VertexKind::Note)).unwrap();
        let work = g.add_vertex(NewVertex::new("work", VertexKind::Category)).unwrap();
        let todo = g.add_vertex(NewVertex::new("todo", VertexKind::Tag)).unwrap();
        g.connect_vertices(&main, &todo, "tag", 1).unwrap();

        let all = connect_candidates(&g, &main, "");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].display, "work (category)");
        assert!(!all[0].connected);
        assert!(all[1].connected);

        let hits = connect_candidates(&g, &main, "wrk");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, work);
        assert!(connect_candidates(&g, &main, "zzz").is_empty());
    }
}

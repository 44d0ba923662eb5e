//! Force-directed simulation, one explicit Euler step per rendered frame.
//!
//! Every pair of vertices repels with `repulsion / d²`; every edge acts as a
//! spring with rest length `base_distance * weight`. Cost is O(V² + E) per
//! step, which limits the engine to graphs of a few tens of vertices.

use eframe::egui::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Graph, VertexState};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsParams {
    pub repulsion: f32,
    pub spring: f32,
    /// Fraction of velocity kept after each step.
    pub damping: f32,
    /// Spring rest length for an edge of weight 1.
    pub base_distance: f32,
    /// Per-step speed cap in world units.
    pub max_speed: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            repulsion: 500.0,
            spring: 0.01,
            damping: 0.9,
            base_distance: 150.0,
            max_speed: 60.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepReport {
    Disabled,
    /// A vertex is being dragged; nothing moved.
    Held,
    Stepped {
        /// Largest speed after damping and capping.
        max_speed: f32,
    },
}

#[derive(Clone, Debug)]
pub struct ForceSimulator {
    params: PhysicsParams,
    enabled: bool,
}

impl ForceSimulator {
    pub fn new(params: PhysicsParams) -> Self {
        Self {
            params,
            enabled: true,
        }
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::info!("physics {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    /// Advances the simulation by one tick, keeping every vertex inside `area`.
    pub fn step(&self, graph: &mut Graph, area: Rect) -> StepReport {
        if !self.enabled {
            return StepReport::Disabled;
        }
        if graph.is_dragging() {
            return StepReport::Held;
        }
        let p = &self.params;
        let (vertices, edges) = graph.parts_mut();
        let n = vertices.len();
        let positions: Vec<_> = vertices.iter().map(|v| v.position).collect();
        let mut forces = vec![Vec2::ZERO; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = positions[i] - positions[j];
                let d = delta.length();
                if d == 0.0 || !d.is_finite() {
                    continue;
                }
                let push = delta / d * (p.repulsion / (d * d));
                forces[i] += push;
                forces[j] -= push;
            }
        }

        let index: HashMap<&str, usize> = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id.as_str(), i))
            .collect();
        for edge in edges {
            let (Some(&s), Some(&t)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                continue;
            };
            if s == t {
                continue;
            }
            let delta = positions[t] - positions[s];
            let d = delta.length();
            if d == 0.0 || !d.is_finite() {
                continue;
            }
            let rest = p.base_distance * edge.weight as f32;
            let pull = delta / d * (p.spring * (d - rest));
            forces[s] += pull;
            forces[t] -= pull;
        }
        drop(index);

        let mut fastest = 0.0_f32;
        for (vertex, force) in vertices.iter_mut().zip(forces) {
            vertex.force = force;
            let mut velocity = (vertex.velocity + force) * p.damping;
            if !(velocity.x.is_finite() && velocity.y.is_finite()) {
                velocity = Vec2::ZERO;
            }
            let speed = velocity.length();
            if speed > p.max_speed {
                velocity *= p.max_speed / speed;
            }
            fastest = fastest.max(velocity.length());
            vertex.velocity = velocity;
            vertex.position += velocity;
            let r = vertex.radius;
            vertex.position.x = clamp_axis(vertex.position.x, area.min.x, area.max.x, r);
            vertex.position.y = clamp_axis(vertex.position.y, area.min.y, area.max.y, r);
            vertex.state = VertexState::Simulated;
        }
        StepReport::Stepped { max_speed: fastest }
    }
}

impl Default for ForceSimulator {
    fn default() -> Self {
        Self::new(PhysicsParams::default())
    }
}

/// Keeps a disc of `radius` inside `[lo, hi]`; centers it when it cannot fit.
fn clamp_axis(value: f32, lo: f32, hi: f32, radius: f32) -> f32 {
    let (lo, hi) = (lo + radius, hi - radius);
    if lo > hi {
        return (lo + hi) * 0.5;
    }
    if !value.is_finite() {
        return (lo + hi) * 0.5;
    }
    value.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NewVertex, VertexId, VertexKind};
    use eframe::egui::{Pos2, pos2, vec2};

    fn area() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0))
    }

    fn pair(a: Pos2, b: Pos2) -> Graph {
        let mut g = Graph::new();
        for (id, at) in [("a", a), ("b", b)] {
            g.add_vertex(NewVertex::new(id, VertexKind::Note).with_id(id).at(at).radius(20.0))
                .unwrap();
        }
        g
    }

    #[test]
    fn repulsion_pushes_apart_symmetrically() {
        let mut g = pair(pos2(390.0, 300.0), pos2(410.0, 300.0));
        let report = ForceSimulator::default().step(&mut g, area());
        assert!(matches!(report, StepReport::Stepped { .. }));
        let a = &g.vertices()[0];
        let b = &g.vertices()[1];
        assert!(a.position.x < 390.0);
        assert!(b.position.x > 410.0);
        assert!((a.velocity.x + b.velocity.x).abs() < 1e-4);
        assert_eq!(a.state, VertexState::Simulated);
    }

    #[test]
    fn stretched_spring_pulls_together() {
        let mut g = pair(pos2(100.0, 300.0), pos2(700.0, 300.0));
        g.connect_vertices(&VertexId::from("a"), &VertexId::from("b"), "link", 1).unwrap();
        ForceSimulator::default().step(&mut g, area());
        assert!(g.vertices()[0].velocity.x > 0.0);
        assert!(g.vertices()[1].velocity.x < 0.0);
    }

    #[test]
    fn coincident_vertices_exert_no_force() {
        let mut g = pair(pos2(400.0, 400.0), pos2(400.0, 400.0));
        g.connect_vertices(&VertexId::from("a"), &VertexId::from("b"), "link", 1).unwrap();
        ForceSimulator::default().step(&mut g, area());
        for v in g.vertices() {
            assert_eq!(v.velocity, Vec2::ZERO);
            assert_eq!(v.position, pos2(400.0, 400.0));
        }
    }

    #[test]
    fn skipped_while_dragging_or_disabled() {
        let mut g = pair(pos2(390.0, 300.0), pos2(410.0, 300.0));
        let mut sim = ForceSimulator::default();
        sim.set_enabled(false);
        assert_eq!(sim.step(&mut g, area()), StepReport::Disabled);

        sim.set_enabled(true);
        crate::gesture::Scene::begin_drag(&mut g, &VertexId::from("a"));
        assert_eq!(sim.step(&mut g, area()), StepReport::Held);
        assert_eq!(g.vertices()[1].position, pos2(410.0, 300.0));
    }

    #[test]
    fn positions_stay_inside_area() {
        let mut g = pair(pos2(1.0, 1.0), pos2(2.0, 1.0));
        ForceSimulator::default().step(&mut g, area());
        for v in g.vertices() {
            assert!(v.position.x >= 20.0 && v.position.y >= 20.0);
        }
    }

    #[test]
    fn narrow_area_centers_vertex() {
        assert_eq!(clamp_axis(5.0, 0.0, 10.0, 20.0), 5.0);
        assert_eq!(clamp_axis(500.0, 0.0, 100.0, 10.0), 90.0);
        assert_eq!(clamp_axis(f32::NAN, 0.0, 100.0, 10.0), 50.0);
    }
}

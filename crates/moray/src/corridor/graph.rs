//! Routing-graph data model and builder.
//!
//! Vertices are ports, track endpoints, and track intersections; edges are
//! the orthogonal stretches between consecutive vertices on a track.
//! Positions are snapped to a 0.01 grid before interning so points that ought
//! to coincide actually do.

use crate::geom::{Orientation, Point, Rect, dist, dist_sq, point, segment_intersects_rect};
use rustc_hash::{FxHashMap, FxHashSet};

use super::channels::Track;

/// Tolerance when matching vertices onto tracks and rejecting box crossings.
const COORD_TOL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphEdge {
    pub to: usize,
    pub weight: f64,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, Default)]
pub struct RoutingGraph {
    pub positions: Vec<Point>,
    /// Undirected: every edge is stored in both endpoint lists.
    pub adjacency: Vec<Vec<GraphEdge>>,
}

impl RoutingGraph {
    /// Graph node nearest to `p` by squared distance; ties go to the lower
    /// index. `None` only for an empty graph.
    pub fn nearest(&self, p: Point) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        for (idx, &pos) in self.positions.iter().enumerate() {
            let d = dist_sq(pos, p);
            match best {
                Some((bd, _)) if bd <= d => {}
                _ => best = Some((d, idx)),
            }
        }
        best.map(|(_, idx)| idx)
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn add_to_edge_weight(&mut self, u: usize, v: usize, delta: f64) {
        for e in &mut self.adjacency[u] {
            if e.to == v {
                e.weight += delta;
            }
        }
        for e in &mut self.adjacency[v] {
            if e.to == u {
                e.weight += delta;
            }
        }
    }

    pub fn edge_weight(&self, u: usize, v: usize) -> Option<f64> {
        self.adjacency[u].iter().find(|e| e.to == v).map(|e| e.weight)
    }
}

fn snap_key(p: Point) -> (i64, i64) {
    ((p.x * 100.0).round() as i64, (p.y * 100.0).round() as i64)
}

pub fn build(tracks: &[Track], ports: &[Point], boxes: &[Rect]) -> RoutingGraph {
    let mut graph = RoutingGraph::default();
    let mut interned: FxHashMap<(i64, i64), usize> = FxHashMap::default();

    let mut intern = |graph: &mut RoutingGraph, p: Point| -> usize {
        let key = snap_key(p);
        *interned.entry(key).or_insert_with(|| {
            graph.positions.push(point(key.0 as f64 / 100.0, key.1 as f64 / 100.0));
            graph.adjacency.push(Vec::new());
            graph.positions.len() - 1
        })
    };

    for &p in ports {
        intern(&mut graph, p);
    }
    for track in tracks {
        intern(&mut graph, track.a);
        intern(&mut graph, track.b);
    }

    // Intersections of horizontal and vertical tracks whose ranges mutually
    // contain the other's fixed coordinate.
    for h in tracks.iter().filter(|t| t.orientation == Orientation::Horizontal) {
        for v in tracks.iter().filter(|t| t.orientation == Orientation::Vertical) {
            let x = v.a.x;
            let y = h.a.y;
            let x_in = h.a.x - COORD_TOL <= x && x <= h.b.x + COORD_TOL;
            let y_in = v.a.y - COORD_TOL <= y && y <= v.b.y + COORD_TOL;
            if x_in && y_in {
                intern(&mut graph, point(x, y));
            }
        }
    }

    // Connect consecutive vertices along every track, skipping stretches that
    // would cut through a box interior.
    let mut connected: FxHashSet<(usize, usize)> = FxHashSet::default();
    for track in tracks {
        let mut on_line: Vec<usize> = Vec::new();
        match track.orientation {
            Orientation::Horizontal => {
                let y = track.a.y;
                for (idx, pos) in graph.positions.iter().enumerate() {
                    if (pos.y - y).abs() <= COORD_TOL
                        && pos.x >= track.a.x - COORD_TOL
                        && pos.x <= track.b.x + COORD_TOL
                    {
                        on_line.push(idx);
                    }
                }
                on_line.sort_by(|&a, &b| {
                    graph.positions[a]
                        .x
                        .total_cmp(&graph.positions[b].x)
                        .then(a.cmp(&b))
                });
            }
            Orientation::Vertical => {
                let x = track.a.x;
                for (idx, pos) in graph.positions.iter().enumerate() {
                    if (pos.x - x).abs() <= COORD_TOL
                        && pos.y >= track.a.y - COORD_TOL
                        && pos.y <= track.b.y + COORD_TOL
                    {
                        on_line.push(idx);
                    }
                }
                on_line.sort_by(|&a, &b| {
                    graph.positions[a]
                        .y
                        .total_cmp(&graph.positions[b].y)
                        .then(a.cmp(&b))
                });
            }
        }

        for pair in on_line.windows(2) {
            let (u, v) = (pair[0], pair[1]);
            if u == v {
                continue;
            }
            let key = (u.min(v), u.max(v));
            if connected.contains(&key) {
                continue;
            }
            let (pu, pv) = (graph.positions[u], graph.positions[v]);
            let weight = dist(pu, pv);
            if weight < 1e-9 {
                continue;
            }
            let blocked = boxes
                .iter()
                .any(|b| segment_intersects_rect(pu, pv, &b.inflate(-COORD_TOL, -COORD_TOL)));
            if blocked {
                continue;
            }
            connected.insert(key);
            graph.adjacency[u].push(GraphEdge {
                to: v,
                weight,
                orientation: track.orientation,
            });
            graph.adjacency[v].push(GraphEdge {
                to: u,
                weight,
                orientation: track.orientation,
            });
        }
    }

    graph
}

//! Per-edge shortest paths over the routing graph.
//!
//! The search key is lexicographic `(length, bends)` with an epsilon on
//! length, and the visited key is `(vertex, entry orientation)` so a cheaper
//! way into a vertex from the other axis is never lost. Crossing penalties
//! keep later edges out of corridors the committed set already uses.

use crate::geom::{Orientation, Point, segments_cross};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::graph::RoutingGraph;

/// Two lengths within this are considered equal; bends break the tie.
const LENGTH_EPS: f64 = 1e-6;

/// A committed route for one diagram edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRoute {
    pub edge: usize,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy)]
struct State {
    length: f64,
    bends: u32,
    node: usize,
    orientation: Orientation,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.length
            .total_cmp(&other.length)
            .then_with(|| self.bends.cmp(&other.bends))
            .then_with(|| self.node.cmp(&other.node))
            .then_with(|| self.orientation.cmp(&other.orientation))
    }
}

fn better(length: f64, bends: u32, than: (f64, u32)) -> bool {
    if length < than.0 - LENGTH_EPS {
        return true;
    }
    length <= than.0 + LENGTH_EPS && bends < than.1
}

/// Route one edge between two ports. Falls back to the straight two-point
/// segment when the graph offers no path (isolated port, empty graph).
pub fn route(graph: &RoutingGraph, src_port: Point, dst_port: Point) -> Vec<Point> {
    let (Some(start), Some(goal)) = (graph.nearest(src_port), graph.nearest(dst_port)) else {
        return vec![src_port, dst_port];
    };
    if start == goal {
        return vec![src_port, dst_port];
    }

    let mut best: FxHashMap<(usize, Orientation), (f64, u32)> = FxHashMap::default();
    let mut prev: FxHashMap<(usize, Orientation), (usize, Orientation)> = FxHashMap::default();
    let mut heap: BinaryHeap<std::cmp::Reverse<State>> = BinaryHeap::new();

    // Two seeds let the first step take either axis without a bend.
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        best.insert((start, orientation), (0.0, 0));
        heap.push(std::cmp::Reverse(State {
            length: 0.0,
            bends: 0,
            node: start,
            orientation,
        }));
    }

    let mut goal_key: Option<(usize, Orientation)> = None;
    while let Some(std::cmp::Reverse(state)) = heap.pop() {
        let key = (state.node, state.orientation);
        match best.get(&key) {
            Some(&(l, b)) if l == state.length && b == state.bends => {}
            _ => continue, // stale entry
        }
        if state.node == goal {
            goal_key = Some(key);
            break;
        }

        for edge in &graph.adjacency[state.node] {
            let length = state.length + edge.weight;
            let bends = state.bends
                + u32::from(edge.orientation != state.orientation && state.node != start);
            let next = (edge.to, edge.orientation);
            let known = best.get(&next).copied().unwrap_or((f64::INFINITY, u32::MAX));
            if better(length, bends, known) {
                best.insert(next, (length, bends));
                prev.insert(next, key);
                heap.push(std::cmp::Reverse(State {
                    length,
                    bends,
                    node: edge.to,
                    orientation: edge.orientation,
                }));
            }
        }
    }

    let Some(mut key) = goal_key else {
        return vec![src_port, dst_port];
    };

    let mut rev: Vec<usize> = vec![key.0];
    while let Some(&p) = prev.get(&key) {
        rev.push(p.0);
        key = p;
    }
    rev.reverse();

    let mut points: Vec<Point> = Vec::with_capacity(rev.len() + 2);
    points.push(src_port);
    points.extend(rev.into_iter().map(|idx| graph.positions[idx]));
    points.push(dst_port);
    simplify_route(&mut points);
    points
}

/// Raise the weight of every routing-graph edge that crosses a segment of
/// `route` by `penalty`. Returns the vertex pairs touched so
/// [`remove_crossing_penalties`] can undo the exact same set.
pub fn apply_crossing_penalties(
    graph: &mut RoutingGraph,
    route: &[Point],
    penalty: f64,
) -> Vec<(usize, usize)> {
    let mut crossed: Vec<(usize, usize)> = Vec::new();
    for u in 0..graph.adjacency.len() {
        for i in 0..graph.adjacency[u].len() {
            let v = graph.adjacency[u][i].to;
            if v <= u {
                continue;
            }
            let (pu, pv) = (graph.positions[u], graph.positions[v]);
            let crosses = route
                .windows(2)
                .any(|w| segments_cross(pu, pv, w[0], w[1]));
            if crosses {
                crossed.push((u, v));
            }
        }
    }
    for &(u, v) in &crossed {
        graph.add_to_edge_weight(u, v, penalty);
    }
    crossed
}

/// Inverse of [`apply_crossing_penalties`] over the same pair list.
pub fn remove_crossing_penalties(
    graph: &mut RoutingGraph,
    applied: &[(usize, usize)],
    penalty: f64,
) {
    for &(u, v) in applied {
        graph.add_to_edge_weight(u, v, -penalty);
    }
}

/// Clean a graph path into a rendering-ready polyline: collapse duplicate
/// points, snap sub-pixel jogs onto their neighbour's coordinate, and drop
/// collinear interiors. The first and last points are ports on shape
/// boundaries and are never touched.
pub fn simplify_route(points: &mut Vec<Point>) {
    if points.len() <= 2 {
        return;
    }

    // Fixpoint: each rule feeds the others, and a bounded number of rounds
    // settles because every change either removes a point or makes two
    // coordinates exactly equal.
    loop {
        let mut changed = false;
        changed |= collapse_duplicates(points);
        changed |= snap_jitter(points);
        changed |= drop_collinear(points);
        if !changed || points.len() <= 2 {
            return;
        }
    }
}

fn collapse_duplicates(points: &mut Vec<Point>) -> bool {
    let mut changed = false;
    let mut i = 0;
    while i + 1 < points.len() && points.len() > 2 {
        let (a, b) = (points[i], points[i + 1]);
        if (a.x - b.x).abs() <= 0.5 && (a.y - b.y).abs() <= 0.5 {
            if i + 1 == points.len() - 1 {
                // Keep the final port; the interior twin goes.
                points.remove(i);
            } else {
                points.remove(i + 1);
            }
            changed = true;
        } else {
            i += 1;
        }
    }
    changed
}

fn snap_jitter(points: &mut [Point]) -> bool {
    let mut changed = false;
    for i in 1..points.len() - 1 {
        let prev = points[i - 1];
        let next = points[i + 1];
        let p = &mut points[i];

        if p.x != prev.x && (p.x - prev.x).abs() <= 0.5 {
            p.x = prev.x;
            changed = true;
        } else if p.x != next.x && (p.x - next.x).abs() <= 0.5 {
            p.x = next.x;
            changed = true;
        }

        if p.y != prev.y && (p.y - prev.y).abs() <= 0.5 {
            p.y = prev.y;
            changed = true;
        } else if p.y != next.y && (p.y - next.y).abs() <= 0.5 {
            p.y = next.y;
            changed = true;
        }
    }
    changed
}

fn drop_collinear(points: &mut Vec<Point>) -> bool {
    let mut changed = false;
    let mut i = 1;
    while i + 1 < points.len() {
        let (a, b, c) = (points[i - 1], points[i], points[i + 1]);
        let x_run = (a.x - b.x).abs() <= 0.5 && (b.x - c.x).abs() <= 0.5;
        let y_run = (a.y - b.y).abs() <= 0.5 && (b.y - c.y).abs() <= 0.5;
        if x_run || y_run {
            points.remove(i);
            changed = true;
        } else {
            i += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    #[test]
    fn simplify_drops_collinear_interiors() {
        let mut route = vec![
            point(0.0, 0.0),
            point(50.0, 0.0),
            point(100.0, 0.0),
            point(100.0, 80.0),
        ];
        simplify_route(&mut route);
        assert_eq!(
            route,
            vec![point(0.0, 0.0), point(100.0, 0.0), point(100.0, 80.0)]
        );
    }

    #[test]
    fn simplify_snaps_sub_pixel_jitter() {
        let mut route = vec![
            point(0.0, 0.0),
            point(60.0, 0.3),
            point(60.2, 80.0),
            point(120.0, 80.0),
        ];
        simplify_route(&mut route);
        for w in route.windows(2) {
            assert!(
                (w[0].x - w[1].x).abs() < 1e-9 || (w[0].y - w[1].y).abs() < 1e-9,
                "segment {:?} -> {:?} is not exactly orthogonal",
                w[0],
                w[1]
            );
        }
        assert_eq!(route.first(), Some(&point(0.0, 0.0)));
        assert_eq!(route.last(), Some(&point(120.0, 80.0)));
    }

    #[test]
    fn simplify_is_idempotent() {
        let mut route = vec![
            point(0.0, 0.0),
            point(40.0, 0.4),
            point(40.3, 0.1),
            point(40.2, 60.0),
            point(90.0, 60.2),
            point(90.0, 60.0),
            point(130.0, 60.0),
        ];
        simplify_route(&mut route);
        let once = route.clone();
        simplify_route(&mut route);
        assert_eq!(route, once);
    }

    #[test]
    fn simplify_never_moves_the_ports() {
        let mut route = vec![point(0.3, 0.1), point(0.0, 0.0), point(50.0, 0.0)];
        simplify_route(&mut route);
        assert_eq!(route.first(), Some(&point(0.3, 0.1)));
        assert_eq!(route.last(), Some(&point(50.0, 0.0)));
    }
}

//! Straight/L/Z route construction.
//!
//! Candidates are tried in a fixed order and the first one whose segments
//! stay clear of every non-endpoint node box (expanded by a safety margin)
//! wins. There is no maze search: multi-cell diagonals with unequal axes may
//! bridge empty space with long segments.

use crate::corridor::dijkstra::simplify_route;
use crate::geom::{Orientation, Point, point, segment_intersects_rect};
use crate::grid::GridInfo;
use crate::model::Graph;

use super::ports::{PortAssignment, PortInfo};

/// Safety margin around non-endpoint boxes when testing candidates.
const OBSTACLE_MARGIN: f64 = 4.0;

pub fn route_all(g: &mut Graph, grid: &GridInfo, routable: &[usize], ports: &PortAssignment) {
    for &edge_idx in routable {
        let (src, dst) = ports.by_edge[&edge_idx];
        let mut route = build_route(g, grid, edge_idx, &src, &dst);
        // Last-resort Z-routes can degenerate into collinear runs.
        simplify_route(&mut route);
        g.edges[edge_idx].route = route;
    }
}

fn build_route(
    g: &Graph,
    grid: &GridInfo,
    edge_idx: usize,
    src: &PortInfo,
    dst: &PortInfo,
) -> Vec<Point> {
    let (r1, c1) = grid.cell_of[&g.edges[edge_idx].src];
    let (r2, c2) = grid.cell_of[&g.edges[edge_idx].dst];
    let skip = (src.node, dst.node);
    let p1 = src.point;
    let p2 = dst.point;

    // 1. Straight shot for shared-row/column pairs with collinear ports.
    if r1 == r2 && (p1.y - p2.y).abs() <= 0.5 && !path_blocked(g, grid, &[p1, p2], skip) {
        return vec![p1, p2];
    }
    if c1 == c2 && (p1.x - p2.x).abs() <= 0.5 && !path_blocked(g, grid, &[p1, p2], skip) {
        return vec![p1, p2];
    }

    // 2–3. One-bend routes; the primary leaves along the source face's exit
    // axis.
    let (primary_bend, alternative_bend) = match src.face.exit_orientation() {
        Orientation::Vertical => (point(p1.x, p2.y), point(p2.x, p1.y)),
        Orientation::Horizontal => (point(p2.x, p1.y), point(p1.x, p2.y)),
    };
    for bend in [primary_bend, alternative_bend] {
        if degenerate_bend(p1, bend, p2) {
            continue;
        }
        let candidate = vec![p1, bend, p2];
        if !path_blocked(g, grid, &candidate, skip) {
            return candidate;
        }
    }

    // 4–6. Z-routes through a channel; primary orientation follows the source
    // exit axis, then perpendicular and opposite-side channels, and finally
    // the primary regardless of obstacles.
    let primary_orientation = match src.face.exit_orientation() {
        Orientation::Vertical => Orientation::Horizontal,
        Orientation::Horizontal => Orientation::Vertical,
    };

    let mut candidates: Vec<Vec<Point>> = Vec::new();
    for coord in channel_coords(grid, primary_orientation, (r1, c1), (r2, c2), p1) {
        candidates.push(z_route(p1, p2, primary_orientation, coord));
    }
    let perpendicular = match primary_orientation {
        Orientation::Horizontal => Orientation::Vertical,
        Orientation::Vertical => Orientation::Horizontal,
    };
    // Interleave: primary first, then perpendicular, then the remaining
    // opposite-side coordinates already queued above.
    let mut ordered: Vec<Vec<Point>> = Vec::new();
    if !candidates.is_empty() {
        ordered.push(candidates[0].clone());
    }
    for coord in channel_coords(grid, perpendicular, (r1, c1), (r2, c2), p1) {
        ordered.push(z_route(p1, p2, perpendicular, coord));
    }
    ordered.extend(candidates.iter().skip(1).cloned());

    for candidate in &ordered {
        if !path_blocked(g, grid, candidate, skip) {
            return candidate.clone();
        }
    }

    // Last resort: the first Z attempted, obstacles or not.
    ordered
        .into_iter()
        .next()
        .unwrap_or_else(|| vec![p1, p2])
}

/// Channel coordinates to try for a Z through the given orientation:
/// the boundary between the two rows (or columns) first, then the two
/// outer boundaries; for same-row/col pairs the nearer side first.
fn channel_coords(
    grid: &GridInfo,
    orientation: Orientation,
    (r1, c1): (i32, i32),
    (r2, c2): (i32, i32),
    src_port: Point,
) -> Vec<f64> {
    match orientation {
        Orientation::Horizontal => {
            if r1 != r2 {
                let lo = r1.min(r2);
                let hi = r1.max(r2);
                vec![grid.row_bottom(lo), grid.row_top(lo), grid.row_bottom(hi)]
            } else {
                let top = grid.row_top(r1);
                let bottom = grid.row_bottom(r1);
                if (src_port.y - top).abs() <= (src_port.y - bottom).abs() {
                    vec![top, bottom]
                } else {
                    vec![bottom, top]
                }
            }
        }
        Orientation::Vertical => {
            if c1 != c2 {
                let lo = c1.min(c2);
                let hi = c1.max(c2);
                vec![grid.col_right(lo), grid.col_left(lo), grid.col_right(hi)]
            } else {
                let left = grid.col_left(c1);
                let right = grid.col_right(c1);
                if (src_port.x - left).abs() <= (src_port.x - right).abs() {
                    vec![left, right]
                } else {
                    vec![right, left]
                }
            }
        }
    }
}

/// Four-point Z through a channel line: two intermediate points dropped onto
/// the channel coordinate.
fn z_route(p1: Point, p2: Point, channel: Orientation, coord: f64) -> Vec<Point> {
    match channel {
        Orientation::Horizontal => vec![p1, point(p1.x, coord), point(p2.x, coord), p2],
        Orientation::Vertical => vec![p1, point(coord, p1.y), point(coord, p2.y), p2],
    }
}

fn degenerate_bend(p1: Point, bend: Point, p2: Point) -> bool {
    (bend.x - p1.x).abs() < 0.5 && (bend.y - p1.y).abs() < 0.5
        || (bend.x - p2.x).abs() < 0.5 && (bend.y - p2.y).abs() < 0.5
}

fn path_blocked(g: &Graph, grid: &GridInfo, points: &[Point], skip: (usize, usize)) -> bool {
    points.windows(2).any(|w| {
        grid.nodes.iter().any(|&idx| {
            idx != skip.0
                && idx != skip.1
                && segment_intersects_rect(
                    w[0],
                    w[1],
                    &g.nodes[idx].rect.inflate(OBSTACLE_MARGIN, OBSTACLE_MARGIN),
                )
        })
    })
}

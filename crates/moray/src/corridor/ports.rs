//! Port assignment for pre-positioned nodes.
//!
//! Faces come from the angle between box centers rather than grid cells: the
//! dominant axis picks opposite faces, a pronounced minor axis flips the
//! destination perpendicular so the route becomes an L instead of a Z.

use crate::geom::{Direction, Point, point};
use crate::model::Graph;
use rustc_hash::FxHashMap;

/// Minor/major ratio beyond which the destination face flips perpendicular.
const L_SHAPE_RATIO: f64 = 0.25;
/// Ports are clamped to the inner span of a face when aligned to an overlap.
const INNER_CLAMP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Port {
    pub node: usize,
    pub edge: usize,
    pub face: Direction,
    pub pos: Point,
    pub is_source: bool,
}

#[derive(Debug, Default)]
pub struct PortMap {
    /// Edge index -> (source port, destination port).
    pub by_edge: FxHashMap<usize, (Port, Port)>,
}

impl PortMap {
    pub fn points(&self, edge: usize) -> (Point, Point) {
        let (src, dst) = &self.by_edge[&edge];
        (src.pos, dst.pos)
    }
}

pub fn assign(g: &Graph, edge_ids: &[usize]) -> PortMap {
    let mut faces: Vec<(Direction, Direction)> = Vec::with_capacity(edge_ids.len());
    let mut counts: FxHashMap<(usize, Direction), usize> = FxHashMap::default();

    for &edge_idx in edge_ids {
        let edge = &g.edges[edge_idx];
        let pair = if edge.src == edge.dst {
            self_loop_faces(edge.src, &counts)
        } else {
            let src_center = g.nodes[edge.src].center();
            let dst_center = g.nodes[edge.dst].center();
            angle_faces(dst_center.x - src_center.x, dst_center.y - src_center.y)
        };
        *counts.entry((edge.src, pair.0)).or_default() += 1;
        *counts.entry((edge.dst, pair.1)).or_default() += 1;
        faces.push(pair);
    }

    // Group by (node, face), order by the neighbour's center, then spread at
    // t = (i+1)/(N+1) of the full face span.
    let mut groups: FxHashMap<(usize, Direction), Vec<Member>> = FxHashMap::default();
    for (slot, &edge_idx) in edge_ids.iter().enumerate() {
        let edge = &g.edges[edge_idx];
        let (src_face, dst_face) = faces[slot];
        groups.entry((edge.src, src_face)).or_default().push(Member {
            edge: edge_idx,
            is_source: true,
            neighbour: edge.dst,
        });
        groups.entry((edge.dst, dst_face)).or_default().push(Member {
            edge: edge_idx,
            is_source: false,
            neighbour: edge.src,
        });
    }

    let mut ports: FxHashMap<(usize, bool), Port> = FxHashMap::default();
    let mut keys: Vec<(usize, Direction)> = groups.keys().copied().collect();
    keys.sort();
    for key in keys {
        let (node_idx, face) = key;
        let members = groups.get_mut(&key).expect("group exists");
        members.sort_by(|a, b| {
            let ca = g.nodes[a.neighbour].center();
            let cb = g.nodes[b.neighbour].center();
            let (ka, kb) = match face {
                Direction::Top | Direction::Bottom => (ca.x, cb.x),
                Direction::Left | Direction::Right => (ca.y, cb.y),
            };
            ka.total_cmp(&kb).then(a.edge.cmp(&b.edge))
        });

        let rect = g.nodes[node_idx].rect;
        let n = members.len() as f64;
        for (i, member) in members.iter().enumerate() {
            let t = (i as f64 + 1.0) / (n + 1.0);
            let pos = match face {
                Direction::Top => point(rect.min_x() + t * rect.size.width, rect.min_y()),
                Direction::Bottom => point(rect.min_x() + t * rect.size.width, rect.max_y()),
                Direction::Left => point(rect.min_x(), rect.min_y() + t * rect.size.height),
                Direction::Right => point(rect.max_x(), rect.min_y() + t * rect.size.height),
            };
            ports.insert(
                (member.edge, member.is_source),
                Port {
                    node: node_idx,
                    edge: member.edge,
                    face,
                    pos,
                    is_source: member.is_source,
                },
            );
        }
    }

    let mut map = PortMap::default();
    for &edge_idx in edge_ids {
        let src = ports[&(edge_idx, true)];
        let dst = ports[&(edge_idx, false)];
        map.by_edge.insert(edge_idx, (src, dst));
    }

    align_facing_pairs(g, edge_ids, &mut map);
    map
}

struct Member {
    edge: usize,
    is_source: bool,
    neighbour: usize,
}

/// Faces for a non-loop edge from the center-to-center angle.
fn angle_faces(dx: f64, dy: f64) -> (Direction, Direction) {
    if dx.abs() == dy.abs() && dx != 0.0 {
        // Exactly 45 degrees: force an L with one horizontal, one vertical face.
        let src = if dx > 0.0 { Direction::Right } else { Direction::Left };
        let dst = if dy > 0.0 { Direction::Top } else { Direction::Bottom };
        return (src, dst);
    }

    if dx.abs() >= dy.abs() {
        let src = if dx >= 0.0 { Direction::Right } else { Direction::Left };
        let mut dst = src.opposite();
        if dy.abs() > L_SHAPE_RATIO * dx.abs() {
            dst = if dy > 0.0 { Direction::Top } else { Direction::Bottom };
        }
        (src, dst)
    } else {
        let src = if dy > 0.0 { Direction::Bottom } else { Direction::Top };
        let mut dst = src.opposite();
        if dx.abs() > L_SHAPE_RATIO * dy.abs() {
            dst = if dx > 0.0 { Direction::Left } else { Direction::Right };
        }
        (src, dst)
    }
}

/// Self-loops leave through the least-loaded face and come back through its
/// clockwise neighbour.
fn self_loop_faces(node: usize, counts: &FxHashMap<(usize, Direction), usize>) -> (Direction, Direction) {
    let primary = Direction::ALL
        .into_iter()
        .min_by_key(|&face| (counts.get(&(node, face)).copied().unwrap_or(0), face))
        .expect("faces are non-empty");
    (primary, primary.clockwise())
}

/// Facing vertical pairs whose boxes overlap horizontally share a single port
/// x at the overlap midpoint, clamped to the inner span of each box; symmetric
/// for facing horizontal pairs.
fn align_facing_pairs(g: &Graph, edge_ids: &[usize], map: &mut PortMap) {
    for &edge_idx in edge_ids {
        let edge = &g.edges[edge_idx];
        if edge.src == edge.dst {
            continue;
        }
        let (src_port, dst_port) = map.by_edge[&edge_idx];
        let vertical = matches!(
            (src_port.face, dst_port.face),
            (Direction::Bottom, Direction::Top) | (Direction::Top, Direction::Bottom)
        );
        let horizontal = matches!(
            (src_port.face, dst_port.face),
            (Direction::Right, Direction::Left) | (Direction::Left, Direction::Right)
        );
        if !vertical && !horizontal {
            continue;
        }

        let a = g.nodes[edge.src].rect;
        let b = g.nodes[edge.dst].rect;
        if vertical {
            let lo = a.min_x().max(b.min_x());
            let hi = a.max_x().min(b.max_x());
            if hi <= lo {
                continue;
            }
            let mut mid = (lo + hi) / 2.0;
            mid = clamp_inner(mid, a.min_x(), a.size.width);
            mid = clamp_inner(mid, b.min_x(), b.size.width);
            let pair = map.by_edge.get_mut(&edge_idx).expect("pair exists");
            pair.0.pos.x = mid;
            pair.1.pos.x = mid;
        } else {
            let lo = a.min_y().max(b.min_y());
            let hi = a.max_y().min(b.max_y());
            if hi <= lo {
                continue;
            }
            let mut mid = (lo + hi) / 2.0;
            mid = clamp_inner(mid, a.min_y(), a.size.height);
            mid = clamp_inner(mid, b.min_y(), b.size.height);
            let pair = map.by_edge.get_mut(&edge_idx).expect("pair exists");
            pair.0.pos.y = mid;
            pair.1.pos.y = mid;
        }
    }
}

fn clamp_inner(v: f64, start: f64, span: f64) -> f64 {
    v.clamp(start + INNER_CLAMP * span, start + (1.0 - INNER_CLAMP) * span)
}

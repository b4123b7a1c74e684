//! Port assignment for the standalone router.
//!
//! Two passes: deterministic faces for axis-dominant pairs, then a
//! load-balanced pick for equal diagonals so mixed face pairs push L-bends
//! toward layout corners. Ports sharing a face are spread along it, sorted by
//! where their neighbour sits.

use crate::geom::{Direction, Point, point};
use crate::grid::GridInfo;
use crate::model::Graph;
use rustc_hash::FxHashMap;

/// Corner clearance reserved at both ends of a face.
const CORNER_GAP: f64 = 12.0;
/// Minimum port-to-port clearance along a face.
const PORT_CLEARANCE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortInfo {
    pub edge: usize,
    pub node: usize,
    pub face: Direction,
    pub point: Point,
    pub is_source: bool,
}

#[derive(Debug, Default)]
pub struct PortAssignment {
    /// Edge index -> (source-side, destination-side) port.
    pub by_edge: FxHashMap<usize, (PortInfo, PortInfo)>,
    /// Ports per `(node, face)` after both passes.
    pub face_counts: FxHashMap<(usize, Direction), usize>,
}

pub fn assign(g: &Graph, grid: &GridInfo, routable: &[usize]) -> PortAssignment {
    let mut faces: Vec<Option<(Direction, Direction)>> = vec![None; routable.len()];
    let mut counts: FxHashMap<(usize, Direction), usize> = FxHashMap::default();

    // Pass 1: deterministic faces for every pair with a dominant axis.
    for (slot, &edge_idx) in routable.iter().enumerate() {
        let edge = &g.edges[edge_idx];
        let (r1, c1) = grid.cell_of[&edge.src];
        let (r2, c2) = grid.cell_of[&edge.dst];
        let (dr, dc) = (r2 - r1, c2 - c1);

        let pair = if dr == 0 {
            let src = if dc > 0 { Direction::Right } else { Direction::Left };
            Some((src, src.opposite()))
        } else if dc == 0 {
            let src = if dr > 0 { Direction::Bottom } else { Direction::Top };
            Some((src, src.opposite()))
        } else if dc.abs() > dr.abs() {
            let src = if dc > 0 { Direction::Right } else { Direction::Left };
            Some((src, src.opposite()))
        } else if dr.abs() > dc.abs() {
            let src = if dr > 0 { Direction::Bottom } else { Direction::Top };
            Some((src, src.opposite()))
        } else {
            None // equal diagonal, pass 2
        };

        if let Some((src_face, dst_face)) = pair {
            *counts.entry((edge.src, src_face)).or_default() += 1;
            *counts.entry((edge.dst, dst_face)).or_default() += 1;
            faces[slot] = Some((src_face, dst_face));
        }
    }

    // Pass 2: equal diagonals pick the lighter of their two candidate faces,
    // preferring the vertical one on ties.
    for (slot, &edge_idx) in routable.iter().enumerate() {
        if faces[slot].is_some() {
            continue;
        }
        let edge = &g.edges[edge_idx];
        let (r1, c1) = grid.cell_of[&edge.src];
        let (r2, c2) = grid.cell_of[&edge.dst];
        let (dr, dc) = (r2 - r1, c2 - c1);

        let src_vertical = if dr > 0 { Direction::Bottom } else { Direction::Top };
        let src_horizontal = if dc > 0 { Direction::Right } else { Direction::Left };
        let src_face = lighter_face(&counts, edge.src, src_vertical, src_horizontal);
        *counts.entry((edge.src, src_face)).or_default() += 1;

        let dst_vertical = if dr > 0 { Direction::Top } else { Direction::Bottom };
        let dst_horizontal = if dc > 0 { Direction::Left } else { Direction::Right };
        let dst_face = lighter_face(&counts, edge.dst, dst_vertical, dst_horizontal);
        *counts.entry((edge.dst, dst_face)).or_default() += 1;

        faces[slot] = Some((src_face, dst_face));
    }

    // Group ports by (node, face) and spread them along the face span.
    let mut groups: FxHashMap<(usize, Direction), Vec<GroupMember>> = FxHashMap::default();
    for (slot, &edge_idx) in routable.iter().enumerate() {
        let edge = &g.edges[edge_idx];
        let (src_face, dst_face) = faces[slot].expect("faces assigned in pass 1 or 2");
        groups.entry((edge.src, src_face)).or_default().push(GroupMember {
            edge: edge_idx,
            is_source: true,
            neighbour: edge.dst,
        });
        groups.entry((edge.dst, dst_face)).or_default().push(GroupMember {
            edge: edge_idx,
            is_source: false,
            neighbour: edge.src,
        });
    }

    let mut ports: FxHashMap<(usize, bool), PortInfo> = FxHashMap::default();
    let mut keys: Vec<(usize, Direction)> = groups.keys().copied().collect();
    keys.sort();
    for key in keys {
        let (node_idx, face) = key;
        let members = groups.get_mut(&key).expect("group exists");
        spread_face(g, node_idx, face, members, &mut ports);
    }

    let mut assignment = PortAssignment {
        by_edge: FxHashMap::default(),
        face_counts: counts,
    };
    for &edge_idx in routable {
        let src = ports[&(edge_idx, true)];
        let dst = ports[&(edge_idx, false)];
        assignment.by_edge.insert(edge_idx, (src, dst));
    }

    align_straight_pairs(g, grid, routable, &faces, &mut assignment);
    assignment
}

struct GroupMember {
    edge: usize,
    is_source: bool,
    neighbour: usize,
}

fn lighter_face(
    counts: &FxHashMap<(usize, Direction), usize>,
    node: usize,
    vertical: Direction,
    horizontal: Direction,
) -> Direction {
    let v = counts.get(&(node, vertical)).copied().unwrap_or(0);
    let h = counts.get(&(node, horizontal)).copied().unwrap_or(0);
    if h < v { horizontal } else { vertical }
}

/// Assign boundary points along one face at `t = (i+1)/(N+1)` of the usable
/// span. The corner gap collapses when the face cannot otherwise fit every
/// port at minimum clearance.
fn spread_face(
    g: &Graph,
    node_idx: usize,
    face: Direction,
    members: &mut [GroupMember],
    ports: &mut FxHashMap<(usize, bool), PortInfo>,
) {
    // Sort by the neighbour's center along the face axis; ties by edge index.
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
    let (start, span) = match face {
        Direction::Top | Direction::Bottom => (rect.min_x(), rect.size.width),
        Direction::Left | Direction::Right => (rect.min_y(), rect.size.height),
    };

    let n = members.len() as f64;
    let mut gap = CORNER_GAP;
    if (span - 2.0 * gap) / (n + 1.0) < PORT_CLEARANCE {
        gap = ((span - (n + 1.0) * PORT_CLEARANCE) / 2.0).max(0.0);
    }
    let usable = (span - 2.0 * gap).max(0.0);

    for (i, member) in members.iter().enumerate() {
        let t = (i as f64 + 1.0) / (n + 1.0);
        let coord = start + gap + t * usable;
        let pt = match face {
            Direction::Top => point(coord, rect.min_y()),
            Direction::Bottom => point(coord, rect.max_y()),
            Direction::Left => point(rect.min_x(), coord),
            Direction::Right => point(rect.max_x(), coord),
        };
        ports.insert(
            (member.edge, member.is_source),
            PortInfo {
                edge: member.edge,
                node: node_idx,
                face,
                point: pt,
                is_source: member.is_source,
            },
        );
    }
}

/// For adjacent same-column (or same-row) pairs with facing ports, pull the
/// port on the busier face over to the quieter face's port coordinate. The
/// single-port face sits at face center; re-aligning it the other way would
/// drag it off-center, while the multi-port face has room to shift.
fn align_straight_pairs(
    g: &Graph,
    grid: &GridInfo,
    routable: &[usize],
    faces: &[Option<(Direction, Direction)>],
    assignment: &mut PortAssignment,
) {
    for (slot, &edge_idx) in routable.iter().enumerate() {
        let edge = &g.edges[edge_idx];
        let (r1, c1) = grid.cell_of[&edge.src];
        let (r2, c2) = grid.cell_of[&edge.dst];
        let Some((src_face, dst_face)) = faces[slot] else {
            continue;
        };

        let vertical_pair = c1 == c2
            && (r1 - r2).abs() == 1
            && src_face.exit_orientation() == crate::geom::Orientation::Vertical
            && dst_face.exit_orientation() == crate::geom::Orientation::Vertical;
        let horizontal_pair = r1 == r2
            && (c1 - c2).abs() == 1
            && src_face.exit_orientation() == crate::geom::Orientation::Horizontal
            && dst_face.exit_orientation() == crate::geom::Orientation::Horizontal;
        if !vertical_pair && !horizontal_pair {
            continue;
        }

        let src_count = assignment
            .face_counts
            .get(&(edge.src, src_face))
            .copied()
            .unwrap_or(0);
        let dst_count = assignment
            .face_counts
            .get(&(edge.dst, dst_face))
            .copied()
            .unwrap_or(0);

        let pair = assignment
            .by_edge
            .get_mut(&edge_idx)
            .expect("port pair assigned");
        if vertical_pair {
            if src_count <= dst_count {
                pair.1.point.x = pair.0.point.x;
            } else {
                pair.0.point.x = pair.1.point.x;
            }
        } else if src_count <= dst_count {
            pair.1.point.y = pair.0.point.y;
        } else {
            pair.0.point.y = pair.1.point.y;
        }
    }
}

//! Consistent ordering of routes that share a routing-graph stretch.
//!
//! Nudging needs a stable rank per edge inside a bundle; ranks come from the
//! first shared stretch an edge appears on (first-writer wins), separately
//! per orientation.

use crate::geom::Orientation;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::dijkstra::EdgeRoute;
use super::graph::RoutingGraph;

#[derive(Debug, Default)]
pub struct EdgeOrdering {
    pub horizontal: FxHashMap<usize, usize>,
    pub vertical: FxHashMap<usize, usize>,
}

impl EdgeOrdering {
    pub fn key(&self, orientation: Orientation, edge: usize) -> Option<usize> {
        match orientation {
            Orientation::Horizontal => self.horizontal.get(&edge).copied(),
            Orientation::Vertical => self.vertical.get(&edge).copied(),
        }
    }
}

pub fn compute(routes: &[EdgeRoute], graph: &RoutingGraph) -> EdgeOrdering {
    // Map each consecutive route pair onto its nearest graph vertices; a
    // canonicalised vertex pair used by several routes is a shared stretch.
    let mut groups: IndexMap<(usize, usize), Vec<usize>> = IndexMap::new();
    for (slot, route) in routes.iter().enumerate() {
        for pair in route.points.windows(2) {
            let (Some(a), Some(b)) = (graph.nearest(pair[0]), graph.nearest(pair[1])) else {
                continue;
            };
            if a == b {
                continue;
            }
            groups.entry((a.min(b), a.max(b))).or_default().push(slot);
        }
    }

    let mut ordering = EdgeOrdering::default();
    for ((a, b), slots) in &groups {
        let mut users: Vec<usize> = Vec::new();
        for &slot in slots {
            if !users.contains(&slot) {
                users.push(slot);
            }
        }
        if users.len() < 2 {
            continue;
        }

        let pa = graph.positions[*a];
        let pb = graph.positions[*b];
        let orientation = if (pa.x - pb.x).abs() > (pa.y - pb.y).abs() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };

        // Horizontal stretches order by where each route starts vertically,
        // vertical ones by where it starts horizontally.
        users.sort_by(|&x, &y| {
            let (first_x, first_y) = (routes[x].points[0], routes[y].points[0]);
            let (kx, ky) = match orientation {
                Orientation::Horizontal => (first_x.y, first_y.y),
                Orientation::Vertical => (first_x.x, first_y.x),
            };
            kx.total_cmp(&ky).then(routes[x].edge.cmp(&routes[y].edge))
        });

        let map = match orientation {
            Orientation::Horizontal => &mut ordering.horizontal,
            Orientation::Vertical => &mut ordering.vertical,
        };
        for (rank, &slot) in users.iter().enumerate() {
            map.entry(routes[slot].edge).or_insert(rank);
        }
    }

    ordering
}

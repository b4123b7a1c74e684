//! Corridor edge router for pre-positioned nodes.
//!
//! Pipeline: port assignment, channel discovery, routing-graph construction,
//! per-edge Dijkstra in priority order with crossing penalties, shared-stretch
//! ordering, and constraint-based nudging.

pub mod channels;
pub mod dijkstra;
pub mod graph;
pub mod nudge;
pub mod order;
pub mod ports;

use crate::geom::{Direction, Rect, manhattan};
use crate::model::{Graph, LabelPosition};
use crate::{Error, Result, RouteOptions};

use self::dijkstra::EdgeRoute;

/// Route the given edges over the already-positioned node boxes of `g`.
pub fn route_edges(g: &mut Graph, edge_ids: &[usize], opts: &RouteOptions) -> Result<()> {
    if edge_ids.is_empty() {
        return Ok(());
    }
    if g.nodes.is_empty() {
        return Err(Error::EmptyObjectSet);
    }

    tracing::debug!("router: routing {} edges", edge_ids.len());

    let obstacles = obstacle_nodes(g, edge_ids);
    let boxes: Vec<Rect> = obstacles.iter().map(|&idx| g.nodes[idx].rect).collect();

    let port_map = ports::assign(g, edge_ids);
    let port_list: Vec<ports::Port> = {
        let mut list = Vec::with_capacity(edge_ids.len() * 2);
        for &edge_idx in edge_ids {
            let (src, dst) = port_map.by_edge[&edge_idx];
            list.push(src);
            list.push(dst);
        }
        list
    };
    let port_points: Vec<crate::geom::Point> = port_list.iter().map(|p| p.pos).collect();

    let bbox = channels::routing_bbox(&boxes);
    let channel_list = channels::discover(&boxes, &bbox);
    let tracks = channels::representatives(&channel_list, &port_list);
    let mut routing_graph = graph::build(&tracks, &port_points, &boxes);

    // Direct face pairs claim the most constrained corridors first, then the
    // longest edges; ties fall back to input order.
    let mut order_of_attack: Vec<usize> = edge_ids.to_vec();
    order_of_attack.sort_by(|&a, &b| {
        let (sa, da) = port_map.by_edge[&a];
        let (sb, db) = port_map.by_edge[&b];
        let direct_a = !is_direct_pair(sa.face, da.face);
        let direct_b = !is_direct_pair(sb.face, db.face);
        let dist_a = manhattan(sa.pos, da.pos);
        let dist_b = manhattan(sb.pos, db.pos);
        direct_a
            .cmp(&direct_b)
            .then(dist_b.total_cmp(&dist_a))
            .then(a.cmp(&b))
    });

    let penalty = opts.crossing_penalty as f64;
    let mut routes: Vec<EdgeRoute> = Vec::with_capacity(order_of_attack.len());
    for &edge_idx in &order_of_attack {
        let (src_pos, dst_pos) = port_map.points(edge_idx);
        let points = dijkstra::route(&routing_graph, src_pos, dst_pos);
        dijkstra::apply_crossing_penalties(&mut routing_graph, &points, penalty);
        routes.push(EdgeRoute {
            edge: edge_idx,
            points,
        });
    }

    let ordering = order::compute(&routes, &routing_graph);
    nudge::nudge(
        &mut routes,
        &channel_list,
        &ordering,
        opts.edge_spacing as f64,
    );

    for route in routes {
        let edge = &mut g.edges[route.edge];
        edge.route = route.points;
        if edge.label.is_some() && edge.label_position.is_none() {
            edge.label_position = Some(LabelPosition::OutsideTopCenter);
        }
    }

    Ok(())
}

fn is_direct_pair(src: Direction, dst: Direction) -> bool {
    matches!(
        (src, dst),
        (Direction::Bottom, Direction::Top)
            | (Direction::Top, Direction::Bottom)
            | (Direction::Right, Direction::Left)
            | (Direction::Left, Direction::Right)
    )
}

/// Obstacle boxes: the siblings of the edge set under its common parent, or
/// the union of endpoint nodes when no single parent covers every endpoint.
fn obstacle_nodes(g: &Graph, edge_ids: &[usize]) -> Vec<usize> {
    let parents = g.parents();

    let mut endpoints: Vec<usize> = Vec::new();
    for &edge_idx in edge_ids {
        let edge = &g.edges[edge_idx];
        for node in [edge.src, edge.dst] {
            if !endpoints.contains(&node) {
                endpoints.push(node);
            }
        }
    }

    let common = endpoints
        .first()
        .map(|&n| parents[n])
        .filter(|&p| endpoints.iter().all(|&n| parents[n] == p));

    match common {
        Some(Some(parent)) => g.nodes[parent].children.clone(),
        // All endpoints at the root level: every root is an obstacle.
        Some(None) => g.roots(),
        None => endpoints,
    }
}

use moray::corridor::{channels, dijkstra, graph as routing_graph, ports};
use moray::geom::{Point, point, rect};
use moray::model::{Edge, Graph, Node};
use moray::{Error, RouteOptions};

fn positioned(boxes: &[(f64, f64, f64, f64)], edges: &[(usize, usize)]) -> Graph {
    let mut g = Graph::new();
    for (i, &(x, y, w, h)) in boxes.iter().enumerate() {
        let mut node = Node::new(format!("n{i}"), w, h);
        node.rect = rect(x, y, w, h);
        g.add_node(node);
    }
    for &(src, dst) in edges {
        g.add_edge(Edge::new(src, dst));
    }
    g
}

fn assert_orthogonal(route: &[Point]) {
    assert!(route.len() >= 2);
    for pair in route.windows(2) {
        assert!(
            (pair[0].x - pair[1].x).abs() <= 0.5 || (pair[0].y - pair[1].y).abs() <= 0.5,
            "segment {:?} -> {:?} is not axis-aligned",
            pair[0],
            pair[1]
        );
    }
    for p in route {
        assert!(p.x.is_finite() && p.y.is_finite(), "bad coordinate {p:?}");
    }
}

#[test]
fn facing_pair_routes_straight_through_the_gap() {
    let mut g = positioned(
        &[(0.0, 0.0, 100.0, 60.0), (180.0, 0.0, 100.0, 60.0)],
        &[(0, 1)],
    );
    moray::route_edges(&mut g, &[0], &RouteOptions::default()).unwrap();

    let route = &g.edges[0].route;
    assert_eq!(route.len(), 2, "expected a straight route, got {route:?}");
    assert!((route[0].x - 100.0).abs() < 1e-6);
    assert!((route[1].x - 180.0).abs() < 1e-6);
    // Overlap alignment put both ports at the shared vertical midpoint.
    assert!((route[0].y - 30.0).abs() < 1e-6);
    assert!((route[1].y - 30.0).abs() < 1e-6);
}

#[test]
fn vertical_facing_pair_aligns_on_the_overlap_midpoint() {
    let mut g = positioned(
        &[(0.0, 0.0, 100.0, 60.0), (20.0, 140.0, 100.0, 60.0)],
        &[(0, 1)],
    );
    moray::route_edges(&mut g, &[0], &RouteOptions::default()).unwrap();

    let route = &g.edges[0].route;
    // Overlap is x in [20, 100], midpoint 60, inside both inner spans.
    assert!((route[0].y - 60.0).abs() < 1e-6);
    assert!((route[0].x - 60.0).abs() < 1e-6);
    assert!((route.last().unwrap().x - 60.0).abs() < 1e-6);
    assert_orthogonal(route);
}

#[test]
fn detour_avoids_a_box_between_the_endpoints() {
    let mut g = positioned(
        &[
            (0.0, 0.0, 100.0, 60.0),
            (180.0, 0.0, 100.0, 60.0),
            (360.0, 0.0, 100.0, 60.0),
        ],
        &[(0, 2)],
    );
    moray::route_edges(&mut g, &[0], &RouteOptions::default()).unwrap();

    let route = &g.edges[0].route;
    assert_orthogonal(route);
    assert!(route.len() > 2, "a detour needs bends: {route:?}");
    let blocker = g.nodes[1].rect.inflate(2.0, 2.0);
    for pair in route.windows(2) {
        assert!(
            !moray::geom::segment_intersects_rect(pair[0], pair[1], &blocker),
            "route cuts through the middle box: {route:?}"
        );
    }
}

#[test]
fn self_loop_goes_out_one_face_and_back_the_next() {
    let mut g = positioned(&[(0.0, 0.0, 100.0, 60.0)], &[(0, 0)]);
    moray::route_edges(&mut g, &[0], &RouteOptions::default()).unwrap();

    let route = &g.edges[0].route;
    assert!(route.len() >= 3, "a loop cannot be straight: {route:?}");
    assert_orthogonal(route);
    // Primary face is the top, secondary its clockwise neighbour (right).
    let first = route[0];
    let last = *route.last().unwrap();
    assert!((first.y - 0.0).abs() < 1e-6, "loop should leave the top face");
    assert!((last.x - 100.0).abs() < 1e-6, "loop should enter the right face");
}

#[test]
fn empty_edge_list_is_a_no_op() {
    let mut g = positioned(&[(0.0, 0.0, 100.0, 60.0)], &[]);
    let before = g.clone();
    moray::route_edges(&mut g, &[], &RouteOptions::default()).unwrap();
    assert_eq!(g, before);
}

#[test]
fn routing_without_objects_is_an_error() {
    let mut g = Graph::new();
    g.add_edge(Edge::new(0, 1));
    let err = moray::route_edges(&mut g, &[0], &RouteOptions::default()).unwrap_err();
    assert!(matches!(err, Error::EmptyObjectSet));
}

#[test]
fn corridor_edge_labels_default_outside_top_center() {
    let mut g = positioned(
        &[(0.0, 0.0, 100.0, 60.0), (180.0, 0.0, 100.0, 60.0)],
        &[(0, 1)],
    );
    g.edges[0].label = Some(moray::LabelInfo {
        text: "calls".to_string(),
        width: 30.0,
        height: 14.0,
    });
    moray::route_edges(&mut g, &[0], &RouteOptions::default()).unwrap();
    assert_eq!(
        g.edges[0].label_position,
        Some(moray::LabelPosition::OutsideTopCenter)
    );
}

#[test]
fn crossing_penalties_are_an_involution() {
    let boxes = vec![rect(0.0, 0.0, 100.0, 60.0), rect(180.0, 0.0, 100.0, 60.0)];
    let bbox = channels::routing_bbox(&boxes);
    let channel_list = channels::discover(&boxes, &bbox);
    let tracks = channels::representatives(&channel_list, &[]);
    let mut graph = routing_graph::build(&tracks, &[], &boxes);

    let before: Vec<Vec<f64>> = graph
        .adjacency
        .iter()
        .map(|adj| adj.iter().map(|e| e.weight).collect())
        .collect();

    // A horizontal stab through the inter-box gap crosses the vertical track.
    let route = vec![point(90.0, 50.0), point(200.0, 50.0)];
    let applied = dijkstra::apply_crossing_penalties(&mut graph, &route, 500.0);
    assert!(!applied.is_empty(), "the stab must cross something");

    let mut changed = false;
    for (u, adj) in graph.adjacency.iter().enumerate() {
        for (i, e) in adj.iter().enumerate() {
            if e.weight != before[u][i] {
                changed = true;
            }
        }
    }
    assert!(changed, "penalties must raise weights");

    dijkstra::remove_crossing_penalties(&mut graph, &applied, 500.0);
    let after: Vec<Vec<f64>> = graph
        .adjacency
        .iter()
        .map(|adj| adj.iter().map(|e| e.weight).collect())
        .collect();
    assert_eq!(before, after, "add then remove must restore every weight");
}

#[test]
fn unreachable_ports_fall_back_to_a_straight_segment() {
    let graph = routing_graph::RoutingGraph::default();
    let route = dijkstra::route(&graph, point(0.0, 0.0), point(50.0, 80.0));
    assert_eq!(route, vec![point(0.0, 0.0), point(50.0, 80.0)]);
}

#[test]
fn corridor_routing_is_deterministic() {
    let boxes = [
        (0.0, 0.0, 100.0, 60.0),
        (180.0, 0.0, 100.0, 60.0),
        (0.0, 140.0, 100.0, 60.0),
        (180.0, 140.0, 100.0, 60.0),
    ];
    let edges = [(0usize, 3usize), (1, 2), (0, 1), (2, 3)];
    let edge_ids: Vec<usize> = (0..edges.len()).collect();

    let mut a = positioned(&boxes, &edges);
    let mut b = positioned(&boxes, &edges);
    moray::route_edges(&mut a, &edge_ids, &RouteOptions::default()).unwrap();
    moray::route_edges(&mut b, &edge_ids, &RouteOptions::default()).unwrap();
    assert_eq!(a, b);

    for edge in &a.edges {
        assert_orthogonal(&edge.route);
    }
}

#[test]
fn sibling_obstacles_come_from_the_common_parent() {
    // Two children of one container, plus an unrelated root far away.
    let mut g = positioned(
        &[
            (0.0, 0.0, 400.0, 300.0),
            (20.0, 20.0, 100.0, 60.0),
            (260.0, 20.0, 100.0, 60.0),
            (1000.0, 1000.0, 100.0, 60.0),
        ],
        &[(1, 2)],
    );
    g.nodes[0].children = vec![1, 2];
    moray::route_edges(&mut g, &[0], &RouteOptions::default()).unwrap();

    let route = &g.edges[0].route;
    assert_orthogonal(route);
    // The route stays in the container's neighbourhood; the far root is not
    // part of the obstacle world.
    for p in route {
        assert!(p.x < 600.0 && p.y < 600.0, "route strayed to {p:?}");
    }
}

#[test]
fn port_assignment_spreads_multi_edges() {
    let g = positioned(
        &[(0.0, 0.0, 100.0, 60.0), (180.0, 80.0, 100.0, 60.0)],
        &[(0, 1), (0, 1)],
    );
    let map = ports::assign(&g, &[0, 1]);
    let (a_src, _) = map.by_edge[&0];
    let (b_src, _) = map.by_edge[&1];
    assert_eq!(a_src.face, b_src.face);
    assert_ne!(a_src.pos, b_src.pos, "multi-edge ports must not collide");
}

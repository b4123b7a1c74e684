use moray::geom::Direction;
use moray::model::{Edge, Graph, Node};
use moray::route::ports;
use moray::{grid, route};

fn graph_of(n: usize, edges: &[(usize, usize)]) -> Graph {
    let mut g = Graph::new();
    for i in 0..n {
        g.add_node(Node::new(format!("n{i}"), 100.0, 60.0));
    }
    for &(src, dst) in edges {
        g.add_edge(Edge::new(src, dst));
    }
    g
}

#[test]
fn satellites_spread_monotonically_across_the_hub_face() {
    // Four satellites feed a 100x80 hub below them; every destination port
    // lands on the hub's top face.
    let mut g = graph_of(5, &[(0, 4), (1, 4), (2, 4), (3, 4)]);
    g.nodes[4].rect.size.height = 80.0;
    let cells = [
        (0usize, (0, 0)),
        (1, (0, 1)),
        (2, (0, 2)),
        (3, (1, 1)),
        (4, (2, 1)),
    ];
    let info = grid::place_at(&mut g, &cells, 80.0);
    let routable: Vec<usize> = (0..4).collect();
    let assignment = ports::assign(&g, &info, &routable);

    let mut xs: Vec<f64> = Vec::new();
    for edge_idx in 0..4 {
        let (_, dst) = assignment.by_edge[&edge_idx];
        assert_eq!(dst.face, Direction::Top, "edge {edge_idx} missed the top face");
        assert_eq!(dst.node, 4);
        xs.push(dst.point.x);
    }

    let mut sorted = xs.clone();
    sorted.sort_by(f64::total_cmp);
    for pair in sorted.windows(2) {
        assert!(
            pair[1] - pair[0] > 4.0,
            "ports too close together: {sorted:?}"
        );
    }
    assert_eq!(sorted.len(), 4);
    for pair in sorted.windows(2) {
        assert!(pair[0] < pair[1], "duplicate port positions: {sorted:?}");
    }
}

#[test]
fn port_order_follows_the_neighbours() {
    // Left, middle, right satellites over one hub: their hub-side ports keep
    // that left-to-right order.
    let mut g = graph_of(4, &[(0, 3), (1, 3), (2, 3)]);
    let cells = [(0usize, (0, 0)), (1, (0, 1)), (2, (0, 2)), (3, (2, 1))];
    let info = grid::place_at(&mut g, &cells, 80.0);
    let assignment = ports::assign(&g, &info, &[0, 1, 2]);

    let x0 = assignment.by_edge[&0].1.point.x;
    let x1 = assignment.by_edge[&1].1.point.x;
    let x2 = assignment.by_edge[&2].1.point.x;
    assert!(x0 < x1 && x1 < x2, "ports out of order: {x0} {x1} {x2}");
}

#[test]
fn equal_diagonals_balance_between_faces() {
    // One satellite straight above loads the hub's top face; the diagonal
    // edge then prefers the hub's free horizontal face.
    let mut g = graph_of(3, &[(0, 2), (1, 2)]);
    let cells = [(0usize, (0, 0)), (1, (0, 1)), (2, (1, 1))];
    let info = grid::place_at(&mut g, &cells, 80.0);
    let assignment = ports::assign(&g, &info, &[0, 1]);

    // Edge 1 is the same-column pair: Bottom -> Top, assigned in pass 1.
    assert_eq!(assignment.by_edge[&1].0.face, Direction::Bottom);
    assert_eq!(assignment.by_edge[&1].1.face, Direction::Top);

    // Edge 0 is the equal diagonal: its destination avoids the loaded top
    // face and takes the horizontal one pointing back at the source.
    assert_eq!(assignment.by_edge[&0].1.face, Direction::Left);
}

#[test]
fn aligned_straight_pair_shares_one_axis() {
    // The hub's top face carries three ports; the single-port face below it
    // keeps its center and the hub port moves over.
    let mut g = graph_of(3, &[(0, 2), (1, 2)]);
    let cells = [(0usize, (0, 0)), (1, (1, 1)), (2, (2, 1))];
    let info = grid::place_at(&mut g, &cells, 80.0);
    route::run(&mut g, &info);

    let route = &g.edges[1].route;
    assert_eq!(route.len(), 2, "aligned pair should route straight: {route:?}");
    assert!((route[0].x - g.nodes[1].rect.center().x).abs() <= 0.5);
    assert!((route[0].x - route[1].x).abs() <= 0.5);
}

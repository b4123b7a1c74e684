use moray::geom::Point;
use moray::model::{Edge, Graph, Node};
use moray::RouteOptions;

fn positioned(boxes: &[(f64, f64, f64, f64)], edges: &[(usize, usize)]) -> Graph {
    let mut g = Graph::new();
    for (i, &(x, y, w, h)) in boxes.iter().enumerate() {
        let mut node = Node::new(format!("n{i}"), w, h);
        node.rect = moray::geom::rect(x, y, w, h);
        g.add_node(node);
    }
    for &(src, dst) in edges {
        g.add_edge(Edge::new(src, dst));
    }
    g
}

/// X coordinates of the route's vertical stretches inside [lo, hi].
fn vertical_stretch_xs(route: &[Point], lo: f64, hi: f64) -> Vec<f64> {
    route
        .windows(2)
        .filter(|w| (w[0].x - w[1].x).abs() <= 0.5 && (w[0].y - w[1].y).abs() > 0.5)
        .map(|w| (w[0].x + w[1].x) / 2.0)
        .filter(|&x| lo < x && x < hi)
        .collect()
}

#[test]
fn shared_channel_users_get_separated_tracks() {
    // Two rows of three boxes; both edges cross the same vertical channel
    // between the first and second column.
    let mut g = positioned(
        &[
            (0.0, 0.0, 100.0, 60.0),
            (180.0, 0.0, 100.0, 60.0),
            (360.0, 0.0, 100.0, 60.0),
            (0.0, 140.0, 100.0, 60.0),
            (180.0, 140.0, 100.0, 60.0),
            (360.0, 140.0, 100.0, 60.0),
        ],
        &[(0, 4), (1, 3)],
    );
    let opts = RouteOptions::default();
    moray::route_edges(&mut g, &[0, 1], &opts).unwrap();

    let xs_a = vertical_stretch_xs(&g.edges[0].route, 100.0, 180.0);
    let xs_b = vertical_stretch_xs(&g.edges[1].route, 100.0, 180.0);
    assert!(
        !xs_a.is_empty() && !xs_b.is_empty(),
        "both routes should pass the first channel: {:?} / {:?}",
        g.edges[0].route,
        g.edges[1].route
    );

    let spacing = opts.edge_spacing as f64;
    for &xa in &xs_a {
        for &xb in &xs_b {
            assert!(
                (xa - xb).abs() >= spacing - 1e-6,
                "channel tracks too close: {xa} vs {xb}"
            );
        }
    }
}

#[test]
fn nudged_routes_remain_orthogonal_with_fixed_ports() {
    let mut g = positioned(
        &[
            (0.0, 0.0, 100.0, 60.0),
            (180.0, 0.0, 100.0, 60.0),
            (360.0, 0.0, 100.0, 60.0),
            (0.0, 140.0, 100.0, 60.0),
            (180.0, 140.0, 100.0, 60.0),
            (360.0, 140.0, 100.0, 60.0),
        ],
        &[(0, 4), (1, 3)],
    );
    moray::route_edges(&mut g, &[0, 1], &RouteOptions::default()).unwrap();

    for edge in &g.edges {
        let route = &edge.route;
        assert!(route.len() >= 2);
        for pair in route.windows(2) {
            assert!(
                (pair[0].x - pair[1].x).abs() <= 0.5 || (pair[0].y - pair[1].y).abs() <= 0.5,
                "nudging broke orthogonality: {route:?}"
            );
        }

        // Ports still sit on their node boundaries.
        let src = g.nodes[edge.src].rect;
        let dst = g.nodes[edge.dst].rect;
        let first = route[0];
        let last = *route.last().unwrap();
        assert!(
            (first.x - src.min_x()).abs() < 0.01
                || (first.x - src.max_x()).abs() < 0.01
                || (first.y - src.min_y()).abs() < 0.01
                || (first.y - src.max_y()).abs() < 0.01
        );
        assert!(
            (last.x - dst.min_x()).abs() < 0.01
                || (last.x - dst.max_x()).abs() < 0.01
                || (last.y - dst.min_y()).abs() < 0.01
                || (last.y - dst.max_y()).abs() < 0.01
        );
    }
}

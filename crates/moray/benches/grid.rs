use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use moray::model::{Edge, Graph, Node};
use moray::LayoutOptions;
use std::hint::black_box;

#[derive(Debug, Clone)]
struct GraphSpec {
    nodes: usize,
    edges: Vec<(usize, usize)>,
}

impl GraphSpec {
    fn mesh(cols: usize, rows: usize) -> Self {
        let nodes = cols * rows;
        let mut edges = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let i = r * cols + c;
                if c + 1 < cols {
                    edges.push((i, i + 1));
                }
                if r + 1 < rows {
                    edges.push((i, i + cols));
                }
            }
        }
        Self { nodes, edges }
    }

    fn build(&self) -> Graph {
        let mut g = Graph::new();
        for i in 0..self.nodes {
            g.add_node(Node::new(format!("n{i}"), 100.0, 60.0));
        }
        for &(src, dst) in &self.edges {
            g.add_edge(Edge::new(src, dst));
        }
        g
    }
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for (name, spec) in [
        ("mesh_3x3", GraphSpec::mesh(3, 3)),
        ("mesh_5x4", GraphSpec::mesh(5, 4)),
        ("mesh_8x5", GraphSpec::mesh(8, 5)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &spec, |b, spec| {
            b.iter(|| {
                let mut g = spec.build();
                moray::layout(&mut g, &LayoutOptions::default()).unwrap();
                black_box(g)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);

//! Standalone L/Z edge router for grid-placed graphs.
//!
//! Runs after [`crate::grid::place`]: assigns ports per edge, constructs
//! straight/L/Z orthogonal candidates, and fills in default label positions.

pub mod labels;
pub mod lz;
pub mod ports;

use crate::grid::GridInfo;
use crate::model::Graph;

/// Route every edge between two distinct placed nodes, then place labels.
pub fn run(g: &mut Graph, grid: &GridInfo) {
    let routable: Vec<usize> = g
        .edges
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            e.src != e.dst && grid.cell_of.contains_key(&e.src) && grid.cell_of.contains_key(&e.dst)
        })
        .map(|(i, _)| i)
        .collect();

    let assignment = ports::assign(g, grid, &routable);
    lz::route_all(g, grid, &routable, &assignment);
    labels::apply(g, &routable);
}

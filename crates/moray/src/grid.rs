//! Grid-snap placement.
//!
//! Maps the root node set onto a virtual grid of variable-size cells: BFS from
//! the highest-degree node with direction-hint preferences, a bounded local
//! improvement pass over a Manhattan-plus-blocking cost, then conversion to
//! absolute coordinates with one routing channel of clearance around every
//! cell.

use crate::geom::{Point, point};
use crate::model::{Graph, LayoutDirection};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Clearance reserved around every grid cell for edge routing.
pub const DEFAULT_CHANNEL: f64 = 80.0;
/// Upper bound on local-improvement passes.
pub const DEFAULT_IMPROVE_PASSES: usize = 5;

/// Cost added per occupied cell sitting on a candidate route.
const BLOCKING_PENALTY: f64 = 4.0;
/// Pairwise swaps are only attempted within this many nodes.
const SWAP_WINDOW: usize = 30;
/// Spiral search radii tried by `find_best_cell` before the escape column.
const SPIRAL_RADII: std::ops::RangeInclusive<i32> = 2..=20;
/// Column stride of the last-resort escape placement.
const ESCAPE_STRIDE: i32 = 100;

pub type Cell = (i32, i32);

/// Output of placement: cell assignment plus the geometry of the grid.
#[derive(Debug, Clone)]
pub struct GridInfo {
    /// Node indices that were placed (the root set), in input order.
    pub nodes: Vec<usize>,
    /// Node index -> normalised `(row, col)`.
    pub cell_of: FxHashMap<usize, Cell>,
    /// Inverse mapping; unique per occupied cell, total on the placed set.
    pub node_at: FxHashMap<Cell, usize>,
    pub col_width: Vec<f64>,
    pub row_height: Vec<f64>,
    /// Prefix sums: left x of each column, top y of each row.
    pub col_x: Vec<f64>,
    pub row_y: Vec<f64>,
    pub channel: f64,
}

impl GridInfo {
    pub fn cell(&self, node: usize) -> Option<Cell> {
        self.cell_of.get(&node).copied()
    }

    pub fn cell_center(&self, (row, col): Cell) -> Point {
        point(
            self.col_x[col as usize] + self.col_width[col as usize] / 2.0,
            self.row_y[row as usize] + self.row_height[row as usize] / 2.0,
        )
    }

    pub fn row_top(&self, row: i32) -> f64 {
        self.row_y[row as usize]
    }

    pub fn row_bottom(&self, row: i32) -> f64 {
        self.row_y[row as usize] + self.row_height[row as usize]
    }

    pub fn col_left(&self, col: i32) -> f64 {
        self.col_x[col as usize]
    }

    pub fn col_right(&self, col: i32) -> f64 {
        self.col_x[col as usize] + self.col_width[col as usize]
    }

    pub fn rows(&self) -> usize {
        self.row_height.len()
    }

    pub fn cols(&self) -> usize {
        self.col_width.len()
    }
}

/// Place the root nodes of `g` on the grid and set their absolute boxes.
///
/// Degenerate inputs (empty, single node, disconnected singleton clusters)
/// all produce legal placements; this never fails.
pub fn place(g: &mut Graph, channel: f64, improve_passes: usize) -> GridInfo {
    let placed: Vec<usize> = g.roots();

    let mut state = PlacementState::build(g, &placed);
    state.assign_initial_cells(g.direction);
    state.improve(improve_passes);
    state.normalise();

    let cells = state.cells;
    build_grid(g, placed, cells, channel)
}

/// Grid geometry for an explicit cell assignment; for callers that computed
/// cells elsewhere. Cells must be non-negative and unique.
pub fn place_at(g: &mut Graph, assignment: &[(usize, Cell)], channel: f64) -> GridInfo {
    let placed: Vec<usize> = assignment.iter().map(|&(node, _)| node).collect();
    let cells: Vec<Cell> = assignment.iter().map(|&(_, cell)| cell).collect();
    build_grid(g, placed, cells, channel)
}

fn build_grid(g: &mut Graph, placed: Vec<usize>, cells: Vec<Cell>, channel: f64) -> GridInfo {
    let n = placed.len();

    // Column widths and row heights from the largest occupant plus channel.
    let (max_row, max_col) = cells
        .iter()
        .fold((0, 0), |(mr, mc), &(r, c)| (mr.max(r), mc.max(c)));
    let rows = if n == 0 { 0 } else { (max_row + 1) as usize };
    let cols = if n == 0 { 0 } else { (max_col + 1) as usize };

    let mut col_width = vec![channel; cols];
    let mut row_height = vec![channel; rows];
    for (local, &(r, c)) in cells.iter().enumerate() {
        let size = g.nodes[placed[local]].rect.size;
        let cw = &mut col_width[c as usize];
        *cw = cw.max(size.width + channel);
        let rh = &mut row_height[r as usize];
        *rh = rh.max(size.height + channel);
    }

    let mut col_x = vec![0.0; cols];
    for c in 1..cols {
        col_x[c] = col_x[c - 1] + col_width[c - 1];
    }
    let mut row_y = vec![0.0; rows];
    for r in 1..rows {
        row_y[r] = row_y[r - 1] + row_height[r - 1];
    }

    let mut cell_of = FxHashMap::default();
    let mut node_at = FxHashMap::default();
    for (local, &cell) in cells.iter().enumerate() {
        cell_of.insert(placed[local], cell);
        node_at.insert(cell, placed[local]);
    }

    let grid = GridInfo {
        nodes: placed,
        cell_of,
        node_at,
        col_width,
        row_height,
        col_x,
        row_y,
        channel,
    };

    // Absolute boxes: node center coincides with its cell center.
    for &idx in &grid.nodes {
        let cell = grid.cell_of[&idx];
        let center = grid.cell_center(cell);
        let size = g.nodes[idx].rect.size;
        g.nodes[idx].rect.origin = point(center.x - size.width / 2.0, center.y - size.height / 2.0);
    }

    grid
}

/// Working state over local indices into the placed-node list.
struct PlacementState {
    /// Local index -> cell; meaningful only once assigned.
    cells: Vec<Cell>,
    occupied: FxHashMap<Cell, usize>,
    adj: Vec<Vec<usize>>,
    degree: Vec<usize>,
    /// `(a, b)` present iff an edge a -> b exists in the input.
    outgoing: FxHashSet<(usize, usize)>,
    /// Unique undirected pairs, for the cost function.
    pairs: Vec<(usize, usize)>,
    col_bound: i32,
}

impl PlacementState {
    fn build(g: &Graph, placed: &[usize]) -> Self {
        let n = placed.len();
        let local_of: FxHashMap<usize, usize> =
            placed.iter().enumerate().map(|(l, &i)| (i, l)).collect();

        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut outgoing: FxHashSet<(usize, usize)> = FxHashSet::default();
        let mut pair_set: FxHashSet<(usize, usize)> = FxHashSet::default();
        let mut pairs: Vec<(usize, usize)> = Vec::new();

        for edge in &g.edges {
            let (Some(&a), Some(&b)) = (local_of.get(&edge.src), local_of.get(&edge.dst)) else {
                continue;
            };
            if a == b {
                continue;
            }
            outgoing.insert((a, b));
            let key = (a.min(b), a.max(b));
            if pair_set.insert(key) {
                pairs.push(key);
                adj[a].push(b);
                adj[b].push(a);
            }
        }

        let degree: Vec<usize> = adj.iter().map(|nb| nb.len()).collect();
        let col_bound = (n as f64).sqrt().ceil() as i32;

        Self {
            cells: vec![(0, 0); n],
            occupied: FxHashMap::default(),
            adj,
            degree,
            outgoing,
            pairs,
            col_bound,
        }
    }

    fn assign_initial_cells(&mut self, direction: LayoutDirection) {
        let n = self.cells.len();
        if n == 0 {
            return;
        }

        let mut visited = vec![false; n];

        // BFS root: maximum degree, ties broken by input index.
        let root = (0..n).max_by_key(|&i| (self.degree[i], usize::MAX - i)).unwrap_or(0);

        self.place_component(root, (0, 0), direction, &mut visited);

        // Remaining components: seed at the free cell nearest the origin.
        for i in 0..n {
            if visited[i] {
                continue;
            }
            let seed = self.free_cell_near_origin();
            self.place_component(i, seed, direction, &mut visited);
        }
    }

    fn place_component(
        &mut self,
        root: usize,
        seed: Cell,
        direction: LayoutDirection,
        visited: &mut [bool],
    ) {
        visited[root] = true;
        self.cells[root] = seed;
        self.occupied.insert(seed, root);

        let mut queue: VecDeque<usize> = VecDeque::new();
        queue.push_back(root);

        while let Some(cur) = queue.pop_front() {
            let mut neighbours: Vec<usize> = self.adj[cur]
                .iter()
                .copied()
                .filter(|&nb| !visited[nb])
                .collect();
            // Degree desc, outgoing before incoming, index asc.
            neighbours.sort_by_key(|&nb| {
                (
                    usize::MAX - self.degree[nb],
                    !self.outgoing.contains(&(cur, nb)),
                    nb,
                )
            });

            for nb in neighbours {
                if visited[nb] {
                    continue;
                }
                let backward = self.outgoing.contains(&(nb, cur))
                    && !self.outgoing.contains(&(cur, nb));
                let prefs = direction_offsets(direction, backward);
                let cell = self.find_best_cell(self.cells[cur], &prefs);
                visited[nb] = true;
                self.cells[nb] = cell;
                self.occupied.insert(cell, nb);
                queue.push_back(nb);
            }
        }
    }

    fn find_best_cell(&self, (row, col): Cell, prefs: &[Cell; 4]) -> Cell {
        for bounded in [true, false] {
            for &(dr, dc) in prefs {
                let cand = (row + dr, col + dc);
                if self.cell_is_free(cand, bounded) {
                    return cand;
                }
            }
        }

        for bounded in [true, false] {
            for radius in SPIRAL_RADII {
                for dr in -radius..=radius {
                    for dc in -radius..=radius {
                        if dr.abs().max(dc.abs()) != radius {
                            continue;
                        }
                        let cand = (row + dr, col + dc);
                        if self.cell_is_free(cand, bounded) {
                            return cand;
                        }
                    }
                }
            }
        }

        // Last resort: march right in big strides; guarantees termination.
        let mut cand = (row, col + ESCAPE_STRIDE);
        while self.occupied.contains_key(&cand) {
            cand.1 += ESCAPE_STRIDE;
        }
        cand
    }

    fn cell_is_free(&self, cell: Cell, bounded: bool) -> bool {
        if bounded && cell.1.abs() > self.col_bound {
            return false;
        }
        !self.occupied.contains_key(&cell)
    }

    fn free_cell_near_origin(&self) -> Cell {
        for radius in 0_i32.. {
            for dr in -radius..=radius {
                for dc in -radius..=radius {
                    if dr.abs().max(dc.abs()) != radius {
                        continue;
                    }
                    let cand = (dr, dc);
                    if !self.occupied.contains_key(&cand) {
                        return cand;
                    }
                }
            }
        }
        unreachable!()
    }

    /// Total cost: Manhattan distance per edge, plus a penalty for each
    /// occupied cell a straight candidate route would have to pass, and for
    /// diagonal pairs whose both L-corners are taken.
    fn layout_cost(&self) -> f64 {
        let mut total = 0.0;
        for &(a, b) in &self.pairs {
            let (r1, c1) = self.cells[a];
            let (r2, c2) = self.cells[b];
            total += ((r1 - r2).abs() + (c1 - c2).abs()) as f64;

            if r1 == r2 {
                let (lo, hi) = (c1.min(c2), c1.max(c2));
                for c in lo + 1..hi {
                    if self.occupied.contains_key(&(r1, c)) {
                        total += BLOCKING_PENALTY;
                    }
                }
            } else if c1 == c2 {
                let (lo, hi) = (r1.min(r2), r1.max(r2));
                for r in lo + 1..hi {
                    if self.occupied.contains_key(&(r, c1)) {
                        total += BLOCKING_PENALTY;
                    }
                }
            } else {
                // Either L-corner yields a working route; penalise only when
                // both are taken.
                let corner_a = self.occupied.contains_key(&(r1, c2));
                let corner_b = self.occupied.contains_key(&(r2, c1));
                if corner_a && corner_b {
                    total += BLOCKING_PENALTY;
                }
            }
        }
        total
    }

    fn improve(&mut self, max_passes: usize) {
        let n = self.cells.len();
        if n < 2 {
            return;
        }

        let mut cost = self.layout_cost();
        for _ in 0..max_passes {
            let mut improved = false;

            // Unit moves into free cells; first strict improvement wins.
            for i in 0..n {
                let from = self.cells[i];
                for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                    let to = (from.0 + dr, from.1 + dc);
                    if self.occupied.contains_key(&to) {
                        continue;
                    }
                    self.occupied.remove(&from);
                    self.occupied.insert(to, i);
                    self.cells[i] = to;
                    let candidate = self.layout_cost();
                    if candidate < cost {
                        cost = candidate;
                        improved = true;
                        break;
                    }
                    self.occupied.remove(&to);
                    self.occupied.insert(from, i);
                    self.cells[i] = from;
                }
            }

            // Pairwise swaps within a bounded window.
            let window = n.min(SWAP_WINDOW);
            for i in 0..window {
                for j in i + 1..window {
                    let (ci, cj) = (self.cells[i], self.cells[j]);
                    self.occupied.insert(ci, j);
                    self.occupied.insert(cj, i);
                    self.cells[i] = cj;
                    self.cells[j] = ci;
                    let candidate = self.layout_cost();
                    if candidate < cost {
                        cost = candidate;
                        improved = true;
                    } else {
                        self.occupied.insert(ci, i);
                        self.occupied.insert(cj, j);
                        self.cells[i] = ci;
                        self.cells[j] = cj;
                    }
                }
            }

            if !improved {
                break;
            }
        }
    }

    fn normalise(&mut self) {
        if self.cells.is_empty() {
            return;
        }
        let min_row = self.cells.iter().map(|&(r, _)| r).min().unwrap_or(0);
        let min_col = self.cells.iter().map(|&(_, c)| c).min().unwrap_or(0);
        if min_row == 0 && min_col == 0 {
            return;
        }
        let mut occupied = FxHashMap::default();
        for (i, cell) in self.cells.iter_mut().enumerate() {
            cell.0 -= min_row;
            cell.1 -= min_col;
            occupied.insert(*cell, i);
        }
        self.occupied = occupied;
    }
}

/// Preference order of unit offsets for a direction hint: primary direction
/// first, clockwise rotations following. A backward edge gets the reversed
/// primary first instead.
fn direction_offsets(direction: LayoutDirection, backward: bool) -> [Cell; 4] {
    let primary: Cell = match direction {
        LayoutDirection::Right => (0, 1),
        LayoutDirection::Down => (1, 0),
        LayoutDirection::Left => (0, -1),
        LayoutDirection::Up => (-1, 0),
    };
    let rot = |(r, c): Cell| -> Cell { (c, -r) };
    let a = rot(primary);
    let b = rot(a);
    let c = rot(b);

    if backward {
        // b is -primary; put it first and demote the primary to last.
        [b, a, c, primary]
    } else {
        [primary, a, b, c]
    }
}

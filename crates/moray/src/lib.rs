//! Orthogonal edge routing and grid-snap placement for PCB-style diagrams.
//!
//! Two entry points share the same geometry kit:
//!
//! * [`layout`] places a graph on a virtual grid and routes its edges with
//!   straight/L/Z orthogonal polylines.
//! * [`route_edges`] skips placement and routes edges between nodes someone
//!   else positioned, through discovered channels and a routing graph.
//!
//! Both are single-threaded, deterministic, and best-effort: degenerate
//! inputs produce legal (if boring) diagrams instead of errors.

#![forbid(unsafe_code)]

pub mod corridor;
pub mod engine;
pub mod geom;
pub mod grid;
pub mod model;
pub mod route;

pub use engine::{EdgeRouter, EngineFlags, EngineInfo, FixedEngine, GridEngine, LayoutEngine};
pub use grid::GridInfo;
pub use model::{Edge, Graph, LabelInfo, LabelPosition, LayoutDirection, Node, NodeShape};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("edge routing requested but the object set is empty")]
    EmptyObjectSet,
}

/// Options for grid placement and the standalone router.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutOptions {
    /// Routing clearance reserved around every grid cell.
    pub channel: f64,
    /// Upper bound on local-improvement passes over the placement.
    pub improve_passes: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            channel: grid::DEFAULT_CHANNEL,
            improve_passes: grid::DEFAULT_IMPROVE_PASSES,
        }
    }
}

/// Options for the corridor router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RouteOptions {
    /// Weight added to routing-graph edges crossed by a committed route.
    pub crossing_penalty: i64,
    /// Minimum spacing between parallel tracks sharing a corridor.
    pub edge_spacing: i64,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            crossing_penalty: 500,
            edge_spacing: 10,
        }
    }
}

/// Grid-snap placement followed by L/Z routing and label placement.
///
/// An empty graph is a no-op. Node boxes are mutated exactly once, edge
/// routes and label positions exactly once.
pub fn layout(g: &mut Graph, opts: &LayoutOptions) -> Result<()> {
    if g.nodes.is_empty() {
        return Ok(());
    }
    let grid_info = grid::place(g, opts.channel, opts.improve_passes);
    route::run(g, &grid_info);
    Ok(())
}

/// Corridor routing over pre-positioned nodes.
///
/// `edges` indexes into `g.edges`. An empty edge list is a no-op; a non-empty
/// one against an empty node set is the caller's mistake and fails.
pub fn route_edges(g: &mut Graph, edges: &[usize], opts: &RouteOptions) -> Result<()> {
    corridor::route_edges(g, edges, opts)
}

//! Layout engine plugin seam.
//!
//! The host system drives every backend through the same object-safe trait; a
//! backend that can also route edges over externally positioned nodes opts in
//! through [`LayoutEngine::edge_router`].

use crate::model::Graph;
use crate::{LayoutOptions, Result, RouteOptions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineFlags {
    /// The engine positions nodes itself.
    pub places_nodes: bool,
    /// The engine can route edges for nodes positioned elsewhere.
    pub routes_edges: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    pub name: &'static str,
    pub long_name: &'static str,
}

pub trait LayoutEngine {
    fn flags(&self) -> EngineFlags;
    fn info(&self) -> EngineInfo;
    fn layout(&self, g: &mut Graph) -> Result<()>;
    fn post_process(&self, _g: &mut Graph) -> Result<()> {
        Ok(())
    }
    /// Present iff `flags().routes_edges`.
    fn edge_router(&self) -> Option<&dyn EdgeRouter> {
        None
    }
}

pub trait EdgeRouter {
    fn route_edges(&self, g: &mut Graph, edges: &[usize]) -> Result<()>;
}

/// The grid engine: snap placement plus the L/Z router, all in-process.
#[derive(Debug, Clone)]
pub struct GridEngine {
    pub options: LayoutOptions,
}

impl Default for GridEngine {
    fn default() -> Self {
        Self {
            options: LayoutOptions::default(),
        }
    }
}

impl LayoutEngine for GridEngine {
    fn flags(&self) -> EngineFlags {
        EngineFlags {
            places_nodes: true,
            routes_edges: false,
        }
    }

    fn info(&self) -> EngineInfo {
        EngineInfo {
            name: "grid",
            long_name: "grid-snap placement with L/Z routing",
        }
    }

    fn layout(&self, g: &mut Graph) -> Result<()> {
        crate::layout(g, &self.options)
    }
}

/// Bridge for backends whose node placement happens out of process: `layout`
/// trusts the boxes it is handed, and edge routing delegates to the corridor
/// pipeline.
#[derive(Debug, Clone)]
pub struct FixedEngine {
    pub options: RouteOptions,
}

impl Default for FixedEngine {
    fn default() -> Self {
        Self {
            options: RouteOptions::default(),
        }
    }
}

impl LayoutEngine for FixedEngine {
    fn flags(&self) -> EngineFlags {
        EngineFlags {
            places_nodes: false,
            routes_edges: true,
        }
    }

    fn info(&self) -> EngineInfo {
        EngineInfo {
            name: "fixed",
            long_name: "corridor routing over externally positioned nodes",
        }
    }

    fn layout(&self, _g: &mut Graph) -> Result<()> {
        Ok(())
    }

    fn edge_router(&self) -> Option<&dyn EdgeRouter> {
        Some(self)
    }
}

impl EdgeRouter for FixedEngine {
    fn route_edges(&self, g: &mut Graph, edges: &[usize]) -> Result<()> {
        crate::route_edges(g, edges, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_fixed_engine_exposes_a_router() {
        let grid = GridEngine::default();
        assert!(grid.flags().places_nodes);
        assert!(grid.edge_router().is_none());

        let fixed = FixedEngine::default();
        assert!(fixed.flags().routes_edges);
        assert!(fixed.edge_router().is_some());
    }
}

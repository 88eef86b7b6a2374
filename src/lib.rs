//! Bounded 2D Voronoi diagrams via Fortune's sweep-line algorithm.
//!
//! [`build`] takes a set of sites and a rectangular viewport and returns a
//! [`Graph`] of cells, edges, and half-edges clipped to that viewport.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

mod beachline;
mod event;
mod graph;
mod site;
mod sweep;
mod tree;
pub mod typedvector;
mod vertex;

pub use graph::{Cell, CellIndex, Edge, EdgeIndex, Graph, HalfEdge};
pub use site::{Site, SiteIndex};
pub use vertex::Vertex;

/// Shared tolerance for coordinate and break-point comparisons throughout
/// the sweep and graph assembly.
pub(crate) const MIN_E: f32 = 1e-4;

/// Builds the Voronoi diagram for `sites` clipped to `[0, x_bound] x [0,
/// y_bound]`.
///
/// Duplicate sites (identical coordinates) are kept in [`Graph::sites`]
/// but collapse to a single cell; the duplicate's `cell` field is left
/// unset.
pub fn build(sites: Vec<Vertex>, x_bound: f32, y_bound: f32) -> Graph {
    log::debug!("building voronoi diagram for {} sites in {}x{}", sites.len(), x_bound, y_bound);
    sweep::run(sites, x_bound, y_bound)
}

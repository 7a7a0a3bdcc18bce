//! Core-Domänentypen: Knoten, Kanten, Strassengraph, Quadtree, Geometrie.

pub mod edge;
pub mod geometry;
pub mod node;
pub mod quadtree;
pub mod street_graph;

pub use edge::{EdgeType, MapEdge};
pub use node::MapNode;
pub use quadtree::{Coordinate2D, QuadTree, DEFAULT_MAX_ELEMENTS};
pub use street_graph::{
    EdgeSplit, GraphSnapshot, NodePoint, StreetGraph, CANONICAL_INDEX_EXTENT,
};

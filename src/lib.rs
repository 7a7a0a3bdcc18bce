//! Prozeduraler Stadtstrassen-Generator auf L-System-Basis.
//!
//! Ein Strassennetz entsteht durch wiederholtes Produzieren einer
//! Atom-Generation: Verzweigungspunkte spucken Strassen-Atome aus, die
//! Strassen wachsen in den Graphen und verschmelzen oder verfädeln sich
//! mit dem Bestand. Muster (radial, Raster) und Welt (Gelände, Dichte)
//! sind über Traits austauschbar.

pub mod core;
pub mod environment;
pub mod error;
pub mod lsystem;

pub use crate::core::{
    EdgeSplit, EdgeType, GraphSnapshot, MapEdge, MapNode, QuadTree, StreetGraph,
};
pub use crate::environment::{
    AnalyticEnvironment, DensityFalloff, Environment, GrowthOptions, PopulationDensity,
};
pub use crate::error::GrowthError;
pub use crate::lsystem::{
    Atom, BranchAtom, CityGenerator, GenerationReport, GeneratorConfig, RadialRule,
    RectangularRule, RoadAtom, RuleStrategy,
};

//! L-System über dem Strassengraphen.
//!
//! Atome bilden die Generationen, Regel-Strategien bestimmen das Muster,
//! der `CityGenerator` treibt die Produktion und hält den Graphen.

pub mod atom;
pub mod generator;
pub mod rules;

pub use atom::{Atom, BranchAtom, RoadAtom};
pub use generator::{CityGenerator, GenerationReport, GeneratorConfig};
pub use rules::{GrowthContext, RadialRule, RectangularRule, RuleStrategy};

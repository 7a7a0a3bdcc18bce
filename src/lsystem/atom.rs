//! Atome des L-Systems.
//!
//! Eine Generation ist eine geordnete Folge von Atomen. Jedes Atom zeigt
//! auf einen Knoten im Strassengraphen und wird pro Produktionsschritt
//! durch null oder mehr Nachfolger-Atome ersetzt. Verzweigungs- und
//! Strassen-Atome wechseln sich dabei ab.

use glam::Vec3;

/// Ein Symbol der aktuellen Generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Atom {
    /// Verzweigungspunkt, produziert Strassen-Atome über die Regel-Strategie.
    Branch(BranchAtom),
    /// Wachsendes Strassenende, produziert höchstens einen Verzweigungspunkt.
    Road(RoadAtom),
}

impl Atom {
    /// Der Graph-Knoten, an dem das Atom sitzt.
    pub fn node(&self) -> u64 {
        match self {
            Atom::Branch(branch) => branch.node,
            Atom::Road(road) => road.node,
        }
    }
}

/// Verzweigungspunkt an einem existierenden Knoten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchAtom {
    /// Knoten, an dem verzweigt wird.
    pub node: u64,
    /// Knoten, von dem aus dieser Punkt erreicht wurde.
    /// `None` nur beim Axiom, dem allerersten Atom des Laufs.
    pub creator_node: Option<u64>,
}

impl BranchAtom {
    pub fn new(node: u64, creator_node: Option<u64>) -> Self {
        Self { node, creator_node }
    }
}

/// Wachsendes Strassenende mit horizontaler Wunschrichtung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadAtom {
    /// Knoten, von dem die Strasse ausgeht.
    pub node: u64,
    /// Horizontale Einheitsrichtung. Null, wenn die Richtung degeneriert war.
    pub forward: Vec3,
}

impl RoadAtom {
    /// Legt die Wunschrichtung horizontal und normiert sie.
    /// Degenerierte Eingaben (Nullvektor, rein vertikal) ergeben `Vec3::ZERO`;
    /// der Produktionsmotor sortiert solche Atome aus.
    pub fn new(node: u64, forward: Vec3) -> Self {
        let flat = Vec3::new(forward.x, 0.0, forward.z);
        Self {
            node,
            forward: flat.normalize_or_zero(),
        }
    }
}

//! Knoten des Strassengraphen.

use glam::{Vec2, Vec3};

/// Ein Wegpunkt bzw. eine Kreuzung im Strassengraphen.
///
/// Identität ist ausschliesslich die `id`; Positionen werden nie zum
/// Vergleich zweier Knoten herangezogen. Die Position ist nach dem
/// Anlegen unveränderlich.
#[derive(Debug, Clone)]
pub struct MapNode {
    /// Eindeutige Knoten-ID
    pub id: u64,
    /// Weltposition (y = Gelaendehoehe)
    pub position: Vec3,
    /// IDs aller anliegenden Kanten
    pub edges: Vec<u64>,
}

impl MapNode {
    /// Erstellt einen Knoten ohne anliegende Kanten.
    pub fn new(id: u64, position: Vec3) -> Self {
        Self {
            id,
            position,
            edges: Vec::new(),
        }
    }

    /// Planprojektion (x, z) der Position.
    pub fn plan_position(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    /// Anzahl der anliegenden Kanten.
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}

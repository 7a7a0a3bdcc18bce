//! Kanten des Strassengraphen.

/// Klassifikation einer Strasse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeType {
    /// Schnellstrasse zwischen Vierteln
    Highway,
    /// Gewoehnliche Stadtstrasse
    #[default]
    Urban,
}

/// Ein Strassensegment zwischen zwei Knoten.
///
/// Die Endpunkte sind immer verschieden; die Laenge wird stets aus den
/// aktuellen Knotenpositionen abgeleitet und nie gespeichert.
#[derive(Debug, Clone)]
pub struct MapEdge {
    /// Eindeutige Kanten-ID
    pub id: u64,
    /// Start-Knoten
    pub from_node: u64,
    /// End-Knoten
    pub to_node: u64,
    /// Strassen-Typ
    pub kind: EdgeType,
}

impl MapEdge {
    /// Erstellt eine Kante zwischen zwei Knoten.
    pub fn new(id: u64, from_node: u64, to_node: u64, kind: EdgeType) -> Self {
        Self {
            id,
            from_node,
            to_node,
            kind,
        }
    }

    /// Prüft ob der Knoten einer der beiden Endpunkte ist.
    pub fn touches(&self, node_id: u64) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Gegenüberliegender Endpunkt, falls `node_id` ein Endpunkt ist.
    pub fn other_endpoint(&self, node_id: u64) -> Option<u64> {
        if node_id == self.from_node {
            Some(self.to_node)
        } else if node_id == self.to_node {
            Some(self.from_node)
        } else {
            None
        }
    }
}

//! Der Strassengraph: Knoten, Kanten und der Quadtree-Index darüber.
//!
//! Der Graph wächst innerhalb eines Laufs nur; Knoten werden nie entfernt.
//! Zwischen zwei Läufen wird er als Ganzes zurückgesetzt. Alle Container
//! sind einfüge-geordnet, damit jede Iteration deterministisch bleibt.

use super::edge::{EdgeType, MapEdge};
use super::geometry::segment_intersection;
use super::node::MapNode;
use super::quadtree::{Coordinate2D, QuadTree};
use crate::error::GrowthError;
use glam::{Vec2, Vec3};
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;

/// Halbe Seitenlänge der kanonischen Index-Grenzen.
pub const CANONICAL_INDEX_EXTENT: f32 = 500.0;

/// Eintrag des Spatial-Index: Knoten-ID plus Planposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// ID des indexierten Knotens
    pub id: u64,
    /// Planposition (x, z) des Knotens
    pub plan: Vec2,
}

impl Coordinate2D for NodePoint {
    fn x(&self) -> f32 {
        self.plan.x
    }

    fn y(&self) -> f32 {
        self.plan.y
    }
}

/// Ergebnis einer Kantenteilung.
#[derive(Debug, Clone, Copy)]
pub struct EdgeSplit {
    /// Der neu eingefügte Teilungs-Knoten
    pub node: u64,
    /// Ersatzkante vom alten Start zum Teilungs-Knoten
    pub first: u64,
    /// Ersatzkante vom Teilungs-Knoten zum alten Ende
    pub second: u64,
}

/// Read-only-Momentaufnahme des Graphen für externe Renderer.
///
/// Enthält die vom Wurzel-Knoten aus erreichbaren Knoten und Kanten in
/// deterministischer Breitensuchen-Reihenfolge.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    /// Wurzel-Knoten des Graphen
    pub root: u64,
    /// Erreichbare Knoten in BFS-Reihenfolge
    pub nodes: Vec<MapNode>,
    /// Erreichbare Kanten in Entdeckungs-Reihenfolge
    pub edges: Vec<MapEdge>,
}

/// Container für das gesamte Strassennetzwerk.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    /// Alle Knoten, indexiert nach ihrer ID (einfüge-geordnet)
    nodes: IndexMap<u64, MapNode>,
    /// Alle Kanten, indexiert nach ihrer ID (einfüge-geordnet)
    edges: IndexMap<u64, MapEdge>,
    /// Der erste angelegte Knoten
    root: Option<u64>,
    /// Spatial-Index über alle Knotenpositionen
    index: QuadTree<NodePoint>,
    next_node_id: u64,
    next_edge_id: u64,
}

impl StreetGraph {
    /// Erstellt einen leeren Graphen mit kanonischen Index-Grenzen.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            root: None,
            index: Self::canonical_index(),
            next_node_id: 1,
            next_edge_id: 1,
        }
    }

    fn canonical_index() -> QuadTree<NodePoint> {
        QuadTree::new(
            Vec2::splat(-CANONICAL_INDEX_EXTENT),
            Vec2::splat(CANONICAL_INDEX_EXTENT),
        )
    }

    /// Fügt einen Knoten hinzu und indexiert ihn. Der erste Knoten wird
    /// zur Wurzel. Nicht-endliche Koordinaten sind ein `OutOfBounds`-Fehler.
    pub fn add_node(&mut self, position: Vec3) -> Result<u64, GrowthError> {
        if !position.is_finite() {
            return Err(GrowthError::OutOfBounds {
                x: position.x,
                y: position.z,
            });
        }

        let id = self.next_node_id;
        self.next_node_id += 1;

        let node = MapNode::new(id, position);
        self.index_node(id, node.plan_position());
        self.nodes.insert(id, node);

        if self.root.is_none() {
            self.root = Some(id);
        }
        Ok(id)
    }

    /// Verbindet zwei Knoten. Der einzige Weg, wie Knoten verbunden werden:
    /// die Kante wird in beiden Anliegerlisten registriert.
    ///
    /// Selbstkanten schlagen mit `InvalidTopology` fehl. Sind die Knoten
    /// bereits verbunden (egal in welcher Orientierung), wird die ID der
    /// bestehenden Kante zurückgegeben; der Graph bleibt einfach.
    pub fn connect(&mut self, from: u64, to: u64, kind: EdgeType) -> Result<u64, GrowthError> {
        if from == to {
            return Err(GrowthError::topology(format!("Selbstkante an Knoten {from}")));
        }
        if !self.nodes.contains_key(&from) || !self.nodes.contains_key(&to) {
            return Err(GrowthError::topology(format!(
                "Kante {from} → {to}: Endpunkt fehlt"
            )));
        }
        if let Some(existing) = self.edge_between(from, to) {
            return Ok(existing);
        }
        Ok(self.attach_edge(from, to, kind))
    }

    /// Teilt eine Kante am Punkt `at`: neuer Knoten, zwei Ersatzkanten
    /// gleichen Typs, alte Kante wird ausgetragen.
    ///
    /// `at` darf nicht auf einem Endpunkt liegen; der Aufrufer leitet
    /// endpunktnahe Schnittpunkte vorher auf den Endpunkt um.
    pub fn split_edge(&mut self, edge_id: u64, at: Vec3) -> Result<EdgeSplit, GrowthError> {
        let Some(edge) = self.edges.get(&edge_id) else {
            return Err(GrowthError::topology(format!(
                "Teilung: Kante {edge_id} nicht gefunden"
            )));
        };
        let (from, to, kind) = (edge.from_node, edge.to_node, edge.kind);

        let node = self.add_node(at)?;
        // Ersatzkanten zuerst anlegen, damit kein Endpunkt kantenlos wird
        let first = self.attach_edge(from, node, kind);
        let second = self.attach_edge(node, to, kind);
        self.detach_edge(edge_id)?;

        Ok(EdgeSplit {
            node,
            first,
            second,
        })
    }

    /// Schnittpunkt einer Kante mit der Strecke `from` → `to` in der Plan-Ebene.
    pub fn edge_intersection(&self, edge_id: u64, from: Vec3, to: Vec3) -> Option<Vec3> {
        let edge = self.edges.get(&edge_id)?;
        let a = self.nodes.get(&edge.from_node)?.position;
        let b = self.nodes.get(&edge.to_node)?.position;
        segment_intersection(from, to, a, b)
    }

    /// Alle indexierten Knoten im Quadrat mit Halbseite `radius` um `center`
    /// (Quadrat-, nicht Kreis-Semantik).
    pub fn neighbors_within(&self, center: Vec2, radius: f32) -> Result<Vec<NodePoint>, GrowthError> {
        self.index.neighbors(center.x, center.y, radius)
    }

    /// Findet die Kante zwischen zwei Knoten (beliebige Orientierung).
    pub fn edge_between(&self, a: u64, b: u64) -> Option<u64> {
        let node = self.nodes.get(&a)?;
        node.edges.iter().copied().find(|edge_id| {
            self.edges
                .get(edge_id)
                .map_or(false, |edge| edge.other_endpoint(a) == Some(b))
        })
    }

    /// Liest einen Knoten.
    pub fn node(&self, id: u64) -> Option<&MapNode> {
        self.nodes.get(&id)
    }

    /// Liest eine Kante.
    pub fn edge(&self, id: u64) -> Option<&MapEdge> {
        self.edges.get(&id)
    }

    /// Aktuelle Länge einer Kante aus den Endpunkt-Positionen.
    pub fn edge_length(&self, edge_id: u64) -> Option<f32> {
        let edge = self.edges.get(&edge_id)?;
        let from = self.nodes.get(&edge.from_node)?.position;
        let to = self.nodes.get(&edge.to_node)?.position;
        Some(from.distance(to))
    }

    /// Der Wurzel-Knoten (erster angelegter Knoten).
    pub fn root(&self) -> Option<u64> {
        self.root
    }

    /// Anzahl der Knoten.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Anzahl der Kanten.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Prüft ob der Graph leer ist.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator über alle Knoten in Einfüge-Reihenfolge.
    pub fn nodes_iter(&self) -> impl Iterator<Item = &MapNode> {
        self.nodes.values()
    }

    /// Iterator über alle Kanten in Einfüge-Reihenfolge.
    pub fn edges_iter(&self) -> impl Iterator<Item = &MapEdge> {
        self.edges.values()
    }

    /// Momentaufnahme der von der Wurzel erreichbaren Knoten und Kanten
    /// per Breitensuche. `None` solange der Graph leer ist.
    pub fn snapshot(&self) -> Option<GraphSnapshot> {
        let root = self.root?;
        let mut visited: IndexSet<u64> = IndexSet::new();
        let mut edge_ids: IndexSet<u64> = IndexSet::new();
        let mut queue = VecDeque::new();

        visited.insert(root);
        queue.push_back(root);
        while let Some(current) = queue.pop_front() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            for &edge_id in &node.edges {
                let Some(edge) = self.edges.get(&edge_id) else {
                    continue;
                };
                edge_ids.insert(edge_id);
                let Some(other) = edge.other_endpoint(current) else {
                    continue;
                };
                if visited.insert(other) {
                    queue.push_back(other);
                }
            }
        }

        Some(GraphSnapshot {
            root,
            nodes: visited
                .iter()
                .filter_map(|id| self.nodes.get(id).cloned())
                .collect(),
            edges: edge_ids
                .iter()
                .filter_map(|id| self.edges.get(id).cloned())
                .collect(),
        })
    }

    /// Prüft die referentielle Konsistenz: jede Kante steht in den
    /// Anliegerlisten beider Endpunkte und umgekehrt, keine Selbstkanten.
    pub fn check_consistency(&self) -> Result<(), GrowthError> {
        for (id, node) in &self.nodes {
            for &edge_id in &node.edges {
                let Some(edge) = self.edges.get(&edge_id) else {
                    return Err(GrowthError::topology(format!(
                        "Knoten {id} verweist auf fehlende Kante {edge_id}"
                    )));
                };
                if !edge.touches(*id) {
                    return Err(GrowthError::topology(format!(
                        "Kante {edge_id} liegt nicht an Knoten {id} an"
                    )));
                }
            }
        }
        for (id, edge) in &self.edges {
            if edge.from_node == edge.to_node {
                return Err(GrowthError::topology(format!(
                    "Selbstkante {id} an Knoten {}",
                    edge.from_node
                )));
            }
            for endpoint in [edge.from_node, edge.to_node] {
                let Some(node) = self.nodes.get(&endpoint) else {
                    return Err(GrowthError::topology(format!(
                        "Kante {id} verweist auf fehlenden Knoten {endpoint}"
                    )));
                };
                if !node.edges.contains(id) {
                    return Err(GrowthError::topology(format!(
                        "Kante {id} fehlt in der Anliegerliste von Knoten {endpoint}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Setzt den Graphen vollständig zurück; der Index wird auf die
    /// kanonischen Grenzen zurückgebaut.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.root = None;
        self.index.clear();
        self.index = Self::canonical_index();
        self.next_node_id = 1;
        self.next_edge_id = 1;
    }

    /// Die wachsende Wurzel des Index erfordert das Neuzuweisen des Handles.
    fn index_node(&mut self, id: u64, plan: Vec2) {
        let index = std::mem::replace(&mut self.index, QuadTree::empty());
        self.index = index.insert(NodePoint { id, plan });
    }

    /// Legt eine Kante ohne Prüfungen an und registriert sie beidseitig.
    fn attach_edge(&mut self, from: u64, to: u64, kind: EdgeType) -> u64 {
        let id = self.next_edge_id;
        self.next_edge_id += 1;
        self.edges.insert(id, MapEdge::new(id, from, to, kind));
        if let Some(node) = self.nodes.get_mut(&from) {
            node.edges.push(id);
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            node.edges.push(id);
        }
        id
    }

    /// Trägt eine Kante aus Speicher und Anliegerlisten aus.
    /// Erwartet, dass Ersatzkanten bereits anliegen: ein Endpunkt ohne
    /// verbleibende Kanten ist eine Topologie-Verletzung.
    fn detach_edge(&mut self, edge_id: u64) -> Result<MapEdge, GrowthError> {
        let Some(edge) = self.edges.shift_remove(&edge_id) else {
            return Err(GrowthError::topology(format!(
                "Kante {edge_id} nicht gefunden"
            )));
        };
        for endpoint in [edge.from_node, edge.to_node] {
            if let Some(node) = self.nodes.get_mut(&endpoint) {
                node.edges.retain(|&e| e != edge_id);
                if node.edges.is_empty() {
                    return Err(GrowthError::topology(format!(
                        "Knoten {endpoint} bliebe ohne Kanten zurueck"
                    )));
                }
            }
        }
        Ok(edge)
    }
}

impl Default for StreetGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_line() -> (StreetGraph, u64, u64, u64) {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Vec3::new(0.0, 0.0, 0.0)).expect("Knoten erwartet");
        let b = graph.add_node(Vec3::new(10.0, 0.0, 0.0)).expect("Knoten erwartet");
        let edge = graph.connect(a, b, EdgeType::Urban).expect("Kante erwartet");
        (graph, a, b, edge)
    }

    #[test]
    fn test_first_node_becomes_root() {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Vec3::ZERO).expect("Knoten erwartet");
        let _b = graph.add_node(Vec3::new(1.0, 0.0, 0.0)).expect("Knoten erwartet");

        assert_eq!(graph.root(), Some(a));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_add_node_rejects_non_finite() {
        let mut graph = StreetGraph::new();
        let err = graph
            .add_node(Vec3::new(f32::NAN, 0.0, 0.0))
            .expect_err("Fehler erwartet");
        assert!(matches!(err, GrowthError::OutOfBounds { .. }));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_connect_registers_edge_on_both_endpoints() {
        let (graph, a, b, edge) = graph_with_line();

        assert_eq!(graph.node(a).expect("Knoten erwartet").edges, vec![edge]);
        assert_eq!(graph.node(b).expect("Knoten erwartet").edges, vec![edge]);
        graph.check_consistency().expect("Konsistenz erwartet");
    }

    #[test]
    fn test_connect_self_edge_fails() {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Vec3::ZERO).expect("Knoten erwartet");

        let err = graph.connect(a, a, EdgeType::Urban).expect_err("Fehler erwartet");
        assert!(matches!(err, GrowthError::InvalidTopology(_)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_connect_duplicate_returns_existing_edge() {
        let (mut graph, a, b, edge) = graph_with_line();

        let again = graph.connect(a, b, EdgeType::Urban).expect("Kante erwartet");
        let inverted = graph.connect(b, a, EdgeType::Urban).expect("Kante erwartet");

        assert_eq!(again, edge);
        assert_eq!(inverted, edge);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_connect_missing_endpoint_fails() {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Vec3::ZERO).expect("Knoten erwartet");

        let err = graph.connect(a, 99, EdgeType::Urban).expect_err("Fehler erwartet");
        assert!(matches!(err, GrowthError::InvalidTopology(_)));
    }

    #[test]
    fn test_neighbors_within_ignores_elevation() {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Vec3::new(0.0, 500.0, 0.0)).expect("Knoten erwartet");
        let _b = graph.add_node(Vec3::new(100.0, 0.0, 0.0)).expect("Knoten erwartet");

        let found = graph
            .neighbors_within(Vec2::new(1.0, 1.0), 5.0)
            .expect("Abfrage erwartet");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a);
    }

    #[test]
    fn test_edge_length_from_positions() {
        let (graph, _, _, edge) = graph_with_line();
        assert_eq!(graph.edge_length(edge), Some(10.0));
    }

    #[test]
    fn test_split_edge_rewires_both_sides() {
        let (mut graph, a, b, edge) = graph_with_line();

        let split = graph
            .split_edge(edge, Vec3::new(4.0, 0.0, 0.0))
            .expect("Teilung erwartet");

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edge(edge).is_none(), "alte Kante muss ausgetragen sein");
        assert_eq!(graph.edge_between(a, split.node), Some(split.first));
        assert_eq!(graph.edge_between(split.node, b), Some(split.second));
        graph.check_consistency().expect("Konsistenz erwartet");

        // Der Teilungs-Knoten ist indexiert
        let found = graph
            .neighbors_within(Vec2::new(4.0, 0.0), 0.5)
            .expect("Abfrage erwartet");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, split.node);
    }

    #[test]
    fn test_split_edge_keeps_kind() {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Vec3::ZERO).expect("Knoten erwartet");
        let b = graph.add_node(Vec3::new(20.0, 0.0, 0.0)).expect("Knoten erwartet");
        let edge = graph.connect(a, b, EdgeType::Highway).expect("Kante erwartet");

        let split = graph
            .split_edge(edge, Vec3::new(10.0, 0.0, 0.0))
            .expect("Teilung erwartet");

        assert_eq!(graph.edge(split.first).expect("Kante erwartet").kind, EdgeType::Highway);
        assert_eq!(graph.edge(split.second).expect("Kante erwartet").kind, EdgeType::Highway);
    }

    #[test]
    fn test_split_missing_edge_fails() {
        let mut graph = StreetGraph::new();
        let err = graph
            .split_edge(42, Vec3::ZERO)
            .expect_err("Fehler erwartet");
        assert!(matches!(err, GrowthError::InvalidTopology(_)));
    }

    #[test]
    fn test_edge_intersection_with_crossing_segment() {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Vec3::new(-5.0, 0.0, 0.0)).expect("Knoten erwartet");
        let b = graph.add_node(Vec3::new(5.0, 0.0, 0.0)).expect("Knoten erwartet");
        let edge = graph.connect(a, b, EdgeType::Urban).expect("Kante erwartet");

        let point = graph
            .edge_intersection(edge, Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0))
            .expect("Schnittpunkt erwartet");
        assert!(point.x.abs() < 1e-6);
        assert!(point.z.abs() < 1e-6);

        // Strecke endet vor der Kante: kein Schnittpunkt.
        assert!(graph
            .edge_intersection(edge, Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0))
            .is_none());
    }

    #[test]
    fn test_snapshot_contains_only_reachable() {
        let (mut graph, a, b, _) = graph_with_line();
        // Isolierter Knoten ausserhalb des zusammenhängenden Netzes
        let isolated = graph.add_node(Vec3::new(50.0, 0.0, 50.0)).expect("Knoten erwartet");

        let snapshot = graph.snapshot().expect("Momentaufnahme erwartet");
        assert_eq!(snapshot.root, a);
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.edges.len(), 1);
        assert!(snapshot.nodes.iter().any(|n| n.id == b));
        assert!(snapshot.nodes.iter().all(|n| n.id != isolated));
    }

    #[test]
    fn test_check_consistency_detects_dangling_reference() {
        let (mut graph, a, _, _) = graph_with_line();
        // Anliegerliste von Hand beschädigen
        if let Some(node) = graph.nodes.get_mut(&a) {
            node.edges.push(999);
        }

        let err = graph.check_consistency().expect_err("Fehler erwartet");
        assert!(matches!(err, GrowthError::InvalidTopology(_)));
    }

    #[test]
    fn test_reset_restores_canonical_bounds() {
        let mut graph = StreetGraph::new();
        // Einfügung weit ausserhalb lässt den Index wachsen
        graph.add_node(Vec3::new(2000.0, 0.0, 0.0)).expect("Knoten erwartet");
        let (_, grown_max) = graph.index.bounds();
        assert!(grown_max.x > CANONICAL_INDEX_EXTENT);

        graph.reset();

        assert!(graph.is_empty());
        assert_eq!(graph.root(), None);
        let (min, max) = graph.index.bounds();
        assert_eq!(min, Vec2::splat(-CANONICAL_INDEX_EXTENT));
        assert_eq!(max, Vec2::splat(CANONICAL_INDEX_EXTENT));
        let next = graph.add_node(Vec3::ZERO).expect("Knoten erwartet");
        assert_eq!(next, 1, "ID-Zähler beginnt nach Reset wieder bei 1");
    }
}

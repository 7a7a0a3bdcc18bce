//! Rechteckige Regel: Rasterstrassen entlang der Elternrichtung.
//!
//! Jeder Verzweigungspunkt setzt das Raster mit drei Kandidaten fort,
//! rechtwinklig links und rechts sowie geradeaus. Jeder Kandidat wird
//! dem flachsten Strahl des Gelände-Fächers nachgeführt, damit das
//! Raster an Hängen den Höhenlinien folgt statt stur geradeaus zu laufen.

use crate::core::geometry::{lift, plan};
use crate::lsystem::atom::{BranchAtom, RoadAtom};

use super::{cardinal_roads, least_steep_direction, GrowthContext, RuleStrategy};

/// Regel für rechtwinklige Rasternetze.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectangularRule;

impl RuleStrategy for RectangularRule {
    fn spawn_roads(&self, atom: &BranchAtom, ctx: &GrowthContext<'_>) -> Vec<RoadAtom> {
        let Some(node) = ctx.graph.node(atom.node) else {
            return Vec::new();
        };
        let Some(creator_id) = atom.creator_node else {
            // Axiom ohne Ankunftsrichtung: vier Kardinalstrassen.
            return cardinal_roads(atom.node);
        };
        let Some(creator) = ctx.graph.node(creator_id) else {
            return Vec::new();
        };

        let Some(parent) = plan(node.position - creator.position).try_normalize() else {
            return Vec::new();
        };

        // Kandidaten bei -90, 0 und +90 Grad zur Elternrichtung.
        [-parent.perp(), parent, parent.perp()]
            .into_iter()
            .map(|candidate| {
                let refined = least_steep_direction(
                    node.position,
                    lift(candidate),
                    ctx.options.maximum_road_deviation_degrees,
                    ctx.options.minimum_road_length,
                    ctx.env,
                );
                RoadAtom::new(atom.node, refined)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EdgeType, StreetGraph};
    use crate::environment::{AnalyticEnvironment, GrowthOptions, PopulationDensity};
    use approx::assert_relative_eq;
    use glam::{Vec2, Vec3};

    fn arrival_fixture(creator: Vec3, node: Vec3) -> (StreetGraph, BranchAtom) {
        let mut graph = StreetGraph::new();
        let creator_id = graph.add_node(creator).expect("Erzeuger-Knoten erwartet");
        let node_id = graph.add_node(node).expect("Verzweigungs-Knoten erwartet");
        graph
            .connect(creator_id, node_id, EdgeType::Urban)
            .expect("Kante zwischen den Knoten erwartet");
        (graph, BranchAtom::new(node_id, Some(creator_id)))
    }

    #[test]
    fn test_axiom_produziert_kardinalstrassen() {
        let env = AnalyticEnvironment::new(PopulationDensity::default());
        let options = GrowthOptions::default();
        let mut graph = StreetGraph::new();
        let node = graph.add_node(Vec3::ZERO).expect("Axiom-Knoten erwartet");
        let ctx = GrowthContext {
            graph: &graph,
            env: &env,
            options: &options,
        };

        let roads = RectangularRule.spawn_roads(&BranchAtom::new(node, None), &ctx);
        let forwards: Vec<Vec3> = roads.iter().map(|road| road.forward).collect();
        assert_eq!(forwards, vec![Vec3::Z, Vec3::X, Vec3::NEG_Z, Vec3::NEG_X]);
    }

    #[test]
    fn test_flaches_gelaende_haelt_rechte_winkel() {
        let env = AnalyticEnvironment::new(PopulationDensity::default());
        let options = GrowthOptions::default();
        let (graph, atom) = arrival_fixture(Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0));
        let ctx = GrowthContext {
            graph: &graph,
            env: &env,
            options: &options,
        };

        let roads = RectangularRule.spawn_roads(&atom, &ctx);
        let forwards: Vec<Vec3> = roads.iter().map(|road| road.forward).collect();
        // Rechts, geradeaus, links relativ zur Ankunft entlang +X.
        assert_eq!(forwards, vec![Vec3::NEG_Z, Vec3::X, Vec3::Z]);
    }

    #[test]
    fn test_hang_fuehrt_das_raster_dem_flachsten_strahl_nach() {
        // Leicht schiefer Hang quer zur Elternrichtung +Z.
        let env = AnalyticEnvironment::new(PopulationDensity::default())
            .with_elevation(0.0, Vec2::new(0.002, 0.04));
        let options = GrowthOptions::default();
        let (graph, atom) = arrival_fixture(Vec3::new(0.0, 0.0, -50.0), Vec3::ZERO);
        let ctx = GrowthContext {
            graph: &graph,
            env: &env,
            options: &options,
        };

        let roads = RectangularRule.spawn_roads(&atom, &ctx);
        assert_eq!(roads.len(), 3);
        // Der Geradeaus-Kandidat weicht um den vollen Fächerwinkel aus.
        assert_relative_eq!(roads[1].forward.x, -0.5, epsilon = 1e-4);
        assert_relative_eq!(roads[1].forward.z, 0.866, epsilon = 1e-3);
    }

    #[test]
    fn test_unbekannter_erzeuger_produziert_nichts() {
        let env = AnalyticEnvironment::new(PopulationDensity::default());
        let options = GrowthOptions::default();
        let mut graph = StreetGraph::new();
        let node = graph.add_node(Vec3::ZERO).expect("Knoten erwartet");
        let ctx = GrowthContext {
            graph: &graph,
            env: &env,
            options: &options,
        };

        let roads = RectangularRule.spawn_roads(&BranchAtom::new(node, Some(999)), &ctx);
        assert!(roads.is_empty());
    }
}

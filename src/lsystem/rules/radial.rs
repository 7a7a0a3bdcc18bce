//! Radiale Regel: Ring- und Speichenstrassen um das Zentrum.
//!
//! Neue Strassen folgen entweder dem Radius durch den Knoten oder der
//! Tangente darauf. Geradeaus bleibt in der eigenen Schar, Abbiegungen
//! wechseln in die jeweils andere. So entstehen Speichen mit
//! Querverbindungen, die sich mit wachsendem Abstand zu Ringen schliessen.

use glam::Vec2;

use crate::core::geometry::{lift, plan};
use crate::lsystem::atom::{BranchAtom, RoadAtom};

use super::{cardinal_roads, GrowthContext, RuleStrategy};

/// Kosinus von 45 Grad; trennt radiale von tangentialer Ankunft.
const RADIAL_ALIGNMENT_COS: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Regel für radiale Strassennetze.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadialRule;

impl RuleStrategy for RadialRule {
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

        let Some(incoming) = plan(node.position - creator.position).try_normalize() else {
            return Vec::new();
        };

        // Radial-tangentialer Rahmen am Knoten. Direkt im Zentrum ist der
        // Radius unbestimmt, dann dient die Nordachse als Ersatz.
        let radius_vector = node.plan_position() - ctx.env.origin();
        let radial = radius_vector.try_normalize().unwrap_or(Vec2::new(0.0, 1.0));
        let tangent = radial.perp();

        // Ankunft unter 45 Grad zum Radius zählt als radial.
        let radius_aligned = incoming.dot(radial).abs() > RADIAL_ALIGNMENT_COS;
        let (own_axis, cross_axis) = if radius_aligned {
            (radial, tangent)
        } else {
            (tangent, radial)
        };

        // Links, geradeaus, rechts; Abbiegungen wechseln die Schar.
        let left = snap_to_axis(incoming.perp(), cross_axis);
        let straight = snap_to_axis(incoming, own_axis);
        let right = snap_to_axis(-incoming.perp(), cross_axis);

        [left, straight, right]
            .into_iter()
            .map(|direction| RoadAtom::new(atom.node, lift(direction)))
            .collect()
    }
}

/// Richtet `direction` exakt auf `axis` aus, das Vorzeichen bleibt erhalten.
fn snap_to_axis(direction: Vec2, axis: Vec2) -> Vec2 {
    if direction.dot(axis) >= 0.0 {
        axis
    } else {
        -axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EdgeType, StreetGraph};
    use crate::environment::{AnalyticEnvironment, GrowthOptions, PopulationDensity};
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn context_fixture() -> (AnalyticEnvironment, GrowthOptions) {
        let env = AnalyticEnvironment::new(PopulationDensity::default());
        (env, GrowthOptions::default())
    }

    /// Graph mit Erzeuger- und Verzweigungsknoten samt Kante dazwischen.
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
        let (env, options) = context_fixture();
        let mut graph = StreetGraph::new();
        let node = graph.add_node(Vec3::ZERO).expect("Axiom-Knoten erwartet");
        let ctx = GrowthContext {
            graph: &graph,
            env: &env,
            options: &options,
        };

        let roads = RadialRule.spawn_roads(&BranchAtom::new(node, None), &ctx);
        let forwards: Vec<Vec3> = roads.iter().map(|road| road.forward).collect();
        assert_eq!(forwards, vec![Vec3::Z, Vec3::X, Vec3::NEG_Z, Vec3::NEG_X]);
    }

    #[test]
    fn test_radiale_ankunft_setzt_speiche_fort() {
        let (env, options) = context_fixture();
        let (graph, atom) = arrival_fixture(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));
        let ctx = GrowthContext {
            graph: &graph,
            env: &env,
            options: &options,
        };

        let roads = RadialRule.spawn_roads(&atom, &ctx);
        let forwards: Vec<Vec3> = roads.iter().map(|road| road.forward).collect();
        // Ankunft entlang +X ist radial: geradeaus bleibt auf der Speiche,
        // links und rechts biegen in die Tangentenschar ab.
        assert_eq!(forwards, vec![Vec3::Z, Vec3::X, Vec3::NEG_Z]);
    }

    #[test]
    fn test_tangentiale_ankunft_biegt_in_die_speichen_ab() {
        let (env, options) = context_fixture();
        let (graph, atom) =
            arrival_fixture(Vec3::new(100.0, 0.0, 0.0), Vec3::new(100.0, 0.0, 30.0));
        let ctx = GrowthContext {
            graph: &graph,
            env: &env,
            options: &options,
        };

        let roads = RadialRule.spawn_roads(&atom, &ctx);
        assert_eq!(roads.len(), 3);

        let radial = Vec2::new(100.0, 30.0).normalize();
        // Geradeaus folgt der Tangente am Knoten.
        assert_relative_eq!(plan(roads[1].forward).dot(radial), 0.0, epsilon = 1e-5);
        // Links zeigt zum Zentrum, rechts vom Zentrum weg.
        assert!(plan(roads[0].forward).dot(radial) < -0.99);
        assert!(plan(roads[2].forward).dot(radial) > 0.99);
    }

    #[test]
    fn test_ankunft_im_zentrum_nutzt_nordachse() {
        let (env, options) = context_fixture();
        let (graph, atom) = arrival_fixture(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);
        let ctx = GrowthContext {
            graph: &graph,
            env: &env,
            options: &options,
        };

        let roads = RadialRule.spawn_roads(&atom, &ctx);
        let forwards: Vec<Vec3> = roads.iter().map(|road| road.forward).collect();
        // Radius im Zentrum unbestimmt: Ersatzachse +Z, Ankunft -X tangential.
        assert_eq!(forwards, vec![Vec3::NEG_Z, Vec3::NEG_X, Vec3::Z]);
    }

    #[test]
    fn test_unbekannter_knoten_produziert_nichts() {
        let (env, options) = context_fixture();
        let graph = StreetGraph::new();
        let ctx = GrowthContext {
            graph: &graph,
            env: &env,
            options: &options,
        };
        assert!(RadialRule
            .spawn_roads(&BranchAtom::new(999, None), &ctx)
            .is_empty());
    }
}

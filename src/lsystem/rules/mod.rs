//! Regel-Strategien der Produktion.
//!
//! Eine Regel entscheidet, welche Strassen-Atome ein Verzweigungspunkt
//! produziert. Das Muster des entstehenden Netzes (radial, Raster)
//! steckt vollständig in der Regel; Einfädeln, Verschmelzen und
//! Schneiden neuer Strassen übernimmt der Produktionsmotor.

use glam::{Vec2, Vec3};

use crate::core::geometry::{clamp01, plan, rotate_horizontal};
use crate::core::StreetGraph;
use crate::environment::{Environment, GrowthOptions};
use crate::lsystem::atom::{BranchAtom, RoadAtom};

pub mod radial;
pub mod rectangular;

pub use radial::RadialRule;
pub use rectangular::RectangularRule;

/// Anzahl der Abtast-Strahlen des Gelände-Fächers.
pub const PROBE_SAMPLE_COUNT: usize = 5;

/// Gebündelter Lesezugriff für Regel-Strategien.
///
/// Regeln lesen Graph, Umgebung und Optionen, schreiben aber nie selbst
/// in den Graphen. Alle Schreibzugriffe laufen über den Produktionsmotor.
pub struct GrowthContext<'a> {
    pub graph: &'a StreetGraph,
    pub env: &'a dyn Environment,
    pub options: &'a GrowthOptions,
}

/// Strategie-Schnittstelle für Verzweigungspunkte.
pub trait RuleStrategy: std::fmt::Debug {
    /// Produziert die Strassen-Atome für einen Verzweigungspunkt.
    ///
    /// Die Reihenfolge der Rückgabe ist Teil des Vertrags: sie bestimmt
    /// die Produktionsreihenfolge der nächsten Generation.
    fn spawn_roads(&self, atom: &BranchAtom, ctx: &GrowthContext<'_>) -> Vec<RoadAtom>;

    /// Wunschlänge einer Strasse aus Bevölkerungsdichte und Gelände.
    ///
    /// Dicht besiedelte und steile Gegenden bekommen kurze Strassen,
    /// leeres flaches Land lange.
    fn road_length(&self, atom: &RoadAtom, ctx: &GrowthContext<'_>) -> f32 {
        let Some(node) = ctx.graph.node(atom.node) else {
            return ctx.options.minimum_road_length;
        };
        let position = node.position;

        let population_factor =
            clamp01(1.0 - ctx.env.normalized_density_at(position.x, position.z));

        // Höhenunterschied über einen Einheitsschritt in Wunschrichtung.
        let ahead = position + atom.forward;
        let rise = (ctx.env.elevation_at(ahead.x, ahead.z)
            - ctx.env.elevation_at(position.x, position.z))
        .abs();
        let elevation_factor = 1.0 - clamp01(ctx.options.slope_exaggeration * rise);

        ctx.options.minimum_road_length
            + population_factor * elevation_factor * ctx.options.road_length_span()
    }
}

/// Vier Strassen in die Kardinalrichtungen `+Z`, `+X`, `-Z`, `-X`.
///
/// Standard-Produktion des Axioms, bei dem es keine Ankunftsrichtung gibt.
pub(crate) fn cardinal_roads(node: u64) -> Vec<RoadAtom> {
    [Vec3::Z, Vec3::X, Vec3::NEG_Z, Vec3::NEG_X]
        .into_iter()
        .map(|forward| RoadAtom::new(node, forward))
        .collect()
}

/// Ein Abtast-Strahl des Gelände-Fächers.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSample {
    /// Horizontale Einheitsrichtung des Strahls.
    pub direction: Vec3,
    /// Abgetastete Plankoordinate.
    pub position: Vec2,
    /// Wert des Samplers an der Koordinate.
    pub value: f32,
}

/// Tastet einen Fächer von Richtungen um `direction` ab.
///
/// Die Strahlen liegen gleichmässig über den Bogen `±max_deviation_degrees`,
/// abgetastet wird jeweils im Abstand `distance`. Die Reihenfolge läuft von
/// innen nach aussen (`0, -s, +s, -2s, +2s`), damit bei Gleichstand die
/// gerade Fortsetzung gewinnt.
pub fn probe(
    position: Vec3,
    direction: Vec3,
    max_deviation_degrees: f32,
    distance: f32,
    sampler: impl Fn(f32, f32) -> f32,
) -> Vec<ProbeSample> {
    let rings = (PROBE_SAMPLE_COUNT / 2) as f32;
    let step = max_deviation_degrees / rings;
    let base = plan(position);

    (0..PROBE_SAMPLE_COUNT)
        .map(|i| {
            let ring = ((i + 1) / 2) as f32;
            let sign = if i % 2 == 1 { -1.0 } else { 1.0 };
            let ray = rotate_horizontal(direction, sign * ring * step);
            let sample_position = base + plan(ray) * distance;
            ProbeSample {
                direction: ray,
                position: sample_position,
                value: sampler(sample_position.x, sample_position.y),
            }
        })
        .collect()
}

/// Sucht im Gelände-Fächer die Richtung mit dem geringsten Höhenunterschied
/// zur Ausgangsposition. Bei Gleichstand gewinnt der innerste Strahl.
pub fn least_steep_direction(
    position: Vec3,
    direction: Vec3,
    max_deviation_degrees: f32,
    distance: f32,
    env: &dyn Environment,
) -> Vec3 {
    let reference = env.elevation_at(position.x, position.z);
    let samples = probe(position, direction, max_deviation_degrees, distance, |x, z| {
        env.elevation_at(x, z)
    });

    let mut best = direction;
    let mut best_deviation = f32::INFINITY;
    for sample in samples {
        let deviation = (sample.value - reference).abs();
        if deviation < best_deviation {
            best_deviation = deviation;
            best = sample.direction;
        }
    }
    best
}

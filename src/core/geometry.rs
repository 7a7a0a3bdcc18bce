//! Geometrie-Bausteine in der Plan-Ebene (x, z).
//!
//! Alle Tests laufen zweidimensional; die Höhe (y) wird nur für
//! Ergebnispunkte entlang der Strecken interpoliert.

use glam::{Vec2, Vec3};

/// Toleranz für Endpunkt-Nähe bei Schnittpunkten (Welteinheiten).
pub const ENDPOINT_EPSILON: f32 = 1e-3;

/// Unterhalb dieser Determinante gelten Richtungen als parallel.
const PARALLEL_EPSILON: f32 = 1e-10;

/// Planprojektion (x, z) eines Weltpunkts.
pub fn plan(point: Vec3) -> Vec2 {
    Vec2::new(point.x, point.z)
}

/// Hebt einen Plan-Vektor als horizontalen Weltvektor an (y = 0).
pub fn lift(direction: Vec2) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.y)
}

/// Hebt einen Plan-Punkt mit expliziter Höhe an.
pub fn lift_at(point: Vec2, elevation: f32) -> Vec3 {
    Vec3::new(point.x, elevation, point.y)
}

/// Horizontale Distanz zweier Weltpunkte.
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    plan(a).distance(plan(b))
}

/// Klemmt einen Wert auf `[0, 1]`.
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// 2D-Kreuzprodukt (z-Komponente des 3D-Kreuzprodukts).
fn cross_2d(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Dreht eine horizontale Richtung um `degrees` um die Hochachse.
/// Positive Winkel drehen von +X nach +Z.
pub fn rotate_horizontal(direction: Vec3, degrees: f32) -> Vec3 {
    let rotated = Vec2::from_angle(degrees.to_radians()).rotate(plan(direction));
    lift(rotated)
}

/// Schnittpunkt zweier Strecken `a1→a2` und `b1→b2` in der Plan-Ebene.
///
/// Parametrischer Test: `p + t*r = q + u*s` mit `t, u ∈ [0, 1]`.
/// Parallele und kollinear überlappende Strecken melden keinen Schnitt.
/// Die Höhe des Ergebnispunkts ist das Mittel der beiden entlang der
/// Strecken interpolierten Höhen, damit der Schnitt symmetrisch in den
/// Argumenten bleibt.
pub fn segment_intersection(a1: Vec3, a2: Vec3, b1: Vec3, b2: Vec3) -> Option<Vec3> {
    let p = plan(a1);
    let r = plan(a2) - p;
    let q = plan(b1);
    let s = plan(b2) - q;

    let denominator = cross_2d(r, s);
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }

    let offset = q - p;
    let t = cross_2d(offset, s) / denominator;
    let u = cross_2d(offset, r) / denominator;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    let point = p + r * t;
    let elevation_a = a1.y + (a2.y - a1.y) * t;
    let elevation_b = b1.y + (b2.y - b1.y) * u;
    Some(lift_at(point, (elevation_a + elevation_b) * 0.5))
}

//! Umgebung des Generators: Gelände, Bevölkerung und Regel-Zonen.
//!
//! Der Produktionsmotor kennt die Welt nur über das `Environment`-Trait.
//! Damit lassen sich Heightmaps, Dichtekarten oder handgebaute
//! Testwelten austauschen, ohne den Motor anzufassen.

use glam::Vec2;

use crate::lsystem::rules::RuleStrategy;

pub mod density;
pub mod options;
pub mod terrain;

pub use density::{DensityFalloff, PopulationDensity};
pub use options::GrowthOptions;
pub use terrain::AnalyticEnvironment;

/// Lesezugriff auf die Welt, in der das Strassennetz wächst.
///
/// Alle Abfragen arbeiten auf Plankoordinaten `(x, z)`. Die Implementierung
/// muss für dieselbe Koordinate stets denselben Wert liefern, sonst ist der
/// Generator-Lauf nicht reproduzierbar.
pub trait Environment {
    /// Geländehöhe an der Plankoordinate.
    fn elevation_at(&self, x: f32, z: f32) -> f32;

    /// Steigungskoeffizient in `[0, 1]` (0 = eben, 1 = maximal steil).
    fn slope_at(&self, x: f32, z: f32) -> f32;

    /// Rohe Bevölkerungsdichte.
    fn density_at(&self, x: f32, z: f32) -> f32;

    /// Auf `[0, 1]` normierte Bevölkerungsdichte.
    fn normalized_density_at(&self, x: f32, z: f32) -> f32;

    /// Ob die Stelle unbebaubar ist (Wasser, Fels, Sperrgebiet).
    fn is_impassable(&self, _x: f32, _z: f32) -> bool {
        false
    }

    /// Die Regel-Strategie, die an dieser Stelle Verzweigungen produziert.
    fn rule_at(&self, x: f32, z: f32) -> &dyn RuleStrategy;

    /// Zentrum des radialen Strassenmusters.
    fn origin(&self) -> Vec2 {
        Vec2::ZERO
    }
}

//! Analytisches Bevölkerungsdichte-Modell.
//!
//! Eine einzelne radiale Dichteglocke: maximale Dichte im Zentrum,
//! nach aussen hin abfallend. Reicht für Stadtkerne mit Umland; mehrere
//! Zentren lassen sich über eine eigene `Environment`-Implementierung
//! kombinieren.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::geometry::clamp01;

/// Standard-Radius der Dichteglocke in Welteinheiten.
pub const DENSITY_RADIUS: f32 = 1000.0;
/// Standard-Dichte im Zentrum (Einwohner pro Flächeneinheit, Modellwert).
pub const DENSITY_AT_CENTER: f32 = 100.0;

/// Abklingkonstante der exponentiellen Kurve über den normierten Abstand.
const EXPONENTIAL_DECAY: f32 = 5.0;

/// Verlaufsform der Dichte vom Zentrum zum Rand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DensityFalloff {
    /// Linear auf null am Radius.
    #[default]
    Linear,
    /// Quadratisch, fällt nahe dem Zentrum langsamer ab.
    Quadratic,
    /// Exponentiell, konzentriert die Dichte stark im Kern.
    Exponential,
}

/// Radiales Dichtefeld um ein Stadtzentrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationDensity {
    /// Zentrum der Glocke in Plankoordinaten.
    pub center: Vec2,
    /// Radius, an dem die Dichte (bis auf den exponentiellen Rest) null erreicht.
    pub radius: f32,
    /// Spitzenwert im Zentrum.
    pub density_at_center: f32,
    /// Verlaufsform.
    pub falloff: DensityFalloff,
}

impl Default for PopulationDensity {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            radius: DENSITY_RADIUS,
            density_at_center: DENSITY_AT_CENTER,
            falloff: DensityFalloff::default(),
        }
    }
}

impl PopulationDensity {
    /// Dichteglocke mit Standardwerten um `center`.
    pub fn new(center: Vec2) -> Self {
        Self {
            center,
            ..Self::default()
        }
    }

    /// Rohe Dichte an der Plankoordinate `(x, z)`.
    pub fn density_at(&self, x: f32, z: f32) -> f32 {
        if self.radius <= 0.0 || self.density_at_center <= 0.0 {
            return 0.0;
        }
        let t = clamp01(Vec2::new(x, z).distance(self.center) / self.radius);
        let factor = match self.falloff {
            DensityFalloff::Linear => 1.0 - t,
            DensityFalloff::Quadratic => (1.0 - t) * (1.0 - t),
            DensityFalloff::Exponential => (-EXPONENTIAL_DECAY * t).exp(),
        };
        self.density_at_center * factor
    }

    /// Auf `[0, 1]` normierte Dichte an der Plankoordinate `(x, z)`.
    pub fn normalized_density_at(&self, x: f32, z: f32) -> f32 {
        if self.density_at_center <= 0.0 {
            return 0.0;
        }
        clamp01(self.density_at(x, z) / self.density_at_center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dichte_im_zentrum_ist_spitzenwert() {
        let density = PopulationDensity::new(Vec2::new(100.0, -50.0));
        assert_relative_eq!(density.density_at(100.0, -50.0), DENSITY_AT_CENTER);
        assert_relative_eq!(density.normalized_density_at(100.0, -50.0), 1.0);
    }

    #[test]
    fn test_linear_faellt_auf_null_am_radius() {
        let density = PopulationDensity::default();
        assert_relative_eq!(density.density_at(DENSITY_RADIUS, 0.0), 0.0);
        assert_relative_eq!(density.density_at(0.0, DENSITY_RADIUS / 2.0), DENSITY_AT_CENTER / 2.0);
        // Jenseits des Radius bleibt die Dichte null.
        assert_relative_eq!(density.density_at(0.0, 2.0 * DENSITY_RADIUS), 0.0);
    }

    #[test]
    fn test_alle_verlaeufe_fallen_monoton() {
        for falloff in [
            DensityFalloff::Linear,
            DensityFalloff::Quadratic,
            DensityFalloff::Exponential,
        ] {
            let density = PopulationDensity {
                falloff,
                ..PopulationDensity::default()
            };
            let mut previous = density.density_at(0.0, 0.0);
            for step in 1..=10 {
                let current = density.density_at(step as f32 * 100.0, 0.0);
                assert!(
                    current <= previous,
                    "{falloff:?} steigt zwischen Schritt {} und {}",
                    step - 1,
                    step
                );
                previous = current;
            }
        }
    }

    #[test]
    fn test_quadratisch_liegt_unter_linear() {
        let linear = PopulationDensity::default();
        let quadratic = PopulationDensity {
            falloff: DensityFalloff::Quadratic,
            ..PopulationDensity::default()
        };
        let halfway = DENSITY_RADIUS / 2.0;
        assert!(quadratic.density_at(halfway, 0.0) < linear.density_at(halfway, 0.0));
    }

    #[test]
    fn test_normierung_bleibt_im_einheitsintervall() {
        let density = PopulationDensity {
            falloff: DensityFalloff::Exponential,
            ..PopulationDensity::default()
        };
        for step in 0..=20 {
            let value = density.normalized_density_at(step as f32 * 100.0, 0.0);
            assert!((0.0..=1.0).contains(&value), "normierte Dichte {value} liegt ausserhalb [0, 1]");
        }
    }

    #[test]
    fn test_leere_glocke_liefert_null() {
        let degenerate = PopulationDensity {
            density_at_center: 0.0,
            ..PopulationDensity::default()
        };
        assert_relative_eq!(degenerate.density_at(0.0, 0.0), 0.0);
        assert_relative_eq!(degenerate.normalized_density_at(0.0, 0.0), 0.0);
    }
}

//! Analytische Beispiel-Umgebung.
//!
//! Geneigte Ebene plus radiale Dichteglocke. Kein Kartenmaterial nötig,
//! deshalb die Standard-Umgebung für Tests, Benchmarks und schnelle
//! Experimente mit den Wachstums-Parametern.

use glam::Vec2;

use crate::core::geometry::clamp01;
use crate::environment::{Environment, PopulationDensity};
use crate::lsystem::rules::{RadialRule, RectangularRule, RuleStrategy};

/// Standard-Radius der Innenstadt-Zone mit Rasterstrassen.
pub const DOWNTOWN_RADIUS: f32 = 200.0;

/// Umgebung aus geneigter Ebene, Dichteglocke und Zwei-Zonen-Regelwahl.
///
/// Innerhalb von `downtown_radius` um das Dichtezentrum wächst ein
/// rechtwinkliges Raster, aussen ein radiales Muster. Ohne Radius
/// gilt überall die radiale Regel.
#[derive(Debug, Clone)]
pub struct AnalyticEnvironment {
    density: PopulationDensity,
    base_elevation: f32,
    elevation_gradient: Vec2,
    water_level: Option<f32>,
    downtown_radius: Option<f32>,
    radial: RadialRule,
    rectangular: RectangularRule,
}

impl AnalyticEnvironment {
    /// Ebene Welt auf Höhe null um die übergebene Dichteglocke.
    pub fn new(density: PopulationDensity) -> Self {
        Self {
            density,
            base_elevation: 0.0,
            elevation_gradient: Vec2::ZERO,
            water_level: None,
            downtown_radius: Some(DOWNTOWN_RADIUS),
            radial: RadialRule,
            rectangular: RectangularRule,
        }
    }

    /// Neigt das Gelände: Höhe = `base + gradient · (x, z)`.
    pub fn with_elevation(mut self, base: f32, gradient: Vec2) -> Self {
        self.base_elevation = base;
        self.elevation_gradient = gradient;
        self
    }

    /// Alles unterhalb dieser Höhe gilt als Wasser und ist unbebaubar.
    pub fn with_water_level(mut self, level: f32) -> Self {
        self.water_level = Some(level);
        self
    }

    /// Radius der Rasterstrassen-Zone um das Dichtezentrum.
    /// `None` schaltet das Raster ab, dann gilt überall die radiale Regel.
    pub fn with_downtown_radius(mut self, radius: Option<f32>) -> Self {
        self.downtown_radius = radius;
        self
    }
}

impl Environment for AnalyticEnvironment {
    fn elevation_at(&self, x: f32, z: f32) -> f32 {
        self.base_elevation + self.elevation_gradient.dot(Vec2::new(x, z))
    }

    fn slope_at(&self, _x: f32, _z: f32) -> f32 {
        // Die Ebene ist überall gleich steil.
        clamp01(self.elevation_gradient.length())
    }

    fn density_at(&self, x: f32, z: f32) -> f32 {
        self.density.density_at(x, z)
    }

    fn normalized_density_at(&self, x: f32, z: f32) -> f32 {
        self.density.normalized_density_at(x, z)
    }

    fn is_impassable(&self, x: f32, z: f32) -> bool {
        self.water_level
            .map_or(false, |level| self.elevation_at(x, z) < level)
    }

    fn rule_at(&self, x: f32, z: f32) -> &dyn RuleStrategy {
        match self.downtown_radius {
            Some(radius) if Vec2::new(x, z).distance(self.density.center) < radius => {
                &self.rectangular
            }
            _ => &self.radial,
        }
    }

    fn origin(&self) -> Vec2 {
        self.density.center
    }
}

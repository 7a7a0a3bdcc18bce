//! Zentrale Wachstums-Parameter des Strassen-Generators.
//!
//! `GrowthOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Nachbarschaft ───────────────────────────────────────────────────

/// Suchradius (Welteinheiten) für Nachbar-Abfragen rund um neue Strassenenden.
pub const NEIGHBOURS_SEARCH_RADIUS: f32 = 50.0;
/// Maximaler Abstand, unter dem ein neues Strassenende auf einen
/// existierenden Knoten einrastet.
pub const NODE_MERGING_MAXIMUM_DISTANCE: f32 = 30.0;

// ── Strassenlängen ─────────────────────────────────────────────────

/// Kürzeste erzeugbare Strasse in Welteinheiten.
pub const MINIMUM_ROAD_LENGTH: f32 = 5.0;
/// Längste erzeugbare Strasse in Welteinheiten.
pub const MAXIMUM_ROAD_LENGTH: f32 = 50.0;

// ── Gelände ─────────────────────────────────────────────────────────

/// Halber Öffnungswinkel des Gelände-Fächers in Grad.
pub const MAXIMUM_ROAD_DEVIATION_DEGREES: f32 = 30.0;
/// Verstärkungsfaktor, mit dem Höhenunterschiede in die Längenformel eingehen.
pub const SLOPE_EXAGGERATION: f32 = 10.0;

// ── Bevölkerung ─────────────────────────────────────────────────────

/// Rohdichte, unterhalb derer ein Atom keine Nachfolger mehr produziert.
pub const POPULATION_DENSITY_MINIMUM: f32 = 1.0;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Wachstums-Parameter.
/// Wird als `city_street_generator.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthOptions {
    // ── Nachbarschaft ───────────────────────────────────────────
    /// Suchradius für Nachbar-Abfragen in Welteinheiten
    pub neighbours_search_radius: f32,
    /// Einrast-Abstand neuer Strassenenden auf existierende Knoten
    pub node_merging_maximum_distance: f32,

    // ── Strassenlängen ──────────────────────────────────────────
    /// Kürzeste erzeugbare Strasse.
    pub minimum_road_length: f32,
    /// Längste erzeugbare Strasse.
    /// Unter `neighbours_search_radius` halten, sonst liegen Schnittpunkte
    /// ausserhalb des Suchfensters und werden übersehen.
    pub maximum_road_length: f32,

    // ── Gelände ─────────────────────────────────────────────────
    /// Halber Öffnungswinkel des Gelände-Fächers in Grad
    #[serde(default = "default_maximum_road_deviation_degrees")]
    pub maximum_road_deviation_degrees: f32,
    /// Verstärkung von Höhenunterschieden in der Längenformel
    #[serde(default = "default_slope_exaggeration")]
    pub slope_exaggeration: f32,

    // ── Bevölkerung ─────────────────────────────────────────────
    /// Rohdichte, unterhalb derer das Wachstum stoppt
    pub population_density_minimum: f32,
}

impl Default for GrowthOptions {
    fn default() -> Self {
        Self {
            neighbours_search_radius: NEIGHBOURS_SEARCH_RADIUS,
            node_merging_maximum_distance: NODE_MERGING_MAXIMUM_DISTANCE,

            minimum_road_length: MINIMUM_ROAD_LENGTH,
            maximum_road_length: MAXIMUM_ROAD_LENGTH,

            maximum_road_deviation_degrees: MAXIMUM_ROAD_DEVIATION_DEGREES,
            slope_exaggeration: SLOPE_EXAGGERATION,

            population_density_minimum: POPULATION_DENSITY_MINIMUM,
        }
    }
}

/// Serde-Default für `maximum_road_deviation_degrees` (Abwärtskompatibilität).
fn default_maximum_road_deviation_degrees() -> f32 {
    MAXIMUM_ROAD_DEVIATION_DEGREES
}

/// Serde-Default für `slope_exaggeration` (Abwärtskompatibilität).
fn default_slope_exaggeration() -> f32 {
    SLOPE_EXAGGERATION
}

impl GrowthOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("city_street_generator"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("city_street_generator.toml")
    }

    /// Spannweite der Längenformel.
    ///
    /// `maximum_road_length - minimum_road_length`
    pub fn road_length_span(&self) -> f32 {
        self.maximum_road_length - self.minimum_road_length
    }
}

//! Fehlertypen des Generators.
//!
//! Zwei Klassen: `InvalidTopology` bricht nur die Produktion des einzelnen
//! Atoms ab und landet als Diagnose im `GenerationReport`. `OutOfBounds`
//! (nicht-endliche Koordinaten) ist ein Konfigurations- bzw. Eingabefehler
//! und wird bis zum Aufrufer durchgereicht.

use thiserror::Error;

/// Fehler beim Aufbau des Strassengraphen.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrowthError {
    /// Eine Operation wuerde die Graph-Topologie verletzen.
    #[error("ungueltige Topologie: {0}")]
    InvalidTopology(String),

    /// Koordinaten ausserhalb des darstellbaren Bereichs (NaN/Inf).
    #[error("Koordinaten ausserhalb des gueltigen Bereichs: ({x}, {y})")]
    OutOfBounds {
        /// Plan-X der fehlerhaften Koordinate
        x: f32,
        /// Plan-Y bzw. Z der fehlerhaften Koordinate
        y: f32,
    },
}

impl GrowthError {
    /// Baut einen `InvalidTopology`-Fehler mit formatierter Begruendung.
    pub fn topology(reason: impl Into<String>) -> Self {
        Self::InvalidTopology(reason.into())
    }

    /// Prüft ob der Fehler nur das einzelne Atom betrifft (absorbierbar).
    pub fn is_atom_local(&self) -> bool {
        matches!(self, Self::InvalidTopology(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_error_is_atom_local() {
        let err = GrowthError::topology("Selbstkante 3 → 3");
        assert!(err.is_atom_local());
        assert!(err.to_string().contains("Selbstkante"));
    }

    #[test]
    fn test_out_of_bounds_is_fatal() {
        let err = GrowthError::OutOfBounds {
            x: f32::NAN,
            y: 0.0,
        };
        assert!(!err.is_atom_local());
    }
}

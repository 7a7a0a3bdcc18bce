//! Generischer Quadtree über 2D-adressierbare Elemente.
//!
//! Überschreitet ein Blatt `max_elements`, teilt es sich in vier
//! Viertel-Quadranten auf. Wird ein Element ausserhalb der aktuellen
//! Grenzen eingefügt, wächst der Baum um einen Eltern-Knoten doppelter
//! Spannweite in die Überlauf-Richtung; der alte Baum wird einer seiner
//! Quadranten. Grenzen wachsen nur, sie schrumpfen nie.
//! Siehe http://en.wikipedia.org/wiki/Quadtree.

use crate::error::GrowthError;
use glam::Vec2;

/// Standard-Limit pro Blatt, bevor die nächste Einfügung es aufteilt.
pub const DEFAULT_MAX_ELEMENTS: usize = 10;

/// 2D-Plankoordinaten eines indexierbaren Elements.
pub trait Coordinate2D {
    /// Plan-X des Elements.
    fn x(&self) -> f32;
    /// Plan-Y des Elements.
    fn y(&self) -> f32;
}

impl Coordinate2D for Vec2 {
    fn x(&self) -> f32 {
        self.x
    }

    fn y(&self) -> f32 {
        self.y
    }
}

/// Rekursiver Quadtree mit dynamischer Teilung und wachsender Wurzel.
///
/// Quadranten-Nummerierung:
/// ```text
///  y^
///   |2 3
///   |0 1
///   +--->x
/// ```
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    /// Untere linke Ecke (inklusive)
    min: Vec2,
    /// Obere rechte Ecke (inklusive)
    max: Vec2,
    /// Teilungs-Limit pro Blatt
    max_elements: usize,
    /// Elemente dieses Blatts; leer sobald Quadranten existieren
    elements: Vec<T>,
    /// Exakt vier Kind-Quadranten halber Breite, oder keine
    quadrants: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T: Coordinate2D + PartialEq + Clone> QuadTree<T> {
    /// Erstellt einen leeren Quadtree über `[min, max]` mit Standard-Limit.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self::with_max_elements(min, max, DEFAULT_MAX_ELEMENTS)
    }

    /// Erstellt einen leeren Quadtree mit explizitem Teilungs-Limit.
    pub fn with_max_elements(min: Vec2, max: Vec2, max_elements: usize) -> Self {
        Self {
            min,
            max,
            max_elements,
            elements: Vec::new(),
            quadrants: None,
        }
    }

    /// Leerer Platzhalter-Baum ohne Ausdehnung (für `mem::replace`).
    pub fn empty() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO)
    }

    /// Fügt ein Element ein und gibt die (gegebenenfalls neue) Wurzel zurück.
    ///
    /// Liegt das Element ausserhalb der Grenzen, wird pro Schritt ein
    /// Eltern-Baum doppelter Spannweite erzeugt, bis es hineinpasst.
    /// Elemente mit nicht-endlichen Koordinaten werden verworfen: NaN
    /// vergleicht gegen jede Grenze mit false, das Wachstum würde sonst
    /// nie terminieren. Duplikate (`PartialEq`) sind No-ops.
    pub fn insert(mut self, element: T) -> Self {
        let (x, y) = (element.x(), element.y());
        if !x.is_finite() || !y.is_finite() {
            return self;
        }
        while !self.contains(x, y) {
            self = self.grow_towards(x, y);
        }
        self.insert_within(element);
        self
    }

    /// Alle Elemente innerhalb des achsenparallelen Quadrats mit
    /// Halbseite `radius` um `(x, y)` (inklusive Ränder).
    ///
    /// Teilbäume ohne Überlapp mit dem Suchquadrat werden übersprungen.
    /// Es gilt Quadrat-, nicht Kreis-Semantik; Aufrufer mit echtem
    /// Radius-Bedarf filtern das Ergebnis per Distanz nach.
    pub fn neighbors(&self, x: f32, y: f32, radius: f32) -> Result<Vec<T>, GrowthError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GrowthError::OutOfBounds { x, y });
        }
        let mut found = Vec::new();
        self.collect_in_rect(
            Vec2::new(x - radius, y - radius),
            Vec2::new(x + radius, y + radius),
            &mut found,
        );
        Ok(found)
    }

    /// Entfernt alle Elemente und kollabiert sämtliche Quadranten.
    /// Die gewachsenen Grenzen bleiben bestehen.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.quadrants = None;
    }

    /// Alle Elemente in Quadranten-Reihenfolge (rekursiv abgeflacht).
    pub fn all_elements(&self) -> Vec<T> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    /// Anzahl aller Elemente im Baum.
    pub fn len(&self) -> usize {
        match &self.quadrants {
            Some(quadrants) => quadrants.iter().map(Self::len).sum(),
            None => self.elements.len(),
        }
    }

    /// Prüft ob der Baum keine Elemente enthält.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aktuelle Grenzen als `(min, max)`.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.min, self.max)
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }

    fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Quadranten-Index für einen Punkt. `<=` geht nach unten/links.
    fn quadrant_of(center: Vec2, x: f32, y: f32) -> usize {
        let mut index = 0;
        if x > center.x {
            index |= 1;
        }
        if y > center.y {
            index += 2;
        }
        index
    }

    /// Grenzen des Kind-Quadranten `index`.
    fn quadrant_bounds(&self, index: usize) -> (Vec2, Vec2) {
        let center = self.center();
        let x = if index & 1 == 0 {
            (self.min.x, center.x)
        } else {
            (center.x, self.max.x)
        };
        let y = if index & 2 == 0 {
            (self.min.y, center.y)
        } else {
            (center.y, self.max.y)
        };
        (Vec2::new(x.0, y.0), Vec2::new(x.1, y.1))
    }

    fn create_quadrants(&self) -> Box<[Self; 4]> {
        Box::new(std::array::from_fn(|index| {
            let (min, max) = self.quadrant_bounds(index);
            Self::with_max_elements(min, max, self.max_elements)
        }))
    }

    /// Einfügung innerhalb der Grenzen: delegieren, anhängen oder teilen.
    fn insert_within(&mut self, element: T) {
        let index = Self::quadrant_of(self.center(), element.x(), element.y());
        if let Some(quadrants) = self.quadrants.as_mut() {
            quadrants[index].insert_within(element);
            return;
        }
        if self.elements.contains(&element) {
            return;
        }
        if self.elements.len() >= self.max_elements {
            self.split();
            self.insert_within(element);
            return;
        }
        self.elements.push(element);
    }

    /// Teilt das Blatt und verteilt die Elemente in Speicher-Reihenfolge.
    fn split(&mut self) {
        let center = self.center();
        let mut quadrants = self.create_quadrants();
        for element in self.elements.drain(..) {
            let index = Self::quadrant_of(center, element.x(), element.y());
            quadrants[index].insert_within(element);
        }
        self.quadrants = Some(quadrants);
    }

    /// Erzeugt einen Eltern-Baum doppelter Spannweite in Richtung `(x, y)`.
    /// Der bisherige Baum wird der Quadrant auf der Gegenseite des Überlaufs.
    fn grow_towards(self, x: f32, y: f32) -> Self {
        let span = self.max - self.min;
        let mut index = 0;

        let (min_x, max_x) = if x < self.min.x {
            index |= 1;
            (self.min.x - span.x, self.max.x)
        } else {
            (self.min.x, self.max.x + span.x)
        };
        let (min_y, max_y) = if y < self.min.y {
            index += 2;
            (self.min.y - span.y, self.max.y)
        } else {
            (self.min.y, self.max.y + span.y)
        };

        let mut parent = Self::with_max_elements(
            Vec2::new(min_x, min_y),
            Vec2::new(max_x, max_y),
            self.max_elements,
        );
        let mut quadrants = parent.create_quadrants();
        quadrants[index] = self;
        parent.quadrants = Some(quadrants);
        parent
    }

    fn collect_in_rect(&self, rect_min: Vec2, rect_max: Vec2, out: &mut Vec<T>) {
        if rect_max.x < self.min.x
            || rect_min.x > self.max.x
            || rect_max.y < self.min.y
            || rect_min.y > self.max.y
        {
            return;
        }
        if let Some(quadrants) = &self.quadrants {
            for quadrant in quadrants.iter() {
                quadrant.collect_in_rect(rect_min, rect_max, out);
            }
            return;
        }
        for element in &self.elements {
            let (x, y) = (element.x(), element.y());
            if x >= rect_min.x && x <= rect_max.x && y >= rect_min.y && y <= rect_max.y {
                out.push(element.clone());
            }
        }
    }

    fn flatten_into(&self, out: &mut Vec<T>) {
        match &self.quadrants {
            Some(quadrants) => {
                for quadrant in quadrants.iter() {
                    quadrant.flatten_into(out);
                }
            }
            None => out.extend(self.elements.iter().cloned()),
        }
    }
}

//! Produktionsmotor des L-Systems.
//!
//! Der Generator hält die aktuelle Atom-Generation und den wachsenden
//! Strassengraphen. Eine Generation entsteht durch zweifaches
//! Überschreiben der Atomliste: erst produzieren alle Verzweigungspunkte
//! ihre Strassen-Atome, dann wachsen die Strassen der Reihe nach in den
//! Graphen und hinterlassen die Verzweigungspunkte der nächsten
//! Generation. Die Reihenfolge ist Teil des Vertrags: spätere Atome
//! sehen die Knoten und Kanten, die frühere Atome im selben Schritt
//! angelegt haben.

use glam::{Vec2, Vec3};
use indexmap::IndexSet;

use crate::core::geometry::{horizontal_distance, lift_at, plan, ENDPOINT_EPSILON};
use crate::core::{EdgeType, GraphSnapshot, NodePoint, StreetGraph};
use crate::environment::{Environment, GrowthOptions};
use crate::error::GrowthError;
use crate::lsystem::atom::{Atom, BranchAtom, RoadAtom};
use crate::lsystem::rules::GrowthContext;

/// Start-Parameter eines Generator-Laufs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneratorConfig {
    /// Plankoordinate des Axioms; die Höhe kommt aus der Umgebung.
    pub axiom_position: Vec2,
    /// Generation, bis zu der `produce` den Lauf treibt.
    pub target_generations: u32,
    /// Wachstums-Parameter.
    pub options: GrowthOptions,
}

/// Ergebnis eines Produktionsschritts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    /// Index der zuletzt abgeschlossenen Generation.
    pub generation: u32,
    /// Ids der in diesem Schritt angelegten Knoten.
    pub new_nodes: Vec<u64>,
    /// Ids der in diesem Schritt angelegten Kanten.
    pub new_edges: Vec<u64>,
    /// Anzahl der von Verzweigungspunkten produzierten Strassen-Atome.
    pub spawned_roads: usize,
    /// Strassenenden, die auf einen existierenden Knoten eingerastet sind.
    pub merges: usize,
    /// Strassen, die in eine geschnittene Kante eingefädelt wurden.
    pub splices: usize,
    /// Atome, die an der Dichteschwelle gestoppt wurden.
    pub density_vetoes: usize,
    /// Strassen, die an unbebaubarem Gelände gestoppt wurden.
    pub obstacle_vetoes: usize,
    /// Absorbierte Topologie-Fehler einzelner Atome.
    pub diagnostics: Vec<GrowthError>,
    /// Ob der Lauf beendet ist (Ziel erreicht oder keine Atome mehr).
    pub settled: bool,
}

/// Wachsender Stadtstrassen-Generator.
pub struct CityGenerator {
    config: GeneratorConfig,
    env: Box<dyn Environment>,
    graph: StreetGraph,
    generation: Vec<Atom>,
    produced_generations: u32,
}

impl CityGenerator {
    /// Baut einen Generator und setzt das Axiom in den Graphen.
    ///
    /// Schlägt fehl, wenn die Axiom-Position nicht endlich ist. Fragwürdige
    /// Parameter-Kombinationen werden nur gemeldet, nicht abgewiesen.
    pub fn new(config: GeneratorConfig, env: Box<dyn Environment>) -> Result<Self, GrowthError> {
        let options = &config.options;
        if options.maximum_road_length > options.neighbours_search_radius {
            log::warn!(
                "maximum_road_length {} liegt über neighbours_search_radius {}: Schnittpunkte am Strassenende können übersehen werden",
                options.maximum_road_length,
                options.neighbours_search_radius
            );
        }
        if options.minimum_road_length > options.maximum_road_length {
            log::warn!(
                "minimum_road_length {} liegt über maximum_road_length {}",
                options.minimum_road_length,
                options.maximum_road_length
            );
        }

        let mut generator = Self {
            config,
            env,
            graph: StreetGraph::new(),
            generation: Vec::new(),
            produced_generations: 0,
        };
        generator.seed_axiom()?;
        Ok(generator)
    }

    /// Setzt das Axiom als Wurzelknoten samt erstem Verzweigungs-Atom.
    fn seed_axiom(&mut self) -> Result<(), GrowthError> {
        let axiom = self.config.axiom_position;
        let elevation = self.env.elevation_at(axiom.x, axiom.y);
        let node = self.graph.add_node(lift_at(axiom, elevation))?;
        self.generation.push(Atom::Branch(BranchAtom::new(node, None)));
        Ok(())
    }

    /// Führt genau einen Generationsschritt aus.
    ///
    /// Bei erreichtem Ziel oder leerer Atomliste passiert nichts; der
    /// Bericht kommt dann leer und mit gesetztem `settled` zurück.
    /// Ein fataler Fehler (`OutOfBounds`) lässt den Lauf in undefiniertem
    /// Zustand zurück; danach hilft nur `reset`.
    pub fn advance_one_generation(&mut self) -> Result<GenerationReport, GrowthError> {
        let mut report = GenerationReport {
            generation: self.produced_generations,
            ..GenerationReport::default()
        };
        if self.produced_generations >= self.config.target_generations
            || self.generation.is_empty()
        {
            report.settled = true;
            return Ok(report);
        }

        let branches = std::mem::take(&mut self.generation);
        let roads = self.rewrite(branches, &mut report)?;
        self.generation = self.rewrite(roads, &mut report)?;

        self.produced_generations += 1;
        report.generation = self.produced_generations;
        report.settled = self.generation.is_empty()
            || self.produced_generations >= self.config.target_generations;

        log::info!(
            "Generation {}: {} neue Knoten, {} neue Kanten, {} aktive Atome",
            report.generation,
            report.new_nodes.len(),
            report.new_edges.len(),
            self.generation.len()
        );
        Ok(report)
    }

    /// Produziert Generationen bis zur Zielgeneration oder bis nichts
    /// mehr wächst. Ein Bericht pro ausgeführtem Schritt.
    pub fn produce(&mut self) -> Result<Vec<GenerationReport>, GrowthError> {
        let mut reports = Vec::new();
        while self.produced_generations < self.config.target_generations
            && !self.generation.is_empty()
        {
            let report = self.advance_one_generation()?;
            let settled = report.settled;
            reports.push(report);
            if settled {
                break;
            }
        }
        Ok(reports)
    }

    /// Setzt die Zielgeneration und produziert bis dorthin.
    ///
    /// Ein niedrigeres Ziel lässt sich nicht rückwärts rechnen; der Lauf
    /// wird dann verworfen und von vorn bis zum neuen Ziel produziert.
    pub fn set_target_generations(
        &mut self,
        target: u32,
    ) -> Result<Vec<GenerationReport>, GrowthError> {
        if target < self.produced_generations {
            log::info!(
                "Zielgeneration {target} liegt unter Stand {}, Netz wird neu aufgebaut",
                self.produced_generations
            );
            self.reset()?;
        }
        self.config.target_generations = target;
        self.produce()
    }

    /// Verwirft Graph und Atome und setzt das Axiom neu.
    pub fn reset(&mut self) -> Result<(), GrowthError> {
        self.graph.reset();
        self.generation.clear();
        self.produced_generations = 0;
        self.seed_axiom()
    }

    /// Schreibt alle Atome einer Liste fort; Topologie-Fehler einzelner
    /// Atome landen als Diagnose im Bericht statt den Lauf zu beenden.
    fn rewrite(
        &mut self,
        atoms: Vec<Atom>,
        report: &mut GenerationReport,
    ) -> Result<Vec<Atom>, GrowthError> {
        let mut next = Vec::new();
        for atom in &atoms {
            match self.produce_atom(atom, report) {
                Ok(children) => next.extend(children),
                Err(err) if err.is_atom_local() => {
                    log::warn!("Atom an Knoten {} verworfen: {err}", atom.node());
                    report.diagnostics.push(err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(next)
    }

    fn produce_atom(
        &mut self,
        atom: &Atom,
        report: &mut GenerationReport,
    ) -> Result<Vec<Atom>, GrowthError> {
        let Some(node) = self.graph.node(atom.node()) else {
            return Err(GrowthError::topology(format!(
                "Atom an unbekanntem Knoten {}",
                atom.node()
            )));
        };
        let position = node.position;

        // Dichteschwelle: zu dünn besiedelte Atome produzieren nichts.
        if self.env.density_at(position.x, position.z)
            < self.config.options.population_density_minimum
        {
            report.density_vetoes += 1;
            return Ok(Vec::new());
        }

        match atom {
            Atom::Branch(branch) => {
                let ctx = GrowthContext {
                    graph: &self.graph,
                    env: self.env.as_ref(),
                    options: &self.config.options,
                };
                let roads = self
                    .env
                    .rule_at(position.x, position.z)
                    .spawn_roads(branch, &ctx);
                report.spawned_roads += roads.len();
                // Degenerierte Richtungen wachsen nicht.
                Ok(roads
                    .into_iter()
                    .filter(|road| road.forward != Vec3::ZERO)
                    .map(Atom::Road)
                    .collect())
            }
            Atom::Road(road) => self.produce_road(road, report),
        }
    }

    /// Lässt ein Strassen-Atom in den Graphen wachsen.
    ///
    /// Reihenfolge der Auflösung: Verschmelzen mit einem nahen Knoten,
    /// sonst Einfädeln in die nächstgelegene geschnittene Kante, sonst
    /// neuer Knoten auf freiem Feld. Nur der letzte Fall produziert
    /// einen Verzweigungspunkt für die nächste Generation.
    fn produce_road(
        &mut self,
        road: &RoadAtom,
        report: &mut GenerationReport,
    ) -> Result<Vec<Atom>, GrowthError> {
        if road.forward == Vec3::ZERO {
            return Ok(Vec::new());
        }
        let Some(origin) = self.graph.node(road.node) else {
            return Err(GrowthError::topology(format!(
                "Strassen-Atom an unbekanntem Knoten {}",
                road.node
            )));
        };
        let origin_position = origin.position;
        let origin_edges = origin.edges.clone();

        let length = {
            let ctx = GrowthContext {
                graph: &self.graph,
                env: self.env.as_ref(),
                options: &self.config.options,
            };
            self.env
                .rule_at(origin_position.x, origin_position.z)
                .road_length(road, &ctx)
        };
        let spawn_plan = plan(origin_position) + plan(road.forward) * length;
        let spawn = lift_at(spawn_plan, self.env.elevation_at(spawn_plan.x, spawn_plan.y));

        let neighbors = self
            .graph
            .neighbors_within(spawn_plan, self.config.options.neighbours_search_radius)?;

        // 1. Verschmelzen: ein nahes Strassenende übernimmt den Endpunkt.
        // Der eigene Ursprung liegt bei kurzen Strassen selbst im
        // Einrast-Abstand und zählt deshalb nicht als Kandidat.
        if let Some(target) = closest_node(
            &neighbors,
            road.node,
            spawn_plan,
            self.config.options.node_merging_maximum_distance,
        ) {
            let already_connected = self.graph.edge_between(road.node, target).is_some();
            let edge = self.graph.connect(road.node, target, EdgeType::Urban)?;
            if !already_connected {
                report.new_edges.push(edge);
            }
            report.merges += 1;
            return Ok(Vec::new());
        }

        // 2. Einfädeln: nächstgelegener Schnittpunkt mit einer fremden Kante.
        // Kanten am eigenen Ursprung berühren die Strasse immer, die zählen nicht.
        let mut candidates: IndexSet<u64> = IndexSet::new();
        for point in &neighbors {
            let Some(neighbor) = self.graph.node(point.id) else {
                continue;
            };
            for &edge_id in &neighbor.edges {
                if !origin_edges.contains(&edge_id) {
                    candidates.insert(edge_id);
                }
            }
        }
        let mut best: Option<(u64, Vec3)> = None;
        let mut best_distance = f32::INFINITY;
        for &edge_id in &candidates {
            let Some(hit) = self.graph.edge_intersection(edge_id, origin_position, spawn) else {
                continue;
            };
            let distance = plan(hit).distance(plan(origin_position));
            if distance < best_distance {
                best_distance = distance;
                best = Some((edge_id, hit));
            }
        }
        if let Some((edge_id, hit)) = best {
            return self.splice_road(road.node, edge_id, hit, report);
        }

        // 3. Freies Feld: unbebaubares Gelände stoppt, sonst neuer Knoten.
        if self.env.is_impassable(spawn_plan.x, spawn_plan.y) {
            report.obstacle_vetoes += 1;
            return Ok(Vec::new());
        }
        let node = self.graph.add_node(spawn)?;
        report.new_nodes.push(node);
        let edge = self.graph.connect(road.node, node, EdgeType::Urban)?;
        report.new_edges.push(edge);
        Ok(vec![Atom::Branch(BranchAtom::new(node, Some(road.node)))])
    }

    /// Fädelt eine Strasse in eine geschnittene Kante ein.
    ///
    /// Endpunktnahe Treffer werden auf den Endpunkt umgeleitet, statt die
    /// Kante in ein degeneriertes Stück zu teilen.
    fn splice_road(
        &mut self,
        origin: u64,
        edge_id: u64,
        hit: Vec3,
        report: &mut GenerationReport,
    ) -> Result<Vec<Atom>, GrowthError> {
        let Some(edge) = self.graph.edge(edge_id) else {
            return Err(GrowthError::topology(format!(
                "Schnittkante {edge_id} nicht gefunden"
            )));
        };

        let near_endpoint = [edge.from_node, edge.to_node].into_iter().find(|&id| {
            self.graph
                .node(id)
                .map_or(false, |node| horizontal_distance(node.position, hit) <= ENDPOINT_EPSILON)
        });
        if let Some(endpoint) = near_endpoint {
            let already_connected = self.graph.edge_between(origin, endpoint).is_some();
            let edge = self.graph.connect(origin, endpoint, EdgeType::Urban)?;
            if !already_connected {
                report.new_edges.push(edge);
            }
            report.splices += 1;
            return Ok(Vec::new());
        }

        let split = self.graph.split_edge(edge_id, hit)?;
        report.new_nodes.push(split.node);
        report.new_edges.push(split.first);
        report.new_edges.push(split.second);
        let connecting = self.graph.connect(origin, split.node, EdgeType::Urban)?;
        report.new_edges.push(connecting);
        report.splices += 1;
        Ok(Vec::new())
    }

    /// Der gewachsene Strassengraph.
    pub fn graph(&self) -> &StreetGraph {
        &self.graph
    }

    /// Momentaufnahme des erreichbaren Netzes, `None` vor dem Axiom.
    pub fn snapshot(&self) -> Option<GraphSnapshot> {
        self.graph.snapshot()
    }

    /// Die Umgebung, in der der Generator wächst.
    pub fn environment(&self) -> &dyn Environment {
        self.env.as_ref()
    }

    /// Aktive Wachstums-Parameter.
    pub fn options(&self) -> &GrowthOptions {
        &self.config.options
    }

    /// Anzahl der abgeschlossenen Generationen.
    pub fn produced_generations(&self) -> u32 {
        self.produced_generations
    }

    /// Aktuelle Zielgeneration.
    pub fn target_generations(&self) -> u32 {
        self.config.target_generations
    }

    /// Anzahl der Atome, die im nächsten Schritt produzieren würden.
    pub fn active_atom_count(&self) -> usize {
        self.generation.len()
    }

    /// Ob der Lauf beendet ist (Ziel erreicht oder keine Atome mehr).
    pub fn is_settled(&self) -> bool {
        self.produced_generations >= self.config.target_generations
            || self.generation.is_empty()
    }
}

/// Nächstliegender Knoten in der Plan-Ebene, sofern innerhalb `max_distance`.
/// `exclude` (der Ursprung der suchenden Strasse) wird übergangen.
/// Bei Gleichstand hält `<` den zuerst gefundenen Treffer fest.
fn closest_node(
    neighbors: &[NodePoint],
    exclude: u64,
    target: Vec2,
    max_distance: f32,
) -> Option<u64> {
    let mut best = None;
    let mut best_distance = f32::INFINITY;
    for point in neighbors {
        if point.id == exclude {
            continue;
        }
        let distance = point.plan.distance(target);
        if distance < best_distance {
            best_distance = distance;
            best = Some(point.id);
        }
    }
    if best_distance <= max_distance {
        best
    } else {
        None
    }
}

use crate::error::TargetingError;
use crate::estimate::snapshot::Snapshot;
use crate::features::TargetingFeatures;
use crate::gateway::TerritoryInputs;
use crate::planet::data::*;
use crate::planet::graph::*;
use crate::planet::routefinder::*;
use crate::targets::data::*;
use crate::targets::resolver::*;
use crate::targetsystem::TargetSystem;
use chrono::{DateTime, Duration, TimeZone, Utc};

pub const FRIENDLY: Faction = Faction(1);
pub const HOSTILE: Faction = Faction(2);

/// Fixed "now" every fixture is built against.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-6, "expected {} but was {}", expected, actual);
}

/// Baseline snapshot `minutes` after `base_time` (negative is before).
pub fn snapshot(planet_id: PlanetId, minutes: i64, health: u64, max_health: u64) -> Snapshot {
    Snapshot {
        planet_id,
        event_id: None,
        timestamp: base_time() + Duration::minutes(minutes),
        health,
        max_health,
        regen_per_second: 0.0,
    }
}

/// Hostile planet at full health with no regen and no players.
pub fn hostile_planet(id: PlanetId) -> Planet {
    Planet {
        id,
        owner: HOSTILE,
        health: 1000,
        max_health: 1000,
        regen_per_second: 0.0,
        event: None,
        attacking: Vec::new(),
        player_count: 0,
    }
}

/// Event that started an hour ago and runs for another day.
pub fn event(id: EventId, faction: Faction, health: u64, max_health: u64) -> PlanetEvent {
    PlanetEvent {
        id,
        faction,
        health,
        max_health,
        start_time: base_time() - Duration::hours(1),
        end_time: base_time() + Duration::hours(24),
    }
}

pub fn liberate(id: ObjectiveId, planet: PlanetId) -> Objective {
    Objective {
        id,
        kind: ObjectiveKind::Liberate { planet },
        progress: 0,
    }
}

/// Friendly 4 under an event, attacked by hostile 5 and 6 (health out of
/// 1000), supplied from friendly 1.
pub fn gambit_map(health_5: u64, health_6: u64) -> TerritoryBuilder {
    TerritoryBuilder::new()
        .friendly(1)
        .friendly(4)
        .hostile_at(5, health_5)
        .hostile_at(6, health_6)
        .link(1, 4)
        .link(4, 5)
        .link(4, 6)
        .event(4, 2, 500, 1000)
        .attacking(5, &[4])
        .attacking(6, &[4])
}

/// `gambit_map` with a one hour assignment to defend 4.
pub fn gambit_territory(health_5: u64, health_6: u64) -> TerritoryBuilder {
    gambit_map(health_5, health_6).assignment(
        3_600_000,
        vec![Objective {
            id: 1,
            kind: ObjectiveKind::Defend { planet: 4 },
            progress: 0,
        }],
    )
}

/// In-memory territory assembled one planet and link at a time.
pub struct TerritoryBuilder {
    inputs: TerritoryInputs,
    features: TargetingFeatures,
    index: PlanetIndex,
    graph: PlanetGraph,
}

impl TerritoryBuilder {
    pub fn new() -> TerritoryBuilder {
        TerritoryBuilder {
            inputs: TerritoryInputs::default(),
            features: TargetingFeatures::default(),
            index: PlanetIndex::default(),
            graph: PlanetGraph::default(),
        }
    }

    fn rebuilt(mut self) -> TerritoryBuilder {
        self.index = PlanetIndex::new(self.inputs.planets.iter().cloned());
        self.graph = PlanetGraph::from_links(self.inputs.supply_links.iter());
        self
    }

    fn planet(mut self, planet: Planet) -> TerritoryBuilder {
        self.inputs.planets.retain(|existing| existing.id != planet.id);
        self.inputs.planets.push(planet);
        self.rebuilt()
    }

    fn update(mut self, id: PlanetId, f: impl FnOnce(&mut Planet)) -> TerritoryBuilder {
        let planet = self
            .inputs
            .planets
            .iter_mut()
            .find(|planet| planet.id == id)
            .unwrap_or_else(|| panic!("planet {} must be added before it is updated", id));

        f(planet);

        self.rebuilt()
    }

    pub fn friendly(self, id: PlanetId) -> TerritoryBuilder {
        let mut planet = hostile_planet(id);
        planet.owner = FRIENDLY;
        self.planet(planet)
    }

    pub fn hostile(self, id: PlanetId) -> TerritoryBuilder {
        self.planet(hostile_planet(id))
    }

    pub fn hostile_with_regen(self, id: PlanetId, regen_per_second: f64) -> TerritoryBuilder {
        let mut planet = hostile_planet(id);
        planet.regen_per_second = regen_per_second;
        self.planet(planet)
    }

    pub fn hostile_at(self, id: PlanetId, health: u64) -> TerritoryBuilder {
        let mut planet = hostile_planet(id);
        planet.health = health;
        self.planet(planet)
    }

    pub fn link(self, origin: PlanetId, destination: PlanetId) -> TerritoryBuilder {
        self.supply_link(SupplyLink::new(origin, destination))
    }

    pub fn supply_link(mut self, link: SupplyLink) -> TerritoryBuilder {
        self.inputs.supply_links.push(link);
        self.rebuilt()
    }

    pub fn players(self, id: PlanetId, player_count: u64) -> TerritoryBuilder {
        self.update(id, |planet| planet.player_count = player_count)
    }

    pub fn event(self, id: PlanetId, faction: u32, health: u64, max_health: u64) -> TerritoryBuilder {
        self.update(id, |planet| planet.event = Some(event(id as EventId, Faction(faction), health, max_health)))
    }

    /// Moves the end of the planet's event relative to `base_time`.
    pub fn event_ending(self, id: PlanetId, ms_from_now: i64) -> TerritoryBuilder {
        self.update(id, |planet| {
            if let Some(event) = planet.event.as_mut() {
                event.end_time = base_time() + Duration::milliseconds(ms_from_now);
            }
        })
    }

    pub fn attacking(self, id: PlanetId, targets: &[PlanetId]) -> TerritoryBuilder {
        self.update(id, |planet| planet.attacking = targets.to_vec())
    }

    pub fn sector(mut self, id: PlanetId, sector: SectorId) -> TerritoryBuilder {
        self.inputs.sectors.0.insert(id, sector);
        self
    }

    pub fn assignment(mut self, ms_from_now: i64, objectives: Vec<Objective>) -> TerritoryBuilder {
        let id = self.inputs.assignments.len() as u64 + 1;

        self.inputs.assignments.push(Assignment {
            id,
            deadline: base_time() + Duration::milliseconds(ms_from_now),
            objectives,
        });

        self
    }

    pub fn planets(&self) -> &PlanetIndex {
        &self.index
    }

    pub fn inputs(&self) -> &TerritoryInputs {
        &self.inputs
    }

    pub fn route_finder(&self) -> RouteFinder<'_> {
        RouteFinder::new(
            &self.graph,
            &self.index,
            self.features.routing.friendly_faction,
            self.features.routing.max_depth,
        )
    }

    pub fn with_resolver<R>(&self, f: impl FnOnce(&TargetResolver) -> R) -> R {
        let route_finder = self.route_finder();
        let resolver = TargetResolver::new(
            &self.index,
            &self.graph,
            &self.inputs.sectors,
            &route_finder,
            self.features.routing.friendly_faction,
        );

        f(&resolver)
    }

    /// Runs a full pass with a fixed impact estimate instead of one derived
    /// from snapshots.
    pub fn resolve_with(&self, impact_per_hour: Option<f64>, total_players: u64) -> Result<Vec<Target>, TargetingError> {
        let mut inputs = self.inputs.clone();
        inputs.total_players = total_players;

        TargetSystem::run_with_impact(&inputs, base_time(), &self.features, impact_per_hour)
    }
}

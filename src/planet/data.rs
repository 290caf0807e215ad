use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

pub type PlanetId = u32;
pub type EventId = u64;
pub type SectorId = u32;

/// Numeric faction identifier. Which faction counts as friendly is a
/// configuration concern, see `RoutingFeatures::friendly_faction`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Faction(pub u32);

impl Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "faction {}", self.0)
    }
}

/// A time-boxed attack on a planet with its own health bounds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanetEvent {
    pub id: EventId,
    /// Faction running the attack.
    pub faction: Faction,
    pub health: u64,
    pub max_health: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub owner: Faction,
    pub health: u64,
    pub max_health: u64,
    #[serde(default)]
    pub regen_per_second: f64,
    #[serde(default)]
    pub event: Option<PlanetEvent>,
    /// Planets this planet is currently attacking.
    #[serde(default)]
    pub attacking: Vec<PlanetId>,
    #[serde(default)]
    pub player_count: u64,
}

impl Planet {
    /// Health bounds that drive progress. An active event takes precedence
    /// over the baseline health.
    pub fn health_bounds(&self) -> (u64, u64) {
        match &self.event {
            Some(event) => (event.health, event.max_health),
            None => (self.health, self.max_health),
        }
    }

    pub fn has_event(&self) -> bool {
        self.event.is_some()
    }

    pub fn is_attacking(&self, planet: PlanetId) -> bool {
        self.attacking.contains(&planet)
    }

    /// A planet matches a faction filter if the faction owns it or runs its
    /// active event.
    pub fn involves_faction(&self, faction: Faction) -> bool {
        self.owner == faction || self.event.as_ref().map(|e| e.faction == faction).unwrap_or(false)
    }
}

impl Display for Planet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "planet {} ({})", self.id, self.owner)
    }
}

/// Supply link between two planets. Each side can be disabled independently;
/// a disabled side cannot be entered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupplyLink {
    pub origin: PlanetId,
    pub destination: PlanetId,
    #[serde(default = "default_bidirectional")]
    pub bidirectional: bool,
    #[serde(default)]
    pub origin_disabled: bool,
    #[serde(default)]
    pub destination_disabled: bool,
}

fn default_bidirectional() -> bool {
    true
}

impl SupplyLink {
    pub fn new(origin: PlanetId, destination: PlanetId) -> SupplyLink {
        SupplyLink {
            origin,
            destination,
            bidirectional: true,
            origin_disabled: false,
            destination_disabled: false,
        }
    }

    pub fn other_side(&self, planet: PlanetId) -> Option<PlanetId> {
        if self.origin == planet {
            Some(self.destination)
        } else if self.destination == planet {
            Some(self.origin)
        } else {
            None
        }
    }

    /// Whether the link may be crossed leaving `from` and entering `to`.
    pub fn can_traverse(&self, from: PlanetId, to: PlanetId) -> bool {
        if from == self.origin && to == self.destination {
            !self.destination_disabled
        } else if from == self.destination && to == self.origin {
            self.bidirectional && !self.origin_disabled
        } else {
            false
        }
    }
}

/// Planet id to sector membership.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorTable(pub HashMap<PlanetId, SectorId>);

impl SectorTable {
    pub fn sector_of(&self, planet: PlanetId) -> Option<SectorId> {
        self.0.get(&planet).copied()
    }

    /// No filter matches every planet. A filter never matches a planet with no
    /// recorded sector.
    pub fn matches(&self, planet: PlanetId, filter: Option<SectorId>) -> bool {
        match filter {
            Some(sector) => self.sector_of(planet) == Some(sector),
            None => true,
        }
    }
}

/// Planets indexed by id. Lookups of missing ids are precondition violations.
#[derive(Clone, Debug, Default)]
pub struct PlanetIndex {
    planets: HashMap<PlanetId, Planet>,
}

impl PlanetIndex {
    pub fn new(planets: impl IntoIterator<Item = Planet>) -> PlanetIndex {
        PlanetIndex {
            planets: planets.into_iter().map(|planet| (planet.id, planet)).collect(),
        }
    }

    pub fn get(&self, id: PlanetId) -> Result<&Planet, crate::error::TargetingError> {
        self.planets.get(&id).ok_or(crate::error::TargetingError::UnknownPlanet(id))
    }

    /// Planets ordered by id so that scans are deterministic.
    pub fn iter(&self) -> impl Iterator<Item = &Planet> {
        let mut planets: Vec<_> = self.planets.values().collect();
        planets.sort_by_key(|planet| planet.id);
        planets.into_iter()
    }
}

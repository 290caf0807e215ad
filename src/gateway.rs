use crate::error::{GatewayError, TargetingError};
use crate::estimate::snapshot::Snapshot;
use crate::features::TargetingFeatures;
use crate::planet::data::*;
use crate::targets::data::Assignment;
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};

/// Read-only lookups a resolution pass needs from the surrounding
/// application.
pub trait TerritoryGateway {
    fn planets(&self) -> Result<Vec<Planet>, GatewayError>;

    fn supply_links(&self) -> Result<Vec<SupplyLink>, GatewayError>;

    fn assignments(&self) -> Result<Vec<Assignment>, GatewayError>;

    /// Snapshots captured at or after `cutoff`.
    fn snapshots_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Snapshot>, GatewayError>;

    fn sectors(&self) -> Result<SectorTable, GatewayError>;

    fn total_players(&self) -> Result<u64, GatewayError>;
}

/// Gateway over data already held in memory, loadable from a single JSON
/// document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryGateway {
    pub planets: Vec<Planet>,
    pub supply_links: Vec<SupplyLink>,
    pub assignments: Vec<Assignment>,
    pub snapshots: Vec<Snapshot>,
    pub sectors: SectorTable,
    /// Falls back to the sum of players on every planet.
    pub total_players: Option<u64>,
}

impl InMemoryGateway {
    pub fn from_json(data: &str) -> Result<InMemoryGateway, serde_json::Error> {
        serde_json::from_str(data)
    }
}

impl TerritoryGateway for InMemoryGateway {
    fn planets(&self) -> Result<Vec<Planet>, GatewayError> {
        Ok(self.planets.clone())
    }

    fn supply_links(&self) -> Result<Vec<SupplyLink>, GatewayError> {
        Ok(self.supply_links.clone())
    }

    fn assignments(&self) -> Result<Vec<Assignment>, GatewayError> {
        Ok(self.assignments.clone())
    }

    fn snapshots_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Snapshot>, GatewayError> {
        Ok(self.snapshots.iter().filter(|snapshot| snapshot.timestamp >= cutoff).cloned().collect())
    }

    fn sectors(&self) -> Result<SectorTable, GatewayError> {
        Ok(self.sectors.clone())
    }

    fn total_players(&self) -> Result<u64, GatewayError> {
        Ok(self
            .total_players
            .unwrap_or_else(|| self.planets.iter().map(|planet| planet.player_count).sum()))
    }
}

/// Complete, static inputs for one resolution pass.
#[derive(Clone, Debug, Default)]
pub struct TerritoryInputs {
    pub planets: Vec<Planet>,
    pub supply_links: Vec<SupplyLink>,
    pub assignments: Vec<Assignment>,
    pub snapshots: Vec<Snapshot>,
    pub sectors: SectorTable,
    pub total_players: u64,
}

fn completed<T>(lookup: &'static str, result: Option<Result<T, GatewayError>>) -> Result<T, GatewayError> {
    result.unwrap_or_else(|| Err(GatewayError::Unavailable(lookup, "never completed".to_string())))
}

fn or_empty<T: Default>(lookup: &'static str, result: Option<Result<T, GatewayError>>) -> T {
    completed(lookup, result).unwrap_or_else(|err| {
        warn!("Gateway lookup failed, continuing without it. Lookup: {} - Error: {}", lookup, err);

        T::default()
    })
}

impl TerritoryInputs {
    /// Issues every lookup concurrently and gathers the results. A failed
    /// lookup is replaced by empty data so the pass still runs on the rest.
    /// Only an unusable snapshot window fails the gather.
    pub fn gather<G>(gateway: &G, now: DateTime<Utc>, features: &TargetingFeatures) -> Result<TerritoryInputs, TargetingError>
    where
        G: TerritoryGateway + Sync,
    {
        let cutoff = features.estimate.snapshot_cutoff(now)?;

        let mut planets = None;
        let mut supply_links = None;
        let mut assignments = None;
        let mut snapshots = None;
        let mut sectors = None;
        let mut total_players = None;

        rayon::scope(|scope| {
            scope.spawn(|_| planets = Some(gateway.planets()));
            scope.spawn(|_| supply_links = Some(gateway.supply_links()));
            scope.spawn(|_| assignments = Some(gateway.assignments()));
            scope.spawn(|_| snapshots = Some(gateway.snapshots_since(cutoff)));
            scope.spawn(|_| sectors = Some(gateway.sectors()));
            scope.spawn(|_| total_players = Some(gateway.total_players()));
        });

        Ok(TerritoryInputs {
            planets: or_empty("planets", planets),
            supply_links: or_empty("supply links", supply_links),
            assignments: or_empty("assignments", assignments),
            snapshots: or_empty("snapshots", snapshots),
            sectors: or_empty("sectors", sectors),
            total_players: or_empty("total players", total_players),
        })
    }
}

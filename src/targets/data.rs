use crate::planet::data::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

pub type ObjectiveId = u64;

/// Optional planet/faction/sector filter shared by the counting objectives.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveFilter {
    #[serde(default)]
    pub planet: Option<PlanetId>,
    #[serde(default)]
    pub faction: Option<Faction>,
    #[serde(default)]
    pub sector: Option<SectorId>,
}

/// What an objective asks of the community, with the payload each kind needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectiveKind {
    Liberate {
        planet: PlanetId,
    },
    Hold {
        planet: PlanetId,
    },
    Defend {
        planet: PlanetId,
    },
    /// Win a number of defenses anywhere matching the filter.
    DefendAmount {
        amount: u64,
        #[serde(default)]
        faction: Option<Faction>,
        #[serde(default)]
        sector: Option<SectorId>,
    },
    Kill {
        amount: u64,
        #[serde(default)]
        filter: ObjectiveFilter,
    },
    Collect {
        amount: u64,
        #[serde(default)]
        filter: ObjectiveFilter,
    },
    Operations {
        amount: u64,
        #[serde(default)]
        filter: ObjectiveFilter,
    },
    /// Gain ground anywhere matching the filter.
    LiberateMore {
        #[serde(default)]
        faction: Option<Faction>,
        #[serde(default)]
        sector: Option<SectorId>,
    },
}

impl ObjectiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectiveKind::Liberate { .. } => "liberate",
            ObjectiveKind::Hold { .. } => "hold",
            ObjectiveKind::Defend { .. } => "defend",
            ObjectiveKind::DefendAmount { .. } => "defend_amount",
            ObjectiveKind::Kill { .. } => "kill",
            ObjectiveKind::Collect { .. } => "collect",
            ObjectiveKind::Operations { .. } => "operations",
            ObjectiveKind::LiberateMore { .. } => "liberate_more",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: ObjectiveId,
    #[serde(flatten)]
    pub kind: ObjectiveKind,
    #[serde(default)]
    pub progress: u64,
}

impl Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "objective {} ({})", self.id, self.kind.name())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
}

impl Assignment {
    pub fn ms_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_milliseconds()
    }
}

/// A planet the community should act on, derived fresh on every pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub planet_id: PlanetId,
    pub objective_ids: BTreeSet<ObjectiveId>,
    /// Actionable now, as opposed to waiting on another target.
    pub valid: bool,
    /// The objective only advances once this planet is neutralized.
    pub needs_completion: bool,
    /// Planets whose targeting depends on this one.
    pub dependants: Vec<PlanetId>,
    pub time_remaining_ms: i64,
    pub regen: f64,
}

impl Target {
    /// Folds a duplicate entry for the same planet into this one.
    pub fn merge(&mut self, other: Target) {
        debug_assert_eq!(self.planet_id, other.planet_id);

        self.valid |= other.valid;
        self.needs_completion |= other.needs_completion;
        self.objective_ids.extend(other.objective_ids);
        self.dependants.extend(other.dependants);
        self.dependants.sort_unstable();
        self.dependants.dedup();
        self.time_remaining_ms = self.time_remaining_ms.min(other.time_remaining_ms);
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "planet {} - objectives {:?} - valid: {} - remaining: {}ms",
            self.planet_id, self.objective_ids, self.valid, self.time_remaining_ms
        )
    }
}

use crate::error::TargetingError;
use crate::planet::data::Faction;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Tunables for a resolution pass. Every field has a default, so `{}` is a
/// complete configuration document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingFeatures {
    pub routing: RoutingFeatures,
    pub estimate: EstimateFeatures,
    pub objectives: ObjectiveFeatures,
}

impl TargetingFeatures {
    pub fn from_json(data: &str) -> Result<TargetingFeatures, TargetingError> {
        let features: TargetingFeatures = serde_json::from_str(data)?;

        features.estimate.snapshot_window()?;

        Ok(features)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingFeatures {
    /// Maximum number of hops a liberation route may span.
    pub max_depth: usize,
    pub friendly_faction: Faction,
}

impl Default for RoutingFeatures {
    fn default() -> Self {
        RoutingFeatures {
            max_depth: 5,
            friendly_faction: Faction(1),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateFeatures {
    /// Progress (percent per hour) above which a planet is considered boosted
    /// and excluded from the per-player estimate.
    pub boosted_progress_threshold: f64,
    /// Trailing window of snapshots requested from the gateway.
    pub snapshot_window_minutes: i64,
}

impl EstimateFeatures {
    pub fn snapshot_window(&self) -> Result<Duration, TargetingError> {
        let minutes = self.snapshot_window_minutes;

        if minutes < 0 {
            return Err(TargetingError::InvalidSnapshotWindow(minutes));
        }

        Duration::try_minutes(minutes).ok_or(TargetingError::InvalidSnapshotWindow(minutes))
    }

    /// Oldest snapshot timestamp a pass at `now` asks for.
    pub fn snapshot_cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, TargetingError> {
        now.checked_sub_signed(self.snapshot_window()?)
            .ok_or(TargetingError::InvalidSnapshotWindow(self.snapshot_window_minutes))
    }
}

impl Default for EstimateFeatures {
    fn default() -> Self {
        EstimateFeatures {
            boosted_progress_threshold: 8.0,
            snapshot_window_minutes: 60,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveFeatures {
    /// Groups a LIBERATE-MORE objective needs before it is satisfied.
    pub liberate_more_need: u64,
}

impl Default for ObjectiveFeatures {
    fn default() -> Self {
        ObjectiveFeatures { liberate_more_need: 2 }
    }
}

use crate::error::TargetingError;
use crate::planet::data::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MINUTES_PER_HOUR: f64 = 60.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Health of one planet (or one event on it) captured at a point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub planet_id: PlanetId,
    #[serde(default)]
    pub event_id: Option<EventId>,
    pub timestamp: DateTime<Utc>,
    pub health: u64,
    pub max_health: u64,
    #[serde(default)]
    pub regen_per_second: f64,
}

impl Snapshot {
    fn series_key(&self) -> (PlanetId, Option<EventId>) {
        (self.planet_id, self.event_id)
    }

    /// Completion in percent: 0 at full health, 100 when neutralized.
    pub fn completion_percent(&self) -> Result<f64, TargetingError> {
        if self.max_health == 0 {
            return Err(TargetingError::ZeroMaxHealth(self.planet_id));
        }

        let max_health = self.max_health as f64;

        Ok((max_health - self.health as f64) / max_health * 100.0)
    }

    pub fn regen_percent_per_hour(&self) -> Result<f64, TargetingError> {
        regen_percent_per_hour(self.planet_id, self.regen_per_second, self.max_health)
    }
}

/// Converts a per-second regen into percent of `max_health` per hour.
pub fn regen_percent_per_hour(planet_id: PlanetId, regen_per_second: f64, max_health: u64) -> Result<f64, TargetingError> {
    if max_health == 0 {
        return Err(TargetingError::ZeroMaxHealth(planet_id));
    }

    Ok(regen_per_second * SECONDS_PER_HOUR / max_health as f64 * 100.0)
}

/// Hourly progress estimates, both in percent per hour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressRate {
    /// Endpoint slope.
    pub simple: f64,
    /// Least-squares slope over every snapshot.
    pub regression: f64,
}

/// Selects the snapshots of one planet/event series, ordered by timestamp.
pub fn select_series(snapshots: &[Snapshot], planet_id: PlanetId, event_id: Option<EventId>) -> Vec<Snapshot> {
    let mut series: Vec<Snapshot> = snapshots
        .iter()
        .filter(|snapshot| snapshot.series_key() == (planet_id, event_id))
        .cloned()
        .collect();

    series.sort_by_key(|snapshot| snapshot.timestamp);

    series
}

fn describe_series(key: (PlanetId, Option<EventId>)) -> String {
    match key.1 {
        Some(event_id) => format!("planet {} event {}", key.0, event_id),
        None => format!("planet {} without event", key.0),
    }
}

fn validate_series(snapshots: &[Snapshot]) -> Result<(), TargetingError> {
    let Some(first) = snapshots.first() else {
        return Ok(());
    };

    let expected = first.series_key();

    for snapshot in snapshots.iter() {
        if snapshot.series_key() != expected {
            return Err(TargetingError::MixedSnapshots {
                expected: describe_series(expected),
                found: describe_series(snapshot.series_key()),
            });
        }
    }

    if snapshots.windows(2).any(|pair| pair[1].timestamp < pair[0].timestamp) {
        return Err(TargetingError::UnorderedSnapshots(first.planet_id));
    }

    Ok(())
}

/// Estimates hourly progress from a series of snapshots.
///
/// Fewer than two snapshots carry no rate and yield zero. Every snapshot must
/// belong to the same planet/event series and be ordered by timestamp. Both
/// estimates add the regen of the latest snapshot back in, so they describe
/// gross player progress rather than the net change.
pub fn estimate_rate(snapshots: &[Snapshot]) -> Result<ProgressRate, TargetingError> {
    if snapshots.len() < 2 {
        return Ok(ProgressRate::default());
    }

    validate_series(snapshots)?;

    let (first, last) = match (snapshots.first(), snapshots.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(ProgressRate::default()),
    };

    let points = snapshots
        .iter()
        .map(|snapshot| {
            let minutes = (snapshot.timestamp - first.timestamp).num_milliseconds() as f64 / 60_000.0;

            snapshot.completion_percent().map(|percent| (minutes, percent))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let elapsed_minutes = points[points.len() - 1].0;

    if elapsed_minutes <= 0.0 {
        return Err(TargetingError::ZeroElapsedTime(first.planet_id));
    }

    let regen = last.regen_percent_per_hour()?;

    let simple = (points[points.len() - 1].1 - points[0].1) / (elapsed_minutes / MINUTES_PER_HOUR) + regen;

    let regression = regression_slope(&points).ok_or(TargetingError::ZeroElapsedTime(first.planet_id))? * MINUTES_PER_HOUR + regen;

    Ok(ProgressRate { simple, regression })
}

/// Ordinary least-squares slope of y against x. None when every x is equal.
fn regression_slope(points: &[(f64, f64)]) -> Option<f64> {
    let count = points.len() as f64;

    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / count;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / count;

    let covariance: f64 = points.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
    let variance: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();

    if variance > 0.0 {
        Some(covariance / variance)
    } else {
        None
    }
}

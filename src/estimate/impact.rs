use super::snapshot::*;
use crate::error::TargetingError;
use crate::planet::data::*;
use itertools::*;
use log::*;

/// Estimates how much health one player removes per hour.
///
/// Planets without an active event are ranked by player count. The first one
/// whose regression estimate sits below `boosted_threshold` (percent per hour)
/// provides the estimate; planets above it are assumed to be in a boosted state
/// that would overstate the per-player contribution. Planets without at least
/// two baseline snapshots carry no estimate and are skipped.
///
/// Returns `None` when no planet qualifies.
pub fn estimate_player_impact_per_hour(
    planets: &PlanetIndex,
    snapshots: &[Snapshot],
    boosted_threshold: f64,
) -> Result<Option<f64>, TargetingError> {
    let ranked = planets
        .iter()
        .filter(|planet| !planet.has_event() && planet.player_count > 0)
        .sorted_by(|a, b| b.player_count.cmp(&a.player_count));

    for planet in ranked {
        let series = select_series(snapshots, planet.id, None);

        if series.len() < 2 {
            continue;
        }

        let rate = estimate_rate(&series)?.regression;

        if rate >= boosted_threshold {
            debug!(
                "Skipping boosted planet for impact estimate. Planet: {} - Rate: {:.2}%/h - Players: {}",
                planet.id, rate, planet.player_count
            );

            continue;
        }

        //
        // NOTE: The rate is a percentage of the snapshot bounds, so the health base must come from the same series.
        //

        let max_health = series.last().map(|snapshot| snapshot.max_health).unwrap_or(0);

        if max_health == 0 {
            return Err(TargetingError::ZeroMaxHealth(planet.id));
        }

        let impact = (max_health as f64 * rate / 100.0) / planet.player_count as f64;

        debug!(
            "Estimated player impact. Planet: {} - Rate: {:.2}%/h - Players: {} - Impact: {:.2}/h",
            planet.id, rate, planet.player_count, impact
        );

        return Ok(Some(impact));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn test_uses_busiest_unboosted_planet() {
        let territory = TerritoryBuilder::new()
            .hostile(1)
            .hostile(2)
            .hostile(3)
            .players(1, 5000)
            .players(2, 2000)
            .players(3, 1000);

        let snapshots = vec![
            // 20%/h on the busiest planet: boosted, skipped.
            snapshot(1, 0, 1_000_000, 1_000_000),
            snapshot(1, 60, 800_000, 1_000_000),
            // 4%/h on the next.
            snapshot(2, 0, 1_000_000, 1_000_000),
            snapshot(2, 30, 980_000, 1_000_000),
            snapshot(2, 60, 960_000, 1_000_000),
            snapshot(3, 0, 1_000_000, 1_000_000),
            snapshot(3, 60, 990_000, 1_000_000),
        ];

        let impact = estimate_player_impact_per_hour(territory.planets(), &snapshots, 8.0).unwrap().unwrap();

        // 40k health per hour across 2000 players.
        assert_close(impact, 20.0);
    }

    #[test]
    fn test_event_planets_and_empty_history_are_skipped() {
        let territory = TerritoryBuilder::new()
            .hostile(1)
            .friendly(2)
            .hostile(3)
            .event(2, 4, 500, 1000)
            .players(1, 9000)
            .players(2, 8000)
            .players(3, 100);

        let snapshots = vec![snapshot(3, 0, 1000, 1000), snapshot(3, 60, 950, 1000)];

        let impact = estimate_player_impact_per_hour(territory.planets(), &snapshots, 8.0).unwrap().unwrap();

        assert_close(impact, 0.5);
    }

    #[test]
    fn test_health_base_follows_snapshots_not_planet() {
        // The planet record says 1000 max health, the series was captured at 500,000.
        let territory = TerritoryBuilder::new().hostile(1).players(1, 100);

        let snapshots = vec![snapshot(1, 0, 500_000, 500_000), snapshot(1, 60, 485_000, 500_000)];

        let impact = estimate_player_impact_per_hour(territory.planets(), &snapshots, 8.0).unwrap().unwrap();

        // 3%/h of 500,000 across 100 players.
        assert_close(impact, 150.0);
    }

    #[test]
    fn test_no_qualifying_planet_is_none() {
        let territory = TerritoryBuilder::new().hostile(1).players(1, 100);

        assert_eq!(estimate_player_impact_per_hour(territory.planets(), &[], 8.0).unwrap(), None);
    }
}

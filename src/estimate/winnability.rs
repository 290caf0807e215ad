use super::snapshot::regen_percent_per_hour;
use crate::error::TargetingError;
use crate::planet::data::*;
use log::*;

const MS_PER_HOUR: f64 = 3_600_000.0;

fn hours(ms_remaining: i64) -> f64 {
    ms_remaining.max(0) as f64 / MS_PER_HOUR
}

/// Health percent still standing and the enemy regen percent per hour.
/// Events do not regenerate.
fn health_state(planet: &Planet) -> Result<(f64, f64, u64), TargetingError> {
    let (health, max_health) = planet.health_bounds();

    if max_health == 0 {
        return Err(TargetingError::ZeroMaxHealth(planet.id));
    }

    let remaining = health as f64 / max_health as f64 * 100.0;

    let regen = if planet.has_event() {
        0.0
    } else {
        regen_percent_per_hour(planet.id, planet.regen_per_second, max_health)?
    };

    Ok((remaining, regen, max_health))
}

/// Whether the players currently on `planet` neutralize it before the time
/// runs out, given the estimated health removed per player per hour.
///
/// Not consulted by a resolution pass, which sizes offenses against the whole
/// playerbase instead. Exposed for callers reporting on a single planet.
pub fn is_planet_winnable(ms_remaining: i64, planet: &Planet, impact_per_hour: f64) -> Result<bool, TargetingError> {
    let (remaining, regen, max_health) = health_state(planet)?;

    let hours = hours(ms_remaining);
    let impact = impact_per_hour * planet.player_count as f64 / max_health as f64 * 100.0;

    let projected = remaining - impact * hours + regen * hours;

    Ok(projected <= 0.0)
}

/// Smallest share of the playerbase (0..) that neutralizes `planet` in time.
pub fn min_offense_fraction(planet: &Planet, ms_remaining: i64, impact_per_hour: f64, total_players: u64) -> Result<f64, TargetingError> {
    if ms_remaining <= 0 {
        return Err(TargetingError::NoTimeRemaining);
    }

    if total_players == 0 {
        return Err(TargetingError::ZeroPlayers);
    }

    if impact_per_hour <= 0.0 {
        return Err(TargetingError::ZeroImpact);
    }

    let (remaining, regen, max_health) = health_state(planet)?;

    let hours = hours(ms_remaining);
    let per_player = impact_per_hour / max_health as f64 * 100.0;

    let players_needed = (remaining + regen * hours) / (per_player * hours);

    Ok((players_needed / total_players as f64).max(0.0))
}

/// Whether one shared pool of players can neutralize every attacker in time.
///
/// Attackers are evaluated in order and evaluation stops as soon as the
/// cumulative required share passes the whole playerbase.
pub fn is_gambit_winnable(ms_remaining: i64, attackers: &[&Planet], impact_per_hour: f64, total_players: u64) -> Result<bool, TargetingError> {
    if attackers.is_empty() {
        return Ok(false);
    }

    let mut required = 0.0;

    for attacker in attackers.iter() {
        required += min_offense_fraction(attacker, ms_remaining, impact_per_hour, total_players)? * 100.0;

        if required > 100.0 {
            debug!("Gambit exceeds playerbase. Attacker: {} - Required: {:.1}%", attacker.id, required);

            return Ok(false);
        }
    }

    Ok(true)
}

use super::aggregator::*;
use super::data::*;
use crate::error::TargetingError;
use crate::estimate::winnability::*;
use crate::planet::data::*;
use crate::planet::routefinder::*;
use chrono::{DateTime, Utc};
use itertools::*;
use log::*;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Shared inputs every objective is finalized against.
pub struct FinalizeContext<'a> {
    pub planets: &'a PlanetIndex,
    pub route_finder: &'a RouteFinder<'a>,
    pub friendly: Faction,
    pub now: DateTime<Utc>,
    /// Health removed per player per hour. Without an estimate no gambit is
    /// evaluated.
    pub impact_per_hour: Option<f64>,
    pub total_players: u64,
    pub liberate_more_need: u64,
}

/// A defended planet together with the hostile candidates attacking it.
#[derive(Clone, Debug, PartialEq)]
pub struct DefenseGroup {
    pub defender: PlanetId,
    pub attackers: Vec<PlanetId>,
}

enum Unit<'g> {
    Defense(&'g DefenseGroup),
    Liberation(PlanetId),
}

/// Validates aggregated candidates and emits the final, deduplicated targets.
pub struct TargetFinalizer<'a> {
    context: FinalizeContext<'a>,
    aggregator: &'a TargetAggregator,
}

impl<'a> TargetFinalizer<'a> {
    pub fn new(context: FinalizeContext<'a>, aggregator: &'a TargetAggregator) -> TargetFinalizer<'a> {
        TargetFinalizer { context, aggregator }
    }

    pub fn finalize(&self, assignments: &[Assignment]) -> Result<Vec<Target>, TargetingError> {
        let mut entries = Vec::new();

        for assignment in assignments.iter() {
            let ms_remaining = assignment.ms_remaining(self.context.now).max(0);

            for objective in assignment.objectives.iter() {
                let targets = self.finalize_objective(objective, ms_remaining)?;

                debug!("Finalized objective. {} - Targets: {}", objective, targets.len());

                entries.extend(targets);
            }
        }

        Ok(deduplicate(entries))
    }

    fn finalize_objective(&self, objective: &Objective, ms_remaining: i64) -> Result<Vec<Target>, TargetingError> {
        let candidates = self.aggregator.candidates(objective.id);

        match &objective.kind {
            ObjectiveKind::Liberate { .. } => self.liberation_targets(objective, candidates, ms_remaining),
            ObjectiveKind::Hold { planet } | ObjectiveKind::Defend { planet } => {
                let defended = self.context.planets.get(*planet)?;

                if defended.has_event() {
                    let (groups, _) = self.group_defenses(candidates)?;

                    let mut targets = Vec::new();

                    for group in groups.iter() {
                        targets.extend(self.defense_targets(objective, group, ms_remaining)?);
                    }

                    Ok(targets)
                } else if defended.owner != self.context.friendly {
                    self.liberation_targets(objective, candidates, ms_remaining)
                } else {
                    Ok(Vec::new())
                }
            }
            ObjectiveKind::DefendAmount { amount, .. } => {
                let need = amount.saturating_sub(objective.progress);

                self.defend_amount_targets(objective, candidates, need, ms_remaining)
            }
            ObjectiveKind::LiberateMore { .. } => {
                let need = self.context.liberate_more_need.saturating_sub(objective.progress);

                self.liberate_more_targets(objective, candidates, need, ms_remaining)
            }
            ObjectiveKind::Kill { .. } | ObjectiveKind::Collect { .. } | ObjectiveKind::Operations { .. } => candidates
                .iter()
                .map(|planet| self.target(objective, *planet, true, false, Vec::new(), ms_remaining))
                .collect(),
        }
    }

    fn target(
        &self,
        objective: &Objective,
        planet: PlanetId,
        valid: bool,
        needs_completion: bool,
        dependants: Vec<PlanetId>,
        time_remaining_ms: i64,
    ) -> Result<Target, TargetingError> {
        let regen = self.context.planets.get(planet)?.regen_per_second;

        let mut objective_ids = self.aggregator.objectives_for(planet);
        objective_ids.insert(objective.id);

        Ok(Target {
            planet_id: planet,
            objective_ids,
            valid,
            needs_completion,
            dependants,
            time_remaining_ms: time_remaining_ms.max(0),
            regen,
        })
    }

    /// Only the hop next to friendly territory is actionable; every other hop
    /// waits on the one after it. Time is split evenly across the route.
    fn liberation_targets(&self, objective: &Objective, route: &[PlanetId], ms_remaining: i64) -> Result<Vec<Target>, TargetingError> {
        let share = ms_remaining / (route.len() as i64 + 1);

        route
            .iter()
            .enumerate()
            .map(|(index, planet)| {
                let valid = index + 1 == route.len();
                let dependants = if index > 0 { vec![route[index - 1]] } else { Vec::new() };

                self.target(objective, *planet, valid, true, dependants, share)
            })
            .collect()
    }

    /// Splits candidates into defense groups and everything else. A candidate
    /// with an active event defends; a hostile candidate attacking it joins its
    /// group.
    pub fn group_defenses(&self, candidates: &[PlanetId]) -> Result<(Vec<DefenseGroup>, Vec<PlanetId>), TargetingError> {
        let mut groups = Vec::new();

        for candidate in candidates.iter().unique() {
            if !self.context.planets.get(*candidate)?.has_event() {
                continue;
            }

            let mut attackers = Vec::new();

            for other in candidates.iter().unique() {
                let planet = self.context.planets.get(*other)?;

                if *other != *candidate && planet.owner != self.context.friendly && planet.is_attacking(*candidate) {
                    attackers.push(*other);
                }
            }

            groups.push(DefenseGroup {
                defender: *candidate,
                attackers,
            });
        }

        let rest = candidates
            .iter()
            .unique()
            .filter(|candidate| !groups.iter().any(|g| g.defender == **candidate || g.attackers.contains(*candidate)))
            .copied()
            .collect();

        Ok((groups, rest))
    }

    /// Gates one defense through the winnability check.
    ///
    /// When the deadline is reachable and the shared playerbase can beat every
    /// attacker, the attackers become the targets. Otherwise the defended
    /// planet itself is the target, invalid if the deadline has passed.
    fn defense_targets(&self, objective: &Objective, group: &DefenseGroup, ms_remaining: i64) -> Result<Vec<Target>, TargetingError> {
        let defender = self.context.planets.get(group.defender)?;

        let ms_remaining = match &defender.event {
            Some(event) => ms_remaining.min((event.end_time - self.context.now).num_milliseconds()),
            None => ms_remaining,
        };

        if ms_remaining <= 0 {
            return Ok(vec![self.target(objective, group.defender, false, true, group.attackers.clone(), 0)?]);
        }

        if let Some(impact) = self.context.impact_per_hour {
            if !group.attackers.is_empty() && self.context.total_players > 0 {
                let attackers = group
                    .attackers
                    .iter()
                    .map(|id| self.context.planets.get(*id))
                    .collect::<Result<Vec<_>, _>>()?;

                if is_gambit_winnable(ms_remaining, &attackers, impact, self.context.total_players)? {
                    debug!("Gambit winnable. Defender: {} - Attackers: {:?}", group.defender, group.attackers);

                    return group
                        .attackers
                        .iter()
                        .map(|attacker| {
                            let others = group.attackers.iter().filter(|other| *other != attacker).copied().collect();

                            self.target(objective, *attacker, true, true, others, ms_remaining)
                        })
                        .collect();
                }
            }
        }

        Ok(vec![self.target(objective, group.defender, true, true, Vec::new(), ms_remaining)?])
    }

    /// Ranks groups by how often their attackers appear across all groups, so
    /// attackers threatening several defenses come first. Ties keep their
    /// input order.
    fn rank_groups(groups: Vec<DefenseGroup>) -> Vec<DefenseGroup> {
        let mut appearances: HashMap<PlanetId, usize> = HashMap::new();

        for attacker in groups.iter().flat_map(|group| group.attackers.iter()) {
            *appearances.entry(*attacker).or_default() += 1;
        }

        groups
            .into_iter()
            .sorted_by_key(|group| Reverse(group.attackers.iter().map(|a| appearances.get(a).copied().unwrap_or(0)).sum::<usize>()))
            .collect()
    }

    fn defend_amount_targets(&self, objective: &Objective, candidates: &[PlanetId], need: u64, ms_remaining: i64) -> Result<Vec<Target>, TargetingError> {
        let (groups, _) = self.group_defenses(candidates)?;

        let mut targets = Vec::new();
        let mut satisfied = 0;

        for group in Self::rank_groups(groups).iter() {
            if satisfied >= need {
                break;
            }

            let group_targets = self.defense_targets(objective, group, ms_remaining)?;

            if group_targets.iter().any(|target| target.valid) {
                satisfied += 1;
            }

            targets.extend(group_targets);
        }

        Ok(targets)
    }

    fn liberate_more_targets(&self, objective: &Objective, candidates: &[PlanetId], need: u64, ms_remaining: i64) -> Result<Vec<Target>, TargetingError> {
        let (groups, rest) = self.group_defenses(candidates)?;

        let units = groups.iter().map(Unit::Defense).interleave(rest.iter().map(|planet| Unit::Liberation(*planet)));

        let mut targets = Vec::new();
        let mut satisfied = 0;

        for unit in units {
            if satisfied >= need {
                break;
            }

            let unit_targets = match unit {
                Unit::Defense(group) => self.defense_targets(objective, group, ms_remaining)?,
                Unit::Liberation(planet) => {
                    let route = self
                        .context
                        .route_finder
                        .shortest_route(planet)?
                        .map(|route| route.without_anchor().to_vec())
                        .unwrap_or_default();

                    self.liberation_targets(objective, &route, ms_remaining)?
                }
            };

            if unit_targets.iter().any(|target| target.valid) {
                satisfied += 1;
            }

            targets.extend(unit_targets);
        }

        Ok(targets)
    }
}

/// Merges entries for the same planet: validity and completion are OR'd,
/// objectives and dependants unioned, and the shortest time remaining kept.
pub fn deduplicate(entries: Vec<Target>) -> Vec<Target> {
    entries
        .into_iter()
        .into_group_map_by(|target| target.planet_id)
        .into_values()
        .filter_map(|duplicates| {
            duplicates.into_iter().reduce(|mut merged, duplicate| {
                merged.merge(duplicate);
                merged
            })
        })
        .map(|mut target| {
            target.dependants.sort_unstable();
            target.dependants.dedup();
            target
        })
        .sorted_by_key(|target| target.planet_id)
        .collect()
}

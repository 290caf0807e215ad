use super::data::*;
use crate::error::TargetingError;
use crate::planet::data::*;
use crate::planet::graph::*;
use crate::planet::routefinder::*;
use itertools::*;
use log::*;

/// Turns a single objective into raw candidate planets.
pub struct TargetResolver<'a> {
    planets: &'a PlanetIndex,
    graph: &'a PlanetGraph,
    sectors: &'a SectorTable,
    route_finder: &'a RouteFinder<'a>,
    friendly: Faction,
}

impl<'a> TargetResolver<'a> {
    pub fn new(
        planets: &'a PlanetIndex,
        graph: &'a PlanetGraph,
        sectors: &'a SectorTable,
        route_finder: &'a RouteFinder<'a>,
        friendly: Faction,
    ) -> TargetResolver<'a> {
        TargetResolver {
            planets,
            graph,
            sectors,
            route_finder,
            friendly,
        }
    }

    pub fn resolve(&self, objective: &Objective) -> Result<Vec<PlanetId>, TargetingError> {
        let candidates = match &objective.kind {
            ObjectiveKind::Liberate { planet } => self.liberate(*planet)?,
            ObjectiveKind::Hold { planet } | ObjectiveKind::Defend { planet } => self.defend(*planet)?,
            ObjectiveKind::DefendAmount { faction, sector, .. } => self.defend_amount(*faction, *sector)?,
            ObjectiveKind::Kill { filter, .. } | ObjectiveKind::Collect { filter, .. } | ObjectiveKind::Operations { filter, .. } => {
                self.filtered(filter)
            }
            ObjectiveKind::LiberateMore { faction, sector } => self.liberate_more(*faction, *sector)?,
        };

        debug!("Resolved candidates. {} - Candidates: {:?}", objective, candidates);

        Ok(candidates)
    }

    fn is_friendly(&self, planet: &Planet) -> bool {
        planet.owner == self.friendly
    }

    /// The liberation route toward `planet`, ordered from `planet` to the hop
    /// adjacent to friendly territory.
    pub fn liberate(&self, planet: PlanetId) -> Result<Vec<PlanetId>, TargetingError> {
        if self.is_friendly(self.planets.get(planet)?) {
            return Ok(Vec::new());
        }

        let route = self.route_finder.shortest_route(planet)?;

        Ok(route.map(|route| route.without_anchor().to_vec()).unwrap_or_default())
    }

    fn defend(&self, planet: PlanetId) -> Result<Vec<PlanetId>, TargetingError> {
        let defended = self.planets.get(planet)?;

        if defended.has_event() {
            self.defense_group(defended)
        } else if !self.is_friendly(defended) {
            self.liberate(planet)
        } else {
            Ok(Vec::new())
        }
    }

    /// Hostile neighbours currently attacking `planet`.
    pub fn attackers(&self, planet: PlanetId) -> Result<Vec<PlanetId>, TargetingError> {
        let mut attackers = Vec::new();

        for neighbour in self.graph.linked(planet).unique() {
            let attacker = self.planets.get(neighbour)?;

            if !self.is_friendly(attacker) && attacker.is_attacking(planet) {
                attackers.push(neighbour);
            }
        }

        Ok(attackers)
    }

    fn defense_group(&self, defended: &Planet) -> Result<Vec<PlanetId>, TargetingError> {
        let mut group = vec![defended.id];

        group.extend(self.attackers(defended.id)?);

        Ok(group)
    }

    fn defend_amount(&self, faction: Option<Faction>, sector: Option<SectorId>) -> Result<Vec<PlanetId>, TargetingError> {
        let mut candidates = Vec::new();

        for planet in self.planets.iter() {
            let Some(event) = &planet.event else {
                continue;
            };

            if faction.map(|faction| event.faction != faction).unwrap_or(false) {
                continue;
            }

            if !self.sectors.matches(planet.id, sector) {
                continue;
            }

            candidates.extend(self.defense_group(planet)?);
        }

        Ok(candidates.into_iter().unique().collect())
    }

    fn filtered(&self, filter: &ObjectiveFilter) -> Vec<PlanetId> {
        self.planets
            .iter()
            .filter(|planet| filter.planet.map(|id| planet.id == id).unwrap_or(true))
            .filter(|planet| filter.faction.map(|faction| planet.involves_faction(faction)).unwrap_or(true))
            .filter(|planet| self.sectors.matches(planet.id, filter.sector))
            .map(|planet| planet.id)
            .collect()
    }

    /// Planets the community can make progress on right now: friendly planets
    /// under attack (with their attackers) and hostile planets directly
    /// supplied from friendly territory.
    fn liberate_more(&self, faction: Option<Faction>, sector: Option<SectorId>) -> Result<Vec<PlanetId>, TargetingError> {
        let mut candidates = Vec::new();

        for planet in self.planets.iter() {
            if faction.map(|faction| !planet.involves_faction(faction)).unwrap_or(false) {
                continue;
            }

            if !self.sectors.matches(planet.id, sector) {
                continue;
            }

            if self.is_friendly(planet) {
                if planet.has_event() {
                    candidates.extend(self.defense_group(planet)?);
                }
            } else if self.route_finder.is_available(planet.id)? {
                candidates.push(planet.id);
            }
        }

        Ok(candidates.into_iter().unique().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn objective(kind: ObjectiveKind) -> Objective {
        Objective { id: 1, kind, progress: 0 }
    }

    /// Friendly 1 - hostile 2 - hostile 3, plus a defended friendly 4 attacked
    /// by hostile 5 and 6 (6 is not linked to 4).
    fn territory() -> TerritoryBuilder {
        TerritoryBuilder::new()
            .friendly(1)
            .hostile(2)
            .hostile(3)
            .friendly(4)
            .hostile(5)
            .hostile(6)
            .friendly(7)
            .link(1, 2)
            .link(2, 3)
            .link(4, 5)
            .link(4, 7)
            .link(6, 3)
            .event(4, 2, 400, 1000)
            .attacking(5, &[4])
            .attacking(6, &[4])
            .attacking(7, &[4])
            .sector(2, 10)
            .sector(3, 10)
            .sector(4, 20)
    }

    #[test]
    fn test_liberate_returns_route_without_anchor() {
        let territory = territory();

        let candidates = territory.with_resolver(|resolver| resolver.resolve(&objective(ObjectiveKind::Liberate { planet: 3 }))).unwrap();

        assert_eq!(candidates, vec![3, 2]);
    }

    #[test]
    fn test_liberate_friendly_planet_has_no_candidates() {
        let territory = territory();

        let candidates = territory.with_resolver(|resolver| resolver.resolve(&objective(ObjectiveKind::Liberate { planet: 1 }))).unwrap();

        assert!(candidates.is_empty());
    }

    #[test]
    fn test_defend_gathers_linked_hostile_attackers() {
        let territory = territory();

        let candidates = territory.with_resolver(|resolver| resolver.resolve(&objective(ObjectiveKind::Defend { planet: 4 }))).unwrap();

        // 6 is attacking but not linked, 7 is linked but friendly.
        assert_eq!(candidates, vec![4, 5]);
    }

    #[test]
    fn test_hold_hostile_planet_delegates_to_liberate() {
        let territory = territory();

        let candidates = territory.with_resolver(|resolver| resolver.resolve(&objective(ObjectiveKind::Hold { planet: 2 }))).unwrap();

        assert_eq!(candidates, vec![2]);
    }

    #[test]
    fn test_defend_amount_filters_by_sector_and_faction() {
        let territory = territory();

        let in_sector = territory
            .with_resolver(|resolver| {
                resolver.resolve(&objective(ObjectiveKind::DefendAmount {
                    amount: 1,
                    faction: None,
                    sector: Some(20),
                }))
            })
            .unwrap();

        assert_eq!(in_sector, vec![4, 5]);

        let other_faction = territory
            .with_resolver(|resolver| {
                resolver.resolve(&objective(ObjectiveKind::DefendAmount {
                    amount: 1,
                    faction: Some(Faction(3)),
                    sector: None,
                }))
            })
            .unwrap();

        assert!(other_faction.is_empty());
    }

    #[test]
    fn test_kill_filters_full_planet_list() {
        let territory = territory();

        let candidates = territory
            .with_resolver(|resolver| {
                resolver.resolve(&objective(ObjectiveKind::Kill {
                    amount: 500,
                    filter: ObjectiveFilter {
                        planet: None,
                        faction: Some(Faction(2)),
                        sector: Some(10),
                    },
                }))
            })
            .unwrap();

        assert_eq!(candidates, vec![2, 3]);
    }

    #[test]
    fn test_liberate_more_takes_reachable_planets() {
        let territory = territory();

        let candidates = territory
            .with_resolver(|resolver| {
                resolver.resolve(&objective(ObjectiveKind::LiberateMore {
                    faction: None,
                    sector: None,
                }))
            })
            .unwrap();

        // 2 is supplied by 1, 4 is under attack by 5; 3 and 6 are out of reach.
        assert_eq!(candidates, vec![2, 4, 5]);
    }

    #[test]
    fn test_liberation_follows_supply_direction() {
        // 1 supplies 2 with its own side disabled. 3 only supplies into 1.
        let mut friendly_side_disabled = SupplyLink::new(1, 2);
        friendly_side_disabled.origin_disabled = true;

        let mut one_way_in = SupplyLink::new(3, 1);
        one_way_in.bidirectional = false;

        let territory = TerritoryBuilder::new()
            .friendly(1)
            .hostile(2)
            .hostile(3)
            .supply_link(friendly_side_disabled)
            .supply_link(one_way_in);

        let liberate_more = territory
            .with_resolver(|resolver| {
                resolver.resolve(&objective(ObjectiveKind::LiberateMore {
                    faction: None,
                    sector: None,
                }))
            })
            .unwrap();

        assert_eq!(liberate_more, vec![2]);

        let liberate_2 = territory.with_resolver(|resolver| resolver.resolve(&objective(ObjectiveKind::Liberate { planet: 2 }))).unwrap();
        let liberate_3 = territory.with_resolver(|resolver| resolver.resolve(&objective(ObjectiveKind::Liberate { planet: 3 }))).unwrap();

        assert_eq!(liberate_2, vec![2]);
        assert!(liberate_3.is_empty());
    }

    #[test]
    fn test_unknown_objective_planet_is_precondition_violation() {
        let territory = territory();

        let result = territory.with_resolver(|resolver| resolver.resolve(&objective(ObjectiveKind::Defend { planet: 42 })));

        assert!(matches!(result, Err(TargetingError::UnknownPlanet(42))));
    }
}

use super::data::*;
use super::graph::*;
use crate::error::TargetingError;
use itertools::*;
use log::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A complete path from a contested planet back to friendly territory.
/// The first entry is the start, the last entry is the friendly anchor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    planets: Vec<PlanetId>,
}

impl Route {
    pub fn new(planets: Vec<PlanetId>) -> Route {
        Route { planets }
    }

    pub fn planets(&self) -> &[PlanetId] {
        &self.planets
    }

    /// Planets between the start and the anchor.
    pub fn intermediate(&self) -> &[PlanetId] {
        if self.planets.len() <= 2 {
            &[]
        } else {
            &self.planets[1..self.planets.len() - 1]
        }
    }

    /// The route with the friendly anchor removed. A route consisting only of
    /// a friendly start has nothing left to liberate.
    pub fn without_anchor(&self) -> &[PlanetId] {
        if self.planets.len() <= 1 {
            &[]
        } else {
            &self.planets[..self.planets.len() - 1]
        }
    }
}

/// Depth-bounded search for routes from a contested planet to friendly
/// territory.
pub struct RouteFinder<'a> {
    graph: &'a PlanetGraph,
    planets: &'a PlanetIndex,
    friendly: Faction,
    max_depth: usize,
}

impl<'a> RouteFinder<'a> {
    pub fn new(graph: &'a PlanetGraph, planets: &'a PlanetIndex, friendly: Faction, max_depth: usize) -> RouteFinder<'a> {
        RouteFinder {
            graph,
            planets,
            friendly,
            max_depth,
        }
    }

    fn is_friendly(&self, planet: PlanetId) -> Result<bool, TargetingError> {
        Ok(self.planets.get(planet)?.owner == self.friendly)
    }

    /// Every route from `from` to the first friendly planet reached along each
    /// branch, in discovery order. Routes follow supply backwards: each step
    /// moves to a planet that can enter the current one, the same rule
    /// `is_available` applies to the last hop.
    pub fn all_routes(&self, from: PlanetId) -> Result<Vec<Route>, TargetingError> {
        if self.is_friendly(from)? {
            return Ok(vec![Route::new(vec![from])]);
        }

        let mut routes = Vec::new();
        let mut path = vec![from];

        self.search(&mut path, &mut routes)?;

        trace!("Enumerated routes. Planet: {} - Routes: {}", from, routes.len());

        Ok(routes)
    }

    fn search(&self, path: &mut Vec<PlanetId>, routes: &mut Vec<Route>) -> Result<(), TargetingError> {
        //
        // NOTE: Path holds hops + 1 planets, so extending is only allowed while the hop count is below the bound.
        //

        if path.len() > self.max_depth {
            return Ok(());
        }

        let current = match path.last() {
            Some(current) => *current,
            None => return Ok(()),
        };

        for next in self.graph.entered_from(current) {
            if path.contains(&next) {
                continue;
            }

            path.push(next);

            if self.is_friendly(next)? {
                routes.push(Route::new(path.clone()));
            } else {
                self.search(path, routes)?;
            }

            path.pop();
        }

        Ok(())
    }

    /// The route whose intermediate planets have the lowest combined regen.
    /// Ties resolve to the first route discovered.
    pub fn shortest_route(&self, from: PlanetId) -> Result<Option<Route>, TargetingError> {
        let routes = self.all_routes(from)?;

        let costs = routes
            .iter()
            .map(|route| self.route_cost(route))
            .collect::<Result<Vec<_>, _>>()?;

        let best = costs
            .iter()
            .position_min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        Ok(best.map(|index| routes[index].clone()))
    }

    fn route_cost(&self, route: &Route) -> Result<f64, TargetingError> {
        route
            .intermediate()
            .iter()
            .map(|planet| self.planets.get(*planet).map(|p| p.regen_per_second))
            .sum()
    }

    /// Whether any friendly planet can supply `planet` directly.
    pub fn is_available(&self, planet: PlanetId) -> Result<bool, TargetingError> {
        for neighbour in self.graph.entered_from(planet) {
            if self.is_friendly(neighbour)? {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

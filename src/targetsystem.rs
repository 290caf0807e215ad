use crate::error::TargetingError;
use crate::estimate::impact::*;
use crate::features::TargetingFeatures;
use crate::gateway::*;
use crate::planet::data::*;
use crate::planet::graph::*;
use crate::planet::routefinder::*;
use crate::targets::aggregator::*;
use crate::targets::data::*;
use crate::targets::finalizer::*;
use crate::targets::resolver::*;
use chrono::{DateTime, Utc};
use log::*;

/// One complete resolution pass from territory state to final targets.
///
/// Every pass owns its aggregator and derived views, so passes running on
/// different inputs never share state.
pub struct TargetSystem;

impl TargetSystem {
    pub fn resolve<G>(gateway: &G, now: DateTime<Utc>, features: &TargetingFeatures) -> Result<Vec<Target>, TargetingError>
    where
        G: TerritoryGateway + Sync,
    {
        let inputs = TerritoryInputs::gather(gateway, now, features)?;

        TargetSystem::run(&inputs, now, features)
    }

    pub fn run(inputs: &TerritoryInputs, now: DateTime<Utc>, features: &TargetingFeatures) -> Result<Vec<Target>, TargetingError> {
        let planets = PlanetIndex::new(inputs.planets.iter().cloned());

        let impact = estimate_player_impact_per_hour(&planets, &inputs.snapshots, features.estimate.boosted_progress_threshold)?;

        let impact = match impact {
            Some(impact) if impact > 0.0 => Some(impact),
            Some(impact) => {
                warn!("Player impact estimate is not positive, skipping gambits. Impact: {:.2}", impact);

                None
            }
            None => {
                warn!("Player impact estimate unavailable, skipping gambits.");

                None
            }
        };

        TargetSystem::pass(inputs, &planets, now, features, impact)
    }

    /// Runs a pass with an externally supplied impact estimate.
    pub fn run_with_impact(
        inputs: &TerritoryInputs,
        now: DateTime<Utc>,
        features: &TargetingFeatures,
        impact_per_hour: Option<f64>,
    ) -> Result<Vec<Target>, TargetingError> {
        let planets = PlanetIndex::new(inputs.planets.iter().cloned());

        TargetSystem::pass(inputs, &planets, now, features, impact_per_hour)
    }

    fn pass(
        inputs: &TerritoryInputs,
        planets: &PlanetIndex,
        now: DateTime<Utc>,
        features: &TargetingFeatures,
        impact_per_hour: Option<f64>,
    ) -> Result<Vec<Target>, TargetingError> {
        let objective_count: usize = inputs.assignments.iter().map(|assignment| assignment.objectives.len()).sum();

        info!(
            "Resolving targets. Assignments: {} - Objectives: {} - Planets: {}",
            inputs.assignments.len(),
            objective_count,
            inputs.planets.len()
        );

        let friendly = features.routing.friendly_faction;

        let graph = PlanetGraph::from_links(inputs.supply_links.iter());
        let route_finder = RouteFinder::new(&graph, planets, friendly, features.routing.max_depth);
        let resolver = TargetResolver::new(planets, &graph, &inputs.sectors, &route_finder, friendly);

        let mut aggregator = TargetAggregator::new();

        for objective in inputs.assignments.iter().flat_map(|assignment| assignment.objectives.iter()) {
            for planet in resolver.resolve(objective)? {
                aggregator.add_target(planet, objective.id);
            }
        }

        let context = FinalizeContext {
            planets,
            route_finder: &route_finder,
            friendly,
            now,
            impact_per_hour,
            total_players: inputs.total_players,
            liberate_more_need: features.objectives.liberate_more_need,
        };

        let targets = TargetFinalizer::new(context, &aggregator).finalize(&inputs.assignments)?;

        info!(
            "Resolved targets. Candidates: {} - Targets: {} - Valid: {}",
            aggregator.targets().len(),
            targets.len(),
            targets.iter().filter(|target| target.valid).count()
        );

        Ok(targets)
    }
}

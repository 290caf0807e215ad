use super::data::*;
use crate::planet::data::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Candidate planets claimed by objectives during one resolution pass.
///
/// Built fresh for every pass and never shared between passes. Records both
/// directions of the overlap: which objectives claim a planet, and the ordered
/// candidates of each objective.
#[derive(Debug, Default)]
pub struct TargetAggregator {
    targets: BTreeMap<PlanetId, BTreeSet<ObjectiveId>>,
    candidates: HashMap<ObjectiveId, Vec<PlanetId>>,
}

impl TargetAggregator {
    pub fn new() -> TargetAggregator {
        TargetAggregator::default()
    }

    pub fn add_target(&mut self, planet: PlanetId, objective: ObjectiveId) {
        let newly_claimed = self.targets.entry(planet).or_default().insert(objective);

        if newly_claimed {
            self.candidates.entry(objective).or_default().push(planet);
        }
    }

    pub fn targets(&self) -> &BTreeMap<PlanetId, BTreeSet<ObjectiveId>> {
        &self.targets
    }

    pub fn objectives_for(&self, planet: PlanetId) -> BTreeSet<ObjectiveId> {
        self.targets.get(&planet).cloned().unwrap_or_default()
    }

    /// Candidates of one objective in the order they were added.
    pub fn candidates(&self, objective: ObjectiveId) -> &[PlanetId] {
        self.candidates.get(&objective).map(|c| c.as_slice()).unwrap_or(&[])
    }
}

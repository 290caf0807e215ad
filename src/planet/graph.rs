use super::data::*;
use std::collections::HashMap;

/// Read-only adjacency view over supply links.
#[derive(Clone, Debug, Default)]
pub struct PlanetGraph {
    adjacency: HashMap<PlanetId, Vec<SupplyLink>>,
}

impl PlanetGraph {
    pub fn from_links<'a>(links: impl IntoIterator<Item = &'a SupplyLink>) -> PlanetGraph {
        let mut adjacency: HashMap<PlanetId, Vec<SupplyLink>> = HashMap::new();

        for link in links {
            adjacency.entry(link.origin).or_default().push(link.clone());

            if link.destination != link.origin {
                adjacency.entry(link.destination).or_default().push(link.clone());
            }
        }

        PlanetGraph { adjacency }
    }

    /// Build from a pre-computed adjacency mapping (planet to every link
    /// touching it).
    pub fn from_adjacency(adjacency: HashMap<PlanetId, Vec<SupplyLink>>) -> PlanetGraph {
        PlanetGraph { adjacency }
    }

    pub fn links(&self, planet: PlanetId) -> &[SupplyLink] {
        self.adjacency.get(&planet).map(|links| links.as_slice()).unwrap_or(&[])
    }

    /// Planets from which `planet` can be entered, in link order.
    pub fn entered_from(&self, planet: PlanetId) -> impl Iterator<Item = PlanetId> + '_ {
        self.links(planet).iter().filter_map(move |link| {
            let other = link.other_side(planet)?;

            if link.can_traverse(other, planet) {
                Some(other)
            } else {
                None
            }
        })
    }

    /// Planets sharing any link with `planet`, ignoring disabled sides.
    pub fn linked(&self, planet: PlanetId) -> impl Iterator<Item = PlanetId> + '_ {
        self.links(planet).iter().filter_map(move |link| link.other_side(planet))
    }
}

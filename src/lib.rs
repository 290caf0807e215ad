#![warn(clippy::all)]

//! Territory targeting for a live, community-driven strategy game.
//!
//! A resolution pass reads the current territory (planets, supply links,
//! events and historical health snapshots), resolves every active objective
//! into candidate planets and finalizes them into deduplicated [`Target`]s.

pub mod error;
pub mod estimate;
pub mod features;
pub mod gateway;
pub mod logging;
pub mod planet;
pub mod targets;
pub mod targetsystem;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{GatewayError, TargetingError};
pub use estimate::winnability::{is_gambit_winnable, is_planet_winnable, min_offense_fraction};
pub use features::TargetingFeatures;
pub use gateway::{InMemoryGateway, TerritoryGateway, TerritoryInputs};
pub use targets::data::Target;
pub use targetsystem::TargetSystem;

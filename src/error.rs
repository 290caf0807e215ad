use crate::planet::data::PlanetId;
use thiserror::Error;

/// Failures raised by a resolution pass.
///
/// Empty inputs are never an error. These variants cover broken consistency
/// contracts (a referenced planet that was not supplied, snapshots from mixed
/// series) and zero denominators inherited from upstream data.
#[derive(Debug, Error)]
pub enum TargetingError {
    #[error("planet {0} is referenced but was not supplied")]
    UnknownPlanet(PlanetId),
    #[error("planet {0} reports a max health of zero")]
    ZeroMaxHealth(PlanetId),
    #[error("player count is zero")]
    ZeroPlayers,
    #[error("snapshots for planet {0} span no elapsed time")]
    ZeroElapsedTime(PlanetId),
    #[error("no time remaining before the deadline")]
    NoTimeRemaining,
    #[error("estimated player impact is zero")]
    ZeroImpact,
    #[error("snapshot series mixes {expected} with {found}")]
    MixedSnapshots { expected: String, found: String },
    #[error("snapshots for planet {0} are not ordered by timestamp")]
    UnorderedSnapshots(PlanetId),
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("snapshot window of {0} minutes is negative or out of range")]
    InvalidSnapshotWindow(i64),
}

/// Failure of a single gateway lookup. Never escapes a pass: the lookup is
/// replaced by an empty collection.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0} lookup unavailable: {1}")]
    Unavailable(&'static str, String),
}

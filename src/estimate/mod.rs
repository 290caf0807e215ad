pub mod impact;
pub mod snapshot;
pub mod winnability;

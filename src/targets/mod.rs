pub mod aggregator;
pub mod data;
pub mod finalizer;
pub mod resolver;

//! tour-optimizer core
//!
//! Tour construction for delivery stops: nearest-neighbor and Clarke-Wright
//! strategies behind a name-keyed registry, plus an orchestrator that selects
//! a strategy and reports total round-trip distance. A remote-inference
//! strategy delegates ordering to a text-generation endpoint and degrades to
//! identity order on any failure.

pub mod model;
pub mod traits;
pub mod haversine;
pub mod nearest_neighbor;
pub mod clarke_wright;
pub mod registry;
pub mod planner;
pub mod remote;

//! Name-to-strategy registry with a default fallback.

use std::collections::HashMap;

use tracing::debug;

use crate::clarke_wright::ClarkeWrightStrategy;
use crate::nearest_neighbor::NearestNeighborStrategy;
use crate::traits::OptimizationStrategy;

/// Immutable once built; safe to share across concurrent optimize calls.
///
/// Lookup is case-insensitive. An unknown or absent name resolves to the
/// default strategy, never to an error.
pub struct StrategyRegistry {
    strategies: HashMap<String, Box<dyn OptimizationStrategy>>,
    default_name: String,
}

impl StrategyRegistry {
    /// Build a registry whose first registration is the default.
    pub fn new(default_strategy: Box<dyn OptimizationStrategy>) -> Self {
        let default_name = default_strategy.name().to_uppercase();
        let mut strategies = HashMap::new();
        strategies.insert(default_name.clone(), default_strategy);
        Self {
            strategies,
            default_name,
        }
    }

    /// Register an additional strategy under its own name.
    ///
    /// Re-registering a name replaces the earlier entry.
    pub fn register(&mut self, strategy: Box<dyn OptimizationStrategy>) {
        self.strategies
            .insert(strategy.name().to_uppercase(), strategy);
    }

    /// Resolve a strategy by name; `None` or an unknown name selects the
    /// default.
    pub fn resolve(&self, name: Option<&str>) -> &dyn OptimizationStrategy {
        if let Some(name) = name {
            if let Some(strategy) = self.strategies.get(&name.to_uppercase()) {
                return strategy.as_ref();
            }
            debug!(name, "unknown strategy name, using default");
        }
        self.strategies[&self.default_name].as_ref()
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }
}

impl Default for StrategyRegistry {
    /// Clarke-Wright as default with nearest-neighbor alongside, mirroring
    /// the deployed wiring.
    fn default() -> Self {
        let mut registry = Self::new(Box::new(ClarkeWrightStrategy::default()));
        registry.register(Box::new(NearestNeighborStrategy::new()));
        registry
    }
}

//! Tour orchestration: strategy selection, distance reporting, optional
//! recording of the computed tour.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::haversine;
use crate::model::{Depot, Stop, Tour};
use crate::registry::StrategyRegistry;
use crate::traits::TourRecorder;

const SECONDS_PER_DAY: i64 = 86_400;

/// The sole entry point a request-handling layer calls.
///
/// Stateless apart from the immutable registry and the optional recorder;
/// concurrent optimize calls need no locking.
pub struct TourPlanner {
    registry: StrategyRegistry,
    recorder: Option<Box<dyn TourRecorder>>,
}

impl TourPlanner {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self {
            registry,
            recorder: None,
        }
    }

    /// Attach a recorder; its failures are logged and swallowed.
    pub fn with_recorder(mut self, recorder: Box<dyn TourRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Order `stops` with the named strategy (default fallback on unknown or
    /// absent names) and return the tour.
    pub fn optimize(
        &self,
        stops: &[Stop],
        strategy_name: Option<&str>,
        depot: Option<&Depot>,
    ) -> Vec<Stop> {
        let strategy = self.registry.resolve(strategy_name);
        debug!(
            strategy = strategy.name(),
            stops = stops.len(),
            "optimizing tour"
        );
        let ordered = strategy.optimize(stops, depot);

        if let Some(recorder) = &self.recorder {
            let tour = Tour {
                date: today_unix(),
                stops: ordered.clone(),
            };
            if let Err(err) = recorder.record(&tour) {
                // Recording is best-effort; the ordered tour is still valid.
                warn!(%err, "failed to record tour");
            }
        }

        ordered
    }

    /// Total round-trip distance in meters for an ordered stop sequence.
    ///
    /// Walks depot → stop₁ → … → stopₙ → depot. Without a depot the walk
    /// starts at the first stop and the return leg is omitted.
    pub fn total_distance(&self, stops: &[Stop], depot: Option<&Depot>) -> f64 {
        total_distance(stops, depot)
    }
}

impl Default for TourPlanner {
    fn default() -> Self {
        Self::new(StrategyRegistry::default())
    }
}

/// Free-function form of [`TourPlanner::total_distance`], usable for
/// reporting on any ordered sequence.
pub fn total_distance(stops: &[Stop], depot: Option<&Depot>) -> f64 {
    let Some(first) = stops.first() else {
        return 0.0;
    };

    let mut current = depot.map(|d| d.coordinate).unwrap_or(first.coordinate);
    let mut total = 0.0;
    for stop in stops {
        total += haversine::distance(current, stop.coordinate);
        current = stop.coordinate;
    }
    if let Some(depot) = depot {
        total += haversine::distance(current, depot.coordinate);
    }
    total
}

fn today_unix() -> i64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    secs - secs % SECONDS_PER_DAY
}

//! Remote-inference degradation through the full planner path.
//!
//! No inference endpoint runs during tests, so every call exercises the
//! identity-order fallback contract.

use tour_optimizer::model::{Coordinate, Depot, Stop};
use tour_optimizer::nearest_neighbor::NearestNeighborStrategy;
use tour_optimizer::planner::TourPlanner;
use tour_optimizer::registry::StrategyRegistry;
use tour_optimizer::remote::{RemoteConfig, RemoteInferenceStrategy, RemoteOutcome};
use tour_optimizer::traits::{DeliveryRecord, HistoryProvider};

struct CannedHistory;

impl HistoryProvider for CannedHistory {
    fn records(&self) -> Vec<DeliveryRecord> {
        vec![DeliveryRecord {
            customer_id: Some(7),
            tour_id: Some(3),
            date: 1_756_339_200,
            planned_time: Some(9 * 3600),
            actual_time: Some(9 * 3600 + 1200),
            delay_minutes: Some(20),
            day_of_week: Some(4),
        }]
    }
}

fn unreachable_config() -> RemoteConfig {
    RemoteConfig {
        // Nothing listens here; connections are refused immediately.
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 2,
        ..RemoteConfig::default()
    }
}

fn stops() -> Vec<Stop> {
    vec![
        Stop::new(Some(3), Coordinate::new(0.03, 0.0), 10.0, 1.0),
        Stop::new(Some(1), Coordinate::new(0.01, 0.0), 10.0, 1.0),
        Stop::new(Some(2), Coordinate::new(0.02, 0.0), 10.0, 1.0),
    ]
}

#[test]
fn planner_selects_remote_by_name_and_degrades_to_input_order() {
    let remote = RemoteInferenceStrategy::new(unreachable_config(), CannedHistory)
        .expect("client should build");

    let mut registry = StrategyRegistry::new(Box::new(NearestNeighborStrategy::new()));
    registry.register(Box::new(remote));
    let planner = TourPlanner::new(registry);

    let input = stops();
    let ordered = planner.optimize(&input, Some("remote"), Some(&Depot::new(0.0, 0.0)));
    assert_eq!(ordered, input, "degraded remote call must keep input order");
}

#[test]
fn degradation_is_observable_as_a_typed_outcome() {
    let remote = RemoteInferenceStrategy::new(unreachable_config(), CannedHistory)
        .expect("client should build");

    let input = stops();
    let outcome = remote.run(&input);
    match &outcome {
        RemoteOutcome::Degraded { stops, .. } => assert_eq!(stops, &input),
        RemoteOutcome::Ordered(_) => panic!("no endpoint is listening; expected degradation"),
    }
    // Callers that only need the permutation unwrap the outcome either way.
    assert_eq!(outcome.into_stops(), input);
}

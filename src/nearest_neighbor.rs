//! Greedy nearest-neighbor tour construction.
//!
//! Starts at the depot (or (0,0) when none is given) and repeatedly visits
//! the closest remaining stop. The return leg to the depot is implicit.
//!
//! Complexity: O(n²) distance evaluations; no matrix is precomputed, which is
//! fine at the target scale of hundreds of stops.

use crate::haversine;
use crate::model::{Coordinate, Depot, Stop};
use crate::traits::OptimizationStrategy;

#[derive(Debug, Clone, Default)]
pub struct NearestNeighborStrategy;

impl NearestNeighborStrategy {
    pub fn new() -> Self {
        Self
    }
}

/// Equidistant candidates resolve to the numerically smaller id; a present id
/// beats an absent one; two absent ids keep the earlier candidate. Input
/// iteration order therefore fixes the output for id-less stops, which is a
/// documented determinism contract.
fn prefer_over(candidate: &Stop, current_best: &Stop) -> bool {
    match (candidate.id, current_best.id) {
        (Some(c), Some(b)) => c < b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

impl OptimizationStrategy for NearestNeighborStrategy {
    fn name(&self) -> &str {
        "nearest"
    }

    fn optimize(&self, stops: &[Stop], depot: Option<&Depot>) -> Vec<Stop> {
        if stops.is_empty() {
            return Vec::new();
        }

        // Working copy; the caller's slice stays untouched.
        let mut remaining: Vec<Stop> = stops.to_vec();
        let mut tour = Vec::with_capacity(remaining.len());

        let mut current = depot
            .map(|d| d.coordinate)
            .unwrap_or(Coordinate::new(0.0, 0.0));

        while !remaining.is_empty() {
            let mut best_index = 0;
            let mut best_dist = haversine::distance(current, remaining[0].coordinate);

            for (i, stop) in remaining.iter().enumerate().skip(1) {
                let dist = haversine::distance(current, stop.coordinate);
                if dist < best_dist
                    || (dist == best_dist && prefer_over(stop, &remaining[best_index]))
                {
                    best_dist = dist;
                    best_index = i;
                }
            }

            let pick = remaining.remove(best_index);
            current = pick.coordinate;
            tour.push(pick);
        }

        tour
    }
}

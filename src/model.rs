//! Value types shared by all optimization strategies.
//!
//! These are intentionally minimal snapshots of the surrounding system's
//! entities. Strategies only ever read them; persistence and request parsing
//! live elsewhere.

use serde::{Deserialize, Serialize};

/// A WGS84-style (latitude, longitude) pair in degrees.
///
/// Values are assumed finite; callers validate coordinates upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A single delivery location with demand.
///
/// `id` is `None` for transient, not-yet-persisted stops; the nearest-neighbor
/// tie-break and the remote strategy's id matching both tolerate that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: Option<i64>,
    pub coordinate: Coordinate,
    /// Demand weight in kilograms.
    pub weight: f64,
    /// Demand volume in cubic meters.
    pub volume: f64,
    /// Free-form status tag; not interpreted by any strategy.
    pub status: Option<String>,
}

impl Stop {
    pub fn new(id: Option<i64>, coordinate: Coordinate, weight: f64, volume: f64) -> Self {
        Self {
            id,
            coordinate,
            weight,
            volume,
            status: None,
        }
    }
}

/// The common origin/return point for a tour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub coordinate: Coordinate,
}

impl Depot {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinate: Coordinate::new(latitude, longitude),
        }
    }
}

/// A computed tour handed to a [`TourRecorder`](crate::traits::TourRecorder).
///
/// `date` is a unix timestamp (date only), matching how the surrounding
/// system tags generated tours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub date: i64,
    pub stops: Vec<Stop>,
}

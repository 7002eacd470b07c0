//! Core domain traits for the tour optimizer.
//!
//! These are intentionally minimal. Concrete apps wire their own collaborators
//! (history lookup, tour persistence) behind these seams.

use serde::Serialize;

use crate::model::{Depot, Stop, Tour};

/// A tour-construction algorithm: stops + optional depot → ordered stops.
///
/// Contract: the output is always a permutation of the input (no stop
/// dropped, none duplicated, none invented). When `depot` is `None`,
/// strategies fall back to (0,0) as the origin.
pub trait OptimizationStrategy: Send + Sync {
    /// Registry name for this strategy (matched case-insensitively).
    fn name(&self) -> &str;

    /// Compute a visiting order for `stops`.
    ///
    /// The caller's slice is never mutated; strategies work on their own
    /// copies.
    fn optimize(&self, stops: &[Stop], depot: Option<&Depot>) -> Vec<Stop>;
}

/// One historical delivery-performance record.
///
/// Consumed only by the remote-inference strategy, which forwards these to
/// the text-generation endpoint as context.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRecord {
    pub customer_id: Option<i64>,
    pub tour_id: Option<i64>,
    /// Unix timestamp (date only).
    pub date: i64,
    /// Planned arrival, seconds from midnight.
    pub planned_time: Option<i32>,
    /// Actual arrival, seconds from midnight.
    pub actual_time: Option<i32>,
    /// Delay in minutes (negative = early).
    pub delay_minutes: Option<i32>,
    pub day_of_week: Option<u8>,
}

/// Supplies past delivery-performance records for remote inference.
pub trait HistoryProvider: Send + Sync {
    fn records(&self) -> Vec<DeliveryRecord>;
}

/// Error from a [`TourRecorder`] implementation.
///
/// The planner logs and swallows it; recording never affects the returned
/// order.
#[derive(Debug)]
pub struct RecordError(pub String);

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tour recording failed: {}", self.0)
    }
}

impl std::error::Error for RecordError {}

/// Optionally persists a computed tour.
pub trait TourRecorder: Send + Sync {
    fn record(&self, tour: &Tour) -> Result<(), RecordError>;
}

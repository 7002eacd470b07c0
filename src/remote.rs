//! Remote-inference strategy: delegates stop ordering to a text-generation
//! endpoint.
//!
//! The strategy POSTs stop coordinates/demand plus historical
//! delivery-performance records to an Ollama-style `/api/generate` endpoint
//! and parses a best-effort ordered id list out of the response. Every
//! failure path (transport, non-2xx status, unparsable body) degrades to the
//! input order; a hard failure is never propagated to the caller.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::model::{Depot, Stop};
use crate::traits::{DeliveryRecord, HistoryProvider, OptimizationStrategy};

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Why a remote optimization degraded to identity order.
#[derive(Debug)]
pub enum RemoteError {
    Transport(reqwest::Error),
    Status(reqwest::StatusCode),
    UnparsableResponse,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Transport(err) => write!(f, "transport failure: {err}"),
            RemoteError::Status(status) => write!(f, "non-success status: {status}"),
            RemoteError::UnparsableResponse => write!(f, "response held no ordered id list"),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(err)
    }
}

/// Outcome of one remote optimization attempt.
///
/// Both variants carry a valid permutation of the input; `Degraded` lets
/// callers observe that the fallback fired without changing the contract.
#[derive(Debug)]
pub enum RemoteOutcome {
    Ordered(Vec<Stop>),
    Degraded {
        reason: RemoteError,
        stops: Vec<Stop>,
    },
}

impl RemoteOutcome {
    pub fn into_stops(self) -> Vec<Stop> {
        match self {
            RemoteOutcome::Ordered(stops) => stops,
            RemoteOutcome::Degraded { stops, .. } => stops,
        }
    }
}

#[derive(Debug, Serialize)]
struct StopPayload {
    id: Option<i64>,
    latitude: f64,
    longitude: f64,
    weight: f64,
    volume: f64,
}

#[derive(Debug, Serialize)]
struct PayloadData {
    stops: Vec<StopPayload>,
    histories: Vec<DeliveryRecord>,
}

#[derive(Debug, Serialize)]
struct GeneratePayload<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    data: PayloadData,
}

pub struct RemoteInferenceStrategy<H: HistoryProvider> {
    config: RemoteConfig,
    client: reqwest::blocking::Client,
    history: H,
}

impl<H: HistoryProvider> RemoteInferenceStrategy<H> {
    pub fn new(config: RemoteConfig, history: H) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            client,
            history,
        })
    }

    /// Single attempt, no retries. The client timeout is the cancellation
    /// boundary; timing out degrades like any other transport failure.
    pub fn run(&self, stops: &[Stop]) -> RemoteOutcome {
        if stops.is_empty() {
            return RemoteOutcome::Ordered(Vec::new());
        }

        let payload = GeneratePayload {
            model: &self.config.model,
            prompt: "Optimize delivery order based on delivery history delays and distances",
            stream: false,
            data: PayloadData {
                stops: stops
                    .iter()
                    .map(|s| StopPayload {
                        id: s.id,
                        latitude: s.coordinate.latitude,
                        longitude: s.coordinate.longitude,
                        weight: s.weight,
                        volume: s.volume,
                    })
                    .collect(),
                histories: self.history.records(),
            },
        };

        let url = format!(
            "{}/api/generate",
            self.config.base_url.trim_end_matches('/')
        );

        let response = match self.client.post(url).json(&payload).send() {
            Ok(response) => response,
            Err(err) => {
                return RemoteOutcome::Degraded {
                    reason: err.into(),
                    stops: stops.to_vec(),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return RemoteOutcome::Degraded {
                reason: RemoteError::Status(status),
                stops: stops.to_vec(),
            };
        }

        let body = match response.text() {
            Ok(body) => body,
            Err(err) => {
                return RemoteOutcome::Degraded {
                    reason: err.into(),
                    stops: stops.to_vec(),
                };
            }
        };

        match parse_ordered_ids(&body) {
            Some(ids) => RemoteOutcome::Ordered(reorder_by_ids(stops, &ids)),
            None => RemoteOutcome::Degraded {
                reason: RemoteError::UnparsableResponse,
                stops: stops.to_vec(),
            },
        }
    }
}

impl<H: HistoryProvider> OptimizationStrategy for RemoteInferenceStrategy<H> {
    fn name(&self) -> &str {
        "remote"
    }

    fn optimize(&self, stops: &[Stop], _depot: Option<&Depot>) -> Vec<Stop> {
        match self.run(stops) {
            RemoteOutcome::Ordered(ordered) => ordered,
            RemoteOutcome::Degraded { reason, stops } => {
                warn!(%reason, "remote inference degraded to input order");
                stops
            }
        }
    }
}

/// Extract an ordered id list from a generation response.
///
/// Accepts a bare JSON array, or an object whose `result`, `response`, or
/// `text` field is (or textually contains) one. Any non-integer element
/// rejects the whole list.
fn parse_ordered_ids(body: &str) -> Option<Vec<i64>> {
    let root: Value = serde_json::from_str(body).ok()?;

    let list = if root.is_array() {
        Some(root)
    } else if let Some(result) = root.get("result") {
        Some(result.clone())
    } else {
        ["response", "text"]
            .iter()
            .find_map(|key| root.get(*key))
            .and_then(Value::as_str)
            .and_then(|text| serde_json::from_str(text).ok())
    }?;

    let items = list.as_array()?;
    items.iter().map(Value::as_i64).collect()
}

/// Reorder `stops` by the remote id list.
///
/// Unknown ids are ignored, a repeated id is consumed only once, and every
/// stop the list misses (including id-less stops) is appended afterwards in
/// original relative order, keeping the output a permutation of the input.
fn reorder_by_ids(stops: &[Stop], ids: &[i64]) -> Vec<Stop> {
    let mut by_id: HashMap<i64, usize> = HashMap::new();
    for (i, stop) in stops.iter().enumerate() {
        if let Some(id) = stop.id {
            by_id.entry(id).or_insert(i);
        }
    }

    let mut taken = vec![false; stops.len()];
    let mut ordered = Vec::with_capacity(stops.len());
    for id in ids {
        if let Some(&i) = by_id.get(id) {
            if !taken[i] {
                taken[i] = true;
                ordered.push(stops[i].clone());
            }
        }
    }
    for (i, stop) in stops.iter().enumerate() {
        if !taken[i] {
            ordered.push(stop.clone());
        }
    }
    ordered
}

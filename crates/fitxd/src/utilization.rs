//! Studio utilization readings from the FitX API.
//!
//! The API returns a list of time slots for the current day. Exactly one of
//! them is expected to carry `isCurrent`; its `percentage` is the live
//! occupancy of the studio.

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::error::Result;

pub const DEFAULT_FITX_URL: &str = "https://mein.fitx.de";

const TENANT_HEADER: &str = "x-tenant";
const TENANT: &str = "fitx";

/// Occupancy percentage of a studio.
///
/// Keeps the number exactly as the upstream API sent it so that `42` is
/// republished as `42` and `57.5` as `57.5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(serde_json::Number);

impl Percentage {
    /// Returns `None` for NaN and infinities, which JSON cannot carry.
    pub fn from_f64(value: f64) -> Option<Self> {
        serde_json::Number::from_f64(value).map(Self)
    }
}

impl From<u64> for Percentage {
    fn from(value: u64) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of studio utilization readings
///
/// This trait allows the poller to be driven by a mock in tests
#[async_trait]
pub trait UtilizationSource: Send + Sync {
    /// Fetch the current utilization of one studio
    async fn fetch_utilization(&self, studio_id: &str) -> Result<Percentage>;
}

/// Only `items` is typed; records stay loose because only the current one
/// is ever read.
#[derive(Debug, Deserialize)]
struct UtilizationResponse {
    items: Vec<serde_json::Value>,
}

/// Extract the percentage of the first item flagged `isCurrent`.
///
/// Records are scanned in order and anything after the first current one is
/// ignored. Records without a boolean `isCurrent` are skipped.
pub fn current_percentage(endpoint: &str, body: &str) -> Result<Percentage> {
    let response: UtilizationResponse = serde_json::from_str(body)
        .map_err(|e| Error::data_format(endpoint, format!("invalid utilization body: {}", e)))?;

    let current = response
        .items
        .into_iter()
        .find(|item| item.get("isCurrent").and_then(|v| v.as_bool()) == Some(true))
        .ok_or_else(|| Error::data_format(endpoint, "no item is marked as current"))?;

    match current.get("percentage") {
        Some(serde_json::Value::Number(n)) => Ok(Percentage(n.clone())),
        None | Some(serde_json::Value::Null) => {
            Err(Error::data_format(endpoint, "current item has no percentage"))
        }
        Some(other) => Err(Error::data_format(
            endpoint,
            format!("current item has a non-numeric percentage: {}", other),
        )),
    }
}

/// Utilization client for the public FitX studio API
#[derive(Debug, Clone)]
pub struct FitxClient {
    http: reqwest::Client,
    base_url: String,
}

impl FitxClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, studio_id: &str) -> String {
        format!(
            "{}/nox/public/v1/studios/{}/utilization",
            self.base_url, studio_id
        )
    }
}

#[async_trait]
impl UtilizationSource for FitxClient {
    async fn fetch_utilization(&self, studio_id: &str) -> Result<Percentage> {
        let endpoint = self.endpoint(studio_id);
        debug!("Fetching utilization for studio {}", studio_id);

        let response = self
            .http
            .get(&endpoint)
            .header(TENANT_HEADER, TENANT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::RemoteRequest {
                endpoint,
                status,
                body,
            });
        }

        let percentage = current_percentage(&endpoint, &body)?;
        debug!(
            "Retrieved utilization {}% for studio {}",
            percentage, studio_id
        );
        Ok(percentage)
    }
}

//! Publishing sensor states through the Home Assistant REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::error::Result;
use crate::utilization::Percentage;

const UNIT_OF_MEASUREMENT: &str = "%";
const ICON: &str = "mdi:weight-lifter";

/// Acknowledgement of an accepted state write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateAck {
    /// 200 when the entity already existed, 201 when Home Assistant created it
    pub status: StatusCode,
}

/// Destination for sensor states
///
/// This trait allows the poller to be driven by a mock in tests
#[async_trait]
pub trait StateSink: Send + Sync {
    /// Set the current state of a sensor entity
    async fn publish_state(&self, entity_id: &str, percentage: &Percentage) -> Result<StateAck>;
}

/// Body of `POST /api/states/<entity_id>`.
#[derive(Debug, Serialize)]
pub struct StatePayload<'a> {
    pub state: &'a Percentage,
    pub attributes: StateAttributes<'a>,
}

#[derive(Debug, Serialize)]
pub struct StateAttributes<'a> {
    pub friendly_name: &'a str,
    pub unit_of_measurement: &'static str,
    pub icon: &'static str,
}

impl<'a> StatePayload<'a> {
    pub fn new(entity_id: &'a str, percentage: &'a Percentage) -> Self {
        Self {
            state: percentage,
            attributes: StateAttributes {
                friendly_name: entity_id,
                unit_of_measurement: UNIT_OF_MEASUREMENT,
                icon: ICON,
            },
        }
    }
}

/// Home Assistant REST client authenticated with a long-lived access token.
pub struct HomeAssistantClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HomeAssistantClient {
    pub fn new(http: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn endpoint(&self, entity_id: &str) -> String {
        format!("{}/api/states/{}", self.base_url, entity_id)
    }
}

#[async_trait]
impl StateSink for HomeAssistantClient {
    async fn publish_state(&self, entity_id: &str, percentage: &Percentage) -> Result<StateAck> {
        let endpoint = self.endpoint(entity_id);
        debug!(
            "Sending state to Home Assistant for {}: {}%",
            entity_id, percentage
        );

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.token)
            .json(&StatePayload::new(entity_id, percentage))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteRequest {
                endpoint,
                status,
                body,
            });
        }

        debug!("Home Assistant accepted state for {}", entity_id);
        Ok(StateAck { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_payload() {
        let percentage = Percentage::from(42);
        let payload = StatePayload::new("sensor.jim", &percentage);

        let json = serde_json::to_string_pretty(&payload).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "state": 42,
          "attributes": {
            "friendly_name": "sensor.jim",
            "unit_of_measurement": "%",
            "icon": "mdi:weight-lifter"
          }
        }
        "#);
    }

    #[test]
    fn test_state_payload_keeps_fraction() {
        let percentage = Percentage::from_f64(57.5).unwrap();
        let value = serde_json::to_value(StatePayload::new("sensor.mainz_jim", &percentage)).unwrap();

        assert_eq!(value["state"], serde_json::json!(57.5));
        assert_eq!(value["attributes"]["friendly_name"], "sensor.mainz_jim");
    }

    #[test]
    fn test_endpoint() {
        let client =
            HomeAssistantClient::new(reqwest::Client::new(), "http://homeassistant.local:8123/", "t");
        assert_eq!(
            client.endpoint("sensor.backup_jim"),
            "http://homeassistant.local:8123/api/states/sensor.backup_jim"
        );
    }
}

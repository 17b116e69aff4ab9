//! Mapping from Home Assistant entities to FitX studios.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;

/// Built-in sensors, published in this order.
const DEFAULT_SENSORS: [(&str, &str); 3] = [
    ("sensor.jim", "1561099930"),
    ("sensor.backup_jim", "1587147290"),
    ("sensor.mainz_jim", "1633404180"),
];

/// One published sensor.
///
/// Both identifiers are opaque: `entity_id` is used verbatim as the Home
/// Assistant entity and `studio_id` verbatim in the utilization API path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sensor {
    pub entity_id: String,
    pub studio_id: String,
}

impl Sensor {
    pub fn new(entity_id: impl Into<String>, studio_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            studio_id: studio_id.into(),
        }
    }
}

/// Ordered, immutable set of sensors polled every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorMap {
    sensors: Vec<Sensor>,
}

#[derive(Debug, Deserialize)]
struct SensorFile {
    #[serde(default, rename = "sensor")]
    sensors: Vec<Sensor>,
}

impl Default for SensorMap {
    fn default() -> Self {
        Self {
            sensors: DEFAULT_SENSORS
                .iter()
                .map(|(entity_id, studio_id)| Sensor::new(*entity_id, *studio_id))
                .collect(),
        }
    }
}

impl SensorMap {
    /// Build a mapping, rejecting an empty list and repeated entity ids
    pub fn new(sensors: Vec<Sensor>) -> Result<Self, ConfigError> {
        if sensors.is_empty() {
            return Err(ConfigError::NoSensors);
        }

        let mut seen = HashSet::new();
        for sensor in &sensors {
            if !seen.insert(sensor.entity_id.as_str()) {
                return Err(ConfigError::DuplicateSensor(sensor.entity_id.clone()));
            }
        }

        Ok(Self { sensors })
    }

    /// Load a mapping from a TOML file of `[[sensor]]` tables
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        let file: SensorFile =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

        Self::new(file.sensors)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.iter()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

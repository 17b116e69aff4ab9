pub mod config;
mod error;
pub mod home_assistant;
pub mod poller;
pub mod sensors;
pub mod utilization;

pub use config::Config;
pub use config::ConfigError;
pub use config::LogLevel;
pub use error::Error;
pub use error::Result;
pub use home_assistant::HomeAssistantClient;
pub use home_assistant::StateAck;
pub use home_assistant::StateSink;
pub use poller::CycleReport;
pub use poller::Poller;
pub use sensors::Sensor;
pub use sensors::SensorMap;
pub use utilization::FitxClient;
pub use utilization::Percentage;
pub use utilization::UtilizationSource;

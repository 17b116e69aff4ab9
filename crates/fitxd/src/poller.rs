//! Polling loop
//!
//! Every cycle walks the sensor mapping in order, reads each studio's
//! utilization and publishes it as the sensor's state. A failing sensor is
//! logged and skipped; it never stops the cycle or the loop.

use std::future::Future;
use std::time::Duration;

use tracing::debug;
use tracing::error;
use tracing::info;

use crate::error::Result;
use crate::home_assistant::StateSink;
use crate::sensors::Sensor;
use crate::sensors::SensorMap;
use crate::utilization::UtilizationSource;

/// Outcome of one pass over all sensors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Number of sensors whose state was published
    pub published: usize,

    /// Entity ids that failed, in mapping order
    pub failed: Vec<String>,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Poller<U, S> {
    source: U,
    sink: S,
    sensors: SensorMap,
    interval: Duration,
}

impl<U: UtilizationSource, S: StateSink> Poller<U, S> {
    pub fn new(source: U, sink: S, sensors: SensorMap, interval: Duration) -> Self {
        Self {
            source,
            sink,
            sensors,
            interval,
        }
    }

    /// Read and publish every sensor once
    pub async fn run_cycle(&self) -> CycleReport {
        info!("Starting utilization update");

        let mut report = CycleReport::default();
        for sensor in self.sensors.iter() {
            match self.process(sensor).await {
                Ok(()) => report.published += 1,
                Err(e) => {
                    error!("Error processing {}: {}", sensor.entity_id, e);
                    report.failed.push(sensor.entity_id.clone());
                }
            }
        }

        info!(
            "Completed utilization update: {} published, {} failed",
            report.published,
            report.failed.len()
        );
        report
    }

    async fn process(&self, sensor: &Sensor) -> Result<()> {
        let percentage = self.source.fetch_utilization(&sensor.studio_id).await?;
        info!("{}: {}%", sensor.entity_id, percentage);

        let ack = self.sink.publish_state(&sensor.entity_id, &percentage).await?;
        info!("{}: status {}", sensor.entity_id, ack.status);
        Ok(())
    }

    /// Poll until the process is terminated
    pub async fn run_forever(&self) {
        self.run_until(std::future::pending()).await
    }

    /// Poll until `shutdown` completes
    ///
    /// Shutdown interrupts both the sleep and an in-flight cycle.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        info!(
            "Starting utilization monitor for {} sensors with {}s interval",
            self.sensors.len(),
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping utilization monitor");
                    return;
                }
                _ = self.cycle_then_sleep() => {}
            }
        }
    }

    async fn cycle_then_sleep(&self) {
        self.run_cycle().await;
        debug!("Sleeping for {} seconds", self.interval.as_secs());
        tokio::time::sleep(self.interval).await;
    }
}

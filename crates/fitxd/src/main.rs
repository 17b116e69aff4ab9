use anyhow::Context;
use clap::Parser;
use fitxd::Config;
use fitxd::FitxClient;
use fitxd::HomeAssistantClient;
use fitxd::LogLevel;
use fitxd::Poller;
use tracing::error;
use tracing::info;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Variables already in the environment win over .env
    dotenvy::dotenv().ok();

    let config = Config::parse();

    let level = config.log_level.parse::<LogLevel>().unwrap_or_else(|e| {
        eprintln!("{}, defaulting to INFO", e);
        LogLevel::Info
    });
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("fitxd starting");

    let sensors = config.sensors().context("Failed to load sensor mapping")?;
    for sensor in sensors.iter() {
        info!("Sensor {} -> studio {}", sensor.entity_id, sensor.studio_id);
    }

    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let poller = Poller::new(
        FitxClient::new(http.clone(), &config.fitx_url),
        HomeAssistantClient::new(http, &config.ha_url, &config.ha_token),
        sensors,
        config.interval(),
    );

    if config.once {
        let report = poller.run_cycle().await;
        if !report.is_success() {
            anyhow::bail!(
                "{} sensor(s) failed: {}",
                report.failed.len(),
                report.failed.join(", ")
            );
        }
        return Ok(());
    }

    poller.run_until(shutdown_signal()).await;

    info!("fitxd shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::SignalKind;

        match tokio::signal::unix::signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

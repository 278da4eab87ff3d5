pub mod api; // HTTP API + change feed
pub mod config;
pub mod core_state; // Transport-agnostic state
pub mod db; // Slot storage backends
pub mod gateway; // AI triage / assistant gateway
pub mod models;
pub mod store; // Appointment record store

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::core_state::CoreState;

pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(serve()) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

/// Load configuration, open storage and serve until Ctrl-C.
async fn serve() -> Result<(), String> {
    let config = AppConfig::from_env().map_err(|e| format!("Invalid configuration: {e}"))?;
    tracing::info!(
        storage = config.storage.as_str(),
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    let mut server = start(config).await?;
    tracing::info!(addr = %server.session.server_addr, "{} ready", config::APP_NAME);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
    }

    server.shutdown();
    server.stopped().await;
    Ok(())
}

/// Build the shared state described by `config` and start the API server
/// on its bind address.
pub async fn start(config: AppConfig) -> Result<api::ApiServer, String> {
    let bind_addr = config.bind_addr;
    let core = CoreState::open(config).await.map_err(|e| e.to_string())?;
    api::start_api_server(Arc::new(core), bind_addr).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config(data_dir: &std::path::Path) -> AppConfig {
        let dir = data_dir.to_string_lossy().to_string();
        AppConfig::from_lookup(move |var| match var {
            "MEDIQ_DATA_DIR" => Some(dir.clone()),
            "MEDIQ_STORAGE" => Some("memory".into()),
            "MEDIQ_BIND" => Some("127.0.0.1:0".into()),
            "MEDIQ_LLM_URL" => Some("http://127.0.0.1:9".into()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn start_serves_from_configured_state() {
        let tmp = tempfile::tempdir().unwrap();
        let mut server = start(memory_config(tmp.path()))
            .await
            .expect("server should start");
        let base = format!("http://{}", server.session.server_addr);
        let client = reqwest::Client::new();

        let health: serde_json::Value = client
            .get(format!("{base}/api/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["storage"], "memory");

        let resp = client
            .post(format!("{base}/api/appointments"))
            .json(&serde_json::json!({
                "patientName": "Jane Doe",
                "patientPhone": "5551234",
                "patientProblem": "chest pain",
                "doctorId": "doc1",
                "appointmentDate": "2024-06-01",
                "appointmentTime": "10:00 - 10:30",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

        server.shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), server.stopped())
            .await
            .expect("server should stop");
    }

    #[tokio::test]
    async fn start_with_unreachable_ai_still_serves_and_reports_503() {
        let tmp = tempfile::tempdir().unwrap();
        let mut server = start(memory_config(tmp.path())).await.unwrap();
        let base = format!("http://{}", server.session.server_addr);

        let resp = reqwest::Client::new()
            .post(format!("{base}/api/assistant/medicine"))
            .json(&serde_json::json!({ "name": "Ibuprofen" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

        server.shutdown();
    }
}

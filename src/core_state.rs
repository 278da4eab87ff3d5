//! Transport-agnostic application state.
//!
//! `CoreState` is built once at startup and shared (via `Arc`) by every
//! HTTP handler and the change feed. It owns the record store and the AI
//! gateway; handlers never reach the storage medium directly.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::config::{AppConfig, StorageBackend};
use crate::db::{JsonFileSlots, MemorySlots, SlotStorage, SqliteSlots, StorageError};
use crate::gateway::{AssistantGateway, LlmClient, LlmError, OllamaClient};
use crate::store::AppointmentStore;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage initialization failed: {0}")]
    Storage(#[from] StorageError),

    #[error("AI client initialization failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Startup task failed: {0}")]
    Startup(String),
}

pub struct CoreState {
    store: AppointmentStore,
    gateway: Arc<AssistantGateway>,
    started_at: Instant,
}

impl CoreState {
    pub fn new(store: AppointmentStore, gateway: AssistantGateway) -> Self {
        Self {
            store,
            gateway: Arc::new(gateway),
            started_at: Instant::now(),
        }
    }

    /// Open the configured slot backend and AI client.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let slots = open_slots(config)?;
        tracing::info!(backend = slots.backend_name(), "Appointment storage opened");

        let llm = OllamaClient::new(&config.llm_url, &config.llm_model, config.llm_timeout_secs)?;
        tracing::info!(url = %config.llm_url, model = %config.llm_model, "AI gateway configured");

        Ok(Self::new(
            AppointmentStore::new(slots),
            AssistantGateway::new(Box::new(llm)),
        ))
    }

    /// `from_config` for async callers. The blocking HTTP client refuses to
    /// be built on a runtime thread, so construction runs on the blocking pool.
    pub async fn open(config: AppConfig) -> Result<Self, CoreError> {
        tokio::task::spawn_blocking(move || Self::from_config(&config))
            .await
            .map_err(|e| CoreError::Startup(e.to_string()))?
    }

    /// Memory-backed state around the given LLM client.
    pub fn in_memory(llm: Box<dyn LlmClient + Send + Sync>) -> Self {
        Self::new(
            AppointmentStore::new(Arc::new(MemorySlots::new())),
            AssistantGateway::new(llm),
        )
    }

    pub fn store(&self) -> &AppointmentStore {
        &self.store
    }

    /// Owned handle for use inside `spawn_blocking`.
    pub fn gateway(&self) -> Arc<AssistantGateway> {
        Arc::clone(&self.gateway)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

fn open_slots(config: &AppConfig) -> Result<Arc<dyn SlotStorage>, StorageError> {
    Ok(match config.storage {
        StorageBackend::Sqlite => Arc::new(SqliteSlots::open(&config.sqlite_path())?),
        StorageBackend::JsonFile => Arc::new(JsonFileSlots::open(&config.slots_dir())?),
        StorageBackend::Memory => Arc::new(MemorySlots::new()),
    })
}

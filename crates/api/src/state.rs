use std::sync::Arc;

use tutorhub_core::gateway::PersistenceGateway;

use crate::config::ServerConfig;
use crate::wizard_registry::WizardRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (PostgreSQL or in-memory).
    pub gateway: Arc<dyn PersistenceGateway>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live signup wizard sessions.
    pub wizards: Arc<WizardRegistry>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, config: ServerConfig) -> Self {
        let wizards = Arc::new(WizardRegistry::new(config.wizard_session_ttl()));
        Self {
            gateway,
            config: Arc::new(config),
            wizards,
        }
    }

    /// The gateway as the `&dyn` the repositories take.
    pub fn gw(&self) -> &dyn PersistenceGateway {
        self.gateway.as_ref()
    }
}

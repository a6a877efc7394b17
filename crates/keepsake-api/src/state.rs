use std::sync::Arc;

use keepsake_llm::{AnthropicClient, GatewayClient};
use keepsake_persist::PersistClient;

use crate::auth::TokenVerifier;
use crate::config::Config;

/// Shared application state passed to all handlers
///
/// All resources are wrapped in Arc for efficient sharing across async tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<PersistClient>,
    pub anthropic: Arc<AnthropicClient>,
    pub gateway: Arc<GatewayClient>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(
        config: Config,
        persist: PersistClient,
        anthropic: AnthropicClient,
        gateway: GatewayClient,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            persist: Arc::new(persist),
            anthropic: Arc::new(anthropic),
            gateway: Arc::new(gateway),
            verifier,
        }
    }
}

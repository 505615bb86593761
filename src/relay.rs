use log::{error, info, warn};
use std::fmt;
use uuid::Uuid;

use crate::config::Config;
use crate::error::RelayError;
use crate::model::{SimulatedResponder, UpstreamClient};
use crate::web::models::{ChatReply, ChatRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    Live,
    Simulated,
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayMode::Live => write!(f, "live"),
            RelayMode::Simulated => write!(f, "simulated"),
        }
    }
}

/// Decides per call whether a message goes to the completion endpoint or to
/// the simulated responder. Holds no per-call state.
pub struct Relay {
    credential: Option<String>,
    upstream: UpstreamClient,
    simulator: SimulatedResponder,
}

impl Relay {
    pub fn new(config: &Config) -> Self {
        Self {
            credential: config.api_key.clone(),
            upstream: UpstreamClient::new(&config.api_base),
            simulator: SimulatedResponder::new(config.simulated_delay),
        }
    }

    pub fn mode(&self) -> RelayMode {
        if self.credential.is_some() {
            RelayMode::Live
        } else {
            RelayMode::Simulated
        }
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatReply, RelayError> {
        let message = request
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or(RelayError::Validation)?;
        let model = request.model;

        let request_id = Uuid::new_v4();
        info!(
            "Chat request {} for model {} ({} characters)",
            request_id,
            model,
            message.len()
        );

        let response = match &self.credential {
            None => {
                warn!("OPENAI_API_KEY not set. Using simulated response.");
                self.simulator.simulate(&message, &model).await
            }
            Some(credential) => match self.upstream.complete(&message, &model, credential).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Error processing chat request {}: {}", request_id, e.cause());
                    return Err(RelayError::Upstream(e));
                }
            },
        };

        Ok(ChatReply { response })
    }
}

//! [`ChatBot`] — the façade that turns one user message into one reply.
//!
//! ```text
//! chat(message)
//!   ├─ NlpEngine::process          classify intent / sentiment
//!   ├─ ConversationManager         get or create the session
//!   │    ├─ append user message
//!   │    ├─ pick canned reply      (placeholder for a real model)
//!   │    └─ append assistant reply
//!   └─ ChatResponse
//! ```
//!
//! Failures never escape [`ChatBot::chat`]: they are logged and folded into
//! a zero-confidence apology response.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::config::Config;
use crate::conversation::{ConversationManager, HistoryEntry, Role};
use crate::error::AppError;
use crate::nlp::{Entities, Intent, NlpEngine, NlpResult};

pub const GREETING_REPLY: &str = "Hello! How can I assist you today?";
pub const FAREWELL_REPLY: &str = "Goodbye! Have a great day!";
pub const ERROR_REPLY: &str = "I apologize, but I encountered an error processing your message.";

/// Reply returned by [`ChatBot::chat`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub message: String,
    /// 0.0 – 1.0. Always 0.0 on the error path.
    pub confidence: f32,
    pub intent: Option<Intent>,
    pub entities: Option<Entities>,
    pub session_id: Option<String>,
    pub metadata: Map<String, Value>,
}

impl ChatResponse {
    fn failure(err: &str) -> Self {
        let mut metadata = Map::new();
        metadata.insert("error".into(), Value::String(err.to_string()));
        Self {
            message: ERROR_REPLY.to_string(),
            confidence: 0.0,
            intent: None,
            entities: None,
            session_id: None,
            metadata,
        }
    }

    pub fn is_error(&self) -> bool {
        self.metadata.contains_key("error")
    }
}

#[derive(Debug)]
pub struct ChatBot {
    config: Arc<Config>,
    nlp: NlpEngine,
    conversations: Arc<ConversationManager>,
}

impl ChatBot {
    pub fn new(config: Config) -> Self {
        let nlp = NlpEngine::new(&config);
        let conversations = Arc::new(ConversationManager::new(&config));
        info!(provider = %config.ai_provider, model = %config.model_name, "chatbot initialised");
        Self {
            config: Arc::new(config),
            nlp,
            conversations,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the session store, e.g. for the background sweeper.
    pub fn conversations(&self) -> Arc<ConversationManager> {
        self.conversations.clone()
    }

    /// Process one user message. Never fails; see [`ChatResponse::is_error`].
    pub fn chat(
        &self,
        message: &str,
        session_id: Option<&str>,
        context: Option<Map<String, Value>>,
    ) -> ChatResponse {
        match self.try_chat(message, session_id, context) {
            Ok(response) => response,
            Err(e) => {
                error!("error processing message: {e}");
                ChatResponse::failure(&e.to_string())
            }
        }
    }

    fn try_chat(
        &self,
        message: &str,
        session_id: Option<&str>,
        context: Option<Map<String, Value>>,
    ) -> Result<ChatResponse, AppError> {
        let analysis = self.nlp.process(message);

        let (session_id, reply) = self.conversations.with_session(session_id, context, |session| {
            session.add_message(Role::User, message, None);
            let reply = self.generate_response(&analysis);
            session.add_message(Role::Assistant, reply.clone(), None);
            (session.session_id.clone(), reply)
        })?;

        let mut metadata = Map::new();
        metadata.insert("model".into(), Value::String(self.config.model_name.clone()));

        Ok(ChatResponse {
            message: reply,
            confidence: analysis.confidence,
            intent: Some(analysis.intent),
            entities: Some(analysis.entities),
            session_id: Some(session_id),
            metadata,
        })
    }

    /// Run [`chat`](Self::chat) on the blocking thread pool.
    pub async fn chat_async(
        self: &Arc<Self>,
        message: impl Into<String>,
        session_id: Option<String>,
        context: Option<Map<String, Value>>,
    ) -> ChatResponse {
        let bot = Arc::clone(self);
        let message = message.into();
        tokio::task::spawn_blocking(move || bot.chat(&message, session_id.as_deref(), context))
            .await
            .unwrap_or_else(|e| {
                error!("chat task failed: {e}");
                ChatResponse::failure(&format!("chat task join: {e}"))
            })
    }

    /// Canned reply selection. Stands in for a real model call.
    fn generate_response(&self, analysis: &NlpResult) -> String {
        match analysis.intent {
            Intent::Greeting => GREETING_REPLY.to_string(),
            Intent::Farewell => FAREWELL_REPLY.to_string(),
            _ => format!(
                "I'm {}, an enterprise-grade AI assistant. I'm currently in setup mode. \
                 Please configure your OpenAI API key in the .env file to enable \
                 full conversational capabilities.",
                self.config.app_name
            ),
        }
    }

    /// Empty a session's history. `false` if the session is unknown.
    pub fn clear_session(&self, session_id: &str) -> Result<bool, AppError> {
        self.conversations.clear_session(session_id)
    }

    /// Full history of a session; empty if the session is unknown.
    pub fn get_session_history(&self, session_id: &str) -> Result<Vec<HistoryEntry>, AppError> {
        Ok(self
            .conversations
            .get_session(session_id)?
            .map(|s| s.history(None))
            .unwrap_or_default())
    }
}

impl Default for ChatBot {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

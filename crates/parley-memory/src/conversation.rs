// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One conversational exchange: build context, record the user's message,
//! ask the reply provider, record the answer.

use std::sync::Arc;

use tracing::{debug, info};

use parley_core::{AgentId, CallScope, ParleyError, ReplyProvider, Role, TurnId};

use crate::manager::MemoryManager;
use crate::prompt::{self, DEFAULT_TEMPLATE, KNOWN_PLACEHOLDERS};

/// Result of [`Conversation::exchange`].
#[derive(Debug, Clone)]
pub struct Exchange {
    pub user_turn: TurnId,
    pub assistant_turn: TurnId,
    pub reply: String,
    /// Semantic context was unavailable for this reply.
    pub degraded: bool,
}

/// Drives replies for any number of agents over a shared memory manager.
pub struct Conversation {
    memory: Arc<MemoryManager>,
    provider: Arc<dyn ReplyProvider>,
    template: String,
}

impl Conversation {
    pub fn new(memory: Arc<MemoryManager>, provider: Arc<dyn ReplyProvider>) -> Self {
        Self {
            memory,
            provider,
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Use a custom prompt template.
    ///
    /// Only `{{history}}`, `{{similar_messages}}` and `{{message}}` may appear.
    pub fn with_template(mut self, template: impl Into<String>) -> Result<Self, ParleyError> {
        let template = template.into();
        prompt::validate_template(&template, KNOWN_PLACEHOLDERS)?;
        self.template = template;
        Ok(self)
    }

    pub fn memory(&self) -> &Arc<MemoryManager> {
        &self.memory
    }

    /// Run one exchange for `agent_id`.
    ///
    /// Context is gathered before the user turn is written, so the new
    /// message never matches itself. The user turn is recorded before the
    /// provider is called. If the provider fails its error is returned and
    /// no assistant turn is written.
    pub async fn exchange(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        user_text: &str,
    ) -> Result<Exchange, ParleyError> {
        let (context, query_vector) = self
            .memory
            .gather_context(scope, agent_id, user_text)
            .await?;
        let mut bindings = context.bindings();
        bindings.insert("message", user_text.to_string());
        let rendered = prompt::render(&self.template, &bindings)?;

        let user_turn = self
            .memory
            .append_with(scope, agent_id, Role::User, user_text, query_vector)
            .await?;

        debug!(
            agent_id = %agent_id,
            recent = context.recent.len(),
            similar = context.similar.len(),
            "prompt assembled"
        );

        let reply = scope.run(self.provider.generate_reply(&rendered)).await?;

        let assistant_turn = self
            .memory
            .append(scope, agent_id, Role::Assistant, &reply)
            .await?;

        info!(
            agent_id = %agent_id,
            user_turn = %user_turn,
            assistant_turn = %assistant_turn,
            degraded = context.degraded,
            "exchange recorded"
        );

        Ok(Exchange {
            user_turn,
            assistant_turn,
            reply,
            degraded: context.degraded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_config::MemoryConfig;
    use parley_test_utils::{FailingEmbedder, MockEmbedder, MockReplyProvider, TempLedger};

    const DIMS: usize = 32;

    async fn setup(
        embedder: Arc<dyn parley_core::EmbeddingAdapter>,
        provider: Arc<MockReplyProvider>,
    ) -> (TempLedger, Conversation) {
        let ledger = TempLedger::open(DIMS).await.unwrap();
        let memory = Arc::new(MemoryManager::new(
            ledger.storage.clone(),
            embedder,
            MemoryConfig::default(),
        ));
        (ledger, Conversation::new(memory, provider))
    }

    #[tokio::test]
    async fn exchange_records_both_turns() {
        let provider = Arc::new(MockReplyProvider::with_replies(vec!["hello!".into()]));
        let (_ledger, conversation) =
            setup(Arc::new(MockEmbedder::new(DIMS)), provider.clone()).await;
        let scope = CallScope::background();
        let a1 = AgentId::from("a1");

        let exchange = conversation.exchange(&scope, &a1, "hi").await.unwrap();
        assert_eq!(exchange.reply, "hello!");
        assert!(exchange.user_turn < exchange.assistant_turn);
        assert!(!exchange.degraded);

        let history = conversation.memory().full_history(&scope, &a1).await.unwrap();
        let pairs: Vec<(Role, &str)> = history.iter().map(|t| (t.role, t.content.as_str())).collect();
        assert_eq!(pairs, vec![(Role::User, "hi"), (Role::Assistant, "hello!")]);

        let prompts = provider.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("user: hi"));
        assert!(!prompts[0].contains("{{"));
    }

    #[tokio::test]
    async fn new_message_does_not_crowd_out_older_matches() {
        let provider = Arc::new(MockReplyProvider::new());
        let embedder = Arc::new(MockEmbedder::new(DIMS));
        let ledger = TempLedger::open(DIMS).await.unwrap();
        let config = MemoryConfig {
            context_size: 1,
            similar_results: 1,
            ..MemoryConfig::default()
        };
        let memory = Arc::new(MemoryManager::new(
            ledger.storage.clone(),
            embedder.clone(),
            config,
        ));
        let conversation = Conversation::new(memory.clone(), provider.clone());
        let scope = CallScope::background();
        let a1 = AgentId::from("a1");

        memory.append(&scope, &a1, Role::User, "hello").await.unwrap();
        memory
            .append(&scope, &a1, Role::Assistant, "what's the weather")
            .await
            .unwrap();

        conversation.exchange(&scope, &a1, "hi").await.unwrap();

        let prompts = provider.prompts().await;
        assert!(
            prompts[0].contains("Related earlier messages:\nuser: hello"),
            "{}",
            prompts[0]
        );
        assert!(prompts[0].contains("assistant: what's the weather\nuser: hi\n"));
        // Two setup appends, then one query vector reused for the user turn
        // and one for the reply.
        assert_eq!(embedder.calls(), 4);

        let history = memory.full_history(&scope, &a1).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[2].embedding, Some(embedder.vector_for("hi")));
    }

    #[tokio::test]
    async fn provider_outage_keeps_the_user_turn() {
        let provider = Arc::new(MockReplyProvider::unreachable());
        let (_ledger, conversation) = setup(Arc::new(MockEmbedder::new(DIMS)), provider).await;
        let scope = CallScope::background();
        let a1 = AgentId::from("a1");

        let err = conversation.exchange(&scope, &a1, "hi").await.unwrap_err();
        assert!(matches!(err, ParleyError::ProviderUnavailable { .. }));

        let history = conversation.memory().full_history(&scope, &a1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
    }

    #[tokio::test]
    async fn exchange_proceeds_without_embeddings() {
        let provider = Arc::new(MockReplyProvider::new());
        let (_ledger, conversation) =
            setup(Arc::new(FailingEmbedder::new(DIMS)), provider).await;
        let scope = CallScope::background();
        let a1 = AgentId::from("a1");

        let exchange = conversation.exchange(&scope, &a1, "hi").await.unwrap();
        assert_eq!(exchange.reply, "mock reply");
        assert!(exchange.degraded);
    }

    #[tokio::test]
    async fn custom_template_receives_message_binding() {
        let provider = Arc::new(MockReplyProvider::new());
        let (_ledger, conversation) =
            setup(Arc::new(MockEmbedder::new(DIMS)), provider.clone()).await;
        let conversation = conversation.with_template("Q: {{message}}").unwrap();

        conversation
            .exchange(&CallScope::background(), &AgentId::from("a1"), "what's up")
            .await
            .unwrap();
        assert_eq!(provider.prompts().await, vec!["Q: what's up"]);
    }

    #[tokio::test]
    async fn unknown_placeholder_in_template_is_rejected() {
        let (_ledger, conversation) = setup(
            Arc::new(MockEmbedder::new(DIMS)),
            Arc::new(MockReplyProvider::new()),
        )
        .await;
        assert!(matches!(
            conversation.with_template("{{persona}}"),
            Err(ParleyError::Template(_))
        ));
    }
}

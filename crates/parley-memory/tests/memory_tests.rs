// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end memory scenarios against a real SQLite ledger.

use std::sync::Arc;

use parley_config::MemoryConfig;
use parley_core::{AgentId, CallScope, ConversationStore, ParleyError, Role};
use parley_memory::MemoryManager;
use parley_storage::SqliteStorage;
use parley_test_utils::{FailingEmbedder, MockEmbedder, TempLedger};

const DIMS: usize = 32;

async fn working_memory() -> (TempLedger, MemoryManager) {
    let ledger = TempLedger::open(DIMS).await.unwrap();
    let memory = MemoryManager::new(
        ledger.storage.clone(),
        Arc::new(MockEmbedder::new(DIMS)),
        MemoryConfig::default(),
    );
    (ledger, memory)
}

fn contents(turns: &[parley_core::Turn]) -> Vec<(Role, String)> {
    turns.iter().map(|t| (t.role, t.content.clone())).collect()
}

#[tokio::test]
async fn greeting_scenario() {
    let (_ledger, memory) = working_memory().await;
    let scope = CallScope::background();
    let a1 = AgentId::from("A1");

    memory.append(&scope, &a1, Role::User, "hi").await.unwrap();
    memory.append(&scope, &a1, Role::Assistant, "hello").await.unwrap();
    memory
        .append(&scope, &a1, Role::User, "what's the weather")
        .await
        .unwrap();

    let recent = memory.recent_context_with(&scope, &a1, 2).await.unwrap();
    assert_eq!(
        contents(&recent),
        vec![
            (Role::Assistant, "hello".to_string()),
            (Role::User, "what's the weather".to_string()),
        ]
    );

    let similar = memory
        .similar_context_with(&scope, &a1, "hi there", 1)
        .await
        .unwrap();
    assert_eq!(contents(&similar), vec![(Role::User, "hi".to_string())]);
}

#[tokio::test]
async fn recent_context_returns_min_of_window_and_total() {
    let (_ledger, memory) = working_memory().await;
    let scope = CallScope::background();
    let a1 = AgentId::from("A1");

    for i in 0..7 {
        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
        memory
            .append(&scope, &a1, role, &format!("message {i}"))
            .await
            .unwrap();
    }

    for n in [-1, 0, 1, 3, 7, 20] {
        let recent = memory.recent_context_with(&scope, &a1, n).await.unwrap();
        assert_eq!(recent.len() as i64, n.clamp(0, 7), "window {n}");
        assert!(
            recent.windows(2).all(|w| w[0].id < w[1].id),
            "window {n} not in creation order"
        );
        if let Some(last) = recent.last() {
            assert_eq!(last.content, "message 6");
        }
    }
}

#[tokio::test]
async fn read_your_write() {
    let (_ledger, memory) = working_memory().await;
    let scope = CallScope::background();
    let a1 = AgentId::from("A1");

    for text in ["first", "second", "third"] {
        let id = memory.append(&scope, &a1, Role::User, text).await.unwrap();
        let recent = memory.recent_context_with(&scope, &a1, 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, id);
        assert_eq!(recent[0].content, text);
    }
}

#[tokio::test]
async fn clear_history_twice_is_fine() {
    let (_ledger, memory) = working_memory().await;
    let scope = CallScope::background();
    let a1 = AgentId::from("A1");

    memory.append(&scope, &a1, Role::User, "hi").await.unwrap();
    memory.append(&scope, &a1, Role::Assistant, "hello").await.unwrap();

    assert_eq!(memory.clear_history(&scope, &a1).await.unwrap(), 2);
    assert!(memory.recent_context_with(&scope, &a1, 50).await.unwrap().is_empty());
    assert_eq!(memory.clear_history(&scope, &a1).await.unwrap(), 0);
}

#[tokio::test]
async fn agents_never_see_each_other() {
    let (_ledger, memory) = working_memory().await;
    let scope = CallScope::background();
    let a1 = AgentId::from("A1");
    let a2 = AgentId::from("A2");

    memory.append(&scope, &a1, Role::User, "hi").await.unwrap();
    memory.append(&scope, &a1, Role::User, "hello").await.unwrap();
    memory.append(&scope, &a2, Role::User, "hey").await.unwrap();

    let similar = memory
        .similar_context_with(&scope, &a2, "hi there", 10)
        .await
        .unwrap();
    assert_eq!(similar.len(), 1);
    assert!(similar.iter().all(|t| t.agent_id == a2));

    memory.clear_history(&scope, &a1).await.unwrap();
    assert_eq!(memory.full_history(&scope, &a2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn similar_context_respects_k() {
    let (_ledger, memory) = working_memory().await;
    let scope = CallScope::background();
    let a1 = AgentId::from("A1");

    for text in ["hi", "hello", "hey", "morning", "rain again", "pizza"] {
        memory.append(&scope, &a1, Role::User, text).await.unwrap();
    }
    for k in 1..=8 {
        let similar = memory
            .similar_context_with(&scope, &a1, "hello there", k)
            .await
            .unwrap();
        assert_eq!(similar.len() as i64, k.min(6));
    }
}

#[tokio::test]
async fn provider_outage_still_records_everything() {
    let ledger = TempLedger::open(DIMS).await.unwrap();
    let embedder = Arc::new(FailingEmbedder::new(DIMS));
    let memory = MemoryManager::new(
        ledger.storage.clone(),
        embedder.clone(),
        MemoryConfig::default(),
    );
    let scope = CallScope::background();
    let a1 = AgentId::from("A1");

    for text in ["hi", "hello", "what's the weather"] {
        memory.append(&scope, &a1, Role::User, text).await.unwrap();
    }

    let history = memory.full_history(&scope, &a1).await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|t| t.embedding.is_none()));

    let similar = memory
        .similar_context_with(&scope, &a1, "hi there", 3)
        .await
        .unwrap();
    assert!(similar.is_empty());
    assert_eq!(embedder.calls(), 4);
}

#[tokio::test]
async fn wrong_query_dimension_reads_nothing() {
    let ledger = TempLedger::open(DIMS).await.unwrap();
    let scope = CallScope::background();
    let err = ledger
        .storage
        .query_by_vector(&scope, &AgentId::from("A1"), &[1.0, 0.0, 0.0], 3)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ParleyError::DimensionMismatch {
            expected: DIMS,
            actual: 3
        }
    ));
}

#[tokio::test]
async fn concurrent_appends_for_one_agent_stay_ordered() {
    let (_ledger, memory) = working_memory().await;
    let memory = Arc::new(memory);
    let a1 = AgentId::from("A1");

    let mut handles = Vec::new();
    for worker in 0..6 {
        let memory = memory.clone();
        let a1 = a1.clone();
        handles.push(tokio::spawn(async move {
            let scope = CallScope::background();
            for i in 0..5 {
                memory
                    .append(&scope, &a1, Role::User, &format!("w{worker} m{i}"))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let history = memory
        .full_history(&CallScope::background(), &a1)
        .await
        .unwrap();
    assert_eq!(history.len(), 30);
    assert!(history.windows(2).all(|w| {
        (w[0].created_at.as_str(), w[0].id) < (w[1].created_at.as_str(), w[1].id)
    }));
}

#[tokio::test]
async fn memory_survives_reopening_the_ledger() {
    let ledger = TempLedger::open(DIMS).await.unwrap();
    let scope = CallScope::background();
    let a1 = AgentId::from("A1");
    {
        let memory = MemoryManager::new(
            ledger.storage.clone(),
            Arc::new(MockEmbedder::new(DIMS)),
            MemoryConfig::default(),
        );
        memory.append(&scope, &a1, Role::User, "hi").await.unwrap();
    }

    let reopened = SqliteStorage::open(ledger.config.clone(), DIMS).await.unwrap();
    let memory = MemoryManager::new(
        Arc::new(reopened),
        Arc::new(MockEmbedder::new(DIMS)),
        MemoryConfig::default(),
    );
    let similar = memory
        .similar_context_with(&scope, &a1, "hello", 1)
        .await
        .unwrap();
    assert_eq!(contents(&similar), vec![(Role::User, "hi".to_string())]);
}

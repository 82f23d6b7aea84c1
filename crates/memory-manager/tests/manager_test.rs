//! Integration tests for `MemoryStoreManager`.
//!
//! **BDD style**: Given a conversation and existing memories, when the model replies with
//! an extraction, then the requested creates, updates and deletes are applied to the store.

mod common;

use std::sync::Arc;

use agent::RunConfig;
use anyhow::Result;
use common::ScriptedLlm;
use memory_core::{MemoryStore, Namespace, NamespaceTemplate, SearchRequest};
use memory_inmemory::InMemoryStore;
use memory_manager::{ManagerError, MemoryChange, MemoryStoreManager};
use prompt::ChatMessage;
use serde_json::json;

fn conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::user("Hi! I'm Alice, and I'm a software engineer."),
        ChatMessage::assistant("Nice to meet you, Alice!"),
        ChatMessage::user("I have a dog named Max who is a Golden Retriever."),
        ChatMessage::assistant("Max sounds lovely."),
    ]
}

fn memories_ns() -> Namespace {
    Namespace::new(["memories"]).expect("valid namespace")
}

async fn contents(store: &InMemoryStore) -> Result<Vec<String>> {
    let mut items: Vec<String> = store
        .search(SearchRequest::new(memories_ns()))
        .await?
        .into_iter()
        .map(|s| s.item.content_text())
        .collect();
    items.sort();
    Ok(items)
}

/// **Test: creates from a fenced reply are stored under the namespace.**
#[tokio::test]
async fn creates_are_stored() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let llm = Arc::new(ScriptedLlm::new([
        "```json\n{\"memories\": [\
            {\"action\": \"create\", \"content\": \"Alice is a software engineer\"},\
            {\"action\": \"create\", \"content\": \"Alice has a Golden Retriever named Max\"}\
         ], \"done\": true}\n```",
    ]));
    let manager = MemoryStoreManager::new(llm.clone(), store.clone(), memories_ns());

    let changes = manager.process(&conversation(), 10, &RunConfig::new("t1")).await?;

    assert_eq!(changes.len(), 2);
    assert!(matches!(&changes[0], MemoryChange::Created { content, .. } if content == "Alice is a software engineer"));
    assert_eq!(
        contents(&store).await?,
        vec!["Alice has a Golden Retriever named Max", "Alice is a software engineer"]
    );
    assert_eq!(llm.requests().len(), 1);
    assert!(llm.user_prompt(0).contains("User: I have a dog named Max"));
    Ok(())
}

/// **Test: updates and deletes target existing memories shown to the model.**
#[tokio::test]
async fn updates_and_deletes_existing() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    store.put(&memories_ns(), "k1", json!({"content": "Alice has a cat"})).await?;
    store.put(&memories_ns(), "k2", json!({"content": "Alice lives in Paris"})).await?;
    let llm = Arc::new(ScriptedLlm::new([
        r#"Changes: {"memories": [
            {"action": "update", "id": "k1", "content": "Alice has a dog named Max"},
            {"action": "delete", "id": "k2"},
            {"action": "delete", "id": "invented"}
        ], "done": true}"#,
    ]));
    let manager = MemoryStoreManager::new(llm.clone(), store.clone(), memories_ns());

    let changes = manager.process(&conversation(), 10, &RunConfig::new("t1")).await?;

    assert_eq!(
        changes,
        vec![
            MemoryChange::Updated { key: "k1".to_string(), content: "Alice has a dog named Max".to_string() },
            MemoryChange::Deleted { key: "k2".to_string() },
        ]
    );
    assert_eq!(contents(&store).await?, vec!["Alice has a dog named Max"]);
    let prompt = llm.user_prompt(0);
    assert!(prompt.contains("\"id\":\"k1\""));
    assert!(prompt.contains("Alice lives in Paris"));
    Ok(())
}

/// **Test: the manager runs another round while changes keep coming and `done` is false.**
#[tokio::test]
async fn repeats_until_done_or_max_steps() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let llm = Arc::new(ScriptedLlm::new([
        r#"{"memories": [{"action": "create", "content": "Alice is a software engineer"}], "done": false}"#,
        r#"{"memories": [], "done": true}"#,
    ]));
    let manager = MemoryStoreManager::new(llm.clone(), store.clone(), memories_ns());
    let changes = manager.process(&conversation(), 10, &RunConfig::new("t1")).await?;
    assert_eq!(changes.len(), 1);
    assert_eq!(llm.requests().len(), 2);
    // Second round sees the memory created in the first.
    assert!(llm.user_prompt(1).contains("Alice is a software engineer"));

    let llm = Arc::new(ScriptedLlm::new([
        r#"{"memories": [{"action": "create", "content": "Max is a dog"}], "done": false}"#,
    ]));
    let manager = MemoryStoreManager::new(llm.clone(), store, memories_ns());
    manager.process(&conversation(), 1, &RunConfig::new("t1")).await?;
    assert_eq!(llm.requests().len(), 1);
    Ok(())
}

/// **Test: disabled actions are skipped and left out of the prompt.**
#[tokio::test]
async fn disabled_actions_are_skipped() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    store.put(&memories_ns(), "k1", json!({"content": "Alice has a cat"})).await?;
    let llm = Arc::new(ScriptedLlm::new([
        r#"{"memories": [{"action": "delete", "id": "k1"}, {"action": "create", "content": "Alice has a dog"}], "done": true}"#,
    ]));
    let manager = MemoryStoreManager::new(llm.clone(), store.clone(), memories_ns())
        .enable_deletes(false);

    let changes = manager.process(&conversation(), 10, &RunConfig::new("t1")).await?;

    assert_eq!(changes.len(), 1);
    assert_eq!(contents(&store).await?, vec!["Alice has a cat", "Alice has a dog"]);
    assert!(!llm.requests()[0].messages[0].content.contains("\"delete\""));
    Ok(())
}

/// **Test: templated namespaces resolve from the run config; bad replies are parse errors.**
#[tokio::test]
async fn template_and_parse_errors() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let llm = Arc::new(ScriptedLlm::new([
        r#"{"memories": [{"action": "create", "content": "likes tea"}], "done": true}"#,
        "I could not find anything worth remembering.",
    ]));
    let manager = MemoryStoreManager::new(
        llm,
        store.clone(),
        NamespaceTemplate::new(["memories", "{user_id}"]),
    );
    let config = RunConfig::new("t1").with_value("user_id", "alice");

    manager.process(&conversation(), 10, &config).await?;
    let alice = Namespace::new(["memories", "alice"])?;
    assert_eq!(store.search(SearchRequest::new(alice)).await?.len(), 1);

    let err = manager.process(&conversation(), 10, &config).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ManagerError>(), Some(ManagerError::Parse(_))));
    Ok(())
}

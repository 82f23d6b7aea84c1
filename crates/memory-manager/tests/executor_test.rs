//! Integration tests for `ReflectionExecutor` on a paused clock.
//!
//! **BDD style**: Given delayed submissions, when time passes or a newer submission for
//! the same thread arrives, then only the latest conversation is processed.

mod common;

use std::sync::Arc;
use std::time::Duration;

use agent::RunConfig;
use common::ScriptedLlm;
use memory_core::Namespace;
use memory_inmemory::InMemoryStore;
use memory_manager::{MemoryStoreManager, ReflectionExecutor, ReflectionRequest};
use prompt::ChatMessage;

const CREATE: &str = r#"{"memories": [{"action": "create", "content": "Alice likes hiking"}], "done": true}"#;

fn executor(llm: Arc<ScriptedLlm>) -> ReflectionExecutor {
    let store = Arc::new(InMemoryStore::new());
    let manager = MemoryStoreManager::new(llm, store, Namespace::new(["memories"]).expect("valid namespace"));
    ReflectionExecutor::new(Arc::new(manager))
}

fn request(thread: &str, texts: &[&str]) -> ReflectionRequest {
    ReflectionRequest {
        messages: texts.iter().map(|t| ChatMessage::user(*t)).collect(),
        max_steps: 10,
        config: RunConfig::new(thread),
    }
}

/// **Test: nothing runs before the delay; flush waits for the job.**
#[tokio::test(start_paused = true)]
async fn runs_after_delay() {
    let llm = Arc::new(ScriptedLlm::new([CREATE]));
    let executor = executor(llm.clone());

    executor
        .submit(request("t1", &["I love hiking"]), Duration::from_secs(30))
        .await;
    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(llm.requests().len(), 0);
    assert_eq!(executor.pending().await, 1);

    let changes = executor.flush().await;
    assert_eq!(changes.len(), 1);
    assert_eq!(llm.requests().len(), 1);
    assert_eq!(executor.pending().await, 0);
}

/// **Test: a newer submission for the same thread replaces the pending one.**
#[tokio::test(start_paused = true)]
async fn resubmission_debounces_per_thread() {
    let llm = Arc::new(ScriptedLlm::new([CREATE, CREATE]));
    let executor = executor(llm.clone());

    executor
        .submit(request("t1", &["I love hiking"]), Duration::from_secs(30))
        .await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    executor
        .submit(
            request("t1", &["I love hiking", "Mostly in the mountains"]),
            Duration::from_secs(30),
        )
        .await;
    assert_eq!(executor.pending().await, 1);

    executor.flush().await;
    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert!(llm.user_prompt(0).contains("Mostly in the mountains"));
}

/// **Test: different threads are processed independently.**
#[tokio::test(start_paused = true)]
async fn threads_are_independent() {
    let llm = Arc::new(ScriptedLlm::new([CREATE, CREATE]));
    let executor = executor(llm.clone());

    executor.submit(request("t1", &["a"]), Duration::from_secs(5)).await;
    executor.submit(request("t2", &["b"]), Duration::from_secs(5)).await;
    assert_eq!(executor.pending().await, 2);

    assert_eq!(executor.flush().await.len(), 2);
    assert_eq!(llm.requests().len(), 2);
}

/// **Test: shutdown aborts pending jobs.**
#[tokio::test(start_paused = true)]
async fn shutdown_aborts_pending() {
    let llm = Arc::new(ScriptedLlm::new([CREATE]));
    let executor = executor(llm.clone());

    executor.submit(request("t1", &["a"]), Duration::from_secs(30)).await;
    executor.shutdown().await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(llm.requests().len(), 0);
    assert_eq!(executor.pending().await, 0);
}

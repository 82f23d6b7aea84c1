//! Delayed, debounced background processing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use agent::RunConfig;
use anyhow::Result;
use prompt::ChatMessage;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{MemoryChange, MemoryStoreManager};

/// Conversation to process for one thread.
#[derive(Debug, Clone)]
pub struct ReflectionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_steps: usize,
    pub config: RunConfig,
}

type Job = JoinHandle<Result<Vec<MemoryChange>>>;

/// Runs [`MemoryStoreManager::process`] after a delay, one pending job per thread.
#[derive(Clone)]
pub struct ReflectionExecutor {
    manager: Arc<MemoryStoreManager>,
    jobs: Arc<Mutex<HashMap<String, Job>>>,
}

impl ReflectionExecutor {
    pub fn new(manager: Arc<MemoryStoreManager>) -> Self {
        Self {
            manager,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn manager(&self) -> &Arc<MemoryStoreManager> {
        &self.manager
    }

    /// Schedules `request` to run after `after`. A job still waiting for the same thread
    /// is aborted and replaced.
    pub async fn submit(&self, request: ReflectionRequest, after: Duration) {
        let thread_id = request.config.thread_id.clone();
        let manager = Arc::clone(&self.manager);
        let job_thread = thread_id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            debug!(thread_id = %job_thread, "reflection delay elapsed");
            let result = manager
                .process(&request.messages, request.max_steps, &request.config)
                .await;
            if let Err(e) = &result {
                warn!(thread_id = %job_thread, error = %e, "background memory processing failed");
            }
            result
        });

        let mut jobs = self.jobs.lock().await;
        if let Some(previous) = jobs.insert(thread_id.clone(), handle) {
            if !previous.is_finished() {
                previous.abort();
                info!(thread_id = %thread_id, "replaced pending reflection");
            }
        }
        info!(thread_id = %thread_id, delay_secs = after.as_secs_f64(), "reflection scheduled");
    }

    /// Jobs not yet finished.
    pub async fn pending(&self) -> usize {
        self.jobs
            .lock()
            .await
            .values()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Waits for every scheduled job and returns the changes they made.
    /// Failed jobs are logged and contribute nothing.
    pub async fn flush(&self) -> Vec<MemoryChange> {
        let jobs: Vec<(String, Job)> = self.jobs.lock().await.drain().collect();
        let mut changes = Vec::new();
        for (thread_id, handle) in jobs {
            match handle.await {
                Ok(Ok(mut done)) => changes.append(&mut done),
                Ok(Err(_)) => {}
                Err(e) if e.is_cancelled() => debug!(thread_id = %thread_id, "reflection was cancelled"),
                Err(e) => warn!(thread_id = %thread_id, error = %e, "reflection task panicked"),
            }
        }
        changes
    }

    /// Aborts every scheduled job.
    pub async fn shutdown(&self) {
        let mut jobs = self.jobs.lock().await;
        let count = jobs.len();
        for (_, handle) in jobs.drain() {
            handle.abort();
        }
        info!(aborted = count, "reflection executor shut down");
    }
}

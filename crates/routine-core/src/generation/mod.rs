//! Remote generation service abstraction and job orchestration.
//!
//! The remote service is a stateful assistants-style API: a conversation
//! thread holds messages, and a run executes an assistant over that thread.
//!
//! ```text
//! ┌──────────────────┐    ┌───────────────────┐    ┌──────────────────┐
//! │ JobOrchestrator  │───▶│ GenerationService │───▶│  Remote service  │
//! │ (poll + deadline)│    │   (trait seam)    │    │ (HTTP, threads)  │
//! └──────────────────┘    └───────────────────┘    └──────────────────┘
//! ```
//!
//! - [`client`]: reqwest implementation of [`GenerationService`]
//! - [`orchestrator`]: submit-and-poll loop over any [`GenerationService`]

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{JobStatus, ThreadMessage},
};

pub mod client;
pub mod orchestrator;

pub use client::AssistantsClient;
pub use orchestrator::JobOrchestrator;

/// Operations the orchestrator needs from the remote generation service.
///
/// Every method maps to one remote call; implementations report transport
/// and protocol problems as `RoutineError::Transport`.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Creates a conversation thread and returns its server-assigned id.
    async fn create_thread(&self) -> Result<String>;

    /// Appends a user message to the thread.
    async fn post_message(&self, thread_id: &str, text: &str) -> Result<()>;

    /// Starts a run of `assistant_id` over the thread and returns the run id.
    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<String>;

    /// Fetches the current status of a run.
    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<JobStatus>;

    /// Returns the newest message in the thread, if any.
    async fn latest_message(&self, thread_id: &str) -> Result<Option<ThreadMessage>>;
}

/// Time source for the poll loop.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    /// Suspends the caller without blocking a worker thread.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

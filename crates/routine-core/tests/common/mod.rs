#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use routine_core::{
    Config, GenerationService, JobStatus, MailMessage, Mailer, PlanStore, Result, RoutineError,
    RoutineService, RoutineServiceBuilder, ThreadMessage,
};
use tempfile::TempDir;

/// Helper function to create a test store
pub async fn create_test_store() -> (TempDir, PlanStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let store = PlanStore::open(Some(&db_path))
        .await
        .expect("Failed to open store");
    (temp_dir, store)
}

/// Generation service that completes on the first poll with a fixed reply.
pub struct CannedGeneration {
    pub status: JobStatus,
    pub reply: String,
    pub prompts: Mutex<Vec<String>>,
    pub listed: Mutex<u32>,
    pub statuses: Mutex<VecDeque<JobStatus>>,
}

impl CannedGeneration {
    pub fn completing(reply: &str) -> Self {
        Self::with_status(JobStatus::Completed, reply)
    }

    pub fn with_status(status: JobStatus, reply: &str) -> Self {
        Self {
            status,
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
            listed: Mutex::new(0),
            statuses: Mutex::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl GenerationService for CannedGeneration {
    async fn create_thread(&self) -> Result<String> {
        Ok("thread_abc".to_string())
    }

    async fn post_message(&self, _thread_id: &str, text: &str) -> Result<()> {
        self.prompts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn start_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<String> {
        Ok("run_abc".to_string())
    }

    async fn run_status(&self, _thread_id: &str, _run_id: &str) -> Result<JobStatus> {
        Ok(self.statuses.lock().unwrap().pop_front().unwrap_or(self.status))
    }

    async fn latest_message(&self, _thread_id: &str) -> Result<Option<ThreadMessage>> {
        *self.listed.lock().unwrap() += 1;
        Ok(Some(ThreadMessage::assistant(self.reply.clone())))
    }
}

/// Mailer that records every message and optionally rejects it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailMessage>>,
    pub reject: bool,
}

impl RecordingMailer {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        if self.reject {
            return Err(RoutineError::Delivery {
                message: "550 mailbox unavailable".to_string(),
            });
        }
        Ok(())
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.generation.assistant_id = Some("asst_test".to_string());
    config.mail.sender = Some("Routine <coach@example.com>".to_string());
    config
}

/// Helper function to create a service wired to in-memory fakes
pub async fn create_test_service(
    generation: Arc<CannedGeneration>,
    mailer: Arc<RecordingMailer>,
) -> (TempDir, RoutineService) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let service = RoutineServiceBuilder::new(test_config())
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .with_generation_service(generation)
        .with_mailer(mailer)
        .build()
        .await
        .expect("Failed to build service");
    (temp_dir, service)
}

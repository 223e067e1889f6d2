//! Submit-and-poll driver for remote generation jobs.

use std::sync::Arc;

use log::{debug, info, warn};

use super::{Clock, GenerationService, TokioClock};
use crate::{
    config::PollPolicy,
    error::{GenerationFailure, Result, RoutineError},
    models::{GenerationJob, JobStatus, MessageRole},
};

/// Runs one prompt through the remote service and waits for the reply.
///
/// The job handle never leaves [`JobOrchestrator::submit`]; callers only see
/// the final text or a tagged failure. Dropping the returned future stops
/// polling. The remote run is not cancelled.
pub struct JobOrchestrator {
    service: Arc<dyn GenerationService>,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
}

impl JobOrchestrator {
    pub fn new(service: Arc<dyn GenerationService>, policy: PollPolicy) -> Self {
        Self::with_clock(service, policy, Arc::new(TokioClock))
    }

    pub fn with_clock(
        service: Arc<dyn GenerationService>,
        policy: PollPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            service,
            clock,
            policy,
        }
    }

    /// Submits `prompt` to a fresh thread and returns `(result_text,
    /// thread_id)` once the run completes.
    ///
    /// # Errors
    ///
    /// - `RoutineError::Configuration` if the poll policy is out of range;
    ///   nothing is sent in that case
    /// - `RoutineError::Transport` if any remote call fails
    /// - `RoutineError::GenerationFailed` if the run ends in any status other
    ///   than completed, does not finish before the deadline, or leaves no
    ///   assistant reply
    pub async fn submit(&self, prompt: &str, assistant_id: &str) -> Result<(String, String)> {
        self.policy.validate()?;

        let thread_id = self.service.create_thread().await?;
        info!("Created generation thread {thread_id}");

        self.service.post_message(&thread_id, prompt).await?;

        let run_id = self.service.start_run(&thread_id, assistant_id).await?;
        info!("Started run {run_id} on thread {thread_id} with assistant {assistant_id}");

        let mut job = GenerationJob {
            assistant_id: assistant_id.to_string(),
            thread_id,
            run_id,
            status: JobStatus::Queued,
        };

        self.poll_until_terminal(&mut job).await?;

        if job.status != JobStatus::Completed {
            warn!("Run {} ended with status '{}'", job.run_id, job.status.as_str());
            return Err(RoutineError::generation_failed(GenerationFailure::Terminal(
                job.status,
            )));
        }

        let reply = self
            .service
            .latest_message(&job.thread_id)
            .await?
            .filter(|message| message.role == MessageRole::Assistant && !message.text.is_empty())
            .ok_or_else(|| {
                warn!("Run {} completed without an assistant reply", job.run_id);
                RoutineError::generation_failed(GenerationFailure::MissingReply)
            })?;

        info!("Run {} completed", job.run_id);
        Ok((reply.text, job.thread_id))
    }

    /// Polls until the job is terminal. Fails with `TimedOut` when the
    /// deadline passes first; no status is fetched after the deadline.
    async fn poll_until_terminal(&self, job: &mut GenerationJob) -> Result<()> {
        let deadline = self
            .clock
            .now()
            .checked_add(self.policy.timeout())
            .ok_or_else(|| RoutineError::configuration("poll.timeout_secs is out of range"))?;
        let mut attempts: u32 = 0;

        loop {
            job.status = self
                .service
                .run_status(&job.thread_id, &job.run_id)
                .await?;
            attempts += 1;
            debug!(
                "Poll {attempts} for run {}: '{}'",
                job.run_id,
                job.status.as_str()
            );

            if job.status.is_terminal() {
                return Ok(());
            }

            let next_poll = self.clock.now().checked_add(self.policy.interval());
            if next_poll.map_or(true, |at| at > deadline) {
                warn!(
                    "Run {} still '{}' after {attempts} polls; giving up",
                    job.run_id,
                    job.status.as_str()
                );
                return Err(RoutineError::generation_failed(GenerationFailure::TimedOut {
                    last_status: job.status,
                }));
            }

            self.clock.sleep(self.policy.interval()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use async_trait::async_trait;

    use super::*;
    use crate::models::ThreadMessage;

    /// Clock whose sleep advances virtual time instantly.
    struct FakeClock {
        start: Instant,
        elapsed: Mutex<Duration>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                elapsed: Mutex::new(Duration::ZERO),
            }
        }

        fn elapsed(&self) -> Duration {
            *self.elapsed.lock().unwrap()
        }
    }

    #[async_trait]
    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.start + self.elapsed()
        }

        async fn sleep(&self, duration: Duration) {
            *self.elapsed.lock().unwrap() += duration;
        }
    }

    #[derive(Default)]
    struct ScriptedService {
        statuses: Mutex<VecDeque<JobStatus>>,
        /// Status returned once the script runs out
        steady: Option<JobStatus>,
        reply: Option<ThreadMessage>,
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedService {
        fn with_statuses(statuses: &[JobStatus]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                reply: Some(ThreadMessage::assistant("Do <<<Burpees>>> for 3 sets.")),
                ..Default::default()
            }
        }

        fn record(&self, call: &'static str) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail_on == Some(call) {
                return Err(RoutineError::transport(format!("{call} refused")));
            }
            Ok(())
        }

        fn count(&self, call: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
        }
    }

    #[async_trait]
    impl GenerationService for ScriptedService {
        async fn create_thread(&self) -> Result<String> {
            self.record("create_thread")?;
            Ok("thread_1".to_string())
        }

        async fn post_message(&self, thread_id: &str, _text: &str) -> Result<()> {
            assert_eq!(thread_id, "thread_1");
            self.record("post_message")
        }

        async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<String> {
            assert_eq!(thread_id, "thread_1");
            assert_eq!(assistant_id, "asst_1");
            self.record("start_run")?;
            Ok("run_1".to_string())
        }

        async fn run_status(&self, _thread_id: &str, run_id: &str) -> Result<JobStatus> {
            assert_eq!(run_id, "run_1");
            self.record("run_status")?;
            let next = self.statuses.lock().unwrap().pop_front();
            Ok(next.or(self.steady).unwrap_or(JobStatus::Running))
        }

        async fn latest_message(&self, _thread_id: &str) -> Result<Option<ThreadMessage>> {
            self.record("latest_message")?;
            Ok(self.reply.clone())
        }
    }

    fn policy() -> PollPolicy {
        PollPolicy::new(Duration::from_secs(1), Duration::from_secs(10))
    }

    fn orchestrator(service: Arc<ScriptedService>, clock: Arc<FakeClock>) -> JobOrchestrator {
        JobOrchestrator::with_clock(service, policy(), clock)
    }

    #[tokio::test]
    async fn test_submit_returns_reply_after_completion() {
        let service = Arc::new(ScriptedService::with_statuses(&[
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Completed,
        ]));
        let clock = Arc::new(FakeClock::new());

        let (text, thread_id) = orchestrator(service.clone(), clock.clone())
            .submit("prompt", "asst_1")
            .await
            .expect("submit should succeed");

        assert_eq!(text, "Do <<<Burpees>>> for 3 sets.");
        assert_eq!(thread_id, "thread_1");
        assert_eq!(service.count("run_status"), 3);
        assert_eq!(service.count("latest_message"), 1);
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_timeout_fails_without_listing_messages() {
        let service = Arc::new(ScriptedService {
            steady: Some(JobStatus::Running),
            ..ScriptedService::with_statuses(&[])
        });
        let clock = Arc::new(FakeClock::new());

        let err = orchestrator(service.clone(), clock.clone())
            .submit("prompt", "asst_1")
            .await
            .unwrap_err();

        match err {
            RoutineError::GenerationFailed {
                reason: GenerationFailure::TimedOut { last_status },
            } => assert_eq!(last_status, JobStatus::Running),
            other => panic!("Expected timeout, got {other:?}"),
        }
        assert_eq!(service.count("latest_message"), 0);
        // Polls at t = 0..=10s, never past the deadline.
        assert_eq!(service.count("run_status"), 11);
        assert!(clock.elapsed() <= policy().timeout());
    }

    #[tokio::test]
    async fn test_out_of_range_policy_fails_before_any_remote_call() {
        let policies = [
            PollPolicy {
                interval_ms: 1_000,
                timeout_secs: 9_223_372_036_854_775_807,
            },
            PollPolicy {
                interval_ms: 0,
                timeout_secs: 10,
            },
        ];
        for policy in policies {
            let service = Arc::new(ScriptedService::with_statuses(&[JobStatus::Completed]));
            let err = JobOrchestrator::with_clock(service.clone(), policy, Arc::new(FakeClock::new()))
                .submit("prompt", "asst_1")
                .await
                .unwrap_err();

            assert!(
                matches!(err, RoutineError::Configuration { .. }),
                "{policy:?} should be rejected, got {err:?}"
            );
            assert!(service.calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_non_completed_terminal_status_is_generation_failure() {
        for status in [JobStatus::Failed, JobStatus::Cancelled, JobStatus::Expired] {
            let service = Arc::new(ScriptedService::with_statuses(&[JobStatus::Running, status]));
            let err = orchestrator(service.clone(), Arc::new(FakeClock::new()))
                .submit("prompt", "asst_1")
                .await
                .unwrap_err();

            assert!(
                matches!(
                    err,
                    RoutineError::GenerationFailed { reason: GenerationFailure::Terminal(s) } if s == status
                ),
                "unexpected error for {status:?}: {err:?}"
            );
            assert_eq!(service.count("latest_message"), 0);
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates_from_each_stage() {
        for stage in ["create_thread", "post_message", "start_run", "run_status", "latest_message"] {
            let service = Arc::new(ScriptedService {
                fail_on: Some(stage),
                ..ScriptedService::with_statuses(&[JobStatus::Completed])
            });
            let err = orchestrator(service.clone(), Arc::new(FakeClock::new()))
                .submit("prompt", "asst_1")
                .await
                .unwrap_err();

            assert!(
                matches!(err, RoutineError::Transport { .. }),
                "stage {stage} should surface a transport error, got {err:?}"
            );
            assert_eq!(service.count(stage), 1, "no retry of {stage}");
        }
    }

    #[tokio::test]
    async fn test_completed_with_user_message_is_missing_reply() {
        let service = Arc::new(ScriptedService {
            reply: Some(ThreadMessage::user("prompt")),
            ..ScriptedService::with_statuses(&[JobStatus::Completed])
        });

        let err = orchestrator(service, Arc::new(FakeClock::new()))
            .submit("prompt", "asst_1")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RoutineError::GenerationFailed {
                reason: GenerationFailure::MissingReply
            }
        ));
    }

    #[tokio::test]
    async fn test_completed_with_empty_thread_is_missing_reply() {
        let service = Arc::new(ScriptedService {
            reply: None,
            ..ScriptedService::with_statuses(&[JobStatus::Completed])
        });

        let err = orchestrator(service, Arc::new(FakeClock::new()))
            .submit("prompt", "asst_1")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("without an assistant reply"));
    }
}

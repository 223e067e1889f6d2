//! The pipeline facade: generate, persist, and deliver routines.
//!
//! ```text
//! PlanRequest ─▶ prompt ─▶ JobOrchestrator ─▶ linkify ─▶ PlanStore::create
//!                                                              │
//!                                              (plan_text, record_id)
//!
//! deliver(record_id, address, plan_text)
//!     ─▶ NotificationDispatcher::dispatch ─▶ PlanStore::update (always)
//! ```
//!
//! # Building a service
//!
//! ```rust,no_run
//! use routine_core::{Config, Goal, PlanRequest, RoutineServiceBuilder};
//!
//! # async fn example() -> routine_core::Result<()> {
//! let config = Config::load(None)?;
//! let service = RoutineServiceBuilder::new(config).build().await?;
//!
//! let request = PlanRequest::builder()
//!     .goal(Goal::LoseFat)
//!     .training_years(2.0)
//!     .duration_minutes(30)
//!     .build()?;
//!
//! let plan = service.generate(&request).await?;
//! let report = service
//!     .deliver(plan.record_id, "athlete@example.com", &plan.plan_text)
//!     .await?;
//! println!("delivered: {}", report.delivered);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::{
    config::Config,
    error::{Result, RoutineError},
    generation::{AssistantsClient, Clock, GenerationService, JobOrchestrator, TokioClock},
    linkify::linkify,
    models::{GeneratedPlan, PlanRecord, PlanRequest},
    notify::{MailgunMailer, Mailer, NotificationDispatcher},
    store::PlanStore,
};

/// Outcome of a delivery attempt. The address is recorded whether or not
/// the mail went out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub record_id: u64,
    pub address: String,
    pub delivered: bool,
}

struct Generation {
    orchestrator: JobOrchestrator,
    assistant_id: String,
}

/// Facade over the whole pipeline. `Send + Sync`; share it behind an `Arc`
/// for concurrent requests.
pub struct RoutineService {
    store: PlanStore,
    // Err holds the reason the component is unavailable.
    generation: std::result::Result<Generation, String>,
    dispatcher: std::result::Result<NotificationDispatcher, String>,
}

impl RoutineService {
    /// Runs one request through the pipeline and persists the result.
    ///
    /// Nothing is written to the store unless generation succeeded.
    ///
    /// # Errors
    ///
    /// `Configuration` when no generation service is configured, then
    /// whatever the orchestrator (`Transport`, `GenerationFailed`) or the
    /// store (`Persistence`) reports.
    pub async fn generate(&self, request: &PlanRequest) -> Result<GeneratedPlan> {
        let generation = self
            .generation
            .as_ref()
            .map_err(|reason| RoutineError::configuration(reason.clone()))?;

        let prompt = request.prompt();
        let (raw_text, thread_id) = generation
            .orchestrator
            .submit(&prompt, &generation.assistant_id)
            .await?;

        let plan_text = linkify(&raw_text).into_owned();

        let record_id = self
            .store
            .create(&generation.assistant_id, &thread_id, &prompt, &plan_text)
            .await?;
        info!("Stored generated plan as record {record_id}");

        Ok(GeneratedPlan {
            plan_text,
            record_id,
        })
    }

    /// Mails `plan_text` to `address`, then records the address on the
    /// record regardless of whether the mail was accepted.
    ///
    /// # Errors
    ///
    /// `Validation` for an unusable address and `Configuration` when no mail
    /// service is configured; both are raised before anything is sent or
    /// stored. `NotFound` and `Persistence` come from the store update.
    /// Mail failures are reported through [`DeliveryReport::delivered`].
    pub async fn deliver(
        &self,
        record_id: u64,
        address: &str,
        plan_text: &str,
    ) -> Result<DeliveryReport> {
        let address = validate_address(address)?;
        let dispatcher = self
            .dispatcher
            .as_ref()
            .map_err(|reason| RoutineError::configuration(reason.clone()))?;

        let delivered = dispatcher.dispatch(address, plan_text).await;
        self.record_delivery_attempt(record_id, address).await?;

        Ok(DeliveryReport {
            record_id,
            address: address.to_string(),
            delivered,
        })
    }

    /// Delivers the plan text already stored under `record_id`.
    pub async fn deliver_stored(&self, record_id: u64, address: &str) -> Result<DeliveryReport> {
        let record = self
            .store
            .get(record_id)
            .await?
            .ok_or(RoutineError::NotFound { id: record_id })?;
        self.deliver(record_id, address, &record.plan_text).await
    }

    /// Attaches `address` to the record as the intended recipient. Runs
    /// after every dispatch, successful or not.
    async fn record_delivery_attempt(&self, record_id: u64, address: &str) -> Result<()> {
        self.store.update(record_id, address).await
    }

    pub async fn record(&self, record_id: u64) -> Result<Option<PlanRecord>> {
        self.store.get(record_id).await
    }

    pub async fn records(&self, limit: u32) -> Result<Vec<PlanRecord>> {
        self.store.list(limit).await
    }
}

fn validate_address(address: &str) -> Result<&str> {
    let address = address.trim();
    match address.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(address),
        _ => Err(RoutineError::validation("email")
            .with_reason(format!("'{address}' is not an email address"))),
    }
}

// Configuration errors are re-raised per call; keep only the message.
fn unavailable_reason(error: RoutineError) -> String {
    match error {
        RoutineError::Configuration { message } => message,
        other => other.to_string(),
    }
}

/// Builder for [`RoutineService`].
///
/// Remote collaborators default to the HTTP clients configured in
/// [`Config`]; tests and embedders can inject their own.
pub struct RoutineServiceBuilder {
    config: Config,
    database_path: Option<PathBuf>,
    generation_service: Option<Arc<dyn GenerationService>>,
    mailer: Option<Arc<dyn Mailer>>,
    clock: Arc<dyn Clock>,
}

impl RoutineServiceBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            database_path: config.database_path.clone(),
            config,
            generation_service: None,
            mailer: None,
            clock: Arc::new(TokioClock),
        }
    }

    /// Overrides the configured database file.
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    pub fn with_generation_service(mut self, service: Arc<dyn GenerationService>) -> Self {
        self.generation_service = Some(service);
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Opens the store and wires the remote collaborators.
    ///
    /// Missing generation or mail settings do not fail the build; the
    /// affected operation reports a `Configuration` error when called.
    ///
    /// # Errors
    ///
    /// Store setup errors (`FileSystem`, `XdgDirectory`, `Persistence`) and
    /// HTTP client construction errors.
    pub async fn build(self) -> Result<RoutineService> {
        let store = PlanStore::open(self.database_path.as_deref()).await?;
        let policy = self.config.poll;

        let generation = match self.config.resolve_generation() {
            Ok(resolved) => {
                let service = match self.generation_service {
                    Some(service) => service,
                    None => Arc::new(AssistantsClient::new(&resolved)?),
                };
                Ok(Generation {
                    orchestrator: JobOrchestrator::with_clock(service, policy, self.clock),
                    assistant_id: resolved.assistant_id,
                })
            }
            Err(e) => match (self.generation_service, &self.config.generation.assistant_id) {
                (Some(service), Some(assistant_id)) => Ok(Generation {
                    orchestrator: JobOrchestrator::with_clock(service, policy, self.clock),
                    assistant_id: assistant_id.clone(),
                }),
                _ => Err(unavailable_reason(e)),
            },
        };

        let dispatcher = match self.config.resolve_mail() {
            Ok(resolved) => {
                let mailer = match self.mailer {
                    Some(mailer) => mailer,
                    None => Arc::new(MailgunMailer::new(&resolved)?),
                };
                Ok(NotificationDispatcher::new(mailer, resolved.sender))
            }
            Err(e) => match (self.mailer, &self.config.mail.sender) {
                (Some(mailer), Some(sender)) => {
                    Ok(NotificationDispatcher::new(mailer, sender.clone()))
                }
                _ => Err(unavailable_reason(e)),
            },
        };

        Ok(RoutineService {
            store,
            generation,
            dispatcher,
        })
    }
}

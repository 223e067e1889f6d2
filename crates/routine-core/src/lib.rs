//! Core library for the Routine workout plan generator.
//!
//! This crate turns a handful of form fields into a personalized workout
//! routine by running a job on a remote assistants-style generation service,
//! then stores the result and mails it on request.
//!
//! # Pipeline
//!
//! - [`models::PlanRequest`]: validated input and its canonical prompt
//! - [`generation::JobOrchestrator`]: submit, poll to a terminal state under
//!   a deadline, read the reply only after completion
//! - [`linkify()`]: turn `<<<Exercise>>>` markers into search links
//! - [`PlanStore`]: persist records and attach delivery addresses
//! - [`notify::NotificationDispatcher`]: plain + HTML email with fixed
//!   boilerplate
//! - [`RoutineService`]: the facade sequencing all of the above
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use routine_core::{Config, Goal, PlanRequest, RoutineServiceBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RoutineServiceBuilder::new(Config::load(None)?)
//!     .with_database_path(Some("routine.db"))
//!     .build()
//!     .await?;
//!
//! let request = PlanRequest::builder()
//!     .goal(Goal::BuildMuscle)
//!     .training_years(1.5)
//!     .duration_minutes(45)
//!     .equipment("dumbbells".to_string())
//!     .build()?;
//!
//! let plan = service.generate(&request).await?;
//! println!("{plan}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod generation;
pub mod linkify;
pub mod models;
pub mod notify;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::{Config, PollPolicy};
pub use display::{LocalDateTime, PlanRecords};
pub use error::{GenerationFailure, Result, RoutineError};
pub use generation::{Clock, GenerationService, JobOrchestrator, TokioClock};
pub use linkify::linkify;
pub use models::{
    GeneratedPlan, Goal, JobStatus, MessageRole, PlanRecord, PlanRequest, PlanRequestBuilder,
    ThreadMessage, MIN_DURATION_MINUTES,
};
pub use notify::{MailMessage, Mailer, NotificationDispatcher};
pub use service::{DeliveryReport, RoutineService, RoutineServiceBuilder};
pub use store::PlanStore;

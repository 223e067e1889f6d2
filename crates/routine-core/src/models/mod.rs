//! Data models for routine requests, generation jobs, and stored records.
//!
//! - [`request`]: the validated user input and its prompt rendering
//! - [`job`]: remote job status vocabulary and thread messages
//! - [`record`]: the persisted plan record and the facade's output

pub mod job;
pub mod record;
pub mod request;


pub use job::{GenerationJob, JobStatus, MessageRole, ThreadMessage};
pub use record::{GeneratedPlan, PlanRecord};
pub use request::{Goal, PlanRequest, PlanRequestBuilder, MIN_DURATION_MINUTES};

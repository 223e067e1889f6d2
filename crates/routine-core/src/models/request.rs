//! Plan request model and prompt rendering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutineError};

/// Shortest workout the generator will plan for.
pub const MIN_DURATION_MINUTES: u32 = 10;

const NONE: &str = "None";

/// Type-safe enumeration of supported fitness objectives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    BuildMuscle,
    LoseFat,
    GainStrength,
}

impl Goal {
    /// All goals in presentation order.
    pub const ALL: [Goal; 3] = [Goal::BuildMuscle, Goal::LoseFat, Goal::GainStrength];

    /// Human-readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Goal::BuildMuscle => "Build muscle",
            Goal::LoseFat => "Lose fat",
            Goal::GainStrength => "Gain strength",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        Goal::ALL
            .into_iter()
            .find(|goal| goal.label().to_lowercase() == normalized)
            .ok_or_else(|| format!("Invalid goal: {s}"))
    }
}

/// Validated input for one routine generation.
///
/// Construct through [`PlanRequestBuilder`]; fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRequest {
    goal: Goal,
    training_years: f64,
    duration_minutes: u32,
    concerns: Option<String>,
    equipment: Option<String>,
    workout_type: Option<String>,
    focus_area: Option<String>,
}

impl PlanRequest {
    pub fn builder() -> PlanRequestBuilder {
        PlanRequestBuilder::new()
    }

    pub fn goal(&self) -> Goal {
        self.goal
    }

    pub fn training_years(&self) -> f64 {
        self.training_years
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn concerns(&self) -> Option<&str> {
        self.concerns.as_deref()
    }

    pub fn equipment(&self) -> Option<&str> {
        self.equipment.as_deref()
    }

    pub fn workout_type(&self) -> Option<&str> {
        self.workout_type.as_deref()
    }

    pub fn focus_area(&self) -> Option<&str> {
        self.focus_area.as_deref()
    }

    /// Renders the canonical prompt: one `- Label: value` line per field in a
    /// fixed order, with `None` standing in for every absent optional field.
    pub fn prompt(&self) -> String {
        let lines = [
            ("Goal", self.goal.label().to_string()),
            ("Concerns", or_none(self.concerns())),
            ("Equipment", or_none(self.equipment())),
            ("Training Years", self.training_years.to_string()),
            ("Duration Minutes", self.duration_minutes.to_string()),
            ("Workout Type", or_none(self.workout_type())),
            ("Focus Area", or_none(self.focus_area())),
        ];

        lines
            .iter()
            .map(|(label, value)| format!("- {label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn or_none(value: Option<&str>) -> String {
    value.unwrap_or(NONE).to_string()
}

/// Builder that collects raw form input and validates it into a
/// [`PlanRequest`].
#[derive(Debug, Clone, Default)]
pub struct PlanRequestBuilder {
    goal: Option<Goal>,
    training_years: f64,
    duration_minutes: u32,
    concerns: Option<String>,
    equipment: Option<String>,
    workout_type: Option<String>,
    focus_area: Option<String>,
}

impl PlanRequestBuilder {
    /// Creates a builder with no goal, zero training years and the minimum
    /// duration.
    pub fn new() -> Self {
        Self {
            duration_minutes: MIN_DURATION_MINUTES,
            ..Default::default()
        }
    }

    pub fn goal(mut self, goal: Goal) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn training_years(mut self, years: f64) -> Self {
        self.training_years = years;
        self
    }

    pub fn duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn concerns(mut self, concerns: impl Into<Option<String>>) -> Self {
        self.concerns = concerns.into();
        self
    }

    pub fn equipment(mut self, equipment: impl Into<Option<String>>) -> Self {
        self.equipment = equipment.into();
        self
    }

    pub fn workout_type(mut self, workout_type: impl Into<Option<String>>) -> Self {
        self.workout_type = workout_type.into();
        self
    }

    pub fn focus_area(mut self, focus_area: impl Into<Option<String>>) -> Self {
        self.focus_area = focus_area.into();
        self
    }

    /// Validates the collected fields.
    ///
    /// # Errors
    ///
    /// Returns `RoutineError::Validation` when the goal is missing, training
    /// years is negative or not finite, or the duration is below
    /// [`MIN_DURATION_MINUTES`].
    pub fn build(self) -> Result<PlanRequest> {
        let goal = self
            .goal
            .ok_or_else(|| RoutineError::validation("goal").with_reason("A goal is required"))?;

        if !self.training_years.is_finite() || self.training_years < 0.0 {
            return Err(RoutineError::validation("training_years")
                .with_reason("Training years must be a non-negative number"));
        }

        if self.duration_minutes < MIN_DURATION_MINUTES {
            return Err(RoutineError::validation("duration_minutes").with_reason(format!(
                "Duration must be at least {MIN_DURATION_MINUTES} minutes"
            )));
        }

        Ok(PlanRequest {
            goal,
            training_years: self.training_years,
            duration_minutes: self.duration_minutes,
            concerns: non_blank(self.concerns),
            equipment: non_blank(self.equipment),
            workout_type: non_blank(self.workout_type),
            focus_area: non_blank(self.focus_area),
        })
    }
}

// An empty text box means "no answer". Multi-line answers are folded onto
// one line so each field stays a single prompt line.
fn non_blank(value: Option<String>) -> Option<String> {
    let folded = value?
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!folded.is_empty()).then_some(folded)
}

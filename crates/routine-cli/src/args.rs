//! Command-line interface definitions using clap
//!
//! Argument structs carry the clap attributes and convert into core types,
//! so `routine-core` stays free of CLI concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → PlanRequest → RoutineService
//! ```

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use routine_core::{Goal, PlanRequest, PlanRequestBuilder, MIN_DURATION_MINUTES};

/// Generate personalized workout routines and mail them to athletes
///
/// A routine is produced by a remote assistant from a short questionnaire,
/// stored locally with a link for every exercise, and can be mailed as
/// plain text and HTML.
#[derive(Parser)]
#[command(version, about, name = "routine")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/routine/routine.db
    #[arg(long, global = true, env = "ROUTINE_DATABASE_FILE")]
    pub database_file: Option<PathBuf>,

    /// Path to a TOML configuration file. Defaults to
    /// $XDG_CONFIG_HOME/routine/config.toml
    #[arg(long, global = true, env = "ROUTINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new routine and store it
    #[command(alias = "g")]
    Generate(GenerateArgs),
    /// Mail a stored routine to an address
    #[command(alias = "d")]
    Deliver(DeliverArgs),
    /// Show a stored routine
    #[command(alias = "s")]
    Show(ShowArgs),
    /// List stored routines, newest first
    #[command(alias = "l")]
    List(ListArgs),
}

#[derive(ClapArgs)]
pub struct GenerateArgs {
    /// Primary training goal
    #[arg(short, long, value_enum)]
    pub goal: GoalArg,

    /// Years of training experience
    #[arg(short = 'y', long, default_value_t = 0.0)]
    pub training_years: f64,

    /// Session length in minutes
    #[arg(short, long, default_value_t = MIN_DURATION_MINUTES)]
    pub duration: u32,

    /// Injuries or other concerns to work around
    #[arg(long)]
    pub concerns: Option<String>,

    /// Available equipment
    #[arg(long)]
    pub equipment: Option<String>,

    /// Preferred kind of workout, e.g. circuit or supersets
    #[arg(long)]
    pub workout_type: Option<String>,

    /// Body area to emphasize
    #[arg(long)]
    pub focus_area: Option<String>,

    /// Mail the routine to this address once generated
    #[arg(short, long)]
    pub email: Option<String>,
}

impl From<&GenerateArgs> for PlanRequestBuilder {
    fn from(val: &GenerateArgs) -> Self {
        PlanRequest::builder()
            .goal(val.goal.into())
            .training_years(val.training_years)
            .duration_minutes(val.duration)
            .concerns(val.concerns.clone())
            .equipment(val.equipment.clone())
            .workout_type(val.workout_type.clone())
            .focus_area(val.focus_area.clone())
    }
}

#[derive(ClapArgs)]
pub struct DeliverArgs {
    /// Record ID of the routine
    pub id: u64,

    /// Recipient address
    pub email: String,
}

#[derive(ClapArgs)]
pub struct ShowArgs {
    /// Record ID of the routine
    pub id: u64,
}

#[derive(ClapArgs)]
pub struct ListArgs {
    /// Maximum number of routines to list
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: u32,
}

/// Command-line representation of [`Goal`]
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum GoalArg {
    /// Build muscle
    BuildMuscle,
    /// Lose fat
    LoseFat,
    /// Gain strength
    GainStrength,
}

impl From<GoalArg> for Goal {
    fn from(val: GoalArg) -> Self {
        match val {
            GoalArg::BuildMuscle => Goal::BuildMuscle,
            GoalArg::LoseFat => Goal::LoseFat,
            GoalArg::GainStrength => Goal::GainStrength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_args_parse() {
        let args = Args::try_parse_from([
            "routine",
            "generate",
            "--goal",
            "lose-fat",
            "-y",
            "2",
            "-d",
            "30",
            "--equipment",
            "kettlebell",
        ])
        .unwrap();

        let Some(Commands::Generate(generate)) = args.command else {
            panic!("expected generate command");
        };
        let request = PlanRequestBuilder::from(&generate).build().unwrap();
        assert_eq!(request.goal(), Goal::LoseFat);
        assert_eq!(request.duration_minutes(), 30);
        assert_eq!(request.equipment(), Some("kettlebell"));
        assert_eq!(request.concerns(), None);
    }

    #[test]
    fn test_unknown_goal_rejected() {
        assert!(Args::try_parse_from(["routine", "generate", "--goal", "get-swole"]).is_err());
    }
}

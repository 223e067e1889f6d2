//! Markdown `Display` implementations and wrappers for CLI output.
//!
//! Domain types format themselves as markdown; the CLI's terminal renderer
//! turns that into styled output.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

use crate::{
    models::{GeneratedPlan, PlanRecord},
    service::DeliveryReport,
};

/// Formats a `Timestamp` in the system timezone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

impl fmt::Display for PlanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Plan {}", self.id)?;
        writeln!(f)?;
        writeln!(f, "- Generated: {}", LocalDateTime(&self.generated_at))?;
        writeln!(f, "- Thread: {}", self.thread_id)?;
        match &self.email {
            Some(email) => writeln!(f, "- Email: {email}")?,
            None => writeln!(f, "- Email: not attached")?,
        }
        writeln!(f)?;
        writeln!(f, "## Request")?;
        writeln!(f)?;
        writeln!(f, "{}", self.prompt)?;
        writeln!(f)?;
        writeln!(f, "## Routine")?;
        writeln!(f)?;
        writeln!(f, "{}", self.plan_text.trim_end())
    }
}

impl fmt::Display for GeneratedPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generated plan with ID: {}", self.record_id)?;
        writeln!(f)?;
        writeln!(f, "{}", self.plan_text.trim_end())
    }
}

impl fmt::Display for DeliveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.delivered {
            writeln!(f, "✓ Sent plan {} to {}", self.record_id, self.address)
        } else {
            writeln!(
                f,
                "✗ Could not send plan {} to {}; the address was recorded",
                self.record_id, self.address
            )
        }
    }
}

/// Compact listing of stored records, newest first.
pub struct PlanRecords(pub Vec<PlanRecord>);

impl fmt::Display for PlanRecords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No plans found.");
        }
        for record in &self.0 {
            let goal = record
                .prompt
                .lines()
                .next()
                .and_then(|line| line.strip_prefix("- Goal: "))
                .unwrap_or("Unknown goal");
            write!(
                f,
                "- **{}.** {goal} ({})",
                record.id,
                LocalDateTime(&record.generated_at)
            )?;
            match &record.email {
                Some(email) => writeln!(f, " → {email}")?,
                None => writeln!(f)?,
            }
        }
        Ok(())
    }
}

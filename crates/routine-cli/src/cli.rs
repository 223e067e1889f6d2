//! Command handlers. Each one calls the facade and renders the markdown
//! `Display` output of the result.

use anyhow::{bail, Context, Result};
use log::info;
use routine_core::{PlanRecords, PlanRequestBuilder, RoutineService};

use crate::args::{DeliverArgs, GenerateArgs, ListArgs, ShowArgs};
use crate::renderer::TerminalRenderer;

pub struct Cli {
    service: RoutineService,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(service: RoutineService, renderer: TerminalRenderer) -> Self {
        Self { service, renderer }
    }

    pub async fn generate(&self, args: GenerateArgs) -> Result<()> {
        let request = PlanRequestBuilder::from(&args)
            .build()
            .context("Invalid routine request")?;

        info!("Generating routine for goal '{}'", request.goal());
        let plan = self
            .service
            .generate(&request)
            .await
            .context("Failed to generate routine")?;
        self.renderer.render(&plan.to_string())?;

        if let Some(email) = args.email {
            let report = self
                .service
                .deliver(plan.record_id, &email, &plan.plan_text)
                .await
                .context("Failed to deliver routine")?;
            self.renderer.render(&format!("\n{report}"))?;
        }
        Ok(())
    }

    pub async fn deliver(&self, args: DeliverArgs) -> Result<()> {
        let report = self
            .service
            .deliver_stored(args.id, &args.email)
            .await
            .with_context(|| format!("Failed to deliver routine {}", args.id))?;
        self.renderer.render(&report.to_string())
    }

    pub async fn show(&self, args: ShowArgs) -> Result<()> {
        match self
            .service
            .record(args.id)
            .await
            .context("Failed to read routine")?
        {
            Some(record) => self.renderer.render(&record.to_string()),
            None => bail!("Routine with ID {} not found", args.id),
        }
    }

    pub async fn list(&self, args: ListArgs) -> Result<()> {
        let records = self
            .service
            .records(args.limit)
            .await
            .context("Failed to list routines")?;
        self.renderer.render(&PlanRecords(records).to_string())
    }
}

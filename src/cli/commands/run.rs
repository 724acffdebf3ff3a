use anyhow::Result;

use crate::cli::render;
use crate::config::DispenserConfig;
use crate::workflow::WorkflowController;

use super::{follow_run, Command};

pub struct RunCommand {
    pub config: DispenserConfig,
    pub selector: String,
    pub json: bool,
}

impl RunCommand {
    pub fn new(config: DispenserConfig, selector: String) -> Self {
        Self {
            config,
            selector,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

impl Command for RunCommand {
    async fn execute(&self) -> Result<()> {
        let controller = WorkflowController::from_config(&self.config);
        let product = controller.catalog().resolve(&self.selector)?;

        controller.select_identifier(product).await;
        controller.approve().await;
        if !self.json {
            for line in render::status_lines(&controller.snapshot().await) {
                println!("{line}");
            }
        }

        controller.start_dispensing().await;
        let last = follow_run(&controller, self.json).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&last)?);
        } else if let Some(message) = &last.completion_message {
            println!();
            println!("✅ {message}");
        } else {
            println!("⚠️  Dispensing stopped before reaching the tolerance band");
        }

        controller.shutdown().await;
        Ok(())
    }
}

use anyhow::Result;

use crate::cli::render;
use crate::config::DispenserConfig;
use crate::workflow::WorkflowController;

use super::Command;

pub struct CatalogCommand {
    pub config: DispenserConfig,
    pub json: bool,
}

impl CatalogCommand {
    pub fn new(config: DispenserConfig) -> Self {
        Self {
            config,
            json: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

impl Command for CatalogCommand {
    async fn execute(&self) -> Result<()> {
        let controller = WorkflowController::from_config(&self.config);
        let catalog = controller.catalog();

        if self.json {
            println!("{}", serde_json::to_string_pretty(catalog)?);
            return Ok(());
        }

        println!("📋 AVAILABLE NDCs");
        println!("=================");
        for line in render::catalog_lines(catalog) {
            println!("{line}");
        }
        Ok(())
    }
}

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::render;
use crate::config::DispenserConfig;
use crate::workflow::WorkflowController;

use super::{follow_run, Command};

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Catalog,
    Select(String),
    Approve,
    Dispense,
    Status,
    Help,
    Quit,
    Unknown(String),
}

impl ShellInput {
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next()?.to_ascii_lowercase();
        let argument = parts.next();
        let input = match (verb.as_str(), argument) {
            ("catalog" | "list", _) => ShellInput::Catalog,
            ("select", Some(selector)) => ShellInput::Select(selector.to_string()),
            ("approve", _) => ShellInput::Approve,
            ("dispense" | "start", _) => ShellInput::Dispense,
            ("status", _) => ShellInput::Status,
            ("help" | "?", _) => ShellInput::Help,
            ("quit" | "exit", _) => ShellInput::Quit,
            _ => ShellInput::Unknown(line.trim().to_string()),
        };
        Some(input)
    }
}

pub struct ShellCommand {
    pub config: DispenserConfig,
}

impl ShellCommand {
    pub fn new(config: DispenserConfig) -> Self {
        Self { config }
    }

    fn print_help() {
        println!("Commands:");
        println!("  catalog          list selectable NDCs");
        println!("  select <n|ndc>   select an NDC by index or identifier");
        println!("  approve          approve and generate the required weight");
        println!("  dispense         start dispensing and follow progress");
        println!("  status           show the current state");
        println!("  quit             leave the shell");
    }

    async fn print_status(controller: &WorkflowController) {
        for line in render::status_lines(&controller.snapshot().await) {
            println!("{line}");
        }
    }

    async fn handle(&self, controller: &WorkflowController, input: ShellInput) -> Result<bool> {
        match input {
            ShellInput::Catalog => {
                for line in render::catalog_lines(controller.catalog()) {
                    println!("{line}");
                }
            }
            ShellInput::Select(selector) => match controller.catalog().resolve(&selector) {
                Ok(product) => {
                    controller.select_identifier(product).await;
                    Self::print_status(controller).await;
                }
                Err(e) => println!("❌ {e}"),
            },
            ShellInput::Approve => {
                if controller.approve().await {
                    Self::print_status(controller).await;
                } else {
                    println!("⚠️  Nothing to approve (select an NDC first, or it is already approved)");
                }
            }
            ShellInput::Dispense => {
                if controller.start_dispensing().await {
                    let last = follow_run(controller, false).await?;
                    if let Some(message) = last.completion_message {
                        println!("✅ {message}");
                    }
                } else {
                    println!("⚠️  Dispensing is not available right now");
                }
            }
            ShellInput::Status => Self::print_status(controller).await,
            ShellInput::Help => Self::print_help(),
            ShellInput::Quit => return Ok(false),
            ShellInput::Unknown(line) => println!("❓ Unknown command: {line} (try 'help')"),
        }
        Ok(true)
    }
}

impl Command for ShellCommand {
    async fn execute(&self) -> Result<()> {
        let controller = WorkflowController::from_config(&self.config);
        println!("⚗️  Powder dispenser shell (session {})", controller.session_id());
        Self::print_help();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let Some(input) = ShellInput::parse(&line) else {
                continue;
            };
            if !self.handle(&controller, input).await? {
                break;
            }
        }

        controller.shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shell_input() {
        assert_eq!(ShellInput::parse("   "), None);
        assert_eq!(ShellInput::parse("catalog"), Some(ShellInput::Catalog));
        assert_eq!(
            ShellInput::parse("select 3"),
            Some(ShellInput::Select("3".to_string()))
        );
        assert_eq!(
            ShellInput::parse("SELECT 12345-6789-01"),
            Some(ShellInput::Select("12345-6789-01".to_string()))
        );
        assert_eq!(ShellInput::parse("approve"), Some(ShellInput::Approve));
        assert_eq!(ShellInput::parse("start"), Some(ShellInput::Dispense));
        assert_eq!(ShellInput::parse("exit"), Some(ShellInput::Quit));
        assert_eq!(
            ShellInput::parse("select"),
            Some(ShellInput::Unknown("select".to_string()))
        );
    }
}

use anyhow::Result;
use std::path::PathBuf;

use crate::config::DispenserConfig;

use super::Command;

pub struct ShowConfigCommand {
    pub config: DispenserConfig,
    pub write: Option<PathBuf>,
}

impl ShowConfigCommand {
    pub fn new(config: DispenserConfig) -> Self {
        Self {
            config,
            write: None,
        }
    }

    pub fn with_write(mut self, write: Option<PathBuf>) -> Self {
        self.write = write;
        self
    }
}

impl Command for ShowConfigCommand {
    async fn execute(&self) -> Result<()> {
        match &self.write {
            Some(path) => {
                self.config.save_to_file(path)?;
                tracing::info!(path = %path.display(), "Configuration written");
                println!("✅ Configuration written to {}", path.display());
            }
            None => print!("{}", self.config.to_toml()?),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_saves_loadable_toml() {
        let path = std::env::temp_dir().join(format!(
            "powder-dispenser-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let mut config = DispenserConfig::default();
        config.catalog.seed = Some(99);
        config.dispensing.tick_interval_ms = 250;

        ShowConfigCommand::new(config.clone())
            .with_write(Some(path.clone()))
            .execute()
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let loaded: DispenserConfig = toml::from_str(&written).unwrap();
        assert_eq!(loaded.catalog.seed, Some(99));
        assert_eq!(loaded, config);
    }
}

use clap::Parser;
use prs_types::{SettingKey, config::BackendConfig};

use crate::commands::Executor;

/// Prints effective review settings (defaults overridden by arguments and environment).
#[derive(Parser, Debug)]
pub struct SettingsCmd {
    #[command(flatten)]
    backend: BackendConfig,
}

impl Executor for SettingsCmd {
    async fn run(self) -> anyhow::Result<()> {
        let settings = self.backend.settings();
        for key in SettingKey::ALL {
            println!("{key} = {}", settings.get(key));
        }
        Ok(())
    }
}

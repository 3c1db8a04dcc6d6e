use clap::{Parser, Subcommand};

use crate::commands::{
    destroy::DestroyCmd,
    moderate::{ApproveCmd, UnapproveCmd},
    pending::PendingCmd,
    recalculate::RecalculateCmd,
    settings::SettingsCmd,
};

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for prs - moderation of product reviews and maintenance of product ratings."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Approve(ApproveCmd),
    Unapprove(UnapproveCmd),
    Destroy(DestroyCmd),
    Pending(PendingCmd),
    Recalculate(RecalculateCmd),
    Settings(SettingsCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Approve(cmd) => cmd.run().await,
            Command::Unapprove(cmd) => cmd.run().await,
            Command::Destroy(cmd) => cmd.run().await,
            Command::Pending(cmd) => cmd.run().await,
            Command::Recalculate(cmd) => cmd.run().await,
            Command::Settings(cmd) => cmd.run().await,
        }
    }
}

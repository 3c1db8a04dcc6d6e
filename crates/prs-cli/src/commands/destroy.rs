use clap::Parser;
use prs_dal::review::ReviewRepository;
use prs_types::config::BackendConfig;

use crate::commands::{Executor, open_pool};

#[derive(Parser, Debug)]
pub struct DestroyCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(required = true, help = "Ids of reviews to delete, with their feedback")]
    ids: Vec<i64>,
}

impl Executor for DestroyCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_pool(&self.backend).await?;
        let repository = ReviewRepository::new(pool, self.backend.settings());
        for id in self.ids {
            repository.destroy(id).await?;
            println!("Deleted review {id}");
        }
        Ok(())
    }
}

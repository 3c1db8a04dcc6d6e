use clap::Parser;
use prs_dal::review::ReviewRepository;
use prs_types::config::BackendConfig;

use crate::commands::{Executor, open_pool};

#[derive(Parser, Debug)]
pub struct ApproveCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(required = true, help = "Ids of reviews to approve")]
    ids: Vec<i64>,
}

impl ApproveCmd {
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}

#[derive(Parser, Debug)]
pub struct UnapproveCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(required = true, help = "Ids of reviews to return to moderation")]
    ids: Vec<i64>,
}

async fn set_approval(backend: &BackendConfig, ids: &[i64], approved: bool) -> anyhow::Result<()> {
    let pool = open_pool(backend).await?;
    let repository = ReviewRepository::new(pool, backend.settings());
    for id in ids {
        let review = if approved {
            repository.approve(*id).await?
        } else {
            repository.unapprove(*id).await?
        };
        println!(
            "Review {} of product {} is {}",
            review.id,
            review.product_id,
            if review.approved { "approved" } else { "not approved" }
        );
    }
    Ok(())
}

impl Executor for ApproveCmd {
    async fn run(self) -> anyhow::Result<()> {
        set_approval(&self.backend, &self.ids, true).await
    }
}

impl Executor for UnapproveCmd {
    async fn run(self) -> anyhow::Result<()> {
        set_approval(&self.backend, &self.ids, false).await
    }
}

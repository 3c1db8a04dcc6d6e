use clap::Parser;
use prs_dal::{
    ListingParams,
    review::{ReviewRepository, ReviewScope},
};
use prs_types::config::BackendConfig;

use crate::commands::{Executor, open_pool};

#[derive(Parser, Debug)]
pub struct PendingCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(long, help = "Only reviews of this product")]
    product_id: Option<i64>,
    #[arg(long, default_value_t = 100, help = "Maximum number of reviews listed")]
    limit: i64,
}

impl Executor for PendingCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_pool(&self.backend).await?;
        let repository = ReviewRepository::new(pool, self.backend.settings());
        let params = ListingParams::new(0, self.limit);
        let reviews = match self.product_id {
            Some(product_id) => {
                repository
                    .list_for_product(product_id, ReviewScope::NotApproved, params)
                    .await?
            }
            None => repository.not_approved(params).await?,
        };
        for review in reviews {
            println!("{}", serde_json::to_string(&review)?);
        }
        Ok(())
    }
}

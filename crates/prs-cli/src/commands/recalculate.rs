use clap::{ArgGroup, Args, Parser};
use prs_dal::product::ProductRepository;
use prs_types::config::BackendConfig;
use tracing::info;

use crate::commands::{Executor, open_pool};

#[derive(Parser, Debug)]
pub struct RecalculateCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[command(flatten)]
    selection: ProductSelection,
}

#[derive(Args, Debug)]
#[command(
    group(
        ArgGroup::new("selection")
            .required(true)
            .args(["product_id", "all"])
    )
)]
pub struct ProductSelection {
    #[arg(long, help = "Recalculate rating of this product")]
    product_id: Option<i64>,
    #[arg(long, help = "Recalculate ratings of all products")]
    all: bool,
}

impl Executor for RecalculateCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_pool(&self.backend).await?;
        let repository = ProductRepository::new(pool);
        let ids = match self.selection.product_id {
            Some(id) => vec![id],
            None => repository.list_ids().await?,
        };
        info!("Recalculating rating of {} products", ids.len());
        for id in ids {
            let product = repository.recalculate_rating(id).await?;
            println!(
                "Product {}: average {:.2} ({} stars) from {} approved reviews",
                product.id,
                product.avg_rating,
                product.stars(),
                product.reviews_count
            );
        }
        Ok(())
    }
}

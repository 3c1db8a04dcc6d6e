pub mod destroy;
pub mod moderate;
pub mod pending;
pub mod recalculate;
pub mod settings;

use prs_dal::Pool;
use prs_types::config::BackendConfig;
use tracing::debug;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self) -> anyhow::Result<()>;
}

pub(crate) async fn open_pool(backend: &BackendConfig) -> anyhow::Result<Pool> {
    backend.ensure_data_dir()?;
    let db_url = backend.database_url();
    debug!("Opening database {db_url}");
    let pool = prs_dal::new_pool(&db_url).await?;
    prs_dal::migrate(&pool).await?;
    Ok(pool)
}

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::data::kv_store::KvStore;
use crate::data::stores::file::FileKvStore;
use crate::data::stores::memory::MemoryKvStore;
use crate::data::stores::postgres::PostgresKvStore;
use crate::infrastructure::database::{create_pool, run_migrations};
use crate::infrastructure::settings::{Settings, StoreBackend};

pub(crate) async fn build_kv_store(settings: &Settings) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match settings.store_backend {
        StoreBackend::Memory => {
            info!(quota = ?settings.store_quota_bytes, "using in-memory post store");
            match settings.store_quota_bytes {
                Some(quota) => Arc::new(MemoryKvStore::with_quota(quota)),
                None => Arc::new(MemoryKvStore::new()),
            }
        }
        StoreBackend::File => {
            info!(dir = %settings.store_dir.display(), "using file post store");
            Arc::new(FileKvStore::new(settings.store_dir.clone()))
        }
        StoreBackend::Postgres => {
            let database_url = settings
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let pool = create_pool(database_url).await?;
            run_migrations(&pool).await?;
            info!("using postgres post store");
            Arc::new(PostgresKvStore::new(pool))
        }
    };
    Ok(store)
}

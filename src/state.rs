use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::domain::expiry::{Clock, SystemClock};
use crate::services::{
    AuthService, CategoryService, ItemService, SeaOrmAuthService, SeaOrmCategoryService,
    SeaOrmItemService, SeaOrmVaultService, VaultService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub clock: Arc<dyn Clock>,

    pub auth_service: Arc<dyn AuthService>,

    pub vault_service: Arc<dyn VaultService>,

    pub item_service: Arc<dyn ItemService>,

    pub category_service: Arc<dyn CategoryService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Build the state with an explicit date source.
    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::from_store(store, config, clock))
    }

    #[must_use]
    pub fn from_store(store: Store, config: Config, clock: Arc<dyn Clock>) -> Self {
        let config = Arc::new(RwLock::new(config));

        let auth_service =
            Arc::new(SeaOrmAuthService::new(store.clone(), config.clone())) as Arc<dyn AuthService>;

        let vault_service = Arc::new(SeaOrmVaultService::new(
            store.clone(),
            config.clone(),
            clock.clone(),
        )) as Arc<dyn VaultService>;

        let item_service = Arc::new(SeaOrmItemService::new(
            store.clone(),
            config.clone(),
            clock.clone(),
        )) as Arc<dyn ItemService>;

        let category_service =
            Arc::new(SeaOrmCategoryService::new(store.clone())) as Arc<dyn CategoryService>;

        Self {
            config,
            store,
            clock,
            auth_service,
            vault_service,
            item_service,
            category_service,
        }
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}

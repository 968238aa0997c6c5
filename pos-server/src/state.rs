//! Shared application state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::DbService;
use crate::error::BoxError;
use crate::payment::KPayGateway;
use crate::printing::ReceiptRenderer;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub gateway: Arc<KPayGateway>,
    pub renderer: Arc<ReceiptRenderer>,
}

impl AppState {
    /// Open the database and build the collaborators from config
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let db = DbService::new(&config.database_path).await?;
        let gateway = KPayGateway::new(config.gateway_config())?;
        Ok(Self::from_parts(db.pool, config.clone(), gateway))
    }

    pub fn from_parts(pool: SqlitePool, config: Config, gateway: KPayGateway) -> Self {
        let renderer = ReceiptRenderer::new(config.receipt_width, config.store_name.clone());
        Self {
            pool,
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            renderer: Arc::new(renderer),
        }
    }
}

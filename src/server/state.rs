//! Server state shared across handlers.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::assets::{AssetLoader, Assets, load_assets};
use crate::config::ReelprintConfig;

/// Application state shared across handlers.
pub struct AppState {
    pub config: ReelprintConfig,
    pub loader: Arc<dyn AssetLoader>,
}

impl AppState {
    pub fn new(config: ReelprintConfig, loader: Arc<dyn AssetLoader>) -> Self {
        Self { config, loader }
    }

    /// Fetch the mill's images for one request.
    pub async fn assets(&self) -> Assets {
        load_assets(self.loader.as_ref(), &self.config.mill).await
    }

    /// Date printed when a record carries none.
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

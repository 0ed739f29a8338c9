use std::sync::Arc;

use crate::directory::UserDirectory;
use crate::observability::metrics::Metrics;
use crate::service::lifecycle::LifecycleService;
use crate::service::listing::ListingEngine;
use crate::store::DeliveryStore;

pub struct AppState {
    pub lifecycle: LifecycleService,
    pub listing: ListingEngine,
    pub directory: Arc<dyn UserDirectory>,
    pub metrics: Metrics,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DeliveryStore>,
        directory: Arc<dyn UserDirectory>,
        default_page_size: usize,
        max_page_size: usize,
    ) -> Self {
        Self {
            lifecycle: LifecycleService::new(store.clone()),
            listing: ListingEngine::new(store),
            directory,
            metrics: Metrics::new(),
            default_page_size,
            max_page_size,
        }
    }
}

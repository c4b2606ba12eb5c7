use std::sync::Arc;
use crate::catalog::domain::CatalogStore;
use crate::core::domain::Configuration;
use crate::reading::domain::ReadingService;
use crate::reading::domain::service::ReadingServiceImpl;

pub fn create_reading_service(config: &Configuration, catalog_store: Arc<dyn CatalogStore>) -> Box<dyn ReadingService> {
    Box::new(ReadingServiceImpl::new(config, catalog_store))
}

use std::sync::Arc;
use tracing::info;
use crate::books::factory;
use crate::catalog::domain::{AdministrativeService, CatalogStore};
use crate::catalog::domain::service::AdministrativeServiceImpl;
use crate::catalog::domain::store::CatalogStoreImpl;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;

// Builds a catalog store over its own repositories. Services sharing a catalog must share
// the returned handle.
pub async fn create_catalog_store(config: &Configuration, store: RepositoryStore) -> Arc<dyn CatalogStore> {
    let (books, resolver) = factory::create_catalog_repositories(config, store).await.into_parts();
    info!("catalog store for {} backed by {:?} (dynamodb={})", config.branch_id, store, store.is_dynamodb());
    Arc::new(CatalogStoreImpl::new(books, resolver))
}

pub fn create_administrative_service(config: &Configuration,
                                     catalog_store: Arc<dyn CatalogStore>) -> Box<dyn AdministrativeService> {
    Box::new(AdministrativeServiceImpl::new(config, catalog_store))
}

#[cfg(test)]
mod tests {
    use crate::catalog::factory::{create_administrative_service, create_catalog_store};
    use crate::core::domain::Configuration;
    use crate::core::library::Permission;
    use crate::core::repository::RepositoryStore;
    use crate::users::domain::User;

    #[tokio::test]
    async fn test_should_isolate_memory_catalogs() {
        let config = Configuration::new("test");
        let admin = User::new("admin", &[Permission::AddBook]);
        let first = create_catalog_store(&config, RepositoryStore::Memory).await;
        let second = create_catalog_store(&config, RepositoryStore::Memory).await;
        let svc = create_administrative_service(&config, first.clone());
        let names = vec!["Eric Evans".to_string()];
        let _ = svc.add_book(Some(&admin), Some("Domain Driven Design"), Some(names.as_slice()), Some("Addison"))
            .await.expect("should add book");
        assert!(first.find_by_name("Domain Driven Design").await.expect("should query").is_some());
        assert!(second.find_by_name("Domain Driven Design").await.expect("should query").is_none());
    }
}

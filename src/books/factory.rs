use aws_sdk_dynamodb::Client;
use crate::books::repository::ddb_book_repository::DDBBookRepository;
use crate::books::repository::ddb_reference_repository::DDBReferenceRepository;
use crate::books::repository::memory_repository::{MemoryBookRepository, MemoryReferenceRepository};
use crate::books::repository::{BookRepository, ReferenceRepository};
use crate::books::resolver::ReferenceResolver;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::utils::ddb::{build_db_client, create_catalog_tables};

// Repositories of one catalog, sharing a single store handle.
pub struct CatalogRepositories {
    pub books: Box<dyn BookRepository>,
    pub authors: Box<dyn ReferenceRepository>,
    pub publishers: Box<dyn ReferenceRepository>,
}

impl CatalogRepositories {
    pub fn into_parts(self) -> (Box<dyn BookRepository>, ReferenceResolver) {
        (self.books, ReferenceResolver::new(self.authors, self.publishers))
    }
}

pub async fn create_catalog_repositories(config: &Configuration, store: RepositoryStore) -> CatalogRepositories {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(config, store).await;
            ddb_repositories(config, client)
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(config, store).await;
            create_catalog_tables(&client, config).await;
            ddb_repositories(config, client)
        }
        RepositoryStore::Memory => {
            CatalogRepositories {
                books: Box::new(MemoryBookRepository::new()),
                authors: Box::new(MemoryReferenceRepository::new("author")),
                publishers: Box::new(MemoryReferenceRepository::new("publisher")),
            }
        }
    }
}

fn ddb_repositories(config: &Configuration, client: Client) -> CatalogRepositories {
    let counters = config.counters_table.as_str();
    CatalogRepositories {
        books: Box::new(DDBBookRepository::new(client.clone(), config.books_table.as_str(), counters)),
        authors: Box::new(DDBReferenceRepository::new(client.clone(), config.authors_table.as_str(), counters)),
        publishers: Box::new(DDBReferenceRepository::new(client, config.publishers_table.as_str(), counters)),
    }
}

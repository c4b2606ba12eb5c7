use tracing::debug;
use crate::books::domain::model::ReferenceEntity;
use crate::books::domain::{Author, Publisher};
use crate::books::repository::ReferenceRepository;
use crate::core::library::{LibraryError, LibraryResult};

// Find-or-create of author and publisher rows, one row per name ignoring case.
pub struct ReferenceResolver {
    authors: Box<dyn ReferenceRepository>,
    publishers: Box<dyn ReferenceRepository>,
}

impl ReferenceResolver {
    pub fn new(authors: Box<dyn ReferenceRepository>, publishers: Box<dyn ReferenceRepository>) -> Self {
        Self {
            authors,
            publishers,
        }
    }

    pub async fn resolve_author(&self, name: &str) -> LibraryResult<Author> {
        let entity = find_or_create(self.authors.as_ref(), name).await?;
        Author::rehydrate(entity.ref_id, entity.name.as_str())
    }

    pub async fn resolve_author_id(&self, name: &str) -> LibraryResult<i64> {
        find_or_create(self.authors.as_ref(), name).await.map(|e| e.ref_id)
    }

    pub async fn resolve_publisher(&self, name: &str) -> LibraryResult<Publisher> {
        let entity = find_or_create(self.publishers.as_ref(), name).await?;
        Publisher::rehydrate(entity.ref_id, entity.name.as_str())
    }

    pub async fn resolve_publisher_id(&self, name: &str) -> LibraryResult<i64> {
        find_or_create(self.publishers.as_ref(), name).await.map(|e| e.ref_id)
    }

    pub async fn find_author(&self, id: i64) -> LibraryResult<Author> {
        let entity = self.authors.get(id).await?;
        Author::rehydrate(entity.ref_id, entity.name.as_str())
    }

    pub async fn find_publisher(&self, id: i64) -> LibraryResult<Publisher> {
        let entity = self.publishers.get(id).await?;
        Publisher::rehydrate(entity.ref_id, entity.name.as_str())
    }
}

async fn find_or_create(repo: &dyn ReferenceRepository, name: &str) -> LibraryResult<ReferenceEntity> {
    if let Some(existing) = repo.find_by_name(name).await? {
        debug!("resolved {} to existing id {}", name, existing.ref_id);
        return Ok(existing);
    }
    match repo.create(name).await {
        Ok(created) => {
            debug!("created id {} for {}", created.ref_id, name);
            Ok(created)
        }
        Err(LibraryError::DuplicateKey { .. }) => {
            repo.find_by_name(name).await?.ok_or_else(|| LibraryError::not_found(
                format!("{} vanished after duplicate insert", name).as_str()))
        }
        Err(err) => Err(err),
    }
}

use async_trait::async_trait;
use tracing::{debug, info};
use crate::books::domain::model::BookEntity;
use crate::books::domain::{Author, Book, Publisher};
use crate::books::repository::BookRepository;
use crate::books::resolver::ReferenceResolver;
use crate::catalog::domain::CatalogStore;
use crate::core::domain::Identifiable;
use crate::core::library::{BookStatus, LibraryResult};

// Translates books to rows, resolving author and publisher ids in author order on writes.
pub(crate) struct CatalogStoreImpl {
    book_repository: Box<dyn BookRepository>,
    resolver: ReferenceResolver,
}

impl CatalogStoreImpl {
    pub(crate) fn new(book_repository: Box<dyn BookRepository>, resolver: ReferenceResolver) -> Self {
        Self {
            book_repository,
            resolver,
        }
    }

    async fn resolve_authors(&self, book: &Book) -> LibraryResult<Vec<Author>> {
        let mut authors = Vec::with_capacity(book.authors().len());
        for author in book.authors() {
            authors.push(self.resolver.resolve_author(author.name()).await?);
        }
        Ok(authors)
    }

    async fn resolve_publisher(&self, book: &Book) -> LibraryResult<Publisher> {
        self.resolver.resolve_publisher(book.publisher().name()).await
    }

    async fn build_book(&self, entity: &BookEntity) -> LibraryResult<Book> {
        let mut authors = Vec::with_capacity(entity.author_ids.len());
        for author_id in &entity.author_ids {
            authors.push(self.resolver.find_author(*author_id).await?);
        }
        let publisher = self.resolver.find_publisher(entity.publisher_id).await?;
        Book::rehydrate(entity.book_id, entity.name.as_str(), authors, publisher,
                        BookStatus::from(entity.book_status.clone()))
    }
}

fn reference_ids<T: Identifiable>(references: &[T]) -> Vec<i64> {
    references.iter().filter_map(|r| r.id()).collect()
}

#[async_trait]
impl CatalogStore for CatalogStoreImpl {
    async fn save(&self, book: &Book) -> LibraryResult<Book> {
        let authors = self.resolve_authors(book).await?;
        let publisher = self.resolve_publisher(book).await?;
        let publisher_id = publisher.id().unwrap_or_default();
        let book_id = self.book_repository.create(book.name(), reference_ids(authors.as_slice()).as_slice(),
                                                  publisher_id, book.status().to_string().as_str()).await?;
        info!("saved book {} as {}", book.name(), book_id);
        Book::rehydrate(book_id, book.name(), authors, publisher, book.status())
    }

    async fn update(&self, book: &Book) -> LibraryResult<bool> {
        let book_id = match book.id() {
            Some(id) => id,
            None => return Ok(false),
        };
        let authors = self.resolve_authors(book).await?;
        let publisher = self.resolve_publisher(book).await?;
        let entity = BookEntity::new(book_id, book.name(), reference_ids(authors.as_slice()),
                                     publisher.id().unwrap_or_default(), book.status().to_string().as_str());
        let size = self.book_repository.update(&entity).await?;
        info!("updated book {} to {} affecting {} rows", book_id, book.status(), size);
        Ok(size == 1)
    }

    async fn delete(&self, book: &Book) -> LibraryResult<bool> {
        let book_id = match book.id() {
            Some(id) => id,
            None => return Ok(false),
        };
        let size = self.book_repository.delete(book_id).await?;
        info!("deleted book {} affecting {} rows", book_id, size);
        Ok(size == 1)
    }

    async fn find_by_name(&self, name: &str) -> LibraryResult<Option<Book>> {
        debug!("finding book named {}", name);
        match self.book_repository.find_by_name(name).await? {
            Some(entity) => Ok(Some(self.build_book(&entity).await?)),
            None => Ok(None),
        }
    }

    async fn find_books_by_name(&self, fragment: &str) -> LibraryResult<Vec<Book>> {
        let entities = self.book_repository.find_by_name_fragment(fragment).await?;
        debug!("found {} books matching {}", entities.len(), fragment);
        let mut books = Vec::with_capacity(entities.len());
        for entity in &entities {
            books.push(self.build_book(entity).await?);
        }
        Ok(books)
    }
}

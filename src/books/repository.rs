pub mod ddb_book_repository;
pub mod ddb_reference_repository;
pub mod memory_repository;

use async_trait::async_trait;
use crate::books::domain::model::{BookEntity, ReferenceEntity};
use crate::core::library::LibraryResult;

#[async_trait]
pub trait BookRepository: Sync + Send {
    // inserts a book row and returns the generated book id
    async fn create(&self, name: &str, author_ids: &[i64],
                    publisher_id: i64, book_status: &str) -> LibraryResult<i64>;

    // updates the row with the same book_id, returns number of affected rows
    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize>;

    // deletes the row, returns number of affected rows
    async fn delete(&self, id: i64) -> LibraryResult<usize>;

    // case-insensitive exact match on name, first match if several
    async fn find_by_name(&self, name: &str) -> LibraryResult<Option<BookEntity>>;

    // case-insensitive literal substring match on name
    async fn find_by_name_fragment(&self, fragment: &str) -> LibraryResult<Vec<BookEntity>>;
}

// Storage of author or publisher rows. Names are unique ignoring case: `create` fails with
// `LibraryError::DuplicateKey` when a row with the same lower-cased name already exists.
#[async_trait]
pub trait ReferenceRepository: Sync + Send {
    async fn create(&self, name: &str) -> LibraryResult<ReferenceEntity>;

    async fn get(&self, id: i64) -> LibraryResult<ReferenceEntity>;

    async fn find_by_name(&self, name: &str) -> LibraryResult<Option<ReferenceEntity>>;
}

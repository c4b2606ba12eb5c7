pub mod service;
pub mod store;

use async_trait::async_trait;
use crate::books::domain::Book;
use crate::core::library::LibraryResult;
use crate::users::domain::User;

// CatalogStore persists Book aggregates, translating authors and publishers to stored ids.
#[async_trait]
pub trait CatalogStore: Sync + Send {
    // inserts the book and returns it with generated id and resolved references; author and
    // publisher names are the stored ones, which may differ in case from the input
    async fn save(&self, book: &Book) -> LibraryResult<Book>;
    async fn update(&self, book: &Book) -> LibraryResult<bool>;
    async fn delete(&self, book: &Book) -> LibraryResult<bool>;
    async fn find_by_name(&self, name: &str) -> LibraryResult<Option<Book>>;
    async fn find_books_by_name(&self, fragment: &str) -> LibraryResult<Vec<Book>>;
}

#[async_trait]
pub trait AdministrativeService: Sync + Send {
    async fn add_book(&self, user: Option<&User>, name: Option<&str>,
                      author_names: Option<&[String]>, publisher_name: Option<&str>) -> LibraryResult<Book>;
    async fn remove_book(&self, user: Option<&User>, book: Option<&Book>) -> LibraryResult<bool>;
}

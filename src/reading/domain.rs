pub mod service;

use async_trait::async_trait;
use crate::books::domain::Book;
use crate::core::library::LibraryResult;
use crate::users::domain::User;

// ReadingService lends books to users and takes them back. The caller's book reflects the
// new status only once the store has recorded it.
#[async_trait]
pub trait ReadingService: Sync + Send {
    async fn borrow_book(&self, user: Option<&User>, book: &mut Book) -> LibraryResult<bool>;
    async fn return_book(&self, user: Option<&User>, book: &mut Book) -> LibraryResult<bool>;
}

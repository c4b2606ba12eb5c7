use std::sync::Arc;
use async_trait::async_trait;
use tracing::{info, warn};
use crate::books::domain::Book;
use crate::catalog::domain::CatalogStore;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryResult, Permission};
use crate::reading::domain::ReadingService;
use crate::users::domain::{authorize, User};

const NOT_AUTHORIZED: &str = "User not authorized for this operation";

pub(crate) struct ReadingServiceImpl {
    branch_id: String,
    catalog_store: Arc<dyn CatalogStore>,
}

impl ReadingServiceImpl {
    pub(crate) fn new(config: &Configuration, catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            catalog_store,
        }
    }

    async fn transition(&self, user: Option<&User>, permission: Permission, book: &mut Book,
                        apply: fn(&mut Book) -> LibraryResult<()>) -> LibraryResult<bool> {
        let user = authorize(user, permission, NOT_AUTHORIZED).map_err(|err| {
            warn!("{} rejected in {}: {}", permission, self.branch_id, err);
            err
        })?;
        let mut changed = book.clone();
        apply(&mut changed)?;
        let updated = self.catalog_store.update(&changed).await?;
        if updated {
            *book = changed;
        }
        info!("{} by {} on {} in {}: {}", permission, user.username, book, self.branch_id, updated);
        Ok(updated)
    }
}

#[async_trait]
impl ReadingService for ReadingServiceImpl {
    async fn borrow_book(&self, user: Option<&User>, book: &mut Book) -> LibraryResult<bool> {
        self.transition(user, Permission::BorrowBook, book, Book::issue).await
    }

    async fn return_book(&self, user: Option<&User>, book: &mut Book) -> LibraryResult<bool> {
        self.transition(user, Permission::ReturnBook, book, Book::returned).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::books::domain::{Author, Book, Publisher};
    use crate::books::repository::memory_repository::{FailingBookRepository, MemoryReferenceRepository};
    use crate::books::resolver::ReferenceResolver;
    use crate::catalog::domain::CatalogStore;
    use crate::catalog::domain::store::CatalogStoreImpl;
    use crate::catalog::factory::create_catalog_store;
    use crate::core::domain::Configuration;
    use crate::core::library::{BookStatus, LibraryError, Permission};
    use crate::core::repository::RepositoryStore;
    use crate::reading::domain::ReadingService;
    use crate::reading::domain::service::ReadingServiceImpl;
    use crate::reading::factory::create_reading_service;
    use crate::users::domain::User;

    async fn build_service() -> (Box<dyn ReadingService>, Arc<dyn CatalogStore>) {
        let config = Configuration::new("test");
        let store = create_catalog_store(&config, RepositoryStore::Memory).await;
        (create_reading_service(&config, store.clone()), store)
    }

    fn reader() -> User {
        User::new("reader", &[Permission::BorrowBook, Permission::ReturnBook])
    }

    fn unsaved_book() -> Book {
        Book::new("Patterns of Enterprise Application Architecture",
                  vec![Author::new("Martin Fowler").expect("author")],
                  Publisher::new("Addison-Wesly").expect("publisher")).expect("should build book")
    }

    async fn stored_status(store: &Arc<dyn CatalogStore>) -> BookStatus {
        store.find_by_name("Patterns of Enterprise Application Architecture").await
            .expect("should query").expect("should find book").status()
    }

    #[tokio::test]
    async fn test_should_borrow_and_return_book() {
        let (svc, store) = build_service().await;
        let mut book = store.save(&unsaved_book()).await.expect("should save book");

        assert!(svc.borrow_book(Some(&reader()), &mut book).await.expect("should borrow"));
        assert_eq!(BookStatus::Issued, book.status());
        assert_eq!(BookStatus::Issued, stored_status(&store).await);

        assert!(svc.return_book(Some(&reader()), &mut book).await.expect("should return"));
        assert!(book.is_available());
        assert_eq!(BookStatus::Available, stored_status(&store).await);
    }

    #[tokio::test]
    async fn test_should_reject_borrowing_issued_book() {
        let (svc, store) = build_service().await;
        let mut book = store.save(&unsaved_book()).await.expect("should save book");
        assert!(svc.borrow_book(Some(&reader()), &mut book).await.expect("should borrow"));
        let err = svc.borrow_book(Some(&reader()), &mut book).await.expect_err("should not borrow twice");
        assert_eq!(LibraryError::illegal_state("Book is not available"), err);
        assert_eq!(BookStatus::Issued, book.status());
    }

    #[tokio::test]
    async fn test_should_reject_returning_available_book() {
        let (svc, store) = build_service().await;
        let mut book = store.save(&unsaved_book()).await.expect("should save book");
        let err = svc.return_book(Some(&reader()), &mut book).await.expect_err("should not return");
        assert_eq!(LibraryError::illegal_state("Already available"), err);
        assert_eq!(BookStatus::Available, stored_status(&store).await);
    }

    #[tokio::test]
    async fn test_should_reject_unauthorized_or_null_user() {
        let (svc, store) = build_service().await;
        let mut book = store.save(&unsaved_book()).await.expect("should save book");
        let returner = User::new("returner", &[Permission::ReturnBook]);
        let err = svc.borrow_book(Some(&returner), &mut book).await.expect_err("should reject user");
        assert!(matches!(err, LibraryError::AccessDenied { .. }));
        assert_eq!("User not authorized for this operation", err.message());
        let err = svc.borrow_book(None, &mut book).await.expect_err("should reject user");
        assert_eq!("Null User Found", err.message());
        assert!(book.is_available());

        assert!(svc.borrow_book(Some(&reader()), &mut book).await.expect("should borrow"));
        let borrower = User::new("borrower", &[Permission::BorrowBook]);
        let err = svc.return_book(Some(&borrower), &mut book).await.expect_err("should reject user");
        assert_eq!("User not authorized for this operation", err.message());
        assert_eq!(BookStatus::Issued, book.status());
    }

    #[tokio::test]
    async fn test_should_keep_status_when_no_row_updated() {
        let (svc, store) = build_service().await;
        let mut unsaved = unsaved_book();
        assert!(!svc.borrow_book(Some(&reader()), &mut unsaved).await.expect("should borrow"));
        assert!(unsaved.is_available());

        let mut book = store.save(&unsaved_book()).await.expect("should save book");
        assert!(store.delete(&book).await.expect("should delete"));
        assert!(!svc.borrow_book(Some(&reader()), &mut book).await.expect("should borrow"));
        assert!(book.is_available());
    }

    fn failing_service() -> ReadingServiceImpl {
        let store = CatalogStoreImpl::new(
            Box::new(FailingBookRepository::default()),
            ReferenceResolver::new(Box::new(MemoryReferenceRepository::new("author")),
                                   Box::new(MemoryReferenceRepository::new("publisher"))));
        ReadingServiceImpl::new(&Configuration::new("test"), Arc::new(store))
    }

    fn stored_book(status: BookStatus) -> Book {
        Book::rehydrate(1, "Refactoring", vec![Author::new("Martin Fowler").expect("author")],
                        Publisher::new("Addison-Wesly").expect("publisher"), status).expect("should rehydrate")
    }

    #[tokio::test]
    async fn test_should_surface_store_failure_on_borrow() {
        let svc = failing_service();
        let mut book = stored_book(BookStatus::Available);
        let err = svc.borrow_book(Some(&reader()), &mut book).await.expect_err("should fail update");
        assert_eq!(FailingBookRepository::error(), err);
        assert!(matches!(err, LibraryError::Database { .. }));
        assert_eq!(BookStatus::Available, book.status());
    }

    #[tokio::test]
    async fn test_should_surface_store_failure_on_return() {
        let svc = failing_service();
        let mut book = stored_book(BookStatus::Issued);
        let err = svc.return_book(Some(&reader()), &mut book).await.expect_err("should fail update");
        assert_eq!(FailingBookRepository::error(), err);
        assert!(!matches!(err, LibraryError::AccessDenied { .. }));
        assert_eq!(BookStatus::Issued, book.status());
    }
}

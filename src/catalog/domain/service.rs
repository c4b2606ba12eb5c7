use std::sync::Arc;
use async_trait::async_trait;
use tracing::{info, warn};
use crate::books::domain::{is_blank, Author, Book, Publisher, BOOK_AUTHOR_REQUIRED, BOOK_NAME_REQUIRED, BOOK_PUBLISHER_REQUIRED};
use crate::catalog::domain::{AdministrativeService, CatalogStore};
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult, Permission};
use crate::users::domain::{authorize, User};

pub(crate) struct AdministrativeServiceImpl {
    branch_id: String,
    catalog_store: Arc<dyn CatalogStore>,
}

impl AdministrativeServiceImpl {
    pub(crate) fn new(config: &Configuration, catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            catalog_store,
        }
    }
}

fn required<'a>(value: Option<&'a str>, message: &str) -> LibraryResult<&'a str> {
    match value {
        Some(v) if !is_blank(v) => Ok(v),
        _ => Err(LibraryError::validation(message, None)),
    }
}

#[async_trait]
impl AdministrativeService for AdministrativeServiceImpl {
    async fn add_book(&self, user: Option<&User>, name: Option<&str>,
                      author_names: Option<&[String]>, publisher_name: Option<&str>) -> LibraryResult<Book> {
        let user = authorize(user, Permission::AddBook, "User Not Authorized").map_err(|err| {
            warn!("add book rejected in {}: {}", self.branch_id, err);
            err
        })?;
        let author_names = match author_names {
            Some(names) if !names.is_empty() => names,
            _ => return Err(LibraryError::validation(BOOK_AUTHOR_REQUIRED, None)),
        };
        let name = required(name, BOOK_NAME_REQUIRED)?;
        let publisher_name = required(publisher_name, BOOK_PUBLISHER_REQUIRED)?;

        let authors = author_names.iter()
            .map(|author| Author::new(author.as_str()))
            .collect::<LibraryResult<Vec<Author>>>()?;
        let book = Book::new(name, authors, Publisher::new(publisher_name)?)?;
        let saved = self.catalog_store.save(&book).await?;
        info!("{} added {} in {}", user.username, saved, self.branch_id);
        Ok(saved)
    }

    async fn remove_book(&self, user: Option<&User>, book: Option<&Book>) -> LibraryResult<bool> {
        let user = authorize(user, Permission::RemoveBook, "User not authorized for this operation").map_err(|err| {
            warn!("remove book rejected in {}: {}", self.branch_id, err);
            err
        })?;
        let book = book.ok_or_else(|| LibraryError::validation("Book is null", None))?;
        book.validate()?;
        let deleted = self.catalog_store.delete(book).await?;
        info!("{} removed {} in {}: {}", user.username, book, self.branch_id, deleted);
        Ok(deleted)
    }
}

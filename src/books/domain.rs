use std::fmt;
use std::fmt::{Display, Formatter};
use serde::Serialize;
use crate::core::domain::Identifiable;
use crate::core::library::{BookStatus, LibraryError, LibraryResult};

pub mod model;

pub(crate) const BOOK_NAME_REQUIRED: &str = "Book should have name";
pub(crate) const BOOK_AUTHOR_REQUIRED: &str = "Book should have atleast one author";
pub(crate) const BOOK_PUBLISHER_REQUIRED: &str = "Book should have publisher name";
pub(crate) const AUTHOR_NAME_REQUIRED: &str = "Author should have name";

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// Author of a book, the id is assigned by the store the first time the name is seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Author {
    id: Option<i64>,
    name: String,
}

impl Author {
    pub fn new(name: &str) -> LibraryResult<Self> {
        if is_blank(name) {
            return Err(LibraryError::validation(AUTHOR_NAME_REQUIRED, None));
        }
        Ok(Self { id: None, name: name.to_string() })
    }

    pub(crate) fn rehydrate(id: i64, name: &str) -> LibraryResult<Self> {
        let mut author = Author::new(name)?;
        author.id = Some(id);
        Ok(author)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl Identifiable for Author {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

// Publisher of a book, identified the same way as authors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Publisher {
    id: Option<i64>,
    name: String,
}

impl Publisher {
    pub fn new(name: &str) -> LibraryResult<Self> {
        if is_blank(name) {
            return Err(LibraryError::validation(BOOK_PUBLISHER_REQUIRED, None));
        }
        Ok(Self { id: None, name: name.to_string() })
    }

    pub(crate) fn rehydrate(id: i64, name: &str) -> LibraryResult<Self> {
        let mut publisher = Publisher::new(name)?;
        publisher.id = Some(id);
        Ok(publisher)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl Identifiable for Publisher {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

// Book is validated on construction, its status only moves through issue and returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Book {
    id: Option<i64>,
    name: String,
    authors: Vec<Author>,
    publisher: Publisher,
    status: BookStatus,
}

impl Book {
    pub fn new(name: &str, authors: Vec<Author>, publisher: Publisher) -> LibraryResult<Self> {
        let book = Self {
            id: None,
            name: name.to_string(),
            authors,
            publisher,
            status: BookStatus::Available,
        };
        book.validate()?;
        Ok(book)
    }

    // Rebuilds a stored book. The constructor still validates the fields; id and status
    // are then restored as stored, skipping the issue/return transition rules.
    pub(crate) fn rehydrate(id: i64, name: &str, authors: Vec<Author>,
                            publisher: Publisher, status: BookStatus) -> LibraryResult<Self> {
        let mut book = Book::new(name, authors, publisher)?;
        book.id = Some(id);
        book.status = status;
        Ok(book)
    }

    pub fn validate(&self) -> LibraryResult<()> {
        if is_blank(self.name.as_str()) {
            return Err(LibraryError::validation(BOOK_NAME_REQUIRED, None));
        }
        if self.authors.is_empty() {
            return Err(LibraryError::validation(BOOK_AUTHOR_REQUIRED, None));
        }
        if self.authors.iter().any(|a| is_blank(a.name())) {
            return Err(LibraryError::validation(AUTHOR_NAME_REQUIRED, None));
        }
        if is_blank(self.publisher.name()) {
            return Err(LibraryError::validation(BOOK_PUBLISHER_REQUIRED, None));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn authors(&self) -> &[Author] {
        self.authors.as_slice()
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub fn status(&self) -> BookStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }

    pub fn issue(&mut self) -> LibraryResult<()> {
        if !self.is_available() {
            return Err(LibraryError::illegal_state("Book is not available"));
        }
        self.status = BookStatus::Issued;
        Ok(())
    }

    pub fn returned(&mut self) -> LibraryResult<()> {
        if self.is_available() {
            return Err(LibraryError::illegal_state("Already available"));
        }
        self.status = BookStatus::Available;
        Ok(())
    }
}

impl Identifiable for Book {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let authors = self.authors.iter().map(Author::name).collect::<Vec<&str>>().join(",");
        write!(f, "Book{{id='{}'name='{}', authors={}, publisher={}, status={}}}",
               self.id.unwrap_or(0), self.name, authors, self.publisher.name(), self.status)
    }
}

#[cfg(test)]
mod tests {
    use crate::books::domain::{Author, Book, Publisher};
    use crate::core::domain::Identifiable;
    use crate::core::library::{BookStatus, LibraryError};

    fn refactoring() -> Book {
        Book::new("refactoring", vec![Author::new("Martin").expect("author")],
                  Publisher::new("Addison").expect("publisher")).expect("should build book")
    }

    #[tokio::test]
    async fn test_should_be_available() {
        let book = refactoring();
        assert!(book.is_available());
        assert_eq!(BookStatus::Available, book.status());
        assert_eq!(None, book.id());
    }

    #[tokio::test]
    async fn test_should_not_be_available_after_issue() {
        let mut book = refactoring();
        book.issue().expect("should issue");
        assert!(!book.is_available());
        assert_eq!(BookStatus::Issued, book.status());
    }

    #[tokio::test]
    async fn test_should_reject_second_issue() {
        let mut book = refactoring();
        book.issue().expect("should issue");
        let err = book.issue().expect_err("should not issue twice");
        assert_eq!(LibraryError::illegal_state("Book is not available"), err);
    }

    #[tokio::test]
    async fn test_should_reject_return_of_available_book() {
        let mut book = refactoring();
        let err = book.returned().expect_err("should not return available book");
        assert_eq!(LibraryError::illegal_state("Already available"), err);
    }

    #[tokio::test]
    async fn test_should_return_issued_book() {
        let mut book = refactoring();
        book.issue().expect("should issue");
        book.returned().expect("should return");
        assert!(book.is_available());
    }

    #[tokio::test]
    async fn test_should_reject_blank_book_name() {
        for name in ["", "   "] {
            let err = Book::new(name, vec![Author::new("Martin").expect("author")],
                                Publisher::new("Addison").expect("publisher")).expect_err("should fail");
            assert_eq!("Book should have name", err.message());
        }
    }

    #[tokio::test]
    async fn test_should_reject_missing_authors() {
        let err = Book::new("refactoring", vec![], Publisher::new("Addison").expect("publisher"))
            .expect_err("should fail");
        assert_eq!("Book should have atleast one author", err.message());
    }

    #[tokio::test]
    async fn test_should_reject_blank_reference_names() {
        assert_eq!("Author should have name", Author::new(" ").expect_err("should fail").message());
        assert_eq!("Book should have publisher name", Publisher::new("     ").expect_err("should fail").message());
    }

    #[tokio::test]
    async fn test_should_compare_structurally() {
        let mut book = refactoring();
        assert_eq!(refactoring(), book);
        book.issue().expect("should issue");
        assert_ne!(refactoring(), book);
        let stored = Book::rehydrate(7, "refactoring", vec![Author::new("Martin").expect("author")],
                                     Publisher::new("Addison").expect("publisher"), BookStatus::Available)
            .expect("should rehydrate");
        assert_ne!(refactoring(), stored);
    }

    #[tokio::test]
    async fn test_should_rehydrate_status_without_transition() {
        let book = Book::rehydrate(3, "refactoring", vec![Author::rehydrate(1, "Martin").expect("author")],
                                   Publisher::rehydrate(2, "Addison").expect("publisher"), BookStatus::Issued)
            .expect("should rehydrate");
        assert_eq!(Some(3), book.id());
        assert_eq!(Some(1), book.authors()[0].id());
        assert_eq!(Some(2), book.publisher().id());
        assert!(!book.is_available());
    }

    #[tokio::test]
    async fn test_should_display_book() {
        let book = Book::new("P EAAA",
                             vec![Author::new("Martin Fowler").expect("author"), Author::new("fowler").expect("author")],
                             Publisher::new("Addison-Wesly").expect("publisher")).expect("should build book");
        assert_eq!("Book{id='0'name='P EAAA', authors=Martin Fowler,fowler, publisher=Addison-Wesly, status=AVAILABLE}",
                   book.to_string());
    }
}

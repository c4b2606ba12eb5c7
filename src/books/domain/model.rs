use serde::{Deserialize, Serialize};

// lower-cased name used for case-insensitive lookups and as the unique key of reference rows
pub(crate) fn name_key(name: &str) -> String {
    name.to_lowercase()
}

// BookEntity is the stored row of a book: author and publisher are kept as foreign keys
// and the author ids keep the display order of the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntity {
    pub book_id: i64,
    pub name: String,
    pub name_key: String,
    pub author_ids: Vec<i64>,
    pub publisher_id: i64,
    pub book_status: String,
}

impl BookEntity {
    pub fn new(book_id: i64, name: &str, author_ids: Vec<i64>, publisher_id: i64, book_status: &str) -> Self {
        Self {
            book_id,
            name: name.to_string(),
            name_key: name_key(name),
            author_ids,
            publisher_id,
            book_status: book_status.to_string(),
        }
    }
}

// ReferenceEntity is the stored row of an author or a publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub ref_id: i64,
    pub name: String,
    pub name_key: String,
}

impl ReferenceEntity {
    pub fn new(ref_id: i64, name: &str) -> Self {
        Self {
            ref_id,
            name: name.to_string(),
            name_key: name_key(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::books::domain::model::{BookEntity, ReferenceEntity};

    #[tokio::test]
    async fn test_should_build_book_entity() {
        let book = BookEntity::new(1, "P EAA", vec![3, 2], 5, "ISSUED");
        assert_eq!("p eaa", book.name_key.as_str());
        assert_eq!(vec![3, 2], book.author_ids);
        assert_eq!("ISSUED", book.book_status.as_str());
    }

    #[tokio::test]
    async fn test_should_build_reference_entity() {
        let author = ReferenceEntity::new(9, "Martin Fowler");
        assert_eq!("martin fowler", author.name_key.as_str());
        assert_eq!("Martin Fowler", author.name.as_str());
    }
}

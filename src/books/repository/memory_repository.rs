use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::books::domain::model::{name_key, BookEntity, ReferenceEntity};
use crate::books::repository::{BookRepository, ReferenceRepository};
use crate::core::library::{LibraryError, LibraryResult};

fn poisoned<T>(_err: PoisonError<T>) -> LibraryError {
    LibraryError::runtime("memory store lock poisoned", None)
}

#[derive(Debug, Default)]
struct BookTable {
    last_id: i64,
    rows: BTreeMap<i64, BookEntity>,
}

// In-process book table. Clones share the same rows, rows are delivered in id order.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookRepository {
    table: Arc<RwLock<BookTable>>,
}

impl MemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn create(&self, name: &str, author_ids: &[i64],
                    publisher_id: i64, book_status: &str) -> LibraryResult<i64> {
        let mut table = self.table.write().map_err(poisoned)?;
        table.last_id += 1;
        let book_id = table.last_id;
        table.rows.insert(book_id, BookEntity::new(book_id, name, author_ids.to_vec(), publisher_id, book_status));
        Ok(book_id)
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let mut table = self.table.write().map_err(poisoned)?;
        match table.rows.get_mut(&entity.book_id) {
            Some(row) => {
                *row = entity.clone();
                row.name_key = name_key(entity.name.as_str());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        let mut table = self.table.write().map_err(poisoned)?;
        Ok(table.rows.remove(&id).map(|_| 1).unwrap_or(0))
    }

    async fn find_by_name(&self, name: &str) -> LibraryResult<Option<BookEntity>> {
        let key = name_key(name);
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.rows.values().find(|b| b.name_key == key).cloned())
    }

    async fn find_by_name_fragment(&self, fragment: &str) -> LibraryResult<Vec<BookEntity>> {
        let key = name_key(fragment);
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.rows.values().filter(|b| b.name_key.contains(key.as_str())).cloned().collect())
    }
}

#[derive(Debug, Default)]
struct ReferenceTable {
    last_id: i64,
    by_name: HashMap<String, ReferenceEntity>,
    names: BTreeMap<i64, String>,
}

// In-process author or publisher table with a unique lower-cased name key.
#[derive(Debug, Clone)]
pub struct MemoryReferenceRepository {
    kind: String,
    table: Arc<RwLock<ReferenceTable>>,
}

impl MemoryReferenceRepository {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            table: Arc::new(RwLock::new(ReferenceTable::default())),
        }
    }

    pub fn len(&self) -> LibraryResult<usize> {
        Ok(self.table.read().map_err(poisoned)?.names.len())
    }

    pub fn is_empty(&self) -> LibraryResult<bool> {
        Ok(self.len()? == 0)
    }
}

// Book table whose every call fails the way a store rejecting the request does.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct FailingBookRepository {}

#[cfg(test)]
impl FailingBookRepository {
    pub(crate) fn error() -> LibraryError {
        LibraryError::database_or_unavailable("ResourceNotFoundException", Some("400 Bad Request".to_string()), false)
    }
}

#[cfg(test)]
#[async_trait]
impl BookRepository for FailingBookRepository {
    async fn create(&self, _name: &str, _author_ids: &[i64],
                    _publisher_id: i64, _book_status: &str) -> LibraryResult<i64> {
        Err(Self::error())
    }

    async fn update(&self, _entity: &BookEntity) -> LibraryResult<usize> {
        Err(Self::error())
    }

    async fn delete(&self, _id: i64) -> LibraryResult<usize> {
        Err(Self::error())
    }

    async fn find_by_name(&self, _name: &str) -> LibraryResult<Option<BookEntity>> {
        Err(Self::error())
    }

    async fn find_by_name_fragment(&self, _fragment: &str) -> LibraryResult<Vec<BookEntity>> {
        Err(Self::error())
    }
}

#[async_trait]
impl ReferenceRepository for MemoryReferenceRepository {
    async fn create(&self, name: &str) -> LibraryResult<ReferenceEntity> {
        let key = name_key(name);
        let mut table = self.table.write().map_err(poisoned)?;
        if table.by_name.contains_key(&key) {
            return Err(LibraryError::duplicate_key(
                format!("{} with name {} already exists", self.kind, name).as_str()));
        }
        table.last_id += 1;
        let entity = ReferenceEntity::new(table.last_id, name);
        table.names.insert(entity.ref_id, key.clone());
        table.by_name.insert(key, entity.clone());
        Ok(entity)
    }

    async fn get(&self, id: i64) -> LibraryResult<ReferenceEntity> {
        let table = self.table.read().map_err(poisoned)?;
        table.names.get(&id)
            .and_then(|key| table.by_name.get(key))
            .cloned()
            .ok_or_else(|| LibraryError::not_found(format!("{} not found for {}", self.kind, id).as_str()))
    }

    async fn find_by_name(&self, name: &str) -> LibraryResult<Option<ReferenceEntity>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.by_name.get(&name_key(name)).cloned())
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};

use crate::books::domain::model::{name_key, BookEntity};
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult};
use crate::utils::ddb::{is_conditional_check_failed, next_id, number_attribute, parse_item, parse_number_attribute, parse_number_list_attribute, parse_string_attribute};

#[derive(Debug)]
pub struct DDBBookRepository {
    client: Client,
    table_name: String,
    index_name: String,
    counters_table: String,
}

impl DDBBookRepository {
    pub(crate) fn new(client: Client, table_name: &str, counters_table: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: format!("{}_ndx", table_name),
            counters_table: counters_table.to_string(),
        }
    }

    async fn put(&self, entity: &BookEntity, condition: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        match self.client
            .put_item()
            .table_name(table_name)
            .condition_expression(condition)
            .set_item(Some(parse_item(val)?))
            .send()
            .await
        {
            Ok(_) => Ok(1),
            Err(err) if is_conditional_check_failed(&err) => Ok(0),
            Err(err) => Err(LibraryError::from(err)),
        }
    }
}

#[async_trait]
impl BookRepository for DDBBookRepository {
    async fn create(&self, name: &str, author_ids: &[i64],
                    publisher_id: i64, book_status: &str) -> LibraryResult<i64> {
        let book_id = next_id(&self.client, self.counters_table.as_str(), self.table_name.as_str()).await?;
        let entity = BookEntity::new(book_id, name, author_ids.to_vec(), publisher_id, book_status);
        if self.put(&entity, "attribute_not_exists(book_id)").await? != 1 {
            return Err(LibraryError::duplicate_key(format!("book {} already exists", book_id).as_str()));
        }
        Ok(book_id)
    }

    // replaces the whole row, only when it exists
    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let mut entity = entity.clone();
        entity.name_key = name_key(entity.name.as_str());
        self.put(&entity, "attribute_exists(book_id)").await
    }

    async fn delete(&self, id: i64) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let out = self.client.delete_item()
            .table_name(table_name)
            .key("book_id", number_attribute(id))
            .return_values(ReturnValue::AllOld)
            .send()
            .await?;
        Ok(out.attributes().map(|old| if old.is_empty() { 0 } else { 1 }).unwrap_or(0))
    }

    async fn find_by_name(&self, name: &str) -> LibraryResult<Option<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let req = self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .key_condition_expression("name_key = :name_key")
            .expression_attribute_values(":name_key", AttributeValue::S(name_key(name)))
            .send()
            .await?;
        match req.items().and_then(|items| items.first()) {
            Some(map) => Ok(Some(map_to_book(map)?)),
            None => Ok(None),
        }
    }

    // Note: the fragment is bound as an expression value, so it always matches literally.
    async fn find_by_name_fragment(&self, fragment: &str) -> LibraryResult<Vec<BookEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let fragment = name_key(fragment);
        let mut books = vec![];
        let mut exclusive_start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let mut request = self.client
                .scan()
                .table_name(table_name)
                .consistent_read(true)
                .set_exclusive_start_key(exclusive_start_key.take());
            if !fragment.is_empty() {
                request = request
                    .filter_expression("contains(name_key, :fragment)")
                    .expression_attribute_values(":fragment", AttributeValue::S(fragment.clone()));
            }
            let req = request.send().await?;
            for map in req.items().unwrap_or_default() {
                books.push(map_to_book(map)?);
            }
            match req.last_evaluated_key() {
                Some(key) => exclusive_start_key = Some(key.clone()),
                None => break,
            }
        }
        Ok(books)
    }
}

fn map_to_book(map: &HashMap<String, AttributeValue>) -> LibraryResult<BookEntity> {
    let malformed = |attr: &str| LibraryError::serialization(format!("malformed book row, missing {}", attr).as_str());
    let name = parse_string_attribute("name", map).ok_or_else(|| malformed("name"))?;
    Ok(BookEntity {
        book_id: parse_number_attribute("book_id", map).ok_or_else(|| malformed("book_id"))?,
        name_key: parse_string_attribute("name_key", map).unwrap_or_else(|| name_key(name.as_str())),
        name,
        author_ids: parse_number_list_attribute("author_ids", map).ok_or_else(|| malformed("author_ids"))?,
        publisher_id: parse_number_attribute("publisher_id", map).ok_or_else(|| malformed("publisher_id"))?,
        book_status: parse_string_attribute("book_status", map).unwrap_or_default(),
    })
}

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::books::domain::model::{name_key, ReferenceEntity};
use crate::books::repository::ReferenceRepository;
use crate::core::library::{LibraryError, LibraryResult};
use crate::utils::ddb::{is_conditional_check_failed, next_id, number_attribute, parse_item, parse_number_attribute, parse_string_attribute};

const INDEX_RETRY_DELAY_MS: u64 = 250;

// Author or publisher table keyed by the lower-cased name, so the conditional put on the
// key is the unique-name constraint. Ids are looked up through the `<table>_ndx` index.
#[derive(Debug)]
pub struct DDBReferenceRepository {
    client: Client,
    table_name: String,
    index_name: String,
    counters_table: String,
}

impl DDBReferenceRepository {
    pub(crate) fn new(client: Client, table_name: &str, counters_table: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: format!("{}_ndx", table_name),
            counters_table: counters_table.to_string(),
        }
    }

    async fn query_by_id(&self, id: i64) -> LibraryResult<Option<ReferenceEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let req = self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .limit(2)
            .key_condition_expression("ref_id = :ref_id")
            .expression_attribute_values(":ref_id", number_attribute(id))
            .send()
            .await?;
        let items = req.items().unwrap_or_default();
        if items.len() > 1 {
            return Err(LibraryError::database(format!("too many {} for {}", table_name, id).as_str(), None, false));
        }
        items.first().map(map_to_reference).transpose()
    }
}

#[async_trait]
impl ReferenceRepository for DDBReferenceRepository {
    async fn create(&self, name: &str) -> LibraryResult<ReferenceEntity> {
        let table_name: &str = self.table_name.as_ref();
        let ref_id = next_id(&self.client, self.counters_table.as_str(), table_name).await?;
        let entity = ReferenceEntity::new(ref_id, name);
        let val = serde_json::to_value(&entity)?;
        match self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(name_key)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await
        {
            Ok(_) => Ok(entity),
            Err(err) if is_conditional_check_failed(&err) => {
                Err(LibraryError::duplicate_key(format!("{} already has {}", table_name, name).as_str()))
            }
            Err(err) => Err(LibraryError::from(err)),
        }
    }

    // the ref_id index is eventually consistent, a row created just before may need a second look
    async fn get(&self, id: i64) -> LibraryResult<ReferenceEntity> {
        if let Some(entity) = self.query_by_id(id).await? {
            return Ok(entity);
        }
        tokio::time::sleep(Duration::from_millis(INDEX_RETRY_DELAY_MS)).await;
        self.query_by_id(id).await?.ok_or_else(|| LibraryError::not_found(
            format!("{} not found for {}", self.table_name, id).as_str()))
    }

    async fn find_by_name(&self, name: &str) -> LibraryResult<Option<ReferenceEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let out = self.client
            .get_item()
            .table_name(table_name)
            .key("name_key", AttributeValue::S(name_key(name)))
            .consistent_read(true)
            .send()
            .await?;
        match out.item() {
            Some(map) => Ok(Some(map_to_reference(map)?)),
            None => Ok(None),
        }
    }
}

fn map_to_reference(map: &HashMap<String, AttributeValue>) -> LibraryResult<ReferenceEntity> {
    match (parse_number_attribute("ref_id", map), parse_string_attribute("name", map)) {
        (Some(ref_id), Some(name)) => Ok(ReferenceEntity::new(ref_id, name.as_str())),
        _ => Err(LibraryError::serialization(format!("malformed reference row {:?}", map).as_str())),
    }
}

use std::collections::HashMap;
use std::time::Duration;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeDefinition, AttributeValue, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection, ProjectionType, ProvisionedThroughput, ReturnValue, ScalarAttributeType, TableStatus};
use serde_json::Value;
use tracing::debug;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::RepositoryStore;

// Creates a table with a hash key and an optional hash-only secondary index named
// `<table>_ndx`. Fails when the table already exists.
pub(crate) async fn create_table(client: &Client,
                                 table_name: &str, pk: &str, pk_type: ScalarAttributeType,
                                 gsi: Option<(&str, ScalarAttributeType)>) -> LibraryResult<()> {
    let mut attributes = vec![
        AttributeDefinition::builder()
            .attribute_name(pk)
            .attribute_type(pk_type)
            .build(),
    ];
    let mut indexes = None;
    if let Some((gsi_pk, gsi_type)) = gsi {
        attributes.push(AttributeDefinition::builder()
            .attribute_name(gsi_pk)
            .attribute_type(gsi_type)
            .build());
        indexes = Some(vec![GlobalSecondaryIndex::builder()
            .index_name(format!("{}_ndx", table_name))
            .key_schema(KeySchemaElement::builder()
                .attribute_name(gsi_pk)
                .key_type(KeyType::Hash).build())
            .projection(Projection::builder().projection_type(ProjectionType::All).build())
            .provisioned_throughput(
                ProvisionedThroughput::builder().read_capacity_units(10).write_capacity_units(10).build())
            .build()]);
    }

    match client
        .create_table()
        .table_name(table_name)
        .set_global_secondary_indexes(indexes)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(pk)
                .key_type(KeyType::Hash)
                .build(),
        )
        .set_attribute_definitions(Some(attributes))
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(10)
                .write_capacity_units(10)
                .build(),
        )
        .send()
        .await
    {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Creating).await;
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to create {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

// Creates every table used by the catalog, tables that already exist are left untouched.
pub(crate) async fn create_catalog_tables(client: &Client, config: &Configuration) {
    let _ = create_table(client, config.books_table.as_str(), "book_id", ScalarAttributeType::N,
                         Some(("name_key", ScalarAttributeType::S))).await;
    let _ = create_table(client, config.authors_table.as_str(), "name_key", ScalarAttributeType::S,
                         Some(("ref_id", ScalarAttributeType::N))).await;
    let _ = create_table(client, config.publishers_table.as_str(), "name_key", ScalarAttributeType::S,
                         Some(("ref_id", ScalarAttributeType::N))).await;
    let _ = create_table(client, config.counters_table.as_str(), "counter_name", ScalarAttributeType::S,
                         None).await;
}

#[cfg(test)]
pub(crate) async fn delete_table(client: &Client, table_name: &str) -> LibraryResult<()> {
    match client.delete_table().table_name(table_name).send().await {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Deleting).await;
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to delete {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

async fn wait_until_table_status_is_not(client: &Client, table_name: &str, other_status: TableStatus) {
    for _i in 0..30 {
        if let Ok(status) = describe_table(client, table_name).await {
            if status != other_status {
                return;
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

async fn describe_table(client: &Client, table_name: &str) -> LibraryResult<TableStatus> {
    match client
        .describe_table()
        .table_name(table_name)
        .send()
        .await
    {
        Ok(out) => {
            if let Some(table) = out.table() {
                if let Some(status) = table.table_status() {
                    return Ok(status.clone());
                }
            }
            Err(LibraryError::runtime(format!("failed to describe {} table",
                                              table_name).as_str(), None))
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to describe {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

// Atomically increments the named counter and returns the new value, used as generated id.
pub(crate) async fn next_id(client: &Client, counters_table: &str, counter_name: &str) -> LibraryResult<i64> {
    let out = client
        .update_item()
        .table_name(counters_table)
        .key("counter_name", AttributeValue::S(counter_name.to_string()))
        .update_expression("ADD seq :one")
        .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
        .return_values(ReturnValue::UpdatedNew)
        .send()
        .await?;
    let id = out.attributes().and_then(|attrs| parse_number_attribute("seq", attrs));
    debug!("allocated id {:?} for {}", id, counter_name);
    id.ok_or_else(|| LibraryError::database(
        format!("failed to allocate id for {}", counter_name).as_str(), None, false))
}

pub(crate) fn parse_item(value: Value) -> Result<HashMap<String, AttributeValue>, String> {
    match value_to_item(value) {
        AttributeValue::M(map) => Ok(map),
        other => Err(format!("failed to parse{:?}", other)),
    }
}

pub(crate) fn parse_string_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<String> {
    if let Some(AttributeValue::S(str)) = map.get(name) {
        return Some(str.clone());
    }
    None
}

pub(crate) fn parse_number_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<i64> {
    if let Some(AttributeValue::N(str)) = map.get(name) {
        if let Ok(n) = str.parse::<i64>() {
            return Some(n);
        }
    }
    None
}

// Parses a list of numbers, None if the attribute is missing or any element is not a number.
pub(crate) fn parse_number_list_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<Vec<i64>> {
    if let Some(AttributeValue::L(list)) = map.get(name) {
        return list.iter().map(|v| match v {
            AttributeValue::N(str) => str.parse::<i64>().ok(),
            _ => None,
        }).collect();
    }
    None
}

pub(crate) fn number_attribute(n: i64) -> AttributeValue {
    AttributeValue::N(n.to_string())
}

fn value_to_item(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(a) => AttributeValue::L(a.into_iter().map(value_to_item).collect()),
        Value::Object(o) => {
            AttributeValue::M(o.into_iter().map(|(k, v)| (k, value_to_item(v))).collect())
        }
    }
}

// helper method to build db-client for the given store
pub(crate) async fn build_db_client(config: &Configuration, store: RepositoryStore) -> Client {
    match store {
        RepositoryStore::LocalDynamoDB => {
            // See https://docs.aws.amazon.com/sdk-for-rust/latest/dg/dynamodb-local.html
            let dynamodb_local_config = aws_sdk_dynamodb::Config::builder()
                .region(Region::new("local"))
                .credentials_provider(
                    Credentials::new("AKIDLOCALSTACK", "localstacksecret", None, None, "faked"))
                .endpoint_url(config.local_endpoint())
                .build();
            Client::from_conf(dynamodb_local_config)
        }
        _ => {
            //Get config from environment.
            let sdk_config = aws_config::load_from_env().await;
            let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
            if let Some(endpoint) = &config.dynamodb_endpoint {
                builder = builder.endpoint_url(endpoint);
            }
            Client::from_conf(builder.build())
        }
    }
}

impl From<SdkError<UpdateItemError>> for LibraryError {
    fn from(err: SdkError<UpdateItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<PutItemError>> for LibraryError {
    fn from(err: SdkError<PutItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<DeleteItemError>> for LibraryError {
    fn from(err: SdkError<DeleteItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<GetItemError>> for LibraryError {
    fn from(err: SdkError<GetItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<QueryError>> for LibraryError {
    fn from(err: SdkError<QueryError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<ScanError>> for LibraryError {
    fn from(err: SdkError<ScanError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

// put rejected by its condition expression
pub(crate) fn is_conditional_check_failed<R>(err: &SdkError<PutItemError, R>) -> bool {
    matches!(err, SdkError::ServiceError(ctx) if ctx.err().is_conditional_check_failed_exception())
}

fn retryable_sdk_error<T>(err: &SdkError<T>) -> (bool, Option<String>) {
    match err {
        SdkError::ConstructionFailure(_) => { (false, Some("ConstructionFailure".to_string())) }
        SdkError::TimeoutError(_) => { (true, Some("TimeoutError".to_string())) }
        SdkError::DispatchFailure(_) => { (true, Some("DispatchFailure".to_string())) }
        SdkError::ResponseError { .. } => { (true, Some("ResponseError".to_string())) }
        SdkError::ServiceError(ctx) => {
            (ctx.raw().http().status().is_server_error() || has_exceeded_limit(ctx.raw().http().body().bytes()), Some(ctx.raw().http().status().to_string()))
        }
        _ => { (true, Some("Unknown".to_string())) }
    }
}

// throttling responses carry "...ThroughputExceeded..." or "LimitExceeded" in the body
fn has_exceeded_limit(opts: Option<&[u8]>) -> bool {
    if let Some(b) = opts {
        return b.windows(6).any(|w| w == b"ceeded");
    }
    false
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use aws_sdk_dynamodb::error::SdkError;
    use aws_sdk_dynamodb::operation::put_item::PutItemError;
    use aws_sdk_dynamodb::types::AttributeValue;
    use aws_sdk_dynamodb::types::error::{ConditionalCheckFailedException, ResourceNotFoundException};
    use serde_json::json;
    use crate::utils::ddb::{has_exceeded_limit, is_conditional_check_failed, parse_item, parse_number_attribute, parse_number_list_attribute, parse_string_attribute};

    #[tokio::test]
    async fn test_should_parse_item() {
        let item = parse_item(json!({"book_id": 3, "name": "P EAA", "author_ids": [2, 1]})).expect("should parse");
        assert_eq!(Some(3), parse_number_attribute("book_id", &item));
        assert_eq!(Some("P EAA".to_string()), parse_string_attribute("name", &item));
        assert_eq!(Some(vec![2, 1]), parse_number_list_attribute("author_ids", &item));
        assert!(parse_item(json!([1, 2])).is_err());
    }

    #[tokio::test]
    async fn test_should_reject_malformed_number_list() {
        let item = HashMap::from([
            ("author_ids".to_string(), AttributeValue::L(vec![AttributeValue::N("1".to_string()), AttributeValue::S("x".to_string())])),
            ("publisher_id".to_string(), AttributeValue::S("1".to_string())),
        ]);
        assert_eq!(None, parse_number_list_attribute("author_ids", &item));
        assert_eq!(None, parse_number_attribute("publisher_id", &item));
        assert_eq!(None, parse_number_attribute("missing", &item));
    }

    #[tokio::test]
    async fn test_should_detect_exceeded_limit() {
        assert!(has_exceeded_limit(Some(b"ProvisionedThroughputExceededException".as_slice())));
        assert!(!has_exceeded_limit(Some(b"short".as_slice())));
        assert!(!has_exceeded_limit(None));
    }

    #[tokio::test]
    async fn test_should_detect_conditional_check_failure() {
        let failed: SdkError<PutItemError, ()> = SdkError::service_error(
            PutItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder().message("The conditional request failed").build()), ());
        assert!(is_conditional_check_failed(&failed));

        let missing: SdkError<PutItemError, ()> = SdkError::service_error(
            PutItemError::ResourceNotFoundException(
                ResourceNotFoundException::builder().message("Requested resource not found").build()), ());
        assert!(!is_conditional_check_failed(&missing));

        let construction: SdkError<PutItemError, ()> = SdkError::construction_failure("bad request");
        assert!(!is_conditional_check_failed(&construction));
    }
}

use serde::{Deserialize, Serialize};

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    // store assigned id, absent until the object has been persisted
    fn id(&self) -> Option<i64>;
}

pub(crate) const LOCAL_DYNAMODB_ENDPOINT: &str = "http://localhost:8000";

// Configuration abstracts config options for the catalog
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub books_table: String,
    pub authors_table: String,
    pub publishers_table: String,
    pub counters_table: String,
    pub dynamodb_endpoint: Option<String>,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            books_table: "books".to_string(),
            authors_table: "authors".to_string(),
            publishers_table: "publishers".to_string(),
            counters_table: "counters".to_string(),
            dynamodb_endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.dynamodb_endpoint = Some(endpoint.to_string());
        self
    }

    pub(crate) fn local_endpoint(&self) -> String {
        self.dynamodb_endpoint.clone().unwrap_or_else(|| LOCAL_DYNAMODB_ENDPOINT.to_string())
    }
}

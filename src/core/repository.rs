use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    DynamoDB,
    LocalDynamoDB,
    Memory,
}

impl RepositoryStore {
    pub fn is_dynamodb(&self) -> bool {
        matches!(self, RepositoryStore::DynamoDB | RepositoryStore::LocalDynamoDB)
    }
}

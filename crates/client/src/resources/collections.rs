use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::to_body;
use crate::client::GatewayClient;
use crate::error::Result;
use crate::query::QueryParams;

/// Collection reference; Metabase addresses the root collection as `root`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionId {
    Root,
    Id(u64),
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

impl From<u64> for CollectionId {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewCollection {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl GatewayClient {
    pub async fn list_collections(&self, archived: Option<bool>) -> Result<Value> {
        let query = QueryParams::new().push_opt("archived", archived);
        self.get_with_query("/api/collection", &query).await
    }

    pub async fn get_collection(&self, id: CollectionId) -> Result<Value> {
        self.get(&format!("/api/collection/{id}")).await
    }

    /// Items in a collection. `models` filters by item type (`card`,
    /// `dashboard`, `collection`, ...) and is sent as repeated keys.
    pub async fn collection_items(&self, id: CollectionId, models: &[&str]) -> Result<Value> {
        let query = QueryParams::new().push_all("models", models);
        self.get_with_query(&format!("/api/collection/{id}/items"), &query)
            .await
    }

    pub async fn create_collection(&self, collection: &NewCollection) -> Result<Value> {
        self.post("/api/collection", to_body(collection)?).await
    }

    pub async fn update_collection(&self, id: u64, update: &CollectionUpdate) -> Result<Value> {
        self.put(&format!("/api/collection/{id}"), to_body(update)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_id_display() {
        assert_eq!(CollectionId::Root.to_string(), "root");
        assert_eq!(CollectionId::from(12).to_string(), "12");
    }
}

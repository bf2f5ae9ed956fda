use serde::Serialize;
use serde_json::{json, Value};

use super::to_body;
use crate::client::GatewayClient;
use crate::error::Result;
use crate::query::QueryParams;

/// A saved question. `dataset_query` and `visualization_settings` are
/// Metabase's own structures and are passed through untouched.
#[derive(Debug, Clone, Serialize)]
pub struct NewCard {
    pub name: String,
    pub dataset_query: Value,
    pub display: String,
    pub visualization_settings: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<u64>,
}

impl NewCard {
    /// Native SQL question with a table display and default settings.
    pub fn native(name: impl Into<String>, database_id: u64, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dataset_query: json!({
                "type": "native",
                "database": database_id,
                "native": { "query": sql.into() }
            }),
            display: "table".into(),
            visualization_settings: json!({}),
            description: None,
            collection_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CardUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_query: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization_settings: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl GatewayClient {
    pub async fn list_cards(&self, filter: Option<&str>, model_id: Option<u64>) -> Result<Value> {
        let query = QueryParams::new()
            .push_opt("f", filter)
            .push_opt("model_id", model_id);
        self.get_with_query("/api/card", &query).await
    }

    pub async fn get_card(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/card/{id}")).await
    }

    pub async fn create_card(&self, card: &NewCard) -> Result<Value> {
        self.post("/api/card", to_body(card)?).await
    }

    pub async fn update_card(&self, id: u64, update: &CardUpdate) -> Result<Value> {
        self.put(&format!("/api/card/{id}"), to_body(update)?).await
    }

    pub async fn delete_card(&self, id: u64) -> Result<Value> {
        self.delete(&format!("/api/card/{id}")).await
    }

    /// Run a saved question, optionally with dashboard-style parameters.
    pub async fn run_card_query(&self, id: u64, parameters: Option<Vec<Value>>) -> Result<Value> {
        let body = match parameters {
            Some(parameters) => json!({ "parameters": parameters }),
            None => json!({}),
        };
        self.post(&format!("/api/card/{id}/query"), body).await
    }

    pub async fn card_query_metadata(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/card/{id}/query_metadata")).await
    }

    pub async fn copy_card(&self, id: u64) -> Result<Value> {
        self.post(&format!("/api/card/{id}/copy"), json!({})).await
    }
}

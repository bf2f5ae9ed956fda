use serde::Serialize;
use serde_json::{json, Value};

use super::{activity::RevisionEntity, to_body};
use crate::client::GatewayClient;
use crate::error::Result;
use crate::query::QueryParams;

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewDashboard {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Value>>,
}

/// Partial update; fields left as `None` are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardCopy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<u64>,
    /// Deep-copy the cards instead of referencing the originals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deep_copy: Option<bool>,
}

impl GatewayClient {
    /// List dashboards, optionally narrowed by Metabase's `f` filter
    /// (`all`, `mine`, `archived`).
    pub async fn list_dashboards(&self, filter: Option<&str>) -> Result<Value> {
        let query = QueryParams::new().push_opt("f", filter);
        self.get_with_query("/api/dashboard", &query).await
    }

    pub async fn get_dashboard(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/dashboard/{id}")).await
    }

    pub async fn create_dashboard(&self, dashboard: &NewDashboard) -> Result<Value> {
        self.post("/api/dashboard", to_body(dashboard)?).await
    }

    pub async fn update_dashboard(&self, id: u64, update: &DashboardUpdate) -> Result<Value> {
        self.put(&format!("/api/dashboard/{id}"), to_body(update)?)
            .await
    }

    pub async fn delete_dashboard(&self, id: u64) -> Result<Value> {
        self.delete(&format!("/api/dashboard/{id}")).await
    }

    pub async fn copy_dashboard(&self, id: u64, copy: &DashboardCopy) -> Result<Value> {
        self.post(&format!("/api/dashboard/{id}/copy"), to_body(copy)?)
            .await
    }

    pub async fn dashboard_related(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/dashboard/{id}/related")).await
    }

    pub async fn dashboard_revisions(&self, id: u64) -> Result<Value> {
        self.revision_history(RevisionEntity::Dashboard, id).await
    }

    /// Replace the card layout of a dashboard. `cards` is passed through as-is.
    pub async fn update_dashboard_cards(&self, id: u64, cards: Vec<Value>) -> Result<Value> {
        self.put(
            &format!("/api/dashboard/{id}/cards"),
            json!({ "cards": cards }),
        )
        .await
    }

    pub async fn create_dashboard_public_link(&self, id: u64) -> Result<Value> {
        self.post(&format!("/api/dashboard/{id}/public_link"), json!({}))
            .await
    }
}

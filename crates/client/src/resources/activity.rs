use serde_json::Value;

use crate::client::GatewayClient;
use crate::error::Result;
use crate::query::QueryParams;

/// Entity kinds that carry revision history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionEntity {
    Card,
    Dashboard,
}

impl RevisionEntity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Dashboard => "dashboard",
        }
    }
}

impl GatewayClient {
    pub async fn recent_views(&self) -> Result<Value> {
        self.get("/api/activity/recent_views").await
    }

    pub async fn popular_items(&self) -> Result<Value> {
        self.get("/api/activity/popular_items").await
    }

    pub async fn revision_history(&self, entity: RevisionEntity, id: u64) -> Result<Value> {
        let query = QueryParams::new()
            .push("entity", entity.as_str())
            .push("id", id);
        self.get_with_query("/api/revision", &query).await
    }
}

use serde_json::Value;

use crate::client::GatewayClient;
use crate::error::Result;
use crate::query::QueryParams;

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub q: String,
    pub models: Vec<String>,
    pub archived: Option<bool>,
    pub table_db_id: Option<u64>,
}

impl SearchRequest {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Default::default()
        }
    }

    fn query(&self) -> QueryParams {
        QueryParams::new()
            .push("q", &self.q)
            .push_all("models", &self.models)
            .push_opt("archived", self.archived)
            .push_opt("table_db_id", self.table_db_id)
    }
}

impl GatewayClient {
    pub async fn search(&self, request: &SearchRequest) -> Result<Value> {
        self.get_with_query("/api/search", &request.query()).await
    }
}

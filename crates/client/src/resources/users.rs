use serde::Serialize;
use serde_json::Value;

use super::to_body;
use crate::client::{GatewayClient, HttpMethod};
use crate::error::Result;
use crate::query::QueryParams;

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Group memberships as Metabase expects them: `[{"id": 3}, ...]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_group_memberships: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl GatewayClient {
    pub async fn list_users(&self, include_deactivated: bool) -> Result<Value> {
        let query =
            QueryParams::new().push_opt("include_deactivated", include_deactivated.then_some(true));
        self.get_with_query("/api/user", &query).await
    }

    pub async fn current_user(&self) -> Result<Value> {
        self.get("/api/user/current").await
    }

    pub async fn get_user(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/user/{id}")).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<Value> {
        self.post("/api/user", to_body(user)?).await
    }

    pub async fn update_user(&self, id: u64, update: &UserUpdate) -> Result<Value> {
        self.put(&format!("/api/user/{id}"), to_body(update)?).await
    }

    /// Metabase never hard-deletes users; DELETE deactivates them.
    pub async fn deactivate_user(&self, id: u64) -> Result<Value> {
        self.delete(&format!("/api/user/{id}")).await
    }

    pub async fn reactivate_user(&self, id: u64) -> Result<Value> {
        self.call(HttpMethod::Put, &format!("/api/user/{id}/reactivate"), None)
            .await
    }
}

use serde_json::{json, Value};

use crate::client::GatewayClient;
use crate::error::Result;

impl GatewayClient {
    pub async fn list_permission_groups(&self) -> Result<Value> {
        self.get("/api/permissions/group").await
    }

    pub async fn get_permission_group(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/permissions/group/{id}")).await
    }

    pub async fn create_permission_group(&self, name: &str) -> Result<Value> {
        self.post("/api/permissions/group", json!({ "name": name }))
            .await
    }

    pub async fn delete_permission_group(&self, id: u64) -> Result<Value> {
        self.delete(&format!("/api/permissions/group/{id}")).await
    }

    pub async fn permissions_graph(&self) -> Result<Value> {
        self.get("/api/permissions/graph").await
    }

    /// Submit a full graph. It must carry the `revision` read from
    /// [`GatewayClient::permissions_graph`] or Metabase rejects it.
    pub async fn update_permissions_graph(&self, graph: Value) -> Result<Value> {
        self.put("/api/permissions/graph", graph).await
    }

    pub async fn add_group_member(&self, group_id: u64, user_id: u64) -> Result<Value> {
        self.post(
            "/api/permissions/membership",
            json!({ "group_id": group_id, "user_id": user_id }),
        )
        .await
    }

    pub async fn remove_group_member(&self, membership_id: u64) -> Result<Value> {
        self.delete(&format!("/api/permissions/membership/{membership_id}"))
            .await
    }
}

use serde::Serialize;
use serde_json::{json, Value};

use super::to_body;
use crate::client::GatewayClient;
use crate::error::Result;
use crate::query::QueryParams;

/// Ad-hoc SQL run through `/api/dataset`.
#[derive(Debug, Clone)]
pub struct NativeQuery {
    pub database_id: u64,
    pub sql: String,
    pub template_tags: Option<Value>,
    pub parameters: Option<Vec<Value>>,
}

impl NativeQuery {
    pub fn new(database_id: u64, sql: impl Into<String>) -> Self {
        Self {
            database_id,
            sql: sql.into(),
            template_tags: None,
            parameters: None,
        }
    }

    fn to_value(&self) -> Result<Value> {
        #[derive(Serialize)]
        struct Native<'a> {
            query: &'a str,
            #[serde(rename = "template-tags", skip_serializing_if = "Option::is_none")]
            template_tags: Option<&'a Value>,
        }
        let mut body = json!({
            "database": self.database_id,
            "type": "native",
            "native": to_body(&Native {
                query: &self.sql,
                template_tags: self.template_tags.as_ref(),
            })?,
        });
        if let Some(parameters) = &self.parameters {
            body["parameters"] = Value::Array(parameters.clone());
        }
        Ok(body)
    }
}

impl GatewayClient {
    pub async fn list_databases(&self, include_tables: bool) -> Result<Value> {
        let query = QueryParams::new().push_opt("include", include_tables.then_some("tables"));
        self.get_with_query("/api/database", &query).await
    }

    pub async fn get_database(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/database/{id}")).await
    }

    pub async fn database_metadata(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/database/{id}/metadata")).await
    }

    pub async fn database_schemas(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/database/{id}/schemas")).await
    }

    pub async fn schema_tables(&self, id: u64, schema: &str) -> Result<Value> {
        let schema = urlencoding::encode(schema);
        self.get(&format!("/api/database/{id}/schema/{schema}"))
            .await
    }

    pub async fn sync_database_schema(&self, id: u64) -> Result<Value> {
        self.post(&format!("/api/database/{id}/sync_schema"), json!({}))
            .await
    }

    pub async fn rescan_database_values(&self, id: u64) -> Result<Value> {
        self.post(&format!("/api/database/{id}/rescan_values"), json!({}))
            .await
    }

    pub async fn execute_native_query(&self, query: &NativeQuery) -> Result<Value> {
        self.post("/api/dataset", query.to_value()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_query_body_without_extras() {
        let body = NativeQuery::new(1, "select count(*) from orders")
            .to_value()
            .unwrap();
        assert_eq!(
            body,
            json!({
                "database": 1,
                "type": "native",
                "native": {"query": "select count(*) from orders"}
            })
        );
    }

    #[test]
    fn native_query_body_with_template_tags_and_parameters() {
        let mut query = NativeQuery::new(3, "select * from t where id = {{id}}");
        query.template_tags = Some(json!({"id": {"name": "id", "type": "number"}}));
        query.parameters = Some(vec![json!({"type": "category", "value": 7})]);
        let body = query.to_value().unwrap();
        assert_eq!(body["native"]["template-tags"]["id"]["type"], "number");
        assert_eq!(body["parameters"][0]["value"], 7);
    }
}

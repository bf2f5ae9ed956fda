use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use super::to_body;
use crate::client::{GatewayClient, HttpMethod, RequestBody};
use crate::error::{GatewayError, Result};
use crate::query::QueryParams;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `null`, `hidden`, `technical` or `cruft`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_type: Option<String>,
}

/// CSV file to append to (or replace the contents of) an uploaded table.
#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl CsvUpload {
    pub fn new(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    fn into_form(self) -> Result<Form> {
        let part = Part::bytes(self.contents)
            .file_name(self.file_name)
            .mime_str("text/csv")
            .map_err(|e| GatewayError::InvalidRequest(format!("invalid CSV upload: {e}")))?;
        Ok(Form::new().part("file", part))
    }
}

impl GatewayClient {
    pub async fn list_tables(&self) -> Result<Value> {
        self.get("/api/table").await
    }

    pub async fn get_table(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/table/{id}")).await
    }

    pub async fn table_query_metadata(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/table/{id}/query_metadata")).await
    }

    pub async fn table_foreign_keys(&self, id: u64) -> Result<Value> {
        self.get(&format!("/api/table/{id}/fks")).await
    }

    pub async fn update_table(&self, id: u64, update: &TableUpdate) -> Result<Value> {
        self.put(&format!("/api/table/{id}"), to_body(update)?).await
    }

    pub async fn append_csv(&self, id: u64, upload: CsvUpload) -> Result<Value> {
        self.upload_csv(&format!("/api/table/{id}/append-csv"), upload)
            .await
    }

    pub async fn replace_csv(&self, id: u64, upload: CsvUpload) -> Result<Value> {
        self.upload_csv(&format!("/api/table/{id}/replace-csv"), upload)
            .await
    }

    async fn upload_csv(&self, path: &str, upload: CsvUpload) -> Result<Value> {
        let form = upload.into_form()?;
        self.call_with(
            HttpMethod::Post,
            path,
            &QueryParams::new(),
            RequestBody::Multipart(form),
        )
        .await
    }
}

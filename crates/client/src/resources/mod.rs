//! Typed convenience wrappers, one module per Metabase resource family.
//!
//! Each wrapper only places parameters (path segments, query pairs, JSON
//! fields) and then goes through the generic call, so authentication and
//! error behaviour are identical to [`crate::GatewayClient::call`].

mod activity;
mod cards;
mod collections;
mod dashboards;
mod databases;
mod permissions;
mod search;
mod tables;
mod users;

pub use activity::RevisionEntity;
pub use cards::{CardUpdate, NewCard};
pub use collections::{CollectionId, CollectionUpdate, NewCollection};
pub use dashboards::{DashboardCopy, DashboardUpdate, NewDashboard};
pub use databases::NativeQuery;
pub use search::SearchRequest;
pub use tables::{CsvUpload, TableUpdate};
pub use users::{NewUser, UserUpdate};

use serde::Serialize;
use serde_json::Value;

use crate::error::{GatewayError, Result};

fn to_body<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| GatewayError::InvalidRequest(format!("failed to encode request body: {e}")))
}

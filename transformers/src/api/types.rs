//! REST API types.
//!
//! Query parameters accepted by the resource endpoints and the JSON
//! envelope wrapped around transformed output. Field names are camelCase.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::Config;
use crate::entity::PageMeta;
use crate::transform::InclusionTree;

/// Query string of `/api/{collection}` and `/api/{collection}/{id}`.
///
/// `?include=posts.tags,isOfAge&strategy=admin&page=2&perPage=5&strict=true`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformQuery {
    /// Comma separated inclusion paths
    pub include: Option<String>,
    /// Strategy key; the type's default when absent
    pub strategy: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    /// Fail on inclusion names that resolve to nothing
    pub strict: bool,
}

impl TransformQuery {
    pub fn inclusions(&self) -> InclusionTree {
        self.include
            .as_deref()
            .map(InclusionTree::from_query)
            .unwrap_or_default()
    }

    /// Requested page (1-based) and clamped page size.
    pub fn window(&self, config: &Config) -> (usize, usize) {
        (self.page.unwrap_or(1).max(1), config.per_page(self.per_page))
    }
}

/// Envelope for every successful resource response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub request_id: String,
    pub data: Value,
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub entity_type: String,
    /// Strategy key that produced `data`
    pub strategy: String,
    /// Flattened inclusion paths that were applied
    pub include: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
}

impl ResourceResponse {
    pub fn new(request_id: impl Into<String>, data: Value, meta: ResponseMeta) -> Self {
        Self {
            request_id: request_id.into(),
            data,
            meta,
        }
    }
}

/// One entry of `/api/strategies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyListing {
    pub entity_type: String,
    pub default: String,
    pub strategies: Vec<String>,
}

pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": new_request_id(),
        "status": "error",
        "error": error,
        "data": null,
    })
}
